//! Trait de acceso a datos para los servicios de cumplimiento
//!
//! Los servicios (sincronizador de estado, sweep de vencimientos, retry de
//! alertas, pipeline de documentos) no hablan con sqlx directamente: dependen
//! de este trait. En producción lo implementa `PgComplianceStore`; en tests
//! de integración, un store en memoria.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{
    Alert, AlertStatus, Document, EntityDisplay, EntityRef, EntityStatus, FleetOwnerContact,
    NewAlert, ProcessingStatus,
};
use crate::utils::errors::AppResult;

#[async_trait]
pub trait ComplianceStore: Send + Sync {
    // --- Documentos ---

    async fn document_by_id(&self, id: Uuid) -> AppResult<Option<Document>>;

    async fn documents_for_entity(&self, entity: EntityRef) -> AppResult<Vec<Document>>;

    /// Documentos con fecha de vencimiento en o antes de `on_or_before`
    /// (incluye los ya vencidos). Alimenta el sweep diario.
    async fn documents_expiring_on_or_before(
        &self,
        on_or_before: NaiveDate,
    ) -> AppResult<Vec<Document>>;

    async fn update_document_status(
        &self,
        id: Uuid,
        status: EntityStatus,
        needs_review: bool,
    ) -> AppResult<()>;

    async fn update_document_processing(
        &self,
        id: Uuid,
        processing_status: ProcessingStatus,
    ) -> AppResult<()>;

    // --- Entidades ---

    async fn update_entity_status(&self, entity: EntityRef, status: EntityStatus) -> AppResult<()>;

    /// Nombre visible de la entidad para mensajes de alerta
    async fn entity_display(&self, entity: EntityRef) -> AppResult<Option<EntityDisplay>>;

    /// Teléfono del driver, si la entidad es un driver y lo tiene cargado
    async fn entity_phone(&self, entity: EntityRef) -> AppResult<Option<String>>;

    // --- Flotas ---

    async fn fleet_owner_contact(&self, fleet_id: Uuid) -> AppResult<Option<FleetOwnerContact>>;

    // --- Alertas ---

    /// ¿Existe una alerta para (fleet, document) creada después de `since`?
    /// La clave de dedup ignora el motivo a propósito.
    async fn alert_exists_since(
        &self,
        fleet_id: Uuid,
        document_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<bool>;

    async fn insert_alert(&self, alert: NewAlert) -> AppResult<Alert>;

    async fn update_alert_delivery(
        &self,
        id: Uuid,
        status: AlertStatus,
        error: Option<String>,
        sent_at: Option<DateTime<Utc>>,
    ) -> AppResult<()>;

    /// Alertas fallidas creadas después de `since`, más viejas primero,
    /// hasta `limit` filas.
    async fn failed_alerts_since(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<Alert>>;
}
