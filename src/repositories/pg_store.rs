//! Implementación Postgres del `ComplianceStore`
//!
//! Delega en los repositorios por tabla. Es la única implementación real;
//! los tests de integración usan un store en memoria.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    Alert, AlertStatus, Document, EntityDisplay, EntityKind, EntityRef, EntityStatus,
    FleetOwnerContact, NewAlert, ProcessingStatus,
};
use crate::repositories::{
    AlertRepository, ComplianceStore, DocumentRepository, DriverRepository, FleetRepository,
    VehicleRepository,
};
use crate::utils::errors::AppResult;

pub struct PgComplianceStore {
    documents: DocumentRepository,
    drivers: DriverRepository,
    vehicles: VehicleRepository,
    fleets: FleetRepository,
    alerts: AlertRepository,
}

impl PgComplianceStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            documents: DocumentRepository::new(pool.clone()),
            drivers: DriverRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool.clone()),
            fleets: FleetRepository::new(pool.clone()),
            alerts: AlertRepository::new(pool),
        }
    }
}

#[async_trait]
impl ComplianceStore for PgComplianceStore {
    async fn document_by_id(&self, id: Uuid) -> AppResult<Option<Document>> {
        self.documents.find_by_id(id).await
    }

    async fn documents_for_entity(&self, entity: EntityRef) -> AppResult<Vec<Document>> {
        self.documents.find_by_entity(entity).await
    }

    async fn documents_expiring_on_or_before(
        &self,
        on_or_before: NaiveDate,
    ) -> AppResult<Vec<Document>> {
        self.documents.expiring_on_or_before(on_or_before).await
    }

    async fn update_document_status(
        &self,
        id: Uuid,
        status: EntityStatus,
        needs_review: bool,
    ) -> AppResult<()> {
        self.documents.update_status(id, status, needs_review).await
    }

    async fn update_document_processing(
        &self,
        id: Uuid,
        processing_status: ProcessingStatus,
    ) -> AppResult<()> {
        self.documents.update_processing(id, processing_status).await
    }

    async fn update_entity_status(&self, entity: EntityRef, status: EntityStatus) -> AppResult<()> {
        match entity.kind {
            EntityKind::Driver => self.drivers.update_status(entity.id, status).await,
            EntityKind::Vehicle => self.vehicles.update_status(entity.id, status).await,
        }
    }

    async fn entity_display(&self, entity: EntityRef) -> AppResult<Option<EntityDisplay>> {
        let name = match entity.kind {
            EntityKind::Driver => self
                .drivers
                .find_by_id(entity.id)
                .await?
                .map(|d| d.name),
            EntityKind::Vehicle => self
                .vehicles
                .find_by_id(entity.id)
                .await?
                .map(|v| format!("Unit {}", v.unit_number)),
        };

        Ok(name.map(|name| EntityDisplay { entity, name }))
    }

    async fn entity_phone(&self, entity: EntityRef) -> AppResult<Option<String>> {
        match entity.kind {
            EntityKind::Driver => Ok(self
                .drivers
                .find_by_id(entity.id)
                .await?
                .and_then(|d| d.phone)),
            EntityKind::Vehicle => Ok(None),
        }
    }

    async fn fleet_owner_contact(&self, fleet_id: Uuid) -> AppResult<Option<FleetOwnerContact>> {
        self.fleets.owner_contact(fleet_id).await
    }

    async fn alert_exists_since(
        &self,
        fleet_id: Uuid,
        document_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.alerts.exists_since(fleet_id, document_id, since).await
    }

    async fn insert_alert(&self, alert: NewAlert) -> AppResult<Alert> {
        self.alerts.insert(alert).await
    }

    async fn update_alert_delivery(
        &self,
        id: Uuid,
        status: AlertStatus,
        error: Option<String>,
        sent_at: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        self.alerts.update_delivery(id, status, error, sent_at).await
    }

    async fn failed_alerts_since(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<Alert>> {
        self.alerts.failed_since(since, limit).await
    }
}
