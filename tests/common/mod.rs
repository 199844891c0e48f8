//! Infraestructura compartida de los tests de integración: un
//! `ComplianceStore` en memoria y senders de email/SMS que registran lo que
//! se les pidió enviar, con fallos inyectables.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use roadready_backend::models::{
    Alert, AlertStatus, Document, Driver, EntityDisplay, EntityKind, EntityRef, EntityStatus,
    Fleet, FleetOwnerContact, NewAlert, ProcessingStatus, Vehicle,
};
use roadready_backend::notifications::{EmailSender, SmsSender};
use roadready_backend::repositories::ComplianceStore;
use roadready_backend::utils::errors::{AppError, AppResult};

#[derive(Default)]
struct MemoryInner {
    fleets: Vec<Fleet>,
    drivers: Vec<Driver>,
    vehicles: Vec<Vehicle>,
    documents: Vec<Document>,
    alerts: Vec<Alert>,
}

/// Store en memoria para ejercitar sweep, retry y sync sin Postgres
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
    /// Si está activo, todas las operaciones de una flota dada fallan
    pub failing_fleet: Mutex<Option<Uuid>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_fleet(&self, email: Option<&str>, phone: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.lock().unwrap().fleets.push(Fleet {
            id,
            owner_id: Uuid::new_v4(),
            name: format!("Fleet {}", id),
            owner_email: email.map(String::from),
            owner_phone: phone.map(String::from),
            created_at: Utc::now(),
        });
        id
    }

    pub fn add_driver(&self, fleet_id: Uuid, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.lock().unwrap().drivers.push(Driver {
            id,
            fleet_id,
            name: name.to_string(),
            license_number: None,
            phone: None,
            status: EntityStatus::Red,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        id
    }

    pub fn add_vehicle(&self, fleet_id: Uuid, unit_number: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.lock().unwrap().vehicles.push(Vehicle {
            id,
            fleet_id,
            unit_number: unit_number.to_string(),
            vin: None,
            plate_number: None,
            status: EntityStatus::Red,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        id
    }

    pub fn add_document(
        &self,
        fleet_id: Uuid,
        entity: EntityRef,
        doc_type: &str,
        expires_on: Option<NaiveDate>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.lock().unwrap().documents.push(Document {
            id,
            fleet_id,
            entity_kind: entity.kind,
            entity_id: entity.id,
            doc_type: doc_type.to_string(),
            expires_on,
            status: EntityStatus::Green,
            processing_status: ProcessingStatus::Complete,
            needs_review: false,
            file_path: None,
            uploaded_at: Utc::now(),
            updated_at: Utc::now(),
        });
        id
    }

    pub fn remove_document(&self, id: Uuid) {
        self.inner.lock().unwrap().documents.retain(|d| d.id != id);
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.inner.lock().unwrap().alerts.clone()
    }

    pub fn seed_alert(&self, alert: NewAlert, created_at: DateTime<Utc>) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.lock().unwrap().alerts.push(Alert {
            id,
            fleet_id: alert.fleet_id,
            channel: alert.channel,
            to_address: alert.to_address,
            reason: alert.reason,
            entity_kind: alert.entity_kind,
            entity_id: alert.entity_id,
            document_id: alert.document_id,
            status: alert.status,
            error: alert.error,
            sent_at: alert.sent_at,
            created_at,
            updated_at: created_at,
        });
        id
    }

    pub fn driver_status(&self, id: Uuid) -> Option<EntityStatus> {
        self.inner
            .lock()
            .unwrap()
            .drivers
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.status)
    }

    pub fn vehicle_status(&self, id: Uuid) -> Option<EntityStatus> {
        self.inner
            .lock()
            .unwrap()
            .vehicles
            .iter()
            .find(|v| v.id == id)
            .map(|v| v.status)
    }

    fn check_fleet(&self, fleet_id: Uuid) -> AppResult<()> {
        if *self.failing_fleet.lock().unwrap() == Some(fleet_id) {
            return Err(AppError::Internal("Simulated store failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ComplianceStore for MemoryStore {
    async fn document_by_id(&self, id: Uuid) -> AppResult<Option<Document>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .documents
            .iter()
            .find(|d| d.id == id)
            .cloned())
    }

    async fn documents_for_entity(&self, entity: EntityRef) -> AppResult<Vec<Document>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .documents
            .iter()
            .filter(|d| d.entity_kind == entity.kind && d.entity_id == entity.id)
            .cloned()
            .collect())
    }

    async fn documents_expiring_on_or_before(
        &self,
        on_or_before: NaiveDate,
    ) -> AppResult<Vec<Document>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .documents
            .iter()
            .filter(|d| d.expires_on.map(|e| e <= on_or_before).unwrap_or(false))
            .cloned()
            .collect())
    }

    async fn update_document_status(
        &self,
        id: Uuid,
        status: EntityStatus,
        needs_review: bool,
    ) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(doc) = inner.documents.iter_mut().find(|d| d.id == id) {
            doc.status = status;
            doc.needs_review = needs_review;
            doc.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_document_processing(
        &self,
        id: Uuid,
        processing_status: ProcessingStatus,
    ) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(doc) = inner.documents.iter_mut().find(|d| d.id == id) {
            doc.processing_status = processing_status;
            doc.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_entity_status(&self, entity: EntityRef, status: EntityStatus) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        match entity.kind {
            EntityKind::Driver => {
                if let Some(d) = inner.drivers.iter_mut().find(|d| d.id == entity.id) {
                    d.status = status;
                }
            }
            EntityKind::Vehicle => {
                if let Some(v) = inner.vehicles.iter_mut().find(|v| v.id == entity.id) {
                    v.status = status;
                }
            }
        }
        Ok(())
    }

    async fn entity_display(&self, entity: EntityRef) -> AppResult<Option<EntityDisplay>> {
        let inner = self.inner.lock().unwrap();
        let name = match entity.kind {
            EntityKind::Driver => inner
                .drivers
                .iter()
                .find(|d| d.id == entity.id)
                .map(|d| d.name.clone()),
            EntityKind::Vehicle => inner
                .vehicles
                .iter()
                .find(|v| v.id == entity.id)
                .map(|v| format!("Unit {}", v.unit_number)),
        };
        Ok(name.map(|name| EntityDisplay { entity, name }))
    }

    async fn entity_phone(&self, entity: EntityRef) -> AppResult<Option<String>> {
        let inner = self.inner.lock().unwrap();
        match entity.kind {
            EntityKind::Driver => Ok(inner
                .drivers
                .iter()
                .find(|d| d.id == entity.id)
                .and_then(|d| d.phone.clone())),
            EntityKind::Vehicle => Ok(None),
        }
    }

    async fn fleet_owner_contact(&self, fleet_id: Uuid) -> AppResult<Option<FleetOwnerContact>> {
        self.check_fleet(fleet_id)?;
        Ok(self
            .inner
            .lock()
            .unwrap()
            .fleets
            .iter()
            .find(|f| f.id == fleet_id)
            .map(|f| FleetOwnerContact {
                email: f.owner_email.clone(),
                phone: f.owner_phone.clone(),
            }))
    }

    async fn alert_exists_since(
        &self,
        fleet_id: Uuid,
        document_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<bool> {
        Ok(self.inner.lock().unwrap().alerts.iter().any(|a| {
            a.fleet_id == fleet_id && a.document_id == Some(document_id) && a.created_at > since
        }))
    }

    async fn insert_alert(&self, alert: NewAlert) -> AppResult<Alert> {
        self.check_fleet(alert.fleet_id)?;
        let now = Utc::now();
        let row = Alert {
            id: Uuid::new_v4(),
            fleet_id: alert.fleet_id,
            channel: alert.channel,
            to_address: alert.to_address,
            reason: alert.reason,
            entity_kind: alert.entity_kind,
            entity_id: alert.entity_id,
            document_id: alert.document_id,
            status: alert.status,
            error: alert.error,
            sent_at: alert.sent_at,
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().unwrap().alerts.push(row.clone());
        Ok(row)
    }

    async fn update_alert_delivery(
        &self,
        id: Uuid,
        status: AlertStatus,
        error: Option<String>,
        sent_at: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(a) = inner.alerts.iter_mut().find(|a| a.id == id) {
            a.status = status;
            a.error = error;
            a.sent_at = sent_at;
            a.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn failed_alerts_since(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<Alert>> {
        let mut failed: Vec<Alert> = self
            .inner
            .lock()
            .unwrap()
            .alerts
            .iter()
            .filter(|a| a.status == AlertStatus::Failed && a.created_at > since)
            .cloned()
            .collect();
        failed.sort_by_key(|a| a.created_at);
        failed.truncate(limit as usize);
        Ok(failed)
    }
}

/// Email registrado por el mock
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Default)]
pub struct MockEmailSender {
    pub sent: Mutex<Vec<SentEmail>>,
    pub fail_next: Mutex<bool>,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_all(&self) {
        *self.fail_next.lock().unwrap() = true;
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    fn is_configured(&self) -> bool {
        true
    }

    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        if *self.fail_next.lock().unwrap() {
            return Err(AppError::ExternalApi("Simulated email failure".to_string()));
        }
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct MockSmsSender {
    pub configured: bool,
    pub sent: Mutex<Vec<(String, String)>>,
}

impl MockSmsSender {
    pub fn configured() -> Self {
        Self {
            configured: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsSender for MockSmsSender {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn send(&self, to: &str, body: &str) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}
