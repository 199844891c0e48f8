//! Tests del reintento de alertas fallidas: actualización en el lugar,
//! reconstrucción del mensaje desde el estado actual y contexto perdido.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};

use common::{MemoryStore, MockEmailSender, MockSmsSender};
use roadready_backend::models::{
    AlertChannel, AlertReason, AlertStatus, EntityKind, EntityRef, NewAlert,
};
use roadready_backend::services::alert_retry::RetrySweeper;

fn failed_alert(
    store: &MemoryStore,
    fleet: uuid::Uuid,
    driver: uuid::Uuid,
    doc: uuid::Uuid,
    age_hours: i64,
) -> uuid::Uuid {
    let created = Utc::now() - Duration::hours(age_hours);
    store.seed_alert(
        NewAlert {
            fleet_id: fleet,
            channel: AlertChannel::Email,
            to_address: "owner@fleet.test".to_string(),
            reason: AlertReason::Expired,
            entity_kind: EntityKind::Driver,
            entity_id: driver,
            document_id: Some(doc),
            status: AlertStatus::Failed,
            error: Some("Resend returned 500".to_string()),
            sent_at: None,
        },
        created,
    )
}

#[tokio::test]
async fn test_retry_updates_alert_in_place() {
    let store = Arc::new(MemoryStore::new());
    let email = Arc::new(MockEmailSender::new());
    let sms = Arc::new(MockSmsSender::unconfigured());

    let now = Utc::now();
    let fleet = store.add_fleet(Some("owner@fleet.test"), None);
    let driver = store.add_driver(fleet, "Maria Lopez");
    let doc = store.add_document(
        fleet,
        EntityRef::new(EntityKind::Driver, driver),
        "CDL",
        Some(now.date_naive() - Duration::days(2)),
    );
    let alert_id = failed_alert(&store, fleet, driver, doc, 3);

    let summary = RetrySweeper::new(store.clone(), email.clone(), sms)
        .run_as_of(now)
        .await
        .unwrap();

    assert_eq!(summary.retried, 1);
    assert_eq!(summary.still_failed, 0);

    // Misma fila, ahora sent y sin error
    let alerts = store.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].id, alert_id);
    assert_eq!(alerts[0].status, AlertStatus::Sent);
    assert!(alerts[0].error.is_none());
    assert!(alerts[0].sent_at.is_some());

    // El mensaje se reconstruyó desde el documento actual
    let sent = email.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.contains("CDL"));
}

#[tokio::test]
async fn test_retry_that_fails_again_stays_failed() {
    let store = Arc::new(MemoryStore::new());
    let email = Arc::new(MockEmailSender::new());
    let sms = Arc::new(MockSmsSender::unconfigured());
    email.fail_all();

    let now = Utc::now();
    let fleet = store.add_fleet(Some("owner@fleet.test"), None);
    let driver = store.add_driver(fleet, "Maria Lopez");
    let doc = store.add_document(
        fleet,
        EntityRef::new(EntityKind::Driver, driver),
        "CDL",
        Some(now.date_naive() - Duration::days(2)),
    );
    failed_alert(&store, fleet, driver, doc, 3);

    let summary = RetrySweeper::new(store.clone(), email, sms)
        .run_as_of(now)
        .await
        .unwrap();

    assert_eq!(summary.retried, 1);
    assert_eq!(summary.still_failed, 1);

    let alerts = store.alerts();
    assert_eq!(alerts[0].status, AlertStatus::Failed);
    assert!(alerts[0].error.as_deref().unwrap().contains("Simulated"));
}

#[tokio::test]
async fn test_alert_older_than_window_is_not_retried() {
    let store = Arc::new(MemoryStore::new());
    let email = Arc::new(MockEmailSender::new());
    let sms = Arc::new(MockSmsSender::unconfigured());

    let now = Utc::now();
    let fleet = store.add_fleet(Some("owner@fleet.test"), None);
    let driver = store.add_driver(fleet, "Maria Lopez");
    let doc = store.add_document(
        fleet,
        EntityRef::new(EntityKind::Driver, driver),
        "CDL",
        Some(now.date_naive() - Duration::days(2)),
    );
    failed_alert(&store, fleet, driver, doc, 30);

    let summary = RetrySweeper::new(store.clone(), email.clone(), sms)
        .run_as_of(now)
        .await
        .unwrap();

    assert_eq!(summary.retried, 0);
    assert!(email.sent().is_empty());
    assert_eq!(store.alerts()[0].status, AlertStatus::Failed);
}

#[tokio::test]
async fn test_deleted_document_marks_retry_still_failed() {
    let store = Arc::new(MemoryStore::new());
    let email = Arc::new(MockEmailSender::new());
    let sms = Arc::new(MockSmsSender::unconfigured());

    let now = Utc::now();
    let fleet = store.add_fleet(Some("owner@fleet.test"), None);
    let driver = store.add_driver(fleet, "Maria Lopez");
    let doc = store.add_document(
        fleet,
        EntityRef::new(EntityKind::Driver, driver),
        "CDL",
        Some(now.date_naive() - Duration::days(2)),
    );
    failed_alert(&store, fleet, driver, doc, 3);
    store.remove_document(doc);

    let summary = RetrySweeper::new(store.clone(), email.clone(), sms)
        .run_as_of(now)
        .await
        .unwrap();

    assert_eq!(summary.retried, 1);
    assert_eq!(summary.still_failed, 1);
    assert!(email.sent().is_empty());

    let alerts = store.alerts();
    assert_eq!(alerts[0].status, AlertStatus::Failed);
    assert!(alerts[0].error.as_deref().unwrap().contains("no longer exists"));
}

#[tokio::test]
async fn test_retry_uses_current_fleet_email() {
    let store = Arc::new(MemoryStore::new());
    let email = Arc::new(MockEmailSender::new());
    let sms = Arc::new(MockSmsSender::unconfigured());

    let now = Utc::now();
    // El email actual de la flota difiere del guardado en la alerta
    let fleet = store.add_fleet(Some("new-owner@fleet.test"), None);
    let driver = store.add_driver(fleet, "Maria Lopez");
    let doc = store.add_document(
        fleet,
        EntityRef::new(EntityKind::Driver, driver),
        "CDL",
        Some(now.date_naive() - Duration::days(2)),
    );
    failed_alert(&store, fleet, driver, doc, 3);

    RetrySweeper::new(store.clone(), email.clone(), sms)
        .run_as_of(now)
        .await
        .unwrap();

    let sent = email.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "new-owner@fleet.test");
}
