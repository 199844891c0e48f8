//! Tests de integración del sweep de vencimientos: dedup de 24h, digest por
//! flota, log de alertas sin huecos y aislamiento de errores entre flotas.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};

use common::{MemoryStore, MockEmailSender, MockSmsSender};
use roadready_backend::models::{
    AlertChannel, AlertReason, AlertStatus, EntityKind, EntityRef, EntityStatus, NewAlert,
};
use roadready_backend::services::expiration_sweep::ExpirationSweeper;
use roadready_backend::services::status_engine::StatusConfig;

fn sweeper(
    store: Arc<MemoryStore>,
    email: Arc<MockEmailSender>,
    sms: Arc<MockSmsSender>,
) -> ExpirationSweeper {
    ExpirationSweeper::new(store, email, sms, StatusConfig::default())
}

#[tokio::test]
async fn test_expired_document_sends_urgent_email_and_logs_alert() {
    let store = Arc::new(MemoryStore::new());
    let email = Arc::new(MockEmailSender::new());
    let sms = Arc::new(MockSmsSender::unconfigured());

    let now = Utc::now();
    let fleet = store.add_fleet(Some("owner@fleet.test"), None);
    let driver = store.add_driver(fleet, "Maria Lopez");
    let entity = EntityRef::new(EntityKind::Driver, driver);
    store.add_document(fleet, entity, "CDL", Some(now.date_naive() - Duration::days(3)));
    store.add_document(fleet, entity, "Medical Card", Some(now.date_naive() + Duration::days(300)));

    let summary = sweeper(store.clone(), email.clone(), sms)
        .run_as_of(now)
        .await
        .unwrap();

    assert_eq!(summary.alerts_sent, 1);
    assert!(summary.errors.is_empty());

    let sent = email.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "owner@fleet.test");
    assert!(sent[0].subject.contains("URGENT"));
    assert!(sent[0].subject.contains("CDL"));
    assert!(sent[0].subject.contains("Maria Lopez"));

    let alerts = store.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].reason, AlertReason::Expired);
    assert_eq!(alerts[0].status, AlertStatus::Sent);
    assert!(alerts[0].sent_at.is_some());

    // El sweep también re-sincroniza el estado de la entidad
    assert_eq!(store.driver_status(driver), Some(EntityStatus::Red));
}

#[tokio::test]
async fn test_expiring_soon_documents_batch_into_one_digest() {
    let store = Arc::new(MemoryStore::new());
    let email = Arc::new(MockEmailSender::new());
    let sms = Arc::new(MockSmsSender::unconfigured());

    let now = Utc::now();
    let today = now.date_naive();
    let fleet = store.add_fleet(Some("owner@fleet.test"), None);

    let driver = store.add_driver(fleet, "Maria Lopez");
    let vehicle = store.add_vehicle(fleet, "42");
    store.add_document(
        fleet,
        EntityRef::new(EntityKind::Driver, driver),
        "CDL",
        Some(today + Duration::days(10)),
    );
    store.add_document(
        fleet,
        EntityRef::new(EntityKind::Vehicle, vehicle),
        "Registration",
        Some(today + Duration::days(25)),
    );

    let summary = sweeper(store.clone(), email.clone(), sms)
        .run_as_of(now)
        .await
        .unwrap();

    // Un solo email para los dos documentos
    let sent = email.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "2 documents expiring soon");
    assert!(sent[0].html.contains("Maria Lopez"));
    assert!(sent[0].html.contains("Unit 42"));
    assert_eq!(summary.alerts_sent, 1);

    // Pero una fila de alerta por documento
    let alerts = store.alerts();
    assert_eq!(alerts.len(), 2);
    assert!(alerts.iter().all(|a| a.reason == AlertReason::ExpiringSoon));
    assert!(alerts.iter().all(|a| a.status == AlertStatus::Sent));
}

#[tokio::test]
async fn test_recent_alert_suppresses_resend_within_24h() {
    let store = Arc::new(MemoryStore::new());
    let email = Arc::new(MockEmailSender::new());
    let sms = Arc::new(MockSmsSender::unconfigured());

    let now = Utc::now();
    let fleet = store.add_fleet(Some("owner@fleet.test"), None);
    let driver = store.add_driver(fleet, "Maria Lopez");
    let entity = EntityRef::new(EntityKind::Driver, driver);
    let doc = store.add_document(fleet, entity, "CDL", Some(now.date_naive() - Duration::days(1)));

    // Alerta de hace 2 horas por el mismo documento
    store.seed_alert(
        NewAlert {
            fleet_id: fleet,
            channel: AlertChannel::Email,
            to_address: "owner@fleet.test".to_string(),
            reason: AlertReason::ExpiringSoon,
            entity_kind: EntityKind::Driver,
            entity_id: driver,
            document_id: Some(doc),
            status: AlertStatus::Sent,
            error: None,
            sent_at: Some(now - Duration::hours(2)),
        },
        now - Duration::hours(2),
    );

    let summary = sweeper(store.clone(), email.clone(), sms)
        .run_as_of(now)
        .await
        .unwrap();

    // Suprimida: ni email ni fila nueva, aunque el motivo haya cambiado
    assert_eq!(summary.alerts_sent, 0);
    assert!(email.sent().is_empty());
    assert_eq!(store.alerts().len(), 1);
}

#[tokio::test]
async fn test_stale_alert_outside_window_allows_resend() {
    let store = Arc::new(MemoryStore::new());
    let email = Arc::new(MockEmailSender::new());
    let sms = Arc::new(MockSmsSender::unconfigured());

    let now = Utc::now();
    let fleet = store.add_fleet(Some("owner@fleet.test"), None);
    let driver = store.add_driver(fleet, "Maria Lopez");
    let entity = EntityRef::new(EntityKind::Driver, driver);
    let doc = store.add_document(fleet, entity, "CDL", Some(now.date_naive() - Duration::days(1)));

    // Alerta de hace 25 horas: fuera de la ventana
    store.seed_alert(
        NewAlert {
            fleet_id: fleet,
            channel: AlertChannel::Email,
            to_address: "owner@fleet.test".to_string(),
            reason: AlertReason::Expired,
            entity_kind: EntityKind::Driver,
            entity_id: driver,
            document_id: Some(doc),
            status: AlertStatus::Sent,
            error: None,
            sent_at: Some(now - Duration::hours(25)),
        },
        now - Duration::hours(25),
    );

    let summary = sweeper(store.clone(), email.clone(), sms)
        .run_as_of(now)
        .await
        .unwrap();

    assert_eq!(summary.alerts_sent, 1);
    assert_eq!(email.sent().len(), 1);
    assert_eq!(store.alerts().len(), 2);
}

#[tokio::test]
async fn test_failed_send_still_logs_alert_row() {
    let store = Arc::new(MemoryStore::new());
    let email = Arc::new(MockEmailSender::new());
    let sms = Arc::new(MockSmsSender::unconfigured());
    email.fail_all();

    let now = Utc::now();
    let fleet = store.add_fleet(Some("owner@fleet.test"), None);
    let driver = store.add_driver(fleet, "Maria Lopez");
    store.add_document(
        fleet,
        EntityRef::new(EntityKind::Driver, driver),
        "CDL",
        Some(now.date_naive() - Duration::days(1)),
    );

    let summary = sweeper(store.clone(), email, sms)
        .run_as_of(now)
        .await
        .unwrap();

    // El envío falló pero la fila quedó en el log igual
    assert_eq!(summary.alerts_sent, 0);
    let alerts = store.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].status, AlertStatus::Failed);
    assert!(alerts[0].error.as_deref().unwrap().contains("Simulated"));
    assert!(alerts[0].sent_at.is_none());
}

#[tokio::test]
async fn test_one_fleet_failure_does_not_stop_the_sweep() {
    let store = Arc::new(MemoryStore::new());
    let email = Arc::new(MockEmailSender::new());
    let sms = Arc::new(MockSmsSender::unconfigured());

    let now = Utc::now();
    let bad_fleet = store.add_fleet(Some("bad@fleet.test"), None);
    let good_fleet = store.add_fleet(Some("good@fleet.test"), None);

    let bad_driver = store.add_driver(bad_fleet, "Bad Fleet Driver");
    let good_driver = store.add_driver(good_fleet, "Good Fleet Driver");
    store.add_document(
        bad_fleet,
        EntityRef::new(EntityKind::Driver, bad_driver),
        "CDL",
        Some(now.date_naive() - Duration::days(1)),
    );
    store.add_document(
        good_fleet,
        EntityRef::new(EntityKind::Driver, good_driver),
        "CDL",
        Some(now.date_naive() - Duration::days(1)),
    );

    *store.failing_fleet.lock().unwrap() = Some(bad_fleet);

    let summary = sweeper(store.clone(), email.clone(), sms)
        .run_as_of(now)
        .await
        .unwrap();

    // La flota buena salió bien, la mala quedó reportada en el summary
    assert_eq!(summary.alerts_sent, 1);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].contains(&bad_fleet.to_string()));
    assert_eq!(email.sent().len(), 1);
    assert_eq!(email.sent()[0].to, "good@fleet.test");
}

#[tokio::test]
async fn test_fleet_without_owner_email_is_reported_in_errors() {
    let store = Arc::new(MemoryStore::new());
    let email = Arc::new(MockEmailSender::new());
    let sms = Arc::new(MockSmsSender::unconfigured());

    let now = Utc::now();
    let fleet = store.add_fleet(None, None);
    let driver = store.add_driver(fleet, "Maria Lopez");
    store.add_document(
        fleet,
        EntityRef::new(EntityKind::Driver, driver),
        "CDL",
        Some(now.date_naive() - Duration::days(1)),
    );

    let summary = sweeper(store.clone(), email.clone(), sms)
        .run_as_of(now)
        .await
        .unwrap();

    // El skip no es silencioso: queda registrado en el summary
    assert_eq!(summary.alerts_sent, 0);
    assert!(email.sent().is_empty());
    assert!(store.alerts().is_empty());
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].contains(&fleet.to_string()));
    assert!(summary.errors[0].contains("no owner email"));
}

#[tokio::test]
async fn test_sms_goes_out_for_expired_when_configured() {
    let store = Arc::new(MemoryStore::new());
    let email = Arc::new(MockEmailSender::new());
    let sms = Arc::new(MockSmsSender::configured());

    let now = Utc::now();
    let fleet = store.add_fleet(Some("owner@fleet.test"), Some("+15550001111"));
    let driver = store.add_driver(fleet, "Maria Lopez");
    store.add_document(
        fleet,
        EntityRef::new(EntityKind::Driver, driver),
        "CDL",
        Some(now.date_naive() - Duration::days(1)),
    );

    let summary = sweeper(store.clone(), email, sms.clone())
        .run_as_of(now)
        .await
        .unwrap();

    // Email + SMS, cada uno con su fila
    assert_eq!(summary.alerts_sent, 2);
    let sms_sent = sms.sent();
    assert_eq!(sms_sent.len(), 1);
    assert_eq!(sms_sent[0].0, "+15550001111");
    assert!(sms_sent[0].1.contains("CDL"));

    let alerts = store.alerts();
    assert_eq!(alerts.len(), 2);
    assert!(alerts.iter().any(|a| a.channel == AlertChannel::Sms));
}
