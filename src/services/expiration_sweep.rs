//! Sweep diario de vencimientos
//!
//! Recorre todos los documentos vencidos o por vencer, re-sincroniza los
//! estados de las entidades afectadas y despacha alertas al dueño de cada
//! flota: email individual urgente por cada documento vencido (más SMS si
//! hay teléfono y Twilio configurado) y un único digest por flota con todo
//! lo que vence dentro de la ventana.
//!
//! Reglas de despacho:
//! - Dedup de 24h por (flota, documento), sin distinguir motivo.
//! - Cada intento de envío deja fila en alerts, falle o no el canal.
//! - Un error en una flota no corta el sweep: queda en el summary y se
//!   sigue con la siguiente.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    Alert, AlertChannel, AlertReason, AlertStatus, Document, EntityRef, FleetOwnerContact,
    NewAlert,
};
use crate::notifications::{
    build_digest_email, build_expired_email, build_expired_sms, AlertContext, DigestItem,
    EmailSender, SmsSender,
};
use crate::repositories::ComplianceStore;
use crate::services::status_engine::{days_until, StatusConfig};
use crate::utils::errors::AppResult;

/// Ventana de deduplicación de alertas
const DEDUP_WINDOW_HOURS: i64 = 24;

/// Resumen del sweep. Siempre se devuelve con forma de éxito: los errores
/// por flota van adentro, no cortan el job.
#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    /// Documentos examinados (vencidos + por vencer)
    pub processed: usize,
    pub alerts_sent: usize,
    pub errors: Vec<String>,
}

pub struct ExpirationSweeper {
    store: Arc<dyn ComplianceStore>,
    email: Arc<dyn EmailSender>,
    sms: Arc<dyn SmsSender>,
    config: StatusConfig,
}

struct FleetOutcome {
    alerts_sent: usize,
    errors: Vec<String>,
}

impl FleetOutcome {
    fn new() -> Self {
        Self {
            alerts_sent: 0,
            errors: Vec::new(),
        }
    }
}

impl ExpirationSweeper {
    pub fn new(
        store: Arc<dyn ComplianceStore>,
        email: Arc<dyn EmailSender>,
        sms: Arc<dyn SmsSender>,
        config: StatusConfig,
    ) -> Self {
        Self {
            store,
            email,
            sms,
            config,
        }
    }

    pub async fn run(&self) -> AppResult<SweepSummary> {
        self.run_as_of(Utc::now()).await
    }

    /// Variante con reloj explícito para los tests.
    pub async fn run_as_of(&self, now: DateTime<Utc>) -> AppResult<SweepSummary> {
        let today = now.date_naive();
        let window_end = today + Duration::days(self.config.yellow_window_days);

        log::info!("🧹 Expiration sweep starting (window through {})", window_end);

        let documents = self
            .store
            .documents_expiring_on_or_before(window_end)
            .await?;

        let mut by_fleet: HashMap<Uuid, Vec<Document>> = HashMap::new();
        for doc in documents {
            by_fleet.entry(doc.fleet_id).or_default().push(doc);
        }

        let mut summary = SweepSummary {
            processed: 0,
            alerts_sent: 0,
            errors: Vec::new(),
        };

        for (fleet_id, docs) in by_fleet {
            summary.processed += docs.len();

            match self.sweep_fleet(fleet_id, &docs, now).await {
                Ok(outcome) => {
                    summary.alerts_sent += outcome.alerts_sent;
                    summary.errors.extend(outcome.errors);
                }
                Err(e) => {
                    log::error!("❌ Sweep failed for fleet {}: {}", fleet_id, e);
                    summary.errors.push(format!("Fleet {}: {}", fleet_id, e));
                }
            }
        }

        log::info!(
            "✅ Expiration sweep done: {} documents, {} alerts, {} errors",
            summary.processed,
            summary.alerts_sent,
            summary.errors.len()
        );

        Ok(summary)
    }

    async fn sweep_fleet(
        &self,
        fleet_id: Uuid,
        docs: &[Document],
        now: DateTime<Utc>,
    ) -> AppResult<FleetOutcome> {
        let today = now.date_naive();
        let dedup_since = now - Duration::hours(DEDUP_WINDOW_HOURS);

        let Some(contact) = self.store.fleet_owner_contact(fleet_id).await? else {
            log::warn!("⚠️ Fleet {} not found, skipping", fleet_id);
            let mut outcome = FleetOutcome::new();
            outcome.errors.push(format!("Fleet {}: not found", fleet_id));
            return Ok(outcome);
        };

        let mut outcome = FleetOutcome::new();
        let mut digest_items: Vec<DigestItem> = Vec::new();
        let mut digest_docs: Vec<&Document> = Vec::new();
        let mut touched_entities: Vec<EntityRef> = Vec::new();

        for doc in docs {
            let entity = doc.entity_ref();
            if !touched_entities.contains(&entity) {
                touched_entities.push(entity);
            }

            let Some(expires_on) = doc.expires_on else {
                continue;
            };

            // Dedup: si ya avisamos por este documento en la ventana,
            // ni fila nueva ni envío
            if self
                .store
                .alert_exists_since(fleet_id, doc.id, dedup_since)
                .await?
            {
                log::info!("⏭️ Alert for document {} suppressed by dedup window", doc.id);
                continue;
            }

            let Some(display) = self.store.entity_display(entity).await? else {
                log::warn!(
                    "⚠️ Document {} references missing {} {}, skipping",
                    doc.id,
                    entity.kind.as_str(),
                    entity.id
                );
                continue;
            };

            let days = days_until(expires_on, today);
            if days < 0 {
                self.dispatch_expired(fleet_id, doc, &contact, &display.name, &mut outcome)
                    .await?;
            } else {
                digest_items.push(DigestItem {
                    entity_label: entity.kind.label().to_string(),
                    entity_name: display.name,
                    doc_type: doc.doc_type.clone(),
                    expires_on,
                    days_remaining: days,
                });
                digest_docs.push(doc);
            }
        }

        if !digest_items.is_empty() {
            self.dispatch_digest(fleet_id, &contact, &digest_items, &digest_docs, &mut outcome)
                .await?;
        }

        // Re-sincronizar el estado de cada entidad tocada por el sweep
        for entity in touched_entities {
            let documents = self.store.documents_for_entity(entity).await?;
            let result =
                super::status_engine::compute_status(entity.kind, &documents, &self.config, today);
            self.store.update_entity_status(entity, result.status).await?;
        }

        Ok(outcome)
    }

    /// Email urgente individual, más SMS si hay canal y teléfono.
    async fn dispatch_expired(
        &self,
        fleet_id: Uuid,
        doc: &Document,
        contact: &FleetOwnerContact,
        entity_name: &str,
        outcome: &mut FleetOutcome,
    ) -> AppResult<()> {
        let entity = doc.entity_ref();
        let expires_on = match doc.expires_on {
            Some(d) => d,
            None => return Ok(()),
        };

        if let Some(email) = contact.email.as_deref() {
            let ctx = AlertContext {
                entity_label: entity.kind.label().to_string(),
                entity_name: entity_name.to_string(),
                doc_type: doc.doc_type.clone(),
                expires_on,
            };
            let (subject, html) = build_expired_email(&ctx);

            let send_result = if self.email.is_configured() {
                self.email.send(email, &subject, &html).await
            } else {
                Err(crate::utils::errors::AppError::ServiceUnavailable(
                    "Email sender not configured".to_string(),
                ))
            };

            self.log_attempt(
                fleet_id,
                AlertChannel::Email,
                email,
                AlertReason::Expired,
                entity,
                Some(doc.id),
                &send_result,
                outcome,
            )
            .await?;
        } else {
            // El skip queda en el summary, no solo en el log
            log::warn!("⚠️ Fleet {} has no owner email, skipping email alert", fleet_id);
            outcome.errors.push(format!(
                "Fleet {}: no owner email for expired {} alert",
                fleet_id, doc.doc_type
            ));
        }

        // SMS solo para urgentes, con teléfono del dueño o del driver
        if self.sms.is_configured() {
            let phone = match contact.phone.clone() {
                Some(p) => Some(p),
                None => self.store.entity_phone(entity).await?,
            };
            if let Some(phone) = phone {
                let body = build_expired_sms(
                    entity.kind.label(),
                    entity_name,
                    &doc.doc_type,
                    expires_on,
                );
                let send_result = self.sms.send(&phone, &body).await;

                self.log_attempt(
                    fleet_id,
                    AlertChannel::Sms,
                    &phone,
                    AlertReason::Expired,
                    entity,
                    Some(doc.id),
                    &send_result,
                    outcome,
                )
                .await?;
            }
        }

        Ok(())
    }

    /// Un email por flota; una fila de alerta por documento incluido, todas
    /// con el resultado del único envío.
    async fn dispatch_digest(
        &self,
        fleet_id: Uuid,
        contact: &FleetOwnerContact,
        items: &[DigestItem],
        docs: &[&Document],
        outcome: &mut FleetOutcome,
    ) -> AppResult<()> {
        let Some(email) = contact.email.as_deref() else {
            log::warn!("⚠️ Fleet {} has no owner email, skipping digest", fleet_id);
            outcome.errors.push(format!(
                "Fleet {}: no owner email for expiring-soon digest ({} documents)",
                fleet_id,
                items.len()
            ));
            return Ok(());
        };

        let (subject, html) = build_digest_email(items);

        let send_result = if self.email.is_configured() {
            self.email.send(email, &subject, &html).await
        } else {
            Err(crate::utils::errors::AppError::ServiceUnavailable(
                "Email sender not configured".to_string(),
            ))
        };

        let sent = send_result.is_ok();
        for doc in docs {
            self.insert_attempt_row(
                fleet_id,
                AlertChannel::Email,
                email,
                AlertReason::ExpiringSoon,
                doc.entity_ref(),
                Some(doc.id),
                &send_result,
            )
            .await?;
        }
        if sent {
            outcome.alerts_sent += 1;
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn log_attempt(
        &self,
        fleet_id: Uuid,
        channel: AlertChannel,
        to_address: &str,
        reason: AlertReason,
        entity: EntityRef,
        document_id: Option<Uuid>,
        send_result: &AppResult<()>,
        outcome: &mut FleetOutcome,
    ) -> AppResult<Alert> {
        let alert = self
            .insert_attempt_row(
                fleet_id,
                channel,
                to_address,
                reason,
                entity,
                document_id,
                send_result,
            )
            .await?;

        if send_result.is_ok() {
            outcome.alerts_sent += 1;
        }

        Ok(alert)
    }

    /// La fila se inserta siempre, con el resultado que haya tenido el canal.
    #[allow(clippy::too_many_arguments)]
    async fn insert_attempt_row(
        &self,
        fleet_id: Uuid,
        channel: AlertChannel,
        to_address: &str,
        reason: AlertReason,
        entity: EntityRef,
        document_id: Option<Uuid>,
        send_result: &AppResult<()>,
    ) -> AppResult<Alert> {
        let (status, error, sent_at) = match send_result {
            Ok(()) => (AlertStatus::Sent, None, Some(Utc::now())),
            Err(e) => (AlertStatus::Failed, Some(e.to_string()), None),
        };

        self.store
            .insert_alert(NewAlert {
                fleet_id,
                channel,
                to_address: to_address.to_string(),
                reason,
                entity_kind: entity.kind,
                entity_id: entity.id,
                document_id,
                status,
                error,
                sent_at,
            })
            .await
    }
}
