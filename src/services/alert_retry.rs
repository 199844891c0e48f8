//! Reintento de alertas fallidas
//!
//! Segundo job programado: toma las alertas con status failed de las últimas
//! 24 horas (hasta 50, más viejas primero), reconstruye el mensaje desde el
//! estado ACTUAL del documento y reintenta por el mismo canal. La fila de
//! alerta se actualiza en el lugar: no se insertan filas nuevas por reintento.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::{Alert, AlertChannel, AlertStatus};
use crate::notifications::{
    build_digest_email, build_expired_email, build_expired_sms, AlertContext, DigestItem,
    EmailSender, SmsSender,
};
use crate::repositories::ComplianceStore;
use crate::services::status_engine::days_until;
use crate::utils::errors::{AppError, AppResult};

/// Cuántas horas hacia atrás se buscan alertas fallidas
const RETRY_WINDOW_HOURS: i64 = 24;

/// Tope de alertas por corrida
const RETRY_BATCH_LIMIT: i64 = 50;

#[derive(Debug, Clone, Serialize)]
pub struct RetrySummary {
    /// Alertas reintentadas en esta corrida
    pub retried: usize,
    /// Las que volvieron a fallar (o perdieron su contexto)
    pub still_failed: usize,
    pub errors: Vec<String>,
}

pub struct RetrySweeper {
    store: Arc<dyn ComplianceStore>,
    email: Arc<dyn EmailSender>,
    sms: Arc<dyn SmsSender>,
}

impl RetrySweeper {
    pub fn new(
        store: Arc<dyn ComplianceStore>,
        email: Arc<dyn EmailSender>,
        sms: Arc<dyn SmsSender>,
    ) -> Self {
        Self { store, email, sms }
    }

    pub async fn run(&self) -> AppResult<RetrySummary> {
        self.run_as_of(Utc::now()).await
    }

    pub async fn run_as_of(&self, now: DateTime<Utc>) -> AppResult<RetrySummary> {
        let since = now - Duration::hours(RETRY_WINDOW_HOURS);
        let failed = self
            .store
            .failed_alerts_since(since, RETRY_BATCH_LIMIT)
            .await?;

        log::info!("🔁 Retrying {} failed alerts", failed.len());

        let mut summary = RetrySummary {
            retried: 0,
            still_failed: 0,
            errors: Vec::new(),
        };

        for alert in failed {
            summary.retried += 1;

            let send_result = match self.retry_alert(&alert, now).await {
                Ok(result) => result,
                Err(e) => {
                    // Error de infraestructura, no del canal: la fila queda
                    // como estaba y el error va al summary
                    log::error!("❌ Retry of alert {} errored: {}", alert.id, e);
                    summary.errors.push(format!("Alert {}: {}", alert.id, e));
                    summary.still_failed += 1;
                    continue;
                }
            };

            let (status, error, sent_at) = match &send_result {
                Ok(()) => (AlertStatus::Sent, None, Some(Utc::now())),
                Err(e) => {
                    summary.still_failed += 1;
                    (AlertStatus::Failed, Some(e.to_string()), None)
                }
            };

            self.store
                .update_alert_delivery(alert.id, status, error, sent_at)
                .await?;
        }

        log::info!(
            "✅ Retry sweep done: {} retried, {} still failed",
            summary.retried,
            summary.still_failed
        );

        Ok(summary)
    }

    /// Reconstruye el mensaje desde el estado actual y reintenta el envío.
    /// El Result exterior es infraestructura (store); el interior, el canal.
    async fn retry_alert(
        &self,
        alert: &Alert,
        now: DateTime<Utc>,
    ) -> AppResult<AppResult<()>> {
        let Some(document_id) = alert.document_id else {
            return Ok(Err(AppError::BadRequest(
                "Alert has no document reference".to_string(),
            )));
        };

        let Some(document) = self.store.document_by_id(document_id).await? else {
            return Ok(Err(AppError::NotFound(format!(
                "Document {} no longer exists",
                document_id
            ))));
        };

        let entity = document.entity_ref();
        let Some(display) = self.store.entity_display(entity).await? else {
            return Ok(Err(AppError::NotFound(format!(
                "{} {} no longer exists",
                entity.kind.label(),
                entity.id
            ))));
        };

        let Some(expires_on) = document.expires_on else {
            return Ok(Err(AppError::BadRequest(
                "Document no longer has an expiration date".to_string(),
            )));
        };

        // Destinatario actual de la flota si existe, si no el guardado
        let to_address = match alert.channel {
            AlertChannel::Email => self
                .store
                .fleet_owner_contact(alert.fleet_id)
                .await?
                .and_then(|c| c.email)
                .unwrap_or_else(|| alert.to_address.clone()),
            AlertChannel::Sms => alert.to_address.clone(),
        };

        let days = days_until(expires_on, now.date_naive());

        let result = match alert.channel {
            AlertChannel::Email => {
                let (subject, html) = if days < 0 {
                    build_expired_email(&AlertContext {
                        entity_label: entity.kind.label().to_string(),
                        entity_name: display.name.clone(),
                        doc_type: document.doc_type.clone(),
                        expires_on,
                    })
                } else {
                    build_digest_email(&[DigestItem {
                        entity_label: entity.kind.label().to_string(),
                        entity_name: display.name.clone(),
                        doc_type: document.doc_type.clone(),
                        expires_on,
                        days_remaining: days,
                    }])
                };
                self.email.send(&to_address, &subject, &html).await
            }
            AlertChannel::Sms => {
                let body = build_expired_sms(
                    entity.kind.label(),
                    &display.name,
                    &document.doc_type,
                    expires_on,
                );
                self.sms.send(&to_address, &body).await
            }
        };

        Ok(result)
    }
}
