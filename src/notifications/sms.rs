//! Envío de SMS vía Twilio
//!
//! Canal secundario: solo alertas urgentes (documento vencido) y solo si la
//! cuenta Twilio está configurada y el destinatario tiene teléfono.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::utils::errors::{AppError, AppResult};

/// Texto corto para el aviso urgente por SMS
pub fn build_expired_sms(
    entity_label: &str,
    entity_name: &str,
    doc_type: &str,
    expires_on: NaiveDate,
) -> String {
    format!(
        "RoadReady alert: {} for {} {} expired on {}. Upload a renewed document to restore compliance.",
        doc_type,
        entity_label.to_lowercase(),
        entity_name,
        expires_on.format("%m/%d/%Y"),
    )
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn send(&self, to: &str, body: &str) -> AppResult<()>;
}

pub struct TwilioSmsSender {
    account_sid: Option<String>,
    auth_token: Option<String>,
    from_number: Option<String>,
    client: reqwest::Client,
}

impl TwilioSmsSender {
    pub fn new(
        account_sid: Option<String>,
        auth_token: Option<String>,
        from_number: Option<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            account_sid,
            auth_token,
            from_number,
            client,
        }
    }
}

#[async_trait]
impl SmsSender for TwilioSmsSender {
    fn is_configured(&self) -> bool {
        self.account_sid.is_some() && self.auth_token.is_some() && self.from_number.is_some()
    }

    async fn send(&self, to: &str, body: &str) -> AppResult<()> {
        let (Some(sid), Some(token), Some(from)) = (
            self.account_sid.as_deref(),
            self.auth_token.as_deref(),
            self.from_number.as_deref(),
        ) else {
            return Err(AppError::ServiceUnavailable(
                "SMS sender not configured".to_string(),
            ));
        };

        log::info!("📱 Sending SMS to {}", to);

        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            sid
        );
        let params = [("To", to), ("From", from), ("Body", body)];

        let response = self
            .client
            .post(&url)
            .basic_auth(sid, Some(token))
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Twilio request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            log::error!("❌ Twilio returned {}: {}", status, text);
            return Err(AppError::ExternalApi(format!(
                "Twilio returned {}: {}",
                status, text
            )));
        }

        log::info!("✅ SMS sent to {}", to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sms_body_is_short_and_complete() {
        let body = build_expired_sms(
            "Driver",
            "Maria Lopez",
            "CDL",
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        );

        assert!(body.contains("CDL"));
        assert!(body.contains("Maria Lopez"));
        assert!(body.contains("03/31/2025"));
        assert!(body.len() < 160);
    }

    #[test]
    fn test_partial_credentials_are_not_configured() {
        let sender = TwilioSmsSender::new(Some("AC123".to_string()), None, None);
        assert!(!sender.is_configured());
    }
}
