//! Envío de emails vía Resend
//!
//! La composición del mensaje está separada del transporte: los builders son
//! funciones puras testeables sin red, el sender solo postea HTML ya armado.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use crate::utils::errors::{AppError, AppResult};

/// Contexto para un aviso individual de documento vencido
#[derive(Debug, Clone)]
pub struct AlertContext {
    /// "Driver" o "Vehicle"
    pub entity_label: String,
    /// Nombre del driver o "Unit 42"
    pub entity_name: String,
    pub doc_type: String,
    pub expires_on: NaiveDate,
}

/// Línea de un digest de documentos por vencer
#[derive(Debug, Clone)]
pub struct DigestItem {
    pub entity_label: String,
    pub entity_name: String,
    pub doc_type: String,
    pub expires_on: NaiveDate,
    pub days_remaining: i64,
}

/// Email urgente por un documento ya vencido. Devuelve (subject, html).
pub fn build_expired_email(ctx: &AlertContext) -> (String, String) {
    let subject = format!(
        "URGENT: {} expired for {} {}",
        ctx.doc_type, ctx.entity_label, ctx.entity_name
    );
    let html = format!(
        r#"<h2>Compliance Alert</h2>
<p>The <strong>{doc_type}</strong> for {label} <strong>{name}</strong> expired on <strong>{date}</strong>.</p>
<p>This {label_lower} is out of compliance until a current document is uploaded.</p>"#,
        doc_type = ctx.doc_type,
        label = ctx.entity_label,
        name = ctx.entity_name,
        date = ctx.expires_on.format("%B %-d, %Y"),
        label_lower = ctx.entity_label.to_lowercase(),
    );
    (subject, html)
}

/// Un solo email por flota resumiendo todo lo que vence pronto.
/// Devuelve (subject, html).
pub fn build_digest_email(items: &[DigestItem]) -> (String, String) {
    let subject = if items.len() == 1 {
        "1 document expiring soon".to_string()
    } else {
        format!("{} documents expiring soon", items.len())
    };

    let mut rows = String::new();
    for item in items {
        rows.push_str(&format!(
            "<tr><td>{} {}</td><td>{}</td><td>{}</td><td>{} days</td></tr>\n",
            item.entity_label,
            item.entity_name,
            item.doc_type,
            item.expires_on.format("%B %-d, %Y"),
            item.days_remaining,
        ));
    }

    let html = format!(
        r#"<h2>Upcoming Expirations</h2>
<table border="1" cellpadding="6" cellspacing="0">
<tr><th>Who</th><th>Document</th><th>Expires</th><th>Time left</th></tr>
{rows}</table>
<p>Upload renewed documents before these dates to stay compliant.</p>"#,
    );
    (subject, html)
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()>;
}

#[derive(Debug, Serialize)]
struct ResendPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, serde::Deserialize)]
struct ResendErrorBody {
    message: Option<String>,
}

pub struct ResendEmailSender {
    api_key: Option<String>,
    from: String,
    client: reqwest::Client,
}

impl ResendEmailSender {
    pub fn new(api_key: Option<String>, from: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key,
            from,
            client,
        }
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::ServiceUnavailable("Email sender not configured".to_string()))?;

        log::info!("📧 Sending email to {}: {}", to, subject);

        let payload = ResendPayload {
            from: &self.from,
            to: [to],
            subject,
            html,
        };

        let response = self
            .client
            .post("https://api.resend.com/emails")
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Resend request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body: ResendErrorBody = response.json().await.unwrap_or(ResendErrorBody {
                message: None,
            });
            let message = body.message.unwrap_or_else(|| "unknown error".to_string());
            log::error!("❌ Resend returned {}: {}", status, message);
            return Err(AppError::ExternalApi(format!(
                "Resend returned {}: {}",
                status, message
            )));
        }

        log::info!("✅ Email sent to {}", to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> AlertContext {
        AlertContext {
            entity_label: "Driver".to_string(),
            entity_name: "Maria Lopez".to_string(),
            doc_type: "CDL".to_string(),
            expires_on: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        }
    }

    #[test]
    fn test_expired_email_names_doc_and_entity() {
        let (subject, html) = build_expired_email(&ctx());

        assert!(subject.contains("URGENT"));
        assert!(subject.contains("CDL"));
        assert!(subject.contains("Maria Lopez"));
        assert!(html.contains("March 31, 2025"));
    }

    #[test]
    fn test_digest_subject_counts_items() {
        let item = DigestItem {
            entity_label: "Vehicle".to_string(),
            entity_name: "Unit 42".to_string(),
            doc_type: "Registration".to_string(),
            expires_on: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            days_remaining: 12,
        };

        let (single, _) = build_digest_email(std::slice::from_ref(&item));
        assert_eq!(single, "1 document expiring soon");

        let (plural, html) = build_digest_email(&[item.clone(), item]);
        assert_eq!(plural, "2 documents expiring soon");
        assert_eq!(html.matches("Unit 42").count(), 2);
    }

    #[test]
    fn test_unconfigured_sender_reports_not_configured() {
        let sender = ResendEmailSender::new(None, "alerts@example.com".to_string());
        assert!(!sender.is_configured());
    }
}
