//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.
//! Los proveedores opcionales (SMS, clasificador AI) quedan en `Option` y el
//! sistema degrada sin ellos en lugar de fallar al arrancar.

use std::env;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub app_url: String,
    /// Secreto compartido para los endpoints de cron (check-expirations, retry)
    pub cron_secret: Option<String>,
    // Email (Resend) - requerido para alertas; su ausencia se reporta en /health
    pub resend_api_key: Option<String>,
    pub resend_from_email: String,
    // SMS (Twilio) - opcional
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_from_number: Option<String>,
    // Storage (Supabase Storage compatible)
    pub storage_url: Option<String>,
    pub storage_service_key: Option<String>,
    pub storage_bucket: String,
    // OCR (endpoint estilo Document AI) - requerido para cab cards
    pub ocr_endpoint: Option<String>,
    pub ocr_api_key: Option<String>,
    // Clasificador AI (OpenAI Vision) - opcional
    pub openai_api_key: Option<String>,
    /// Ventana amarilla en días antes del vencimiento
    pub yellow_window_days: i64,
    /// Orígenes permitidos para CORS; vacío = permisivo (desarrollo)
    pub allowed_origins: Vec<String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            app_url: env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            cron_secret: env::var("CRON_SECRET").ok(),
            resend_api_key: env::var("RESEND_API_KEY").ok(),
            resend_from_email: env::var("RESEND_FROM_EMAIL")
                .unwrap_or_else(|_| "RoadReady <onboarding@resend.dev>".to_string()),
            twilio_account_sid: env::var("TWILIO_ACCOUNT_SID").ok(),
            twilio_auth_token: env::var("TWILIO_AUTH_TOKEN").ok(),
            twilio_from_number: env::var("TWILIO_FROM_NUMBER").ok(),
            storage_url: env::var("STORAGE_URL").ok(),
            storage_service_key: env::var("STORAGE_SERVICE_KEY").ok(),
            storage_bucket: env::var("STORAGE_BUCKET").unwrap_or_else(|_| "uploads".to_string()),
            ocr_endpoint: env::var("OCR_ENDPOINT").ok(),
            ocr_api_key: env::var("OCR_API_KEY").ok(),
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            yellow_window_days: env::var("YELLOW_WINDOW_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("YELLOW_WINDOW_DAYS must be a valid number"),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
        }
    }
}

/// Lista separada por comas, con espacios y entradas vacías toleradas
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl EnvironmentConfig {
    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Email configurado (requerido para que las alertas realmente salgan)
    pub fn email_configured(&self) -> bool {
        self.resend_api_key.is_some()
    }

    /// Storage de archivos configurado
    pub fn storage_configured(&self) -> bool {
        self.storage_url.is_some() && self.storage_service_key.is_some()
    }

    /// OCR configurado (sin él, los cab cards van directo a review)
    pub fn ocr_configured(&self) -> bool {
        self.ocr_endpoint.is_some() && self.ocr_api_key.is_some()
    }

    /// SMS configurado (opcional - se omite silenciosamente si falta)
    pub fn sms_configured(&self) -> bool {
        self.twilio_account_sid.is_some()
            && self.twilio_auth_token.is_some()
            && self.twilio_from_number.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_splits_and_trims() {
        let origins = parse_origins("https://app.roadready.test, https://admin.roadready.test ,");
        assert_eq!(
            origins,
            vec![
                "https://app.roadready.test".to_string(),
                "https://admin.roadready.test".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_origins_empty_is_empty() {
        assert!(parse_origins("").is_empty());
        assert!(parse_origins(" , ").is_empty());
    }
}
