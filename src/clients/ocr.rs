//! Motor de OCR
//!
//! Devuelve el texto plano de una imagen o PDF de documento. El parser de
//! cab cards trabaja sobre este texto; el pipeline no sabe qué proveedor hay
//! detrás del trait.

use async_trait::async_trait;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;

use crate::utils::errors::{AppError, AppResult};

#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn extract_text(&self, bytes: &[u8], content_type: &str) -> AppResult<String>;
}

#[derive(Debug, Deserialize)]
struct OcrDocument {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    document: Option<OcrDocument>,
}

/// OCR vía un endpoint remoto estilo Document AI: se postea el archivo en
/// base64 y se lee `document.text` de la respuesta.
pub struct RemoteOcrEngine {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl RemoteOcrEngine {
    pub fn new(endpoint: String, api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            endpoint,
            api_key,
            client,
        }
    }
}

#[async_trait]
impl OcrEngine for RemoteOcrEngine {
    async fn extract_text(&self, bytes: &[u8], content_type: &str) -> AppResult<String> {
        log::info!("🔍 Running OCR on {} bytes ({})", bytes.len(), content_type);

        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        let payload = json!({
            "rawDocument": {
                "content": encoded,
                "mimeType": content_type,
            }
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("OCR request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OCR returned {}: {}",
                status, text
            )));
        }

        let body: OcrResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalApi(format!("OCR response malformed: {}", e)))?;

        Ok(body.document.and_then(|d| d.text).unwrap_or_default())
    }
}

/// Sin OCR configurado: el pipeline marca el documento para revisión manual.
pub struct DisabledOcr;

#[async_trait]
impl OcrEngine for DisabledOcr {
    async fn extract_text(&self, _bytes: &[u8], _content_type: &str) -> AppResult<String> {
        Err(AppError::ServiceUnavailable(
            "OCR engine is not configured".to_string(),
        ))
    }
}
