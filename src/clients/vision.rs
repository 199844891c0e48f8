//! Clasificador de tipo de documento
//!
//! Cuando el usuario sube un archivo sin declarar el tipo, una llamada de
//! visión a OpenAI sugiere el tipo y una fecha de vencimiento tentativa.
//! La sugerencia nunca es autoritativa: el documento queda en needs_review.

use async_trait::async_trait;
use base64::Engine as _;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::utils::errors::{AppError, AppResult};

/// Sugerencia del clasificador
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocTypeSuggestion {
    pub doc_type: String,
    pub expires_on: Option<NaiveDate>,
    /// 0.0-1.0 según lo reporta el modelo
    pub confidence: f64,
    /// Justificación corta del modelo, para el log y la pantalla de review
    pub reasoning: Option<String>,
}

#[async_trait]
pub trait DocumentClassifier: Send + Sync {
    async fn classify(&self, bytes: &[u8], content_type: &str) -> AppResult<DocTypeSuggestion>;
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct RawSuggestion {
    doc_type: String,
    expires_on: Option<String>,
    confidence: Option<f64>,
    reasoning: Option<String>,
}

const CLASSIFY_PROMPT: &str = "You are a fleet compliance assistant. Look at this document image and answer with JSON only, no prose: \
{\"doc_type\": one of [\"CDL\", \"Medical Card\", \"Registration\", \"Insurance\", \"IRP_CAB_CARD\", \"Other\"], \
\"expires_on\": \"YYYY-MM-DD\" or null, \"confidence\": 0.0-1.0, \
\"reasoning\": one short sentence explaining the choice}";

pub struct OpenAiClassifier {
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClassifier {
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self { api_key, client }
    }
}

#[async_trait]
impl DocumentClassifier for OpenAiClassifier {
    async fn classify(&self, bytes: &[u8], content_type: &str) -> AppResult<DocTypeSuggestion> {
        log::info!("👁️ Classifying document ({} bytes)", bytes.len());

        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        let data_url = format!("data:{};base64,{}", content_type, encoded);

        let payload = json!({
            "model": "gpt-4o-mini",
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": CLASSIFY_PROMPT },
                    { "type": "image_url", "image_url": { "url": data_url } }
                ]
            }],
            "max_tokens": 200,
        });

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OpenAI returned {}: {}",
                status, text
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalApi(format!("OpenAI response malformed: {}", e)))?;

        let content = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| AppError::ExternalApi("OpenAI returned no choices".to_string()))?;

        parse_suggestion(content)
    }
}

/// El modelo a veces envuelve el JSON en un fence de markdown
fn parse_suggestion(content: &str) -> AppResult<DocTypeSuggestion> {
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let raw: RawSuggestion = serde_json::from_str(trimmed)
        .map_err(|e| AppError::ExternalApi(format!("Classifier output malformed: {}", e)))?;

    let expires_on = raw
        .expires_on
        .as_deref()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());

    Ok(DocTypeSuggestion {
        doc_type: raw.doc_type,
        expires_on,
        confidence: raw.confidence.unwrap_or(0.0).clamp(0.0, 1.0),
        reasoning: raw.reasoning,
    })
}

/// Sin API key: la subida sin tipo declarado va directo a revisión manual.
pub struct DisabledClassifier;

#[async_trait]
impl DocumentClassifier for DisabledClassifier {
    async fn classify(&self, _bytes: &[u8], _content_type: &str) -> AppResult<DocTypeSuggestion> {
        Err(AppError::ServiceUnavailable(
            "Document classifier is not configured".to_string(),
        ))
    }
}
