use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Document, EntityStatus, Extraction, ProcessingStatus};
use crate::parsers::cab_card::CabCardFields;

// Request de subida: el archivo viaja en base64 dentro del JSON
#[derive(Debug, Deserialize, Validate)]
pub struct UploadDocumentRequest {
    pub fleet_id: Uuid,
    /// "driver" o "vehicle"
    pub entity_kind: String,
    pub entity_id: Uuid,
    /// Si falta, el clasificador de visión sugiere uno
    pub doc_type: Option<String>,
    pub expires_on: Option<NaiveDate>,
    #[validate(length(min = 1, message = "File name is required"))]
    pub file_name: String,
    pub content_type: String,
    /// Contenido del archivo en base64
    #[validate(length(min = 1, message = "File content is required"))]
    pub content_base64: String,
}

// Request para corregir tipo o vencimiento a mano
#[derive(Debug, Deserialize)]
pub struct UpdateDocumentRequest {
    pub doc_type: Option<String>,
    pub expires_on: Option<NaiveDate>,
}

// Request de confirmación humana de una extracción
#[derive(Debug, Deserialize)]
pub struct ConfirmExtractionRequest {
    pub fields: CabCardFields,
    pub doc_type: Option<String>,
    pub expires_on: Option<NaiveDate>,
}

// Response de documento
#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub fleet_id: Uuid,
    pub entity_kind: String,
    pub entity_id: Uuid,
    pub doc_type: String,
    pub expires_on: Option<NaiveDate>,
    pub status: EntityStatus,
    pub processing_status: ProcessingStatus,
    pub needs_review: bool,
    pub file_path: Option<String>,
    /// URL firmada de lectura; solo se resuelve en la consulta individual
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            fleet_id: doc.fleet_id,
            entity_kind: doc.entity_kind.as_str().to_string(),
            entity_id: doc.entity_id,
            doc_type: doc.doc_type,
            expires_on: doc.expires_on,
            status: doc.status,
            processing_status: doc.processing_status,
            needs_review: doc.needs_review,
            file_path: doc.file_path,
            file_url: None,
            uploaded_at: doc.uploaded_at,
        }
    }
}

// Response de extracción
#[derive(Debug, Serialize)]
pub struct ExtractionResponse {
    pub id: Uuid,
    pub document_id: Uuid,
    pub doc_type: String,
    pub fields: CabCardFields,
    pub confidence: HashMap<String, f64>,
    pub raw_text: String,
}

impl From<Extraction> for ExtractionResponse {
    fn from(extraction: Extraction) -> Self {
        Self {
            id: extraction.id,
            document_id: extraction.document_id,
            doc_type: extraction.doc_type,
            fields: extraction.extracted_json.0,
            confidence: extraction.confidence.0,
            raw_text: extraction.raw_text,
        }
    }
}

// Documento + extracción juntos, para la pantalla de review
#[derive(Debug, Serialize)]
pub struct ProcessedDocumentResponse {
    pub document: DocumentResponse,
    pub extraction: Option<ExtractionResponse>,
}
