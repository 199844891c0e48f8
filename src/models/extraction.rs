//! Modelo de Extraction
//!
//! Uno a uno con un Document de tipo estructurado reconocido (IRP cab card).
//! Guarda el set de campos extraídos, el texto crudo del OCR y el mapa de
//! confianza por campo. Lo crea el Field Extractor y lo puede editar un
//! humano durante el review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

use crate::parsers::cab_card::CabCardFields;

/// Extraction - mapea exactamente a la tabla document_extractions
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Extraction {
    pub id: Uuid,
    pub document_id: Uuid,
    pub doc_type: String,
    pub extracted_json: Json<CabCardFields>,
    pub raw_text: String,
    /// Confianza 0.0-1.0 por nombre de campo
    pub confidence: Json<HashMap<String, f64>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
