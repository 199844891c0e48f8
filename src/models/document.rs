//! Modelo de Document
//!
//! Un documento de cumplimiento (CDL, Medical Card, Registration, Insurance,
//! IRP cab card, etc.) adjunto a un driver o vehicle. El `status` es función
//! pura de (expires_on, requerido, hoy) salvo cuando `needs_review` es true:
//! un documento vencido pero no verificado se mantiene en yellow en vez de
//! escalar a red.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use super::entity::{EntityKind, EntityRef, EntityStatus};

/// Estado del pipeline de extracción - mapea al ENUM processing_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "processing_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Processing,
    Complete,
    NeedsReview,
    Failed,
}

/// Document - mapea exactamente a la tabla documents
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub fleet_id: Uuid,
    pub entity_kind: EntityKind,
    pub entity_id: Uuid,
    /// Tipo libre, comparado case-insensitive contra la tabla de requeridos
    pub doc_type: String,
    pub expires_on: Option<NaiveDate>,
    pub status: EntityStatus,
    pub processing_status: ProcessingStatus,
    /// Flag pegajoso: se limpia solo cuando un humano confirma la extracción
    pub needs_review: bool,
    pub file_path: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.entity_kind, self.entity_id)
    }

    /// Tipo normalizado para matching contra la lista de requeridos
    pub fn normalized_type(&self) -> String {
        self.doc_type.trim().to_lowercase()
    }
}

/// Tipo de documento estructurado que el pipeline sabe procesar
pub const CAB_CARD_DOC_TYPE: &str = "IRP_CAB_CARD";
