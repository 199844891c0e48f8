//! Entidades de cumplimiento: conductores y vehículos
//!
//! Ambos comparten la tabla de documentos mediante una referencia polimórfica
//! (kind + id). El campo `status` es derivado por el rule engine y nunca se
//! edita a mano.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Tipo de entidad dueña de un documento - mapea al ENUM entity_kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "entity_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Driver,
    Vehicle,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Driver => "driver",
            EntityKind::Vehicle => "vehicle",
        }
    }

    /// Etiqueta legible para mensajes de alerta
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Driver => "Driver",
            EntityKind::Vehicle => "Vehicle",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "driver" => Some(EntityKind::Driver),
            "vehicle" => Some(EntityKind::Vehicle),
            _ => None,
        }
    }
}

/// Referencia polimórfica a la entidad dueña de un documento
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: Uuid,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

/// Estado semáforo derivado de los documentos - mapea al ENUM entity_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "entity_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Green,
    Yellow,
    Red,
}

impl EntityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Green => "green",
            EntityStatus::Yellow => "yellow",
            EntityStatus::Red => "red",
        }
    }
}

/// Driver - mapea exactamente a la tabla drivers
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub id: Uuid,
    pub fleet_id: Uuid,
    pub name: String,
    pub license_number: Option<String>,
    pub phone: Option<String>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Vehicle - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub fleet_id: Uuid,
    pub unit_number: String,
    pub vin: Option<String>,
    pub plate_number: Option<String>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Nombre visible de una entidad para mensajes de alerta
/// (drivers tienen `name`, vehicles tienen `unit_number`)
#[derive(Debug, Clone, Serialize)]
pub struct EntityDisplay {
    pub entity: EntityRef,
    pub name: String,
}
