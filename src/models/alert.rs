//! Modelo de Alert
//!
//! Fila inmutable de log por cada intento de notificación. Sirve de audit
//! trail y de fuente para la ventana de deduplicación de 24h. Borrar un
//! documento no borra sus alertas históricas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use super::entity::EntityKind;

/// Canal de notificación - mapea al ENUM alert_channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "alert_channel", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AlertChannel {
    Email,
    Sms,
}

/// Motivo de la alerta - mapea al ENUM alert_reason
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "alert_reason", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlertReason {
    Expired,
    ExpiringSoon,
}

/// Estado de entrega - mapea al ENUM alert_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "alert_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Queued,
    Sent,
    Failed,
}

/// Alert - mapea exactamente a la tabla alerts
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Alert {
    pub id: Uuid,
    pub fleet_id: Uuid,
    pub channel: AlertChannel,
    pub to_address: String,
    pub reason: AlertReason,
    pub entity_kind: EntityKind,
    pub entity_id: Uuid,
    pub document_id: Option<Uuid>,
    pub status: AlertStatus,
    pub error: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Datos para insertar una nueva fila de alerta
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub fleet_id: Uuid,
    pub channel: AlertChannel,
    pub to_address: String,
    pub reason: AlertReason,
    pub entity_kind: EntityKind,
    pub entity_id: Uuid,
    pub document_id: Option<Uuid>,
    pub status: AlertStatus,
    pub error: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
}
