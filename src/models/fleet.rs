//! Modelo de Fleet

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Fleet - mapea exactamente a la tabla fleets
///
/// El contacto del dueño vive desnormalizado en la fila: la identidad real
/// pertenece al proveedor de autenticación externo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Fleet {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub owner_email: Option<String>,
    pub owner_phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Contacto del dueño de una flota para notificaciones
#[derive(Debug, Clone)]
pub struct FleetOwnerContact {
    pub email: Option<String>,
    pub phone: Option<String>,
}
