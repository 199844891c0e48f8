use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Driver, EntityStatus};
use crate::services::status_engine::StatusResult;

// Request para dar de alta un conductor
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDriverRequest {
    pub fleet_id: Uuid,
    #[validate(length(min = 1, message = "Driver name is required"))]
    pub name: String,
    pub license_number: Option<String>,
    pub phone: Option<String>,
}

// Request para actualizar un conductor
#[derive(Debug, Deserialize)]
pub struct UpdateDriverRequest {
    pub name: Option<String>,
    pub license_number: Option<String>,
    pub phone: Option<String>,
}

// Response de conductor
#[derive(Debug, Serialize)]
pub struct DriverResponse {
    pub id: Uuid,
    pub fleet_id: Uuid,
    pub name: String,
    pub license_number: Option<String>,
    pub phone: Option<String>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Driver> for DriverResponse {
    fn from(driver: Driver) -> Self {
        Self {
            id: driver.id,
            fleet_id: driver.fleet_id,
            name: driver.name,
            license_number: driver.license_number,
            phone: driver.phone,
            status: driver.status,
            created_at: driver.created_at,
            updated_at: driver.updated_at,
        }
    }
}

// Response de estado con explicación del rule engine
#[derive(Debug, Serialize)]
pub struct EntityStatusResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub result: StatusResult,
}
