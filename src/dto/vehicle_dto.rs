use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{EntityStatus, Vehicle};

// Request para dar de alta un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    pub fleet_id: Uuid,
    #[validate(length(min = 1, message = "Unit number is required"))]
    pub unit_number: String,
    #[validate(length(equal = 17, message = "VIN must be 17 characters"))]
    pub vin: Option<String>,
    pub plate_number: Option<String>,
}

// Request para actualizar un vehículo
#[derive(Debug, Deserialize)]
pub struct UpdateVehicleRequest {
    pub unit_number: Option<String>,
    pub vin: Option<String>,
    pub plate_number: Option<String>,
}

// Response de vehículo
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub fleet_id: Uuid,
    pub unit_number: String,
    pub vin: Option<String>,
    pub plate_number: Option<String>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            fleet_id: vehicle.fleet_id,
            unit_number: vehicle.unit_number,
            vin: vehicle.vin,
            plate_number: vehicle.plate_number,
            status: vehicle.status,
            created_at: vehicle.created_at,
            updated_at: vehicle.updated_at,
        }
    }
}
