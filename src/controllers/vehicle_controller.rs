use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::driver_dto::EntityStatusResponse;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest, VehicleResponse};
use crate::models::{EntityKind, EntityRef};
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::status_sync::StatusSynchronizer;
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct VehicleController {
    repository: VehicleRepository,
    synchronizer: Arc<StatusSynchronizer>,
}

impl VehicleController {
    pub fn new(pool: PgPool, synchronizer: Arc<StatusSynchronizer>) -> Self {
        Self {
            repository: VehicleRepository::new(pool),
            synchronizer,
        }
    }

    pub async fn create(
        &self,
        request: CreateVehicleRequest,
    ) -> AppResult<ApiResponse<VehicleResponse>> {
        request.validate()?;

        let vehicle = self
            .repository
            .create(
                request.fleet_id,
                request.unit_number.trim(),
                request.vin.as_deref(),
                request.plate_number.as_deref(),
            )
            .await?;

        self.synchronizer
            .sync_entity(EntityRef::new(EntityKind::Vehicle, vehicle.id))
            .await?;

        let vehicle = self
            .repository
            .find_by_id(vehicle.id)
            .await?
            .ok_or_else(|| AppError::Internal("Vehicle vanished after create".to_string()))?;

        Ok(ApiResponse::success_with_message(
            vehicle.into(),
            "Vehicle created".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<VehicleResponse> {
        let vehicle = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

        Ok(vehicle.into())
    }

    pub async fn list(&self, fleet_id: Uuid) -> AppResult<Vec<VehicleResponse>> {
        let vehicles = self.repository.find_by_fleet(fleet_id).await?;
        Ok(vehicles.into_iter().map(Into::into).collect())
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateVehicleRequest,
    ) -> AppResult<VehicleResponse> {
        let vehicle = self
            .repository
            .update(
                id,
                request.unit_number.as_deref(),
                request.vin.as_deref(),
                request.plate_number.as_deref(),
            )
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

        Ok(vehicle.into())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        let deleted = self.repository.delete(id).await?;
        if !deleted {
            return Err(not_found_error("Vehicle", &id.to_string()));
        }

        Ok(ApiResponse::success_with_message((), "Vehicle deleted".to_string()))
    }

    pub async fn status(&self, id: Uuid) -> AppResult<EntityStatusResponse> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

        let result = self
            .synchronizer
            .sync_entity(EntityRef::new(EntityKind::Vehicle, id))
            .await?;

        Ok(EntityStatusResponse { id, result })
    }
}
