use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::driver_dto::{
    CreateDriverRequest, DriverResponse, EntityStatusResponse, UpdateDriverRequest,
};
use crate::models::{EntityKind, EntityRef};
use crate::repositories::driver_repository::DriverRepository;
use crate::services::status_sync::StatusSynchronizer;
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct DriverController {
    repository: DriverRepository,
    synchronizer: Arc<StatusSynchronizer>,
}

impl DriverController {
    pub fn new(pool: PgPool, synchronizer: Arc<StatusSynchronizer>) -> Self {
        Self {
            repository: DriverRepository::new(pool),
            synchronizer,
        }
    }

    pub async fn create(
        &self,
        request: CreateDriverRequest,
    ) -> AppResult<ApiResponse<DriverResponse>> {
        request.validate()?;

        let driver = self
            .repository
            .create(
                request.fleet_id,
                request.name.trim(),
                request.license_number.as_deref(),
                request.phone.as_deref(),
            )
            .await?;

        // Sin documentos todavía: el sync lo deja en red por faltantes
        self.synchronizer
            .sync_entity(EntityRef::new(EntityKind::Driver, driver.id))
            .await?;

        let driver = self
            .repository
            .find_by_id(driver.id)
            .await?
            .ok_or_else(|| AppError::Internal("Driver vanished after create".to_string()))?;

        Ok(ApiResponse::success_with_message(
            driver.into(),
            "Driver created".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<DriverResponse> {
        let driver = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Driver", &id.to_string()))?;

        Ok(driver.into())
    }

    pub async fn list(&self, fleet_id: Uuid) -> AppResult<Vec<DriverResponse>> {
        let drivers = self.repository.find_by_fleet(fleet_id).await?;
        Ok(drivers.into_iter().map(Into::into).collect())
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateDriverRequest,
    ) -> AppResult<DriverResponse> {
        let driver = self
            .repository
            .update(
                id,
                request.name.as_deref(),
                request.license_number.as_deref(),
                request.phone.as_deref(),
            )
            .await?
            .ok_or_else(|| not_found_error("Driver", &id.to_string()))?;

        Ok(driver.into())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        let deleted = self.repository.delete(id).await?;
        if !deleted {
            return Err(not_found_error("Driver", &id.to_string()));
        }

        Ok(ApiResponse::success_with_message((), "Driver deleted".to_string()))
    }

    /// Estado actual con la explicación del rule engine. Recalcula y
    /// persiste antes de responder.
    pub async fn status(&self, id: Uuid) -> AppResult<EntityStatusResponse> {
        // Verificar existencia antes de sincronizar
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Driver", &id.to_string()))?;

        let result = self
            .synchronizer
            .sync_entity(EntityRef::new(EntityKind::Driver, id))
            .await?;

        Ok(EntityStatusResponse { id, result })
    }
}
