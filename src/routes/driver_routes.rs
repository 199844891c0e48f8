use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::controllers::driver_controller::DriverController;
use crate::dto::common::ApiResponse;
use crate::dto::driver_dto::{
    CreateDriverRequest, DriverResponse, EntityStatusResponse, UpdateDriverRequest,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_driver))
        .route("/", get(list_drivers))
        .route("/:id", get(get_driver))
        .route("/:id", put(update_driver))
        .route("/:id", delete(delete_driver))
        .route("/:id/status", get(driver_status))
}

#[derive(Debug, Deserialize)]
struct FleetQuery {
    fleet_id: Uuid,
}

async fn create_driver(
    State(state): State<AppState>,
    Json(request): Json<CreateDriverRequest>,
) -> Result<Json<ApiResponse<DriverResponse>>, AppError> {
    let controller = DriverController::new(state.pool.clone(), state.synchronizer.clone());
    let response = controller.create(request).await?;
    Ok(Json(response))
}

async fn list_drivers(
    State(state): State<AppState>,
    Query(query): Query<FleetQuery>,
) -> Result<Json<ApiResponse<Vec<DriverResponse>>>, AppError> {
    let controller = DriverController::new(state.pool.clone(), state.synchronizer.clone());
    let drivers = controller.list(query.fleet_id).await?;
    Ok(Json(ApiResponse::success(drivers)))
}

async fn get_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DriverResponse>>, AppError> {
    let controller = DriverController::new(state.pool.clone(), state.synchronizer.clone());
    let driver = controller.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(driver)))
}

async fn update_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDriverRequest>,
) -> Result<Json<ApiResponse<DriverResponse>>, AppError> {
    let controller = DriverController::new(state.pool.clone(), state.synchronizer.clone());
    let driver = controller.update(id, request).await?;
    Ok(Json(ApiResponse::success(driver)))
}

async fn delete_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = DriverController::new(state.pool.clone(), state.synchronizer.clone());
    let response = controller.delete(id).await?;
    Ok(Json(response))
}

async fn driver_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EntityStatusResponse>>, AppError> {
    let controller = DriverController::new(state.pool.clone(), state.synchronizer.clone());
    let status = controller.status(id).await?;
    Ok(Json(ApiResponse::success(status)))
}
