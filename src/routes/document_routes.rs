use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::controllers::document_controller::DocumentController;
use crate::dto::common::ApiResponse;
use crate::dto::document_dto::{
    ConfirmExtractionRequest, DocumentResponse, ExtractionResponse, ProcessedDocumentResponse,
    UpdateDocumentRequest, UploadDocumentRequest,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_document_router() -> Router<AppState> {
    Router::new()
        .route("/", post(upload_document))
        .route("/", get(list_documents))
        .route("/:id", get(get_document))
        .route("/:id", put(update_document))
        .route("/:id", delete(delete_document))
        .route("/:id/extraction", get(get_extraction))
        .route("/:id/extraction/confirm", post(confirm_extraction))
}

#[derive(Debug, Deserialize)]
struct EntityQuery {
    entity_kind: String,
    entity_id: Uuid,
}

fn controller(state: &AppState) -> DocumentController {
    DocumentController::new(state.pool.clone(), state.pipeline.clone())
}

async fn upload_document(
    State(state): State<AppState>,
    Json(request): Json<UploadDocumentRequest>,
) -> Result<Json<ApiResponse<ProcessedDocumentResponse>>, AppError> {
    let response = controller(&state).upload(request).await?;
    Ok(Json(response))
}

async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<EntityQuery>,
) -> Result<Json<ApiResponse<Vec<DocumentResponse>>>, AppError> {
    let documents = controller(&state)
        .list_for_entity(&query.entity_kind, query.entity_id)
        .await?;
    Ok(Json(ApiResponse::success(documents)))
}

async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProcessedDocumentResponse>>, AppError> {
    let document = controller(&state).get_by_id(id).await?;
    Ok(Json(ApiResponse::success(document)))
}

async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDocumentRequest>,
) -> Result<Json<ApiResponse<DocumentResponse>>, AppError> {
    let document = controller(&state).update(id, request).await?;
    Ok(Json(ApiResponse::success(document)))
}

async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let response = controller(&state).delete(id).await?;
    Ok(Json(response))
}

async fn get_extraction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ExtractionResponse>>, AppError> {
    let extraction = controller(&state).get_extraction(id).await?;
    Ok(Json(ApiResponse::success(extraction)))
}

async fn confirm_extraction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ConfirmExtractionRequest>,
) -> Result<Json<ApiResponse<ProcessedDocumentResponse>>, AppError> {
    let response = controller(&state).confirm_extraction(id, request).await?;
    Ok(Json(response))
}
