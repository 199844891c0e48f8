use std::sync::Arc;

use base64::Engine as _;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::document_dto::{
    ConfirmExtractionRequest, DocumentResponse, ExtractionResponse, ProcessedDocumentResponse,
    UpdateDocumentRequest, UploadDocumentRequest,
};
use crate::models::{EntityKind, EntityRef};
use crate::repositories::document_repository::DocumentRepository;
use crate::repositories::extraction_repository::ExtractionRepository;
use crate::services::document_pipeline::{DocumentPipeline, DocumentUpload};
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct DocumentController {
    documents: DocumentRepository,
    extractions: ExtractionRepository,
    pipeline: Arc<DocumentPipeline>,
}

impl DocumentController {
    pub fn new(pool: PgPool, pipeline: Arc<DocumentPipeline>) -> Self {
        Self {
            documents: DocumentRepository::new(pool.clone()),
            extractions: ExtractionRepository::new(pool),
            pipeline,
        }
    }

    pub async fn upload(
        &self,
        request: UploadDocumentRequest,
    ) -> AppResult<ApiResponse<ProcessedDocumentResponse>> {
        request.validate()?;

        let kind = EntityKind::parse(&request.entity_kind).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Unknown entity kind '{}', expected 'driver' or 'vehicle'",
                request.entity_kind
            ))
        })?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&request.content_base64)
            .map_err(|e| AppError::BadRequest(format!("Invalid base64 content: {}", e)))?;

        let processed = self
            .pipeline
            .process_upload(DocumentUpload {
                fleet_id: request.fleet_id,
                entity: EntityRef::new(kind, request.entity_id),
                doc_type: request.doc_type,
                expires_on: request.expires_on,
                file_name: request.file_name,
                content_type: request.content_type,
                bytes,
            })
            .await?;

        Ok(ApiResponse::success_with_message(
            ProcessedDocumentResponse {
                document: processed.document.into(),
                extraction: processed.extraction.map(Into::into),
            },
            "Document processed".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<ProcessedDocumentResponse> {
        let document = self
            .documents
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Document", &id.to_string()))?;

        let extraction = self.extractions.find_by_document(id).await?;
        let file_url = self.pipeline.file_url(&document).await;

        let mut response: DocumentResponse = document.into();
        response.file_url = file_url;

        Ok(ProcessedDocumentResponse {
            document: response,
            extraction: extraction.map(Into::into),
        })
    }

    pub async fn list_for_entity(
        &self,
        entity_kind: &str,
        entity_id: Uuid,
    ) -> AppResult<Vec<DocumentResponse>> {
        let kind = EntityKind::parse(entity_kind).ok_or_else(|| {
            AppError::BadRequest(format!("Unknown entity kind '{}'", entity_kind))
        })?;

        let documents = self
            .documents
            .find_by_entity(EntityRef::new(kind, entity_id))
            .await?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    /// Corrección manual de tipo o vencimiento. El pipeline recalcula el
    /// estado del documento y dispara el re-sync de la entidad dueña.
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateDocumentRequest,
    ) -> AppResult<DocumentResponse> {
        let document = self
            .pipeline
            .update_document(id, request.doc_type.as_deref(), request.expires_on)
            .await?;

        Ok(document.into())
    }

    pub async fn confirm_extraction(
        &self,
        id: Uuid,
        request: ConfirmExtractionRequest,
    ) -> AppResult<ApiResponse<ProcessedDocumentResponse>> {
        let processed = self
            .pipeline
            .confirm_extraction(id, request.fields, request.doc_type, request.expires_on)
            .await?;

        Ok(ApiResponse::success_with_message(
            ProcessedDocumentResponse {
                document: processed.document.into(),
                extraction: processed.extraction.map(Into::into),
            },
            "Extraction confirmed".to_string(),
        ))
    }

    pub async fn get_extraction(&self, id: Uuid) -> AppResult<ExtractionResponse> {
        let extraction = self
            .extractions
            .find_by_document(id)
            .await?
            .ok_or_else(|| not_found_error("Extraction for document", &id.to_string()))?;

        Ok(extraction.into())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        self.pipeline.delete_document(id).await?;

        Ok(ApiResponse::success_with_message(
            (),
            "Document deleted".to_string(),
        ))
    }
}
