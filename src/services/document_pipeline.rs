//! Pipeline de procesamiento de documentos
//!
//! Desde la subida del archivo hasta el documento listo: storage, OCR y
//! extracción de campos para cab cards, clasificación por visión cuando el
//! tipo no viene declarado, y decisión complete / needs_review. Cada paso
//! degrada: un fallo de OCR o del clasificador nunca pierde el archivo, el
//! documento queda marcado para revisión manual.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::clients::{BlobStorage, DocumentClassifier, OcrEngine};
use crate::models::{
    Document, EntityRef, EntityStatus, Extraction, ProcessingStatus, CAB_CARD_DOC_TYPE,
};
use crate::parsers::{parse_cab_card, CabCardFields};
use crate::repositories::{DocumentRepository, ExtractionRepository};
use crate::services::status_engine::{document_status, StatusConfig};
use crate::services::status_sync::StatusSynchronizer;
use crate::utils::errors::{AppError, AppResult};

/// Tope de warnings del parser para dar una extracción por buena
const MAX_WARNINGS_FOR_COMPLETE: usize = 5;

/// Vigencia de las URLs firmadas de lectura
const SIGNED_URL_TTL_SECS: u64 = 3600;

/// Parámetros de una subida de documento
#[derive(Debug)]
pub struct DocumentUpload {
    pub fleet_id: Uuid,
    pub entity: EntityRef,
    /// None => se pide sugerencia al clasificador
    pub doc_type: Option<String>,
    pub expires_on: Option<NaiveDate>,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Resultado del pipeline para devolver al cliente
#[derive(Debug)]
pub struct ProcessedDocument {
    pub document: Document,
    pub extraction: Option<Extraction>,
}

pub struct DocumentPipeline {
    documents: DocumentRepository,
    extractions: ExtractionRepository,
    storage: Arc<dyn BlobStorage>,
    ocr: Arc<dyn OcrEngine>,
    classifier: Arc<dyn DocumentClassifier>,
    synchronizer: Arc<StatusSynchronizer>,
    config: StatusConfig,
}

/// Una extracción se da por buena solo si encontró al menos un campo
/// crítico (vencimiento, VIN o placa) y el parser no acumuló demasiados
/// warnings. Cualquier otro caso va a revisión humana.
pub fn extraction_is_complete(fields: &CabCardFields, warnings: &[String]) -> bool {
    fields.has_critical_field() && warnings.len() < MAX_WARNINGS_FOR_COMPLETE
}

impl DocumentPipeline {
    pub fn new(
        documents: DocumentRepository,
        extractions: ExtractionRepository,
        storage: Arc<dyn BlobStorage>,
        ocr: Arc<dyn OcrEngine>,
        classifier: Arc<dyn DocumentClassifier>,
        synchronizer: Arc<StatusSynchronizer>,
        config: StatusConfig,
    ) -> Self {
        Self {
            documents,
            extractions,
            storage,
            ocr,
            classifier,
            synchronizer,
            config,
        }
    }

    /// Procesa una subida completa. Siempre que el archivo haya llegado al
    /// storage, devuelve un documento; los fallos de OCR o clasificación se
    /// reflejan en processing_status, no en el Result.
    pub async fn process_upload(&self, upload: DocumentUpload) -> AppResult<ProcessedDocument> {
        if upload.bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }

        let path = self
            .storage
            .upload(upload.fleet_id, &upload.file_name, upload.bytes.clone())
            .await?;

        let result = match &upload.doc_type {
            Some(doc_type) if doc_type == CAB_CARD_DOC_TYPE => {
                self.process_cab_card(&upload, &path).await
            }
            Some(_) => self.process_declared(&upload, &path).await,
            None => self.process_unclassified(&upload, &path).await,
        };

        let processed = result?;

        self.synchronizer.sync_entity(upload.entity).await?;

        Ok(processed)
    }

    /// Tipo declarado no estructurado: alta directa, completo de entrada.
    /// El estado del documento sale de su vencimiento, no de un default:
    /// subir un documento ya vencido lo deja en red desde el primer momento.
    async fn process_declared(
        &self,
        upload: &DocumentUpload,
        path: &str,
    ) -> AppResult<ProcessedDocument> {
        let doc_type = upload.doc_type.as_deref().unwrap_or_default();
        let status = document_status(upload.expires_on, &self.config, Utc::now().date_naive());

        let document = self
            .documents
            .create(
                upload.fleet_id,
                upload.entity,
                doc_type,
                upload.expires_on,
                status,
                ProcessingStatus::Complete,
                Some(path),
            )
            .await?;

        log::info!("✅ Document {} created ({})", document.id, doc_type);

        Ok(ProcessedDocument {
            document,
            extraction: None,
        })
    }

    /// Cab card: OCR + parser + extracción persistida
    async fn process_cab_card(
        &self,
        upload: &DocumentUpload,
        path: &str,
    ) -> AppResult<ProcessedDocument> {
        let document = self
            .documents
            .create(
                upload.fleet_id,
                upload.entity,
                CAB_CARD_DOC_TYPE,
                upload.expires_on,
                EntityStatus::Yellow,
                ProcessingStatus::Processing,
                Some(path),
            )
            .await?;

        let text = match self.ocr.extract_text(&upload.bytes, &upload.content_type).await {
            Ok(text) => text,
            Err(e) => {
                log::error!("❌ OCR failed for document {}: {}", document.id, e);
                return self.mark_failed(document).await;
            }
        };

        let parsed = parse_cab_card(&text);
        let extraction = self
            .extractions
            .insert(
                document.id,
                CAB_CARD_DOC_TYPE,
                &parsed.fields,
                &parsed.raw_text,
                &parsed.confidence,
            )
            .await?;

        let complete = extraction_is_complete(&parsed.fields, &parsed.warnings);
        let expires_on = upload.expires_on.or(parsed.fields.expiration_date);

        let document_id = document.id;
        self.documents
            .update_expiration(document_id, None, expires_on)
            .await?;

        if complete {
            let status = document_status(expires_on, &self.config, Utc::now().date_naive());
            self.documents
                .update_processing(document_id, ProcessingStatus::Complete)
                .await?;
            self.documents
                .update_status(document_id, status, false)
                .await?;
            log::info!(
                "✅ Cab card {} extracted: {} fields, {} warnings",
                document_id,
                parsed.fields.extracted_count(),
                parsed.warnings.len()
            );
        } else {
            self.documents
                .update_processing(document_id, ProcessingStatus::NeedsReview)
                .await?;
            self.documents
                .update_status(document_id, EntityStatus::Yellow, true)
                .await?;
            log::warn!(
                "⚠️ Cab card {} needs review: {} warnings",
                document_id,
                parsed.warnings.len()
            );
        }

        let document = self.reload(document_id).await?;

        Ok(ProcessedDocument {
            document,
            extraction: Some(extraction),
        })
    }

    /// Sin tipo declarado: el clasificador sugiere, el humano confirma
    async fn process_unclassified(
        &self,
        upload: &DocumentUpload,
        path: &str,
    ) -> AppResult<ProcessedDocument> {
        let suggestion = self
            .classifier
            .classify(&upload.bytes, &upload.content_type)
            .await;

        let (doc_type, expires_on) = match suggestion {
            Ok(s) => {
                log::info!(
                    "👁️ Classifier suggested {} (confidence {:.2})",
                    s.doc_type,
                    s.confidence
                );
                if let Some(reasoning) = &s.reasoning {
                    log::debug!("👁️ Classifier reasoning: {}", reasoning);
                }
                (s.doc_type, upload.expires_on.or(s.expires_on))
            }
            Err(e) => {
                log::warn!("⚠️ Classification failed, leaving untyped: {}", e);
                ("Other".to_string(), upload.expires_on)
            }
        };

        let document = self
            .documents
            .create(
                upload.fleet_id,
                upload.entity,
                &doc_type,
                expires_on,
                EntityStatus::Yellow,
                ProcessingStatus::NeedsReview,
                Some(path),
            )
            .await?;

        self.documents
            .update_status(document.id, EntityStatus::Yellow, true)
            .await?;

        let document = self.reload(document.id).await?;

        Ok(ProcessedDocument {
            document,
            extraction: None,
        })
    }

    /// Confirmación humana de una extracción: pisa campos, limpia el flag de
    /// review y deja el documento completo. Dispara el sync de la entidad.
    pub async fn confirm_extraction(
        &self,
        document_id: Uuid,
        fields: CabCardFields,
        doc_type: Option<String>,
        expires_on: Option<NaiveDate>,
    ) -> AppResult<ProcessedDocument> {
        let document = self
            .documents
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| {
                crate::utils::errors::not_found_error("Document", &document_id.to_string())
            })?;

        // Campos confirmados por humano: confianza 1.0 en lo presente
        let mut confidence = std::collections::HashMap::new();
        for (name, present) in fields.field_presence() {
            if present {
                confidence.insert(name.to_string(), 1.0);
            }
        }

        let extraction = self
            .extractions
            .update_fields(document_id, &fields, &confidence)
            .await?;

        let expires_on = expires_on.or(fields.expiration_date).or(document.expires_on);
        let status = document_status(expires_on, &self.config, Utc::now().date_naive());
        self.documents
            .update_expiration(document_id, doc_type.as_deref(), expires_on)
            .await?;
        self.documents
            .update_processing(document_id, ProcessingStatus::Complete)
            .await?;
        self.documents
            .update_status(document_id, status, false)
            .await?;

        let document = self.reload(document_id).await?;
        self.synchronizer.sync_entity(document.entity_ref()).await?;

        log::info!("✅ Extraction for document {} confirmed", document_id);

        Ok(ProcessedDocument {
            document,
            extraction,
        })
    }

    /// Corrección manual de tipo o vencimiento. Recalcula el estado del
    /// documento desde la nueva fecha (salvo que esté retenido en review)
    /// y re-sincroniza la entidad dueña.
    pub async fn update_document(
        &self,
        document_id: Uuid,
        doc_type: Option<&str>,
        expires_on: Option<NaiveDate>,
    ) -> AppResult<Document> {
        let document = self
            .documents
            .update_expiration(document_id, doc_type, expires_on)
            .await?
            .ok_or_else(|| {
                crate::utils::errors::not_found_error("Document", &document_id.to_string())
            })?;

        if !document.needs_review {
            let status =
                document_status(document.expires_on, &self.config, Utc::now().date_naive());
            self.documents
                .update_status(document_id, status, false)
                .await?;
        }

        let document = self.reload(document_id).await?;
        self.synchronizer.sync_entity(document.entity_ref()).await?;

        Ok(document)
    }

    /// URL firmada de lectura del archivo del documento. Que el storage no
    /// pueda firmar no rompe la consulta: se devuelve sin URL.
    pub async fn file_url(&self, document: &Document) -> Option<String> {
        let path = document.file_path.as_deref()?;
        match self.storage.signed_url(path, SIGNED_URL_TTL_SECS).await {
            Ok(url) => Some(url),
            Err(e) => {
                log::warn!("⚠️ Could not sign URL for {}: {}", path, e);
                None
            }
        }
    }

    /// Borra documento + archivo y re-sincroniza la entidad dueña
    pub async fn delete_document(&self, document_id: Uuid) -> AppResult<()> {
        let document = self
            .documents
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| {
                crate::utils::errors::not_found_error("Document", &document_id.to_string())
            })?;

        if let Some(path) = document.file_path.as_deref() {
            // El archivo es secundario: si el storage falla igual se borra la fila
            if let Err(e) = self.storage.delete(path).await {
                log::warn!("⚠️ Could not delete stored file {}: {}", path, e);
            }
        }

        self.documents.delete(document_id).await?;
        self.synchronizer.sync_entity(document.entity_ref()).await?;

        log::info!("🗑️ Document {} deleted", document_id);

        Ok(())
    }

    async fn mark_failed(&self, document: Document) -> AppResult<ProcessedDocument> {
        self.documents
            .update_processing(document.id, ProcessingStatus::Failed)
            .await?;
        self.documents
            .update_status(document.id, EntityStatus::Yellow, true)
            .await?;

        let document = self.reload(document.id).await?;

        Ok(ProcessedDocument {
            document,
            extraction: None,
        })
    }

    async fn reload(&self, id: Uuid) -> AppResult<Document> {
        self.documents
            .find_by_id(id)
            .await?
            .ok_or_else(|| crate::utils::errors::not_found_error("Document", &id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_with_critical_field_and_few_warnings_is_complete() {
        let mut fields = CabCardFields::default();
        fields.vin = Some("1FUJGHDV5LHLM1234".to_string());

        assert!(extraction_is_complete(&fields, &[]));
    }

    #[test]
    fn test_extraction_without_critical_fields_needs_review() {
        let mut fields = CabCardFields::default();
        fields.registrant_name = Some("ACME TRUCKING LLC".to_string());

        assert!(!extraction_is_complete(&fields, &[]));
    }

    #[test]
    fn test_sparse_card_with_critical_fields_is_complete() {
        // Un cab card real rara vez trae los ~19 campos; los ausentes no
        // cuentan contra el umbral de review
        let parsed =
            parse_cab_card("VIN: 1FUJGHDV5LHLM1234 Plate: RP12345 EXP 12/31/2026");

        assert!(parsed.fields.has_critical_field());
        assert!(
            extraction_is_complete(&parsed.fields, &parsed.warnings),
            "warnings: {:?}",
            parsed.warnings
        );
    }

    #[test]
    fn test_too_many_warnings_force_review() {
        let mut fields = CabCardFields::default();
        fields.expiration_date = NaiveDate::from_ymd_opt(2026, 3, 31);

        let warnings: Vec<String> = (0..5).map(|i| format!("warning {}", i)).collect();
        assert!(!extraction_is_complete(&fields, &warnings));
    }
}
