use crate::models::Extraction;
use crate::parsers::cab_card::CabCardFields;
use crate::utils::errors::AppResult;
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

pub struct ExtractionRepository {
    pool: PgPool,
}

impl ExtractionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        document_id: Uuid,
        doc_type: &str,
        fields: &CabCardFields,
        raw_text: &str,
        confidence: &HashMap<String, f64>,
    ) -> AppResult<Extraction> {
        let result = sqlx::query_as::<_, Extraction>(
            r#"
            INSERT INTO document_extractions (
                id, document_id, doc_type, extracted_json, raw_text, confidence,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(document_id)
        .bind(doc_type)
        .bind(Json(fields))
        .bind(raw_text)
        .bind(Json(confidence))
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    pub async fn find_by_document(&self, document_id: Uuid) -> AppResult<Option<Extraction>> {
        let result = sqlx::query_as::<_, Extraction>(
            "SELECT * FROM document_extractions WHERE document_id = $1",
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    /// Reemplaza los campos extraídos tras una corrección humana. La
    /// confianza de los campos editados pasa a 1.0 del lado del caller.
    pub async fn update_fields(
        &self,
        document_id: Uuid,
        fields: &CabCardFields,
        confidence: &HashMap<String, f64>,
    ) -> AppResult<Option<Extraction>> {
        let result = sqlx::query_as::<_, Extraction>(
            r#"
            UPDATE document_extractions SET
                extracted_json = $2,
                confidence = $3,
                updated_at = NOW()
            WHERE document_id = $1
            RETURNING *
            "#,
        )
        .bind(document_id)
        .bind(Json(fields))
        .bind(Json(confidence))
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }
}
