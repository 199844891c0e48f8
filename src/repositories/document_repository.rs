use crate::models::{Document, EntityRef, EntityStatus, ProcessingStatus};
use crate::utils::errors::AppResult;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        fleet_id: Uuid,
        entity: EntityRef,
        doc_type: &str,
        expires_on: Option<NaiveDate>,
        status: EntityStatus,
        processing_status: ProcessingStatus,
        file_path: Option<&str>,
    ) -> AppResult<Document> {
        let result = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (
                id, fleet_id, entity_kind, entity_id, doc_type, expires_on,
                status, processing_status, needs_review, file_path, uploaded_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, false, $9, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(fleet_id)
        .bind(entity.kind)
        .bind(entity.id)
        .bind(doc_type)
        .bind(expires_on)
        .bind(status)
        .bind(processing_status)
        .bind(file_path)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Document>> {
        let result = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(result)
    }

    pub async fn find_by_entity(&self, entity: EntityRef) -> AppResult<Vec<Document>> {
        let result = sqlx::query_as::<_, Document>(
            r#"
            SELECT * FROM documents
            WHERE entity_kind = $1 AND entity_id = $2
            ORDER BY uploaded_at DESC
            "#,
        )
        .bind(entity.kind)
        .bind(entity.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(result)
    }

    pub async fn find_by_fleet(&self, fleet_id: Uuid) -> AppResult<Vec<Document>> {
        let result = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE fleet_id = $1 ORDER BY uploaded_at DESC",
        )
        .bind(fleet_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(result)
    }

    /// Documentos cuyo vencimiento cae en o antes de la fecha dada,
    /// vencidos incluidos. Es la consulta que alimenta el sweep.
    pub async fn expiring_on_or_before(&self, date: NaiveDate) -> AppResult<Vec<Document>> {
        let result = sqlx::query_as::<_, Document>(
            r#"
            SELECT * FROM documents
            WHERE expires_on IS NOT NULL AND expires_on <= $1
            ORDER BY fleet_id, expires_on
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(result)
    }

    pub async fn update_expiration(
        &self,
        id: Uuid,
        doc_type: Option<&str>,
        expires_on: Option<NaiveDate>,
    ) -> AppResult<Option<Document>> {
        let result = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents SET
                doc_type = COALESCE($2, doc_type),
                expires_on = COALESCE($3, expires_on),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(doc_type)
        .bind(expires_on)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: EntityStatus,
        needs_review: bool,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE documents SET status = $2, needs_review = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(needs_review)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn update_processing(
        &self,
        id: Uuid,
        processing_status: ProcessingStatus,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE documents SET processing_status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(processing_status)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
