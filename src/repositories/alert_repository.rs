use crate::models::{Alert, AlertStatus, NewAlert};
use crate::utils::errors::AppResult;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct AlertRepository {
    pool: PgPool,
}

impl AlertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, alert: NewAlert) -> AppResult<Alert> {
        let result = sqlx::query_as::<_, Alert>(
            r#"
            INSERT INTO alerts (
                id, fleet_id, channel, to_address, reason, entity_kind, entity_id,
                document_id, status, error, sent_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(alert.fleet_id)
        .bind(alert.channel)
        .bind(alert.to_address)
        .bind(alert.reason)
        .bind(alert.entity_kind)
        .bind(alert.entity_id)
        .bind(alert.document_id)
        .bind(alert.status)
        .bind(alert.error)
        .bind(alert.sent_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    /// La clave de dedup es (fleet, document), sin el motivo: si ya avisamos
    /// por este documento en la ventana, no volvemos a avisar aunque el
    /// motivo haya cambiado de expiring_soon a expired.
    pub async fn exists_since(
        &self,
        fleet_id: Uuid,
        document_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM alerts
                WHERE fleet_id = $1 AND document_id = $2 AND created_at > $3
            )
            "#,
        )
        .bind(fleet_id)
        .bind(document_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn update_delivery(
        &self,
        id: Uuid,
        status: AlertStatus,
        error: Option<String>,
        sent_at: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE alerts SET status = $2, error = $3, sent_at = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(error)
        .bind(sent_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn failed_since(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<Alert>> {
        let result = sqlx::query_as::<_, Alert>(
            r#"
            SELECT * FROM alerts
            WHERE status = 'failed' AND created_at > $1
            ORDER BY created_at ASC
            LIMIT $2
            "#,
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(result)
    }

    pub async fn find_by_fleet(&self, fleet_id: Uuid, limit: i64) -> AppResult<Vec<Alert>> {
        let result = sqlx::query_as::<_, Alert>(
            r#"
            SELECT * FROM alerts
            WHERE fleet_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(fleet_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(result)
    }
}
