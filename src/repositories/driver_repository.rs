use crate::models::{Driver, EntityStatus};
use crate::utils::errors::AppResult;
use sqlx::PgPool;
use uuid::Uuid;

pub struct DriverRepository {
    pool: PgPool,
}

impl DriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        fleet_id: Uuid,
        name: &str,
        license_number: Option<&str>,
        phone: Option<&str>,
    ) -> AppResult<Driver> {
        let result = sqlx::query_as::<_, Driver>(
            r#"
            INSERT INTO drivers (id, fleet_id, name, license_number, phone, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 'red', NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(fleet_id)
        .bind(name)
        .bind(license_number)
        .bind(phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Driver>> {
        let result = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(result)
    }

    pub async fn find_by_fleet(&self, fleet_id: Uuid) -> AppResult<Vec<Driver>> {
        let result = sqlx::query_as::<_, Driver>(
            "SELECT * FROM drivers WHERE fleet_id = $1 ORDER BY name",
        )
        .bind(fleet_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(result)
    }

    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        license_number: Option<&str>,
        phone: Option<&str>,
    ) -> AppResult<Option<Driver>> {
        let result = sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers SET
                name = COALESCE($2, name),
                license_number = COALESCE($3, license_number),
                phone = COALESCE($4, phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(license_number)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    pub async fn update_status(&self, id: Uuid, status: EntityStatus) -> AppResult<()> {
        sqlx::query("UPDATE drivers SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM drivers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
