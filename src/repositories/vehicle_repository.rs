use crate::models::{EntityStatus, Vehicle};
use crate::utils::errors::AppResult;
use sqlx::PgPool;
use uuid::Uuid;

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        fleet_id: Uuid,
        unit_number: &str,
        vin: Option<&str>,
        plate_number: Option<&str>,
    ) -> AppResult<Vehicle> {
        let result = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (id, fleet_id, unit_number, vin, plate_number, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 'red', NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(fleet_id)
        .bind(unit_number)
        .bind(vin)
        .bind(plate_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let result = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(result)
    }

    pub async fn find_by_fleet(&self, fleet_id: Uuid) -> AppResult<Vec<Vehicle>> {
        let result = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE fleet_id = $1 ORDER BY unit_number",
        )
        .bind(fleet_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(result)
    }

    pub async fn update(
        &self,
        id: Uuid,
        unit_number: Option<&str>,
        vin: Option<&str>,
        plate_number: Option<&str>,
    ) -> AppResult<Option<Vehicle>> {
        let result = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles SET
                unit_number = COALESCE($2, unit_number),
                vin = COALESCE($3, vin),
                plate_number = COALESCE($4, plate_number),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(unit_number)
        .bind(vin)
        .bind(plate_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }

    pub async fn update_status(&self, id: Uuid, status: EntityStatus) -> AppResult<()> {
        sqlx::query("UPDATE vehicles SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
