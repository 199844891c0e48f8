use crate::models::{Fleet, FleetOwnerContact};
use crate::utils::errors::AppResult;
use sqlx::PgPool;
use uuid::Uuid;

pub struct FleetRepository {
    pool: PgPool,
}

impl FleetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Fleet>> {
        let result = sqlx::query_as::<_, Fleet>("SELECT * FROM fleets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(result)
    }

    pub async fn owner_contact(&self, id: Uuid) -> AppResult<Option<FleetOwnerContact>> {
        let row: Option<(Option<String>, Option<String>)> =
            sqlx::query_as("SELECT owner_email, owner_phone FROM fleets WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(email, phone)| FleetOwnerContact { email, phone }))
    }
}
