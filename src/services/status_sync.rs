//! Sincronizador de estado
//!
//! Único punto por el que el estado derivado llega a la base: recalcula el
//! estado de una entidad con el rule engine y lo persiste. Se dispara tras
//! cada mutación de documentos (alta, edición, borrado, review) y desde el
//! sweep diario.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::models::EntityRef;
use crate::repositories::ComplianceStore;
use crate::services::status_engine::{compute_status, StatusConfig, StatusResult};
use crate::utils::errors::AppResult;

pub struct StatusSynchronizer {
    store: Arc<dyn ComplianceStore>,
    config: StatusConfig,
}

impl StatusSynchronizer {
    pub fn new(store: Arc<dyn ComplianceStore>, config: StatusConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &StatusConfig {
        &self.config
    }

    /// Recalcula y persiste el estado de la entidad. Devuelve el resultado
    /// del engine para que el caller pueda mostrar la explicación.
    pub async fn sync_entity(&self, entity: EntityRef) -> AppResult<StatusResult> {
        self.sync_entity_as_of(entity, Utc::now().date_naive()).await
    }

    /// Variante con fecha explícita, para el sweep y los tests.
    pub async fn sync_entity_as_of(
        &self,
        entity: EntityRef,
        today: NaiveDate,
    ) -> AppResult<StatusResult> {
        let documents = self.store.documents_for_entity(entity).await?;
        let result = compute_status(entity.kind, &documents, &self.config, today);

        log::info!(
            "🔄 Status sync {} {}: {} ({})",
            entity.kind.as_str(),
            entity.id,
            result.status.as_str(),
            result.reason
        );

        self.store.update_entity_status(entity, result.status).await?;

        Ok(result)
    }
}
