//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum: el pool, la config y los servicios ya
//! cableados (sincronizador, pipeline, sweepers) detrás de sus traits.

use std::sync::Arc;

use sqlx::PgPool;

use crate::clients::{
    DisabledClassifier, DisabledOcr, DisabledStorage, OpenAiClassifier, RemoteOcrEngine,
    SupabaseStorage,
};
use crate::config::environment::EnvironmentConfig;
use crate::notifications::{ResendEmailSender, TwilioSmsSender};
use crate::repositories::{DocumentRepository, ExtractionRepository, PgComplianceStore};
use crate::services::alert_retry::RetrySweeper;
use crate::services::document_pipeline::DocumentPipeline;
use crate::services::expiration_sweep::ExpirationSweeper;
use crate::services::status_engine::StatusConfig;
use crate::services::status_sync::StatusSynchronizer;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub synchronizer: Arc<StatusSynchronizer>,
    pub pipeline: Arc<DocumentPipeline>,
    pub sweeper: Arc<ExpirationSweeper>,
    pub retrier: Arc<RetrySweeper>,
}

impl AppState {
    /// Cablea todos los servicios a partir del pool y la config. Los
    /// proveedores sin credenciales quedan en su variante deshabilitada.
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        let store = Arc::new(PgComplianceStore::new(pool.clone()));

        let status_config = StatusConfig::default().with_window(config.yellow_window_days);

        let synchronizer = Arc::new(StatusSynchronizer::new(
            store.clone(),
            status_config.clone(),
        ));

        let email = Arc::new(ResendEmailSender::new(
            config.resend_api_key.clone(),
            config.resend_from_email.clone(),
        ));

        let sms = Arc::new(TwilioSmsSender::new(
            config.twilio_account_sid.clone(),
            config.twilio_auth_token.clone(),
            config.twilio_from_number.clone(),
        ));

        let storage: Arc<dyn crate::clients::BlobStorage> =
            match (config.storage_url.clone(), config.storage_service_key.clone()) {
                (Some(url), Some(key)) => Arc::new(SupabaseStorage::new(
                    url,
                    key,
                    config.storage_bucket.clone(),
                )),
                _ => Arc::new(DisabledStorage),
            };

        let ocr: Arc<dyn crate::clients::OcrEngine> =
            match (config.ocr_endpoint.clone(), config.ocr_api_key.clone()) {
                (Some(endpoint), Some(key)) => Arc::new(RemoteOcrEngine::new(endpoint, key)),
                _ => Arc::new(DisabledOcr),
            };

        let classifier: Arc<dyn crate::clients::DocumentClassifier> =
            match config.openai_api_key.clone() {
                Some(key) => Arc::new(OpenAiClassifier::new(key)),
                None => Arc::new(DisabledClassifier),
            };

        let pipeline = Arc::new(DocumentPipeline::new(
            DocumentRepository::new(pool.clone()),
            ExtractionRepository::new(pool.clone()),
            storage,
            ocr,
            classifier,
            synchronizer.clone(),
            status_config.clone(),
        ));

        let sweeper = Arc::new(ExpirationSweeper::new(
            store.clone(),
            email.clone(),
            sms.clone(),
            status_config,
        ));

        let retrier = Arc::new(RetrySweeper::new(store, email, sms));

        Self {
            pool,
            config,
            synchronizer,
            pipeline,
            sweeper,
            retrier,
        }
    }
}
