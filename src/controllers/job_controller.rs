use std::sync::Arc;

use crate::services::alert_retry::{RetrySummary, RetrySweeper};
use crate::services::expiration_sweep::{ExpirationSweeper, SweepSummary};
use crate::utils::errors::AppResult;

/// Orquesta los dos jobs programados. Los summaries siempre tienen forma de
/// éxito: los errores por flota o por alerta viajan adentro.
pub struct JobController {
    sweeper: Arc<ExpirationSweeper>,
    retrier: Arc<RetrySweeper>,
}

impl JobController {
    pub fn new(sweeper: Arc<ExpirationSweeper>, retrier: Arc<RetrySweeper>) -> Self {
        Self { sweeper, retrier }
    }

    pub async fn check_expirations(&self) -> AppResult<SweepSummary> {
        self.sweeper.run().await
    }

    pub async fn retry_failed_alerts(&self) -> AppResult<RetrySummary> {
        self.retrier.run().await
    }
}
