//! Rutas de jobs programados
//!
//! Las invoca el scheduler externo (cron). Protegidas por un Bearer token
//! compartido (CRON_SECRET): sin secret configurado los endpoints quedan
//! deshabilitados.

use axum::{
    extract::State,
    http::HeaderMap,
    routing::get,
    Json, Router,
};

use crate::controllers::job_controller::JobController;
use crate::dto::common::ApiResponse;
use crate::services::alert_retry::RetrySummary;
use crate::services::expiration_sweep::SweepSummary;
use crate::state::AppState;
use crate::utils::errors::AppError;

// GET: los schedulers tipo Vercel cron invocan con GET
pub fn create_job_router() -> Router<AppState> {
    Router::new()
        .route("/check-expirations", get(check_expirations))
        .route("/retry-failed-alerts", get(retry_failed_alerts))
}

fn require_cron_secret(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(secret) = state.config.cron_secret.as_deref() else {
        return Err(AppError::ServiceUnavailable(
            "Scheduled jobs are disabled: CRON_SECRET is not set".to_string(),
        ));
    };

    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token == secret)
        .unwrap_or(false);

    if !authorized {
        return Err(AppError::Unauthorized(
            "Invalid or missing cron token".to_string(),
        ));
    }

    Ok(())
}

async fn check_expirations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<SweepSummary>>, AppError> {
    require_cron_secret(&state, &headers)?;

    let controller = JobController::new(state.sweeper.clone(), state.retrier.clone());
    let summary = controller.check_expirations().await?;
    Ok(Json(ApiResponse::success(summary)))
}

async fn retry_failed_alerts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<RetrySummary>>, AppError> {
    require_cron_secret(&state, &headers)?;

    let controller = JobController::new(state.sweeper.clone(), state.retrier.clone());
    let summary = controller.retry_failed_alerts().await?;
    Ok(Json(ApiResponse::success(summary)))
}
