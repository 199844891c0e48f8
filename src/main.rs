use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use roadready_backend::config::environment::EnvironmentConfig;
use roadready_backend::database::DatabaseConnection;
use roadready_backend::middleware::cors::cors_layer;
use roadready_backend::routes;
use roadready_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚛 RoadReady - Fleet Compliance Backend");
    info!("=======================================");

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let pool = db_connection.pool().clone();
    let config = EnvironmentConfig::default();
    let port = config.port;

    if !config.email_configured() {
        info!("⚠️ RESEND_API_KEY no configurada - las alertas por email fallarán");
    }
    if !config.sms_configured() {
        info!("ℹ️ Twilio no configurado - alertas SMS deshabilitadas");
    }

    let app_state = AppState::new(pool, config);

    let app = Router::new()
        .route("/health", get(health))
        .nest("/api/driver", routes::driver_routes::create_driver_router())
        .nest("/api/vehicle", routes::vehicle_routes::create_vehicle_router())
        .nest("/api/document", routes::document_routes::create_document_router())
        .nest("/api/jobs", routes::job_routes::create_job_router())
        .layer(cors_layer(&app_state.config.allowed_origins))
        .with_state(app_state.clone());

    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Estado del servicio");
    info!("🧑 Endpoints - Driver:");
    info!("   POST /api/driver - Crear conductor");
    info!("   GET  /api/driver?fleet_id= - Listar conductores");
    info!("   GET  /api/driver/:id - Obtener conductor");
    info!("   GET  /api/driver/:id/status - Estado de cumplimiento");
    info!("🚗 Endpoints - Vehicle:");
    info!("   POST /api/vehicle - Crear vehículo");
    info!("   GET  /api/vehicle?fleet_id= - Listar vehículos");
    info!("   GET  /api/vehicle/:id/status - Estado de cumplimiento");
    info!("📄 Endpoints - Document:");
    info!("   POST /api/document - Subir y procesar documento");
    info!("   GET  /api/document/:id/extraction - Ver extracción");
    info!("   POST /api/document/:id/extraction/confirm - Confirmar review");
    info!("⏰ Endpoints - Jobs (Bearer CRON_SECRET):");
    info!("   GET  /api/jobs/check-expirations - Sweep de vencimientos");
    info!("   GET  /api/jobs/retry-failed-alerts - Reintento de alertas");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Servidor detenido");
    Ok(())
}

/// Health check con el estado de los proveedores externos
async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    let db_ok = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();

    Json(json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "database": db_ok,
        "email_configured": state.config.email_configured(),
        "sms_configured": state.config.sms_configured(),
        "storage_configured": state.config.storage_configured(),
        "ocr_configured": state.config.ocr_configured(),
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("🛑 Ctrl+C recibido"),
        _ = terminate => info!("🛑 SIGTERM recibido"),
    }
}
