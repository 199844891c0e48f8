//! Middleware de CORS
//!
//! Los orígenes permitidos vienen de la config (`ALLOWED_ORIGINS`). Sin la
//! variable, la capa queda permisiva para desarrollo local; con ella, solo
//! esos orígenes y el set mínimo de métodos/headers que usa esta API JSON.

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;

pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::very_permissive();
    }

    let mut cors = CorsLayer::new();
    for origin in origins {
        if let Ok(value) = HeaderValue::from_str(origin) {
            cors = cors.allow_origin(value);
        } else {
            log::warn!("⚠️ Ignoring invalid CORS origin: {}", origin);
        }
    }

    // API JSON pura: el cron manda Bearer, el frontend JSON
    cors.allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            HeaderName::from_static("authorization"),
            HeaderName::from_static("content-type"),
        ])
}
