//! Blob storage para archivos de documentos
//!
//! Los archivos viven fuera de Postgres; la fila de documento guarda solo el
//! path. Implementación real contra la API de storage de Supabase, más una
//! variante deshabilitada para entornos sin storage configurado.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::utils::errors::{AppError, AppResult};

#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Sube los bytes y devuelve el path dentro del bucket
    async fn upload(&self, fleet_id: Uuid, file_name: &str, bytes: Vec<u8>) -> AppResult<String>;

    /// URL firmada de lectura, válida por `expires_in` segundos
    async fn signed_url(&self, path: &str, expires_in: u64) -> AppResult<String>;

    async fn delete(&self, path: &str) -> AppResult<()>;
}

pub struct SupabaseStorage {
    base_url: String,
    service_key: String,
    bucket: String,
    client: reqwest::Client,
}

impl SupabaseStorage {
    pub fn new(base_url: String, service_key: String, bucket: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            service_key,
            bucket,
            client,
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.bucket,
            path
        )
    }

    fn sign_request_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/sign/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.bucket,
            path
        )
    }
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

#[async_trait]
impl BlobStorage for SupabaseStorage {
    async fn upload(&self, fleet_id: Uuid, file_name: &str, bytes: Vec<u8>) -> AppResult<String> {
        // Path namespaced por flota, con uuid para evitar colisiones de nombre
        let path = format!("{}/{}-{}", fleet_id, Uuid::new_v4(), file_name);

        log::info!("📤 Uploading {} bytes to storage: {}", bytes.len(), path);

        let response = self
            .client
            .post(self.object_url(&path))
            .bearer_auth(&self.service_key)
            .header("Content-Type", "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Upload request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "Upload returned {}: {}",
                status, text
            )));
        }

        Ok(path)
    }

    async fn signed_url(&self, path: &str, expires_in: u64) -> AppResult<String> {
        let response = self
            .client
            .post(self.sign_request_url(path))
            .bearer_auth(&self.service_key)
            .json(&json!({ "expiresIn": expires_in }))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Sign request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "Sign returned {}: {}",
                status, text
            )));
        }

        let body: SignResponse = response
            .json()
            .await
            .map_err(|e| AppError::Storage(format!("Sign response malformed: {}", e)))?;

        // El API devuelve un path relativo a /storage/v1
        Ok(format!(
            "{}/storage/v1{}",
            self.base_url.trim_end_matches('/'),
            body.signed_url
        ))
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let response = self
            .client
            .delete(self.object_url(path))
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Delete request failed: {}", e)))?;

        let status = response.status();
        // 404 al borrar no es error: el archivo ya no está
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::Storage(format!("Delete returned {}", status)));
        }

        Ok(())
    }
}

/// Storage deshabilitado: todo falla con un error claro. Permite levantar el
/// server sin credenciales de storage para desarrollo local.
pub struct DisabledStorage;

#[async_trait]
impl BlobStorage for DisabledStorage {
    async fn upload(&self, _fleet_id: Uuid, _file_name: &str, _bytes: Vec<u8>) -> AppResult<String> {
        Err(AppError::ServiceUnavailable(
            "File storage is not configured".to_string(),
        ))
    }

    async fn signed_url(&self, _path: &str, _expires_in: u64) -> AppResult<String> {
        Err(AppError::ServiceUnavailable(
            "File storage is not configured".to_string(),
        ))
    }

    async fn delete(&self, _path: &str) -> AppResult<()> {
        Err(AppError::ServiceUnavailable(
            "File storage is not configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> SupabaseStorage {
        SupabaseStorage::new(
            "https://project.supabase.co/".to_string(),
            "service-key".to_string(),
            "uploads".to_string(),
        )
    }

    #[test]
    fn test_object_url_handles_trailing_slash() {
        assert_eq!(
            storage().object_url("fleet-1/card.pdf"),
            "https://project.supabase.co/storage/v1/object/uploads/fleet-1/card.pdf"
        );
    }

    #[test]
    fn test_sign_request_url_targets_sign_endpoint() {
        assert_eq!(
            storage().sign_request_url("fleet-1/card.pdf"),
            "https://project.supabase.co/storage/v1/object/sign/uploads/fleet-1/card.pdf"
        );
    }
}
