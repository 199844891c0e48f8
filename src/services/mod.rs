//! Lógica de negocio
//!
//! El rule engine puro, el sincronizador que lo persiste, el pipeline de
//! documentos y los dos jobs programados (sweep de vencimientos y retry de
//! alertas fallidas).

pub mod alert_retry;
pub mod document_pipeline;
pub mod expiration_sweep;
pub mod status_engine;
pub mod status_sync;

pub use alert_retry::{RetrySummary, RetrySweeper};
pub use document_pipeline::{DocumentPipeline, DocumentUpload, ProcessedDocument};
pub use expiration_sweep::{ExpirationSweeper, SweepSummary};
pub use status_engine::{compute_status, document_status, ExpiringDoc, StatusConfig, StatusResult};
pub use status_sync::StatusSynchronizer;
