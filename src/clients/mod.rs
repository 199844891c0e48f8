//! Clients - HTTP Clients for External APIs
//!
//! This module contains HTTP clients for communicating with external APIs:
//! blob storage for document files, OCR, and the AI document classifier.

pub mod ocr;
pub mod storage;
pub mod vision;

// Re-export main types for convenience
pub use ocr::{DisabledOcr, OcrEngine, RemoteOcrEngine};
pub use storage::{BlobStorage, DisabledStorage, SupabaseStorage};
pub use vision::{DisabledClassifier, DocTypeSuggestion, DocumentClassifier, OpenAiClassifier};
