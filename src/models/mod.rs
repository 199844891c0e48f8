//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL con las convenciones estándar.

pub mod alert;
pub mod document;
pub mod entity;
pub mod extraction;
pub mod fleet;

pub use alert::*;
pub use document::*;
pub use entity::*;
pub use extraction::*;
pub use fleet::*;
