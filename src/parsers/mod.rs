//! Parsers de documentos estructurados
//!
//! Extracción de campos desde texto OCR ruidoso. Los parsers son funciones
//! puras: nunca fallan, cada campo degrada independientemente a None con
//! confianza 0.0.

pub mod cab_card;

pub use cab_card::{parse_cab_card, CabCardFields, ParseResult};
