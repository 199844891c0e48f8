//! RoadReady - backend de cumplimiento de flotas
//!
//! Extracción de campos de documentos (IRP cab cards vía OCR), rule engine
//! de estado semáforo por conductor/vehículo, y despacho de alertas de
//! vencimiento con deduplicación y reintentos.

pub mod clients;
pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod notifications;
pub mod parsers;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
