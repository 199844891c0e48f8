//! Rutas de la API

pub mod document_routes;
pub mod driver_routes;
pub mod job_routes;
pub mod vehicle_routes;
