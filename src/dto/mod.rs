//! DTOs - Request y Response de la API

pub mod common;
pub mod document_dto;
pub mod driver_dto;
pub mod vehicle_dto;

pub use common::ApiResponse;
