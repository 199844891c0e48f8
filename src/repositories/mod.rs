//! Capa de acceso a datos
//!
//! Repositorios sqlx por tabla, más el trait `ComplianceStore` que agrupa
//! las operaciones que necesitan los servicios (sync, sweep, retry, pipeline)
//! detrás de una interfaz mockeable.

pub mod alert_repository;
pub mod document_repository;
pub mod driver_repository;
pub mod extraction_repository;
pub mod fleet_repository;
pub mod pg_store;
pub mod store;
pub mod vehicle_repository;

pub use alert_repository::AlertRepository;
pub use document_repository::DocumentRepository;
pub use driver_repository::DriverRepository;
pub use extraction_repository::ExtractionRepository;
pub use fleet_repository::FleetRepository;
pub use pg_store::PgComplianceStore;
pub use store::ComplianceStore;
pub use vehicle_repository::VehicleRepository;
