//! Controllers - lógica de orquestación entre rutas y servicios

pub mod document_controller;
pub mod driver_controller;
pub mod job_controller;
pub mod vehicle_controller;

pub use document_controller::DocumentController;
pub use driver_controller::DriverController;
pub use job_controller::JobController;
pub use vehicle_controller::VehicleController;
