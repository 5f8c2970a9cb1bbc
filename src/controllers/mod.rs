//! Controladores
//!
//! Orquestan validación, reglas de negocio, repositorio e invalidación de
//! cache. Los usan tanto las rutas HTTP como las herramientas del asistente.

pub mod analytics_controller;
pub mod driver_controller;
pub mod fuel_log_controller;
pub mod maintenance_controller;
pub mod trip_controller;
pub mod vehicle_controller;

pub use analytics_controller::AnalyticsController;
pub use driver_controller::DriverController;
pub use fuel_log_controller::FuelLogController;
pub use maintenance_controller::MaintenanceController;
pub use trip_controller::TripController;
pub use vehicle_controller::VehicleController;
