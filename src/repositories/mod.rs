//! Repositorios
//!
//! Interfaz de persistencia del dashboard. `PgRepository` habla con el
//! backend Postgres; `MemoryRepository` emula sus restricciones en memoria
//! para desarrollo y tests.
//!
//! Las escrituras de varias filas (transiciones de viaje, mantenimiento)
//! se aplican como una sola unidad en ambas implementaciones.

pub mod memory_repository;
pub mod postgres;

pub use memory_repository::MemoryRepository;
pub use postgres::PgRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    Driver, DriverPatch, DriverPerformanceSummary, FleetKpiSummary, FleetTable, FuelLog,
    FuelLogWithTrip, MaintenanceLog, MaintenancePatch, MonthlyFinancialSummary, NewDriver,
    NewFuelLog, NewMaintenanceLog, NewTrip, NewVehicle, Trip, TripTransition, Vehicle,
    VehicleCostSummary, VehicleFuelEfficiency, VehiclePatch, VehicleStatus,
};
use crate::utils::errors::AppResult;

/// Mensaje cuando el backend rechaza una matrícula repetida
pub const DUPLICATE_PLATE_MESSAGE: &str = "License plate already registered";
/// Mensaje cuando el backend rechaza un número de licencia repetido
pub const DUPLICATE_LICENSE_MESSAGE: &str = "A driver with this license number already exists";

/// Resultado de cerrar un registro de mantenimiento
#[derive(Debug, Clone)]
pub struct MaintenanceClosure {
    pub log: MaintenanceLog,
    /// Vehículo si su estado cambió al cerrar
    pub released_vehicle: Option<Vehicle>,
}

/// Filtro de igualdad ya validado contra la lista de columnas de la tabla
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub column: &'static str,
    pub value: String,
}

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Más recientes primero
    async fn list_vehicles(&self) -> AppResult<Vec<Vehicle>>;

    async fn find_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>>;

    async fn license_plate_exists(&self, plate: &str, exclude_id: Option<Uuid>) -> AppResult<bool>;

    async fn insert_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle>;

    async fn update_vehicle(&self, id: Uuid, patch: VehiclePatch) -> AppResult<Vehicle>;

    async fn delete_vehicle(&self, id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait DriverRepository: Send + Sync {
    /// Ordenados por nombre
    async fn list_drivers(&self) -> AppResult<Vec<Driver>>;

    async fn find_driver(&self, id: Uuid) -> AppResult<Option<Driver>>;

    async fn license_number_exists(&self, number: &str, exclude_id: Option<Uuid>) -> AppResult<bool>;

    async fn insert_driver(&self, driver: NewDriver) -> AppResult<Driver>;

    async fn update_driver(&self, id: Uuid, patch: DriverPatch) -> AppResult<Driver>;
}

#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Más recientes primero
    async fn list_trips(&self) -> AppResult<Vec<Trip>>;

    async fn find_trip(&self, id: Uuid) -> AppResult<Option<Trip>>;

    /// Viajes creados desde `since` (inclusive)
    async fn trips_created_since(&self, since: DateTime<Utc>) -> AppResult<Vec<Trip>>;

    async fn insert_trip(&self, trip: NewTrip) -> AppResult<Trip>;

    /// Escribe el viaje y las filas acompañantes como una unidad. Falla con
    /// `Conflict` si el viaje ya no está en `transition.from`.
    async fn apply_transition(&self, transition: &TripTransition) -> AppResult<Trip>;
}

#[async_trait]
pub trait MaintenanceRepository: Send + Sync {
    /// Por fecha de servicio, más recientes primero
    async fn list_maintenance(&self) -> AppResult<Vec<MaintenanceLog>>;

    async fn find_maintenance(&self, id: Uuid) -> AppResult<Option<MaintenanceLog>>;

    /// Inserta el registro y, si se indica, el nuevo estado del vehículo
    async fn insert_maintenance(
        &self,
        log: NewMaintenanceLog,
        vehicle_status: Option<VehicleStatus>,
    ) -> AppResult<MaintenanceLog>;

    async fn update_maintenance(&self, id: Uuid, patch: MaintenancePatch) -> AppResult<MaintenanceLog>;

    /// Marca el registro como completado y libera el vehículo si ya no
    /// quedan registros abiertos
    async fn complete_maintenance(&self, id: Uuid) -> AppResult<MaintenanceClosure>;
}

#[async_trait]
pub trait FuelLogRepository: Send + Sync {
    /// Por fecha, más recientes primero
    async fn list_fuel_logs(&self) -> AppResult<Vec<FuelLog>>;

    async fn insert_fuel_log(&self, log: NewFuelLog) -> AppResult<FuelLog>;

    /// Registros unidos a su viaje y vehículo, por fecha ascendente
    async fn fuel_logs_with_trips(&self) -> AppResult<Vec<FuelLogWithTrip>>;
}

#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn vehicle_cost_summary(&self) -> AppResult<Vec<VehicleCostSummary>>;

    async fn vehicle_fuel_efficiency(&self) -> AppResult<Vec<VehicleFuelEfficiency>>;

    /// Meses más recientes primero
    async fn monthly_financial_summary(&self, limit: i64) -> AppResult<Vec<MonthlyFinancialSummary>>;

    async fn fleet_kpi_summary(&self) -> AppResult<FleetKpiSummary>;

    async fn driver_performance_summary(&self) -> AppResult<Vec<DriverPerformanceSummary>>;
}

#[async_trait]
pub trait TableQueryRepository: Send + Sync {
    /// Lectura genérica de una tabla o vista con filtros de igualdad
    async fn query_table(
        &self,
        table: FleetTable,
        filters: &[ColumnFilter],
        limit: i64,
    ) -> AppResult<Vec<serde_json::Value>>;
}

/// Repositorio completo del dashboard
pub trait FleetRepository:
    VehicleRepository
    + DriverRepository
    + TripRepository
    + MaintenanceRepository
    + FuelLogRepository
    + AnalyticsRepository
    + TableQueryRepository
{
    /// Nombre del almacén para logs y `/health`
    fn store_name(&self) -> &'static str;
}
