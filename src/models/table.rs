//! Tablas y vistas del backend
//!
//! Lista cerrada de fuentes de datos que la aplicación puede leer, con las
//! columnas sobre las que se permite filtrar por igualdad.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FleetTable {
    Vehicles,
    Drivers,
    Trips,
    MaintenanceLogs,
    FuelLogs,
    VehicleCostSummary,
    DriverPerformanceSummary,
    FleetKpiSummary,
    MonthlyFinancialSummary,
    VehicleFuelEfficiency,
}

impl FleetTable {
    pub const ALL: [FleetTable; 10] = [
        FleetTable::Vehicles,
        FleetTable::Drivers,
        FleetTable::Trips,
        FleetTable::MaintenanceLogs,
        FleetTable::FuelLogs,
        FleetTable::VehicleCostSummary,
        FleetTable::DriverPerformanceSummary,
        FleetTable::FleetKpiSummary,
        FleetTable::MonthlyFinancialSummary,
        FleetTable::VehicleFuelEfficiency,
    ];

    pub const BASE_TABLES: [FleetTable; 5] = [
        FleetTable::Vehicles,
        FleetTable::Drivers,
        FleetTable::Trips,
        FleetTable::MaintenanceLogs,
        FleetTable::FuelLogs,
    ];

    /// Nombre de la relación en Postgres
    pub fn as_str(&self) -> &'static str {
        match self {
            FleetTable::Vehicles => "vehicles",
            FleetTable::Drivers => "drivers",
            FleetTable::Trips => "trips",
            FleetTable::MaintenanceLogs => "maintenance_logs",
            FleetTable::FuelLogs => "fuel_logs",
            FleetTable::VehicleCostSummary => "vehicle_cost_summary",
            FleetTable::DriverPerformanceSummary => "driver_performance_summary",
            FleetTable::FleetKpiSummary => "fleet_kpi_summary",
            FleetTable::MonthlyFinancialSummary => "monthly_financial_summary",
            FleetTable::VehicleFuelEfficiency => "vehicle_fuel_efficiency",
        }
    }

    pub fn is_view(&self) -> bool {
        !Self::BASE_TABLES.contains(self)
    }

    /// Tablas base de las que depende la relación (ella misma si es tabla)
    pub fn sources(&self) -> &'static [FleetTable] {
        match self {
            FleetTable::Vehicles => &[FleetTable::Vehicles],
            FleetTable::Drivers => &[FleetTable::Drivers],
            FleetTable::Trips => &[FleetTable::Trips],
            FleetTable::MaintenanceLogs => &[FleetTable::MaintenanceLogs],
            FleetTable::FuelLogs => &[FleetTable::FuelLogs],
            FleetTable::VehicleCostSummary | FleetTable::MonthlyFinancialSummary => &[
                FleetTable::Vehicles,
                FleetTable::Trips,
                FleetTable::MaintenanceLogs,
                FleetTable::FuelLogs,
            ],
            FleetTable::VehicleFuelEfficiency => {
                &[FleetTable::Vehicles, FleetTable::Trips, FleetTable::FuelLogs]
            }
            FleetTable::DriverPerformanceSummary => &[FleetTable::Drivers, FleetTable::Trips],
            FleetTable::FleetKpiSummary => &[
                FleetTable::Vehicles,
                FleetTable::Trips,
                FleetTable::MaintenanceLogs,
            ],
        }
    }

    /// Columnas admitidas en filtros de igualdad
    pub fn filterable_columns(&self) -> &'static [&'static str] {
        match self {
            FleetTable::Vehicles => &["id", "name", "license_plate", "model", "type", "status", "region"],
            FleetTable::Drivers => &[
                "id",
                "full_name",
                "email",
                "phone",
                "license_number",
                "license_category",
                "status",
            ],
            FleetTable::Trips => &["id", "vehicle_id", "driver_id", "origin", "destination", "status"],
            FleetTable::MaintenanceLogs => {
                &["id", "vehicle_id", "service_type", "mechanic", "is_completed"]
            }
            FleetTable::FuelLogs => &["id", "trip_id", "vehicle_id", "fuel_date"],
            FleetTable::VehicleCostSummary => &["vehicle_id", "name", "license_plate"],
            FleetTable::DriverPerformanceSummary => &["driver_id", "full_name"],
            FleetTable::FleetKpiSummary => &[],
            FleetTable::MonthlyFinancialSummary => &["month_label"],
            FleetTable::VehicleFuelEfficiency => &["vehicle_id", "name"],
        }
    }

    /// Devuelve la columna estática si está permitida
    pub fn filter_column(&self, column: &str) -> Option<&'static str> {
        self.filterable_columns()
            .iter()
            .copied()
            .find(|allowed| *allowed == column)
    }
}

impl fmt::Display for FleetTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names_match_relation_names() {
        for table in FleetTable::ALL {
            let json = serde_json::to_string(&table).unwrap();
            assert_eq!(json, format!("\"{}\"", table.as_str()));
        }
    }

    #[test]
    fn test_views_depend_on_base_tables_only() {
        for table in FleetTable::ALL {
            assert!(table.sources().iter().all(|source| !source.is_view()));
        }
    }

    #[test]
    fn test_filter_column_allowlist() {
        assert_eq!(FleetTable::Vehicles.filter_column("status"), Some("status"));
        assert_eq!(FleetTable::Vehicles.filter_column("status; drop table vehicles"), None);
        assert_eq!(FleetTable::FleetKpiSummary.filter_column("id"), None);
    }
}
