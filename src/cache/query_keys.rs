//! Tabla de dependencias de la cache
//!
//! Cada lectura cacheada declara las tablas base que lee y cada mutación
//! las tablas que escribe. La lista de invalidación de cada mutación está
//! escrita a mano y un test comprueba que cubre todas las lecturas
//! afectadas.

use serde::Serialize;

use crate::models::FleetTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKey {
    Vehicles,
    Drivers,
    Trips,
    MaintenanceLogs,
    FuelLogs,
    /// Registros de combustible con distancia del viaje y nombre del vehículo
    FuelLogDetails,
    VehicleCostSummary,
    VehicleFuelEfficiency,
    MonthlyFinancialSummary,
    FleetKpi,
    DriverPerformance,
}

impl QueryKey {
    pub const ALL: [QueryKey; 11] = [
        QueryKey::Vehicles,
        QueryKey::Drivers,
        QueryKey::Trips,
        QueryKey::MaintenanceLogs,
        QueryKey::FuelLogs,
        QueryKey::FuelLogDetails,
        QueryKey::VehicleCostSummary,
        QueryKey::VehicleFuelEfficiency,
        QueryKey::MonthlyFinancialSummary,
        QueryKey::FleetKpi,
        QueryKey::DriverPerformance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKey::Vehicles => "vehicles",
            QueryKey::Drivers => "drivers",
            QueryKey::Trips => "trips",
            QueryKey::MaintenanceLogs => "maintenance_logs",
            QueryKey::FuelLogs => "fuel_logs",
            QueryKey::FuelLogDetails => "fuel_log_details",
            QueryKey::VehicleCostSummary => "vehicle_cost_summary",
            QueryKey::VehicleFuelEfficiency => "vehicle_fuel_efficiency",
            QueryKey::MonthlyFinancialSummary => "monthly_financial_summary",
            QueryKey::FleetKpi => "fleet_kpi",
            QueryKey::DriverPerformance => "driver_performance",
        }
    }

    /// Tablas base que lee la consulta
    pub fn reads(&self) -> &'static [FleetTable] {
        match self {
            QueryKey::Vehicles => FleetTable::Vehicles.sources(),
            QueryKey::Drivers => FleetTable::Drivers.sources(),
            QueryKey::Trips => FleetTable::Trips.sources(),
            QueryKey::MaintenanceLogs => FleetTable::MaintenanceLogs.sources(),
            QueryKey::FuelLogs => FleetTable::FuelLogs.sources(),
            QueryKey::FuelLogDetails => {
                &[FleetTable::FuelLogs, FleetTable::Trips, FleetTable::Vehicles]
            }
            QueryKey::VehicleCostSummary => FleetTable::VehicleCostSummary.sources(),
            QueryKey::VehicleFuelEfficiency => FleetTable::VehicleFuelEfficiency.sources(),
            QueryKey::MonthlyFinancialSummary => FleetTable::MonthlyFinancialSummary.sources(),
            QueryKey::FleetKpi => FleetTable::FleetKpiSummary.sources(),
            QueryKey::DriverPerformance => FleetTable::DriverPerformanceSummary.sources(),
        }
    }
}

/// Escrituras que realiza el servicio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    CreateVehicle,
    UpdateVehicle,
    DeleteVehicle,
    CreateDriver,
    UpdateDriver,
    CreateTrip,
    /// Dispatch, complete o cancel (viaje + vehículo + conductor)
    TransitionTrip,
    CreateMaintenance,
    UpdateMaintenance,
    CompleteMaintenance,
    CreateFuelLog,
}

impl Mutation {
    pub const ALL: [Mutation; 11] = [
        Mutation::CreateVehicle,
        Mutation::UpdateVehicle,
        Mutation::DeleteVehicle,
        Mutation::CreateDriver,
        Mutation::UpdateDriver,
        Mutation::CreateTrip,
        Mutation::TransitionTrip,
        Mutation::CreateMaintenance,
        Mutation::UpdateMaintenance,
        Mutation::CompleteMaintenance,
        Mutation::CreateFuelLog,
    ];

    /// Tablas base que escribe la mutación
    pub fn writes(&self) -> &'static [FleetTable] {
        match self {
            Mutation::CreateVehicle | Mutation::UpdateVehicle | Mutation::DeleteVehicle => {
                &[FleetTable::Vehicles]
            }
            Mutation::CreateDriver | Mutation::UpdateDriver => &[FleetTable::Drivers],
            Mutation::CreateTrip => &[FleetTable::Trips],
            Mutation::TransitionTrip => {
                &[FleetTable::Trips, FleetTable::Vehicles, FleetTable::Drivers]
            }
            // Un registro abierto pone el vehículo In Shop; cerrarlo lo libera
            Mutation::CreateMaintenance
            | Mutation::UpdateMaintenance
            | Mutation::CompleteMaintenance => {
                &[FleetTable::MaintenanceLogs, FleetTable::Vehicles]
            }
            Mutation::CreateFuelLog => &[FleetTable::FuelLogs],
        }
    }

    /// Consultas a invalidar tras la mutación
    pub fn invalidates(&self) -> &'static [QueryKey] {
        use QueryKey::*;

        match self {
            Mutation::CreateVehicle | Mutation::UpdateVehicle | Mutation::DeleteVehicle => &[
                Vehicles,
                FuelLogDetails,
                VehicleCostSummary,
                VehicleFuelEfficiency,
                MonthlyFinancialSummary,
                FleetKpi,
            ],
            Mutation::CreateDriver | Mutation::UpdateDriver => &[Drivers, DriverPerformance],
            Mutation::CreateTrip => &[
                Trips,
                FuelLogDetails,
                VehicleCostSummary,
                VehicleFuelEfficiency,
                MonthlyFinancialSummary,
                DriverPerformance,
                FleetKpi,
            ],
            Mutation::TransitionTrip => &[
                Trips,
                Vehicles,
                Drivers,
                FuelLogDetails,
                VehicleCostSummary,
                VehicleFuelEfficiency,
                MonthlyFinancialSummary,
                DriverPerformance,
                FleetKpi,
            ],
            Mutation::CreateMaintenance
            | Mutation::UpdateMaintenance
            | Mutation::CompleteMaintenance => &[
                MaintenanceLogs,
                Vehicles,
                FuelLogDetails,
                VehicleCostSummary,
                VehicleFuelEfficiency,
                MonthlyFinancialSummary,
                FleetKpi,
            ],
            Mutation::CreateFuelLog => &[
                FuelLogs,
                FuelLogDetails,
                VehicleCostSummary,
                VehicleFuelEfficiency,
                MonthlyFinancialSummary,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidation_covers_every_affected_query() {
        for mutation in Mutation::ALL {
            for key in QueryKey::ALL {
                let affected = key
                    .reads()
                    .iter()
                    .any(|table| mutation.writes().contains(table));
                if affected {
                    assert!(
                        mutation.invalidates().contains(&key),
                        "{:?} must invalidate {:?}",
                        mutation,
                        key
                    );
                }
            }
        }
    }

    #[test]
    fn test_mutations_only_write_base_tables() {
        for mutation in Mutation::ALL {
            assert!(mutation.writes().iter().all(|table| !table.is_view()));
        }
    }

    #[test]
    fn test_trip_transition_refreshes_dashboard() {
        let keys = Mutation::TransitionTrip.invalidates();
        for key in [QueryKey::Trips, QueryKey::Vehicles, QueryKey::Drivers, QueryKey::FleetKpi] {
            assert!(keys.contains(&key));
        }
    }
}
