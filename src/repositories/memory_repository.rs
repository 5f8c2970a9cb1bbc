//! Repositorio en memoria
//!
//! Emula el backend: restricciones de unicidad y de clave foránea, vistas
//! de analytics calculadas al vuelo y escrituras de varias filas
//! todo-o-nada. Permite inyectar fallos de escritura por tabla.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AnalyticsRepository, ColumnFilter, DriverRepository, FleetRepository, FuelLogRepository,
    MaintenanceClosure, MaintenanceRepository, TableQueryRepository, TripRepository,
    VehicleRepository, DUPLICATE_LICENSE_MESSAGE, DUPLICATE_PLATE_MESSAGE,
};
use crate::models::{
    Driver, DriverPatch, DriverPerformanceSummary, FleetKpiSummary, FleetTable, FuelLog,
    FuelLogWithTrip, MaintenanceLog, MaintenancePatch, MonthlyFinancialSummary, NewDriver,
    NewFuelLog, NewMaintenanceLog, NewTrip, NewVehicle, Trip, TripStatus, TripTransition, Vehicle,
    VehicleCostSummary, VehicleFuelEfficiency, VehiclePatch, VehicleStatus,
};
use crate::services::fleet_rules::status_after_maintenance_closed;
use crate::utils::errors::{duplicate_error, not_found_error, AppError, AppResult};
use crate::utils::validation::round2;

#[derive(Default)]
struct MemoryState {
    vehicles: HashMap<Uuid, Vehicle>,
    drivers: HashMap<Uuid, Driver>,
    trips: HashMap<Uuid, Trip>,
    maintenance: HashMap<Uuid, MaintenanceLog>,
    fuel_logs: HashMap<Uuid, FuelLog>,
    failing: HashSet<FleetTable>,
}

impl MemoryState {
    /// Todas las tablas de una unidad deben aceptar escrituras antes de tocar nada
    fn check_writable(&self, tables: &[FleetTable]) -> AppResult<()> {
        match tables.iter().find(|table| self.failing.contains(table)) {
            Some(table) => Err(AppError::Database(sqlx::Error::Protocol(format!(
                "simulated write failure on {}",
                table
            )))),
            None => Ok(()),
        }
    }

    fn foreign_key(message: &str) -> AppError {
        AppError::ForeignKeyConflict(message.to_string())
    }

    fn open_logs(&self, vehicle_id: Uuid) -> i64 {
        self.maintenance
            .values()
            .filter(|log| log.vehicle_id == vehicle_id && !log.is_completed)
            .count() as i64
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    state: RwLock<MemoryState>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Las escrituras sobre `table` fallarán hasta `clear_failures`
    pub async fn fail_writes_to(&self, table: FleetTable) {
        self.state.write().await.failing.insert(table);
    }

    pub async fn clear_failures(&self) {
        self.state.write().await.failing.clear();
    }

    /// Mover la fecha de creación de un viaje (ventana de dead stock en tests)
    pub async fn backdate_trip(&self, id: Uuid, created_at: DateTime<Utc>) -> AppResult<Trip> {
        let mut state = self.state.write().await;
        let trip = state
            .trips
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Trip", &id.to_string()))?;
        trip.created_at = created_at;
        Ok(trip.clone())
    }
}

fn sorted_by<T, K: Ord>(rows: impl Iterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut rows: Vec<T> = rows.collect();
    rows.sort_by_key(|row| key(row));
    rows
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

#[async_trait]
impl VehicleRepository for MemoryRepository {
    async fn list_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        let state = self.state.read().await;
        Ok(sorted_by(state.vehicles.values().cloned(), |v| {
            std::cmp::Reverse(v.created_at)
        }))
    }

    async fn find_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        Ok(self.state.read().await.vehicles.get(&id).cloned())
    }

    async fn license_plate_exists(&self, plate: &str, exclude_id: Option<Uuid>) -> AppResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .vehicles
            .values()
            .any(|v| v.license_plate == plate && Some(v.id) != exclude_id))
    }

    async fn insert_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        let mut state = self.state.write().await;
        state.check_writable(&[FleetTable::Vehicles])?;

        if state.vehicles.values().any(|v| v.license_plate == vehicle.license_plate) {
            return Err(duplicate_error("license_plate", DUPLICATE_PLATE_MESSAGE));
        }

        let created = Vehicle {
            id: Uuid::new_v4(),
            name: vehicle.name,
            license_plate: vehicle.license_plate,
            model: vehicle.model,
            vehicle_type: vehicle.vehicle_type,
            max_capacity_kg: vehicle.max_capacity_kg,
            odometer_km: vehicle.odometer_km,
            status: vehicle.status,
            region: vehicle.region,
            acquisition_cost: vehicle.acquisition_cost,
            created_at: Utc::now(),
        };
        state.vehicles.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_vehicle(&self, id: Uuid, patch: VehiclePatch) -> AppResult<Vehicle> {
        let mut state = self.state.write().await;
        state.check_writable(&[FleetTable::Vehicles])?;

        let current = state
            .vehicles
            .get(&id)
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;
        let next = patch.apply_to(current);

        if state
            .vehicles
            .values()
            .any(|v| v.id != id && v.license_plate == next.license_plate)
        {
            return Err(duplicate_error("license_plate", DUPLICATE_PLATE_MESSAGE));
        }

        state.vehicles.insert(id, next.clone());
        Ok(next)
    }

    async fn delete_vehicle(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.check_writable(&[FleetTable::Vehicles])?;

        if !state.vehicles.contains_key(&id) {
            return Err(not_found_error("Vehicle", &id.to_string()));
        }
        let referenced = state.trips.values().any(|t| t.vehicle_id == id)
            || state.maintenance.values().any(|m| m.vehicle_id == id)
            || state.fuel_logs.values().any(|f| f.vehicle_id == id);
        if referenced {
            return Err(MemoryState::foreign_key("Record is referenced by other records"));
        }

        state.vehicles.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl DriverRepository for MemoryRepository {
    async fn list_drivers(&self) -> AppResult<Vec<Driver>> {
        let state = self.state.read().await;
        Ok(sorted_by(state.drivers.values().cloned(), |d| d.full_name.clone()))
    }

    async fn find_driver(&self, id: Uuid) -> AppResult<Option<Driver>> {
        Ok(self.state.read().await.drivers.get(&id).cloned())
    }

    async fn license_number_exists(&self, number: &str, exclude_id: Option<Uuid>) -> AppResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .drivers
            .values()
            .any(|d| d.license_number == number && Some(d.id) != exclude_id))
    }

    async fn insert_driver(&self, driver: NewDriver) -> AppResult<Driver> {
        let mut state = self.state.write().await;
        state.check_writable(&[FleetTable::Drivers])?;

        if state.drivers.values().any(|d| d.license_number == driver.license_number) {
            return Err(duplicate_error("license_number", DUPLICATE_LICENSE_MESSAGE));
        }

        let created = Driver {
            id: Uuid::new_v4(),
            full_name: driver.full_name,
            email: driver.email,
            phone: driver.phone,
            license_number: driver.license_number,
            license_expiry: driver.license_expiry,
            license_category: driver.license_category,
            status: driver.status,
            safety_score: driver.safety_score,
            complaints: driver.complaints,
            total_trips: 0,
            notes: driver.notes,
            created_at: Utc::now(),
        };
        state.drivers.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_driver(&self, id: Uuid, patch: DriverPatch) -> AppResult<Driver> {
        let mut state = self.state.write().await;
        state.check_writable(&[FleetTable::Drivers])?;

        let current = state
            .drivers
            .get(&id)
            .ok_or_else(|| not_found_error("Driver", &id.to_string()))?;
        let next = patch.apply_to(current);

        if state
            .drivers
            .values()
            .any(|d| d.id != id && d.license_number == next.license_number)
        {
            return Err(duplicate_error("license_number", DUPLICATE_LICENSE_MESSAGE));
        }

        state.drivers.insert(id, next.clone());
        Ok(next)
    }
}

#[async_trait]
impl TripRepository for MemoryRepository {
    async fn list_trips(&self) -> AppResult<Vec<Trip>> {
        let state = self.state.read().await;
        Ok(sorted_by(state.trips.values().cloned(), |t| {
            std::cmp::Reverse(t.created_at)
        }))
    }

    async fn find_trip(&self, id: Uuid) -> AppResult<Option<Trip>> {
        Ok(self.state.read().await.trips.get(&id).cloned())
    }

    async fn trips_created_since(&self, since: DateTime<Utc>) -> AppResult<Vec<Trip>> {
        let state = self.state.read().await;
        Ok(sorted_by(
            state.trips.values().filter(|t| t.created_at >= since).cloned(),
            |t| std::cmp::Reverse(t.created_at),
        ))
    }

    async fn insert_trip(&self, trip: NewTrip) -> AppResult<Trip> {
        let mut state = self.state.write().await;
        state.check_writable(&[FleetTable::Trips])?;

        if !state.vehicles.contains_key(&trip.vehicle_id) || !state.drivers.contains_key(&trip.driver_id) {
            return Err(MemoryState::foreign_key("Trip references a missing vehicle or driver"));
        }

        let created = Trip {
            id: Uuid::new_v4(),
            vehicle_id: trip.vehicle_id,
            driver_id: trip.driver_id,
            origin: trip.origin,
            destination: trip.destination,
            cargo_weight_kg: trip.cargo_weight_kg,
            cargo_description: trip.cargo_description,
            estimated_fuel_cost: trip.estimated_fuel_cost,
            revenue: trip.revenue,
            status: TripStatus::Pending,
            start_odometer: None,
            end_odometer: None,
            distance_km: None,
            dispatched_at: None,
            completed_at: None,
            created_at: Utc::now(),
        };
        state.trips.insert(created.id, created.clone());
        Ok(created)
    }

    async fn apply_transition(&self, transition: &TripTransition) -> AppResult<Trip> {
        let mut state = self.state.write().await;

        let mut tables = vec![FleetTable::Trips];
        if transition.vehicle.is_some() {
            tables.push(FleetTable::Vehicles);
        }
        if transition.driver.is_some() {
            tables.push(FleetTable::Drivers);
        }
        state.check_writable(&tables)?;

        let current = state
            .trips
            .get(&transition.trip_id)
            .ok_or_else(|| not_found_error("Trip", &transition.trip_id.to_string()))?;
        if current.status != transition.from {
            return Err(AppError::Conflict(format!(
                "Trip {} is no longer {}",
                transition.trip_id, transition.from
            )));
        }
        if let Some(write) = transition.vehicle {
            let vehicle = state
                .vehicles
                .get(&write.id)
                .ok_or_else(|| not_found_error("Vehicle", &write.id.to_string()))?;
            if let Some(expected) = transition.vehicle_must_be {
                if vehicle.status != expected {
                    return Err(AppError::Conflict(format!(
                        "Vehicle {} is {} and cannot be dispatched",
                        vehicle.name, vehicle.status
                    )));
                }
            }
        }
        if let Some(write) = transition.driver {
            let driver = state
                .drivers
                .get(&write.id)
                .ok_or_else(|| not_found_error("Driver", &write.id.to_string()))?;
            if transition.driver_must_not_be == Some(driver.status) {
                return Err(AppError::Conflict(format!(
                    "Driver {} is {} and cannot be dispatched",
                    driver.full_name, driver.status
                )));
            }
        }

        // Validado todo: aplicar la unidad completa
        let now = Utc::now();
        let mut trip = current.clone();
        trip.status = transition.to;
        trip.start_odometer = transition.start_odometer.or(trip.start_odometer);
        trip.end_odometer = transition.end_odometer.or(trip.end_odometer);
        // Columna generada del backend
        trip.distance_km = match (trip.start_odometer, trip.end_odometer) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        };
        match transition.to {
            TripStatus::OnWay => trip.dispatched_at = Some(now),
            TripStatus::Completed => trip.completed_at = Some(now),
            _ => {}
        }
        state.trips.insert(trip.id, trip.clone());

        if let Some(write) = transition.vehicle {
            if let Some(vehicle) = state.vehicles.get_mut(&write.id) {
                vehicle.status = write.status;
                if let Some(odometer) = transition.vehicle_odometer {
                    vehicle.odometer_km = odometer;
                }
            }
        }
        if let Some(write) = transition.driver {
            if let Some(driver) = state.drivers.get_mut(&write.id) {
                driver.status = write.status;
            }
        }

        Ok(trip)
    }
}

#[async_trait]
impl MaintenanceRepository for MemoryRepository {
    async fn list_maintenance(&self) -> AppResult<Vec<MaintenanceLog>> {
        let state = self.state.read().await;
        Ok(sorted_by(state.maintenance.values().cloned(), |m| {
            std::cmp::Reverse((m.service_date, m.created_at))
        }))
    }

    async fn find_maintenance(&self, id: Uuid) -> AppResult<Option<MaintenanceLog>> {
        Ok(self.state.read().await.maintenance.get(&id).cloned())
    }

    async fn insert_maintenance(
        &self,
        log: NewMaintenanceLog,
        vehicle_status: Option<VehicleStatus>,
    ) -> AppResult<MaintenanceLog> {
        let mut state = self.state.write().await;
        if vehicle_status.is_some() {
            state.check_writable(&[FleetTable::MaintenanceLogs, FleetTable::Vehicles])?;
        } else {
            state.check_writable(&[FleetTable::MaintenanceLogs])?;
        }

        if !state.vehicles.contains_key(&log.vehicle_id) {
            return Err(MemoryState::foreign_key("Maintenance log references a missing vehicle"));
        }

        let created = MaintenanceLog {
            id: Uuid::new_v4(),
            vehicle_id: log.vehicle_id,
            service_type: log.service_type,
            description: log.description,
            cost: log.cost,
            service_date: log.service_date,
            mechanic: log.mechanic,
            is_completed: log.is_completed,
            created_at: Utc::now(),
        };
        state.maintenance.insert(created.id, created.clone());

        if let (Some(status), Some(vehicle)) = (vehicle_status, state.vehicles.get_mut(&log.vehicle_id)) {
            vehicle.status = status;
        }

        Ok(created)
    }

    async fn update_maintenance(&self, id: Uuid, patch: MaintenancePatch) -> AppResult<MaintenanceLog> {
        let mut state = self.state.write().await;
        state.check_writable(&[FleetTable::MaintenanceLogs])?;

        let current = state
            .maintenance
            .get(&id)
            .ok_or_else(|| not_found_error("Maintenance log", &id.to_string()))?;
        let next = patch.apply_to(current);
        state.maintenance.insert(id, next.clone());
        Ok(next)
    }

    async fn complete_maintenance(&self, id: Uuid) -> AppResult<MaintenanceClosure> {
        let mut state = self.state.write().await;
        state.check_writable(&[FleetTable::MaintenanceLogs, FleetTable::Vehicles])?;

        let current = state
            .maintenance
            .get(&id)
            .ok_or_else(|| not_found_error("Maintenance log", &id.to_string()))?;
        if current.is_completed {
            return Err(AppError::Conflict(format!("Maintenance log {} is not open", id)));
        }

        let mut log = current.clone();
        log.is_completed = true;
        state.maintenance.insert(id, log.clone());

        let open_logs = state.open_logs(log.vehicle_id);
        let mut released_vehicle = None;
        if let Some(vehicle) = state.vehicles.get_mut(&log.vehicle_id) {
            if let Some(status) = status_after_maintenance_closed(vehicle.status, open_logs) {
                vehicle.status = status;
                released_vehicle = Some(vehicle.clone());
            }
        }

        Ok(MaintenanceClosure {
            log,
            released_vehicle,
        })
    }
}

#[async_trait]
impl FuelLogRepository for MemoryRepository {
    async fn list_fuel_logs(&self) -> AppResult<Vec<FuelLog>> {
        let state = self.state.read().await;
        Ok(sorted_by(state.fuel_logs.values().cloned(), |f| {
            std::cmp::Reverse((f.fuel_date, f.created_at))
        }))
    }

    async fn insert_fuel_log(&self, log: NewFuelLog) -> AppResult<FuelLog> {
        let mut state = self.state.write().await;
        state.check_writable(&[FleetTable::FuelLogs])?;

        if !state.trips.contains_key(&log.trip_id) || !state.vehicles.contains_key(&log.vehicle_id) {
            return Err(MemoryState::foreign_key("Fuel log references a missing trip or vehicle"));
        }

        let created = FuelLog {
            id: Uuid::new_v4(),
            trip_id: log.trip_id,
            vehicle_id: log.vehicle_id,
            liters: log.liters,
            total_cost: log.total_cost,
            misc_expense: log.misc_expense,
            fuel_date: log.fuel_date,
            created_at: Utc::now(),
        };
        state.fuel_logs.insert(created.id, created.clone());
        Ok(created)
    }

    async fn fuel_logs_with_trips(&self) -> AppResult<Vec<FuelLogWithTrip>> {
        let state = self.state.read().await;
        let logs = sorted_by(state.fuel_logs.values(), |f| (f.fuel_date, f.created_at));

        Ok(logs
            .into_iter()
            .map(|log| FuelLogWithTrip {
                id: log.id,
                fuel_date: log.fuel_date,
                liters: log.liters,
                total_cost: log.total_cost,
                distance_km: state.trips.get(&log.trip_id).and_then(|t| t.distance_km),
                vehicle_name: state.vehicles.get(&log.vehicle_id).map(|v| v.name.clone()),
            })
            .collect())
    }
}

impl MemoryState {
    fn cost_summary(&self) -> Vec<VehicleCostSummary> {
        let mut rows: Vec<VehicleCostSummary> = self
            .vehicles
            .values()
            .map(|vehicle| {
                let revenue: Decimal = self
                    .trips
                    .values()
                    .filter(|t| t.vehicle_id == vehicle.id && t.status == TripStatus::Completed)
                    .filter_map(|t| t.revenue)
                    .sum();
                let fuel: Decimal = self
                    .fuel_logs
                    .values()
                    .filter(|f| f.vehicle_id == vehicle.id)
                    .map(|f| f.total_cost)
                    .sum();
                let maintenance: Decimal = self
                    .maintenance
                    .values()
                    .filter(|m| m.vehicle_id == vehicle.id)
                    .map(|m| m.cost)
                    .sum();

                let cost = fuel + maintenance;
                let roi_percentage = (cost > Decimal::ZERO)
                    .then(|| round2(to_f64(revenue - cost) / to_f64(cost) * 100.0));

                VehicleCostSummary {
                    vehicle_id: vehicle.id,
                    name: vehicle.name.clone(),
                    license_plate: vehicle.license_plate.clone(),
                    total_revenue: Some(revenue),
                    total_fuel_cost: Some(fuel),
                    total_maintenance_cost: Some(maintenance),
                    roi_percentage,
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            b.roi_percentage
                .unwrap_or(f64::MIN)
                .total_cmp(&a.roi_percentage.unwrap_or(f64::MIN))
        });
        rows
    }

    fn fuel_efficiency(&self) -> Vec<VehicleFuelEfficiency> {
        let mut rows: Vec<VehicleFuelEfficiency> = self
            .vehicles
            .values()
            .map(|vehicle| {
                let distance: f64 = self
                    .trips
                    .values()
                    .filter(|t| t.vehicle_id == vehicle.id)
                    .filter_map(|t| t.distance_km)
                    .sum();
                let liters: f64 = self
                    .fuel_logs
                    .values()
                    .filter(|f| f.vehicle_id == vehicle.id)
                    .map(|f| f.liters)
                    .sum();

                VehicleFuelEfficiency {
                    vehicle_id: vehicle.id,
                    name: vehicle.name.clone(),
                    total_distance_km: Some(distance),
                    total_liters: Some(liters),
                    km_per_liter: (distance > 0.0 && liters > 0.0).then(|| round2(distance / liters)),
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            b.km_per_liter
                .unwrap_or(f64::MIN)
                .total_cmp(&a.km_per_liter.unwrap_or(f64::MIN))
        });
        rows
    }

    fn monthly_summary(&self, limit: i64) -> Vec<MonthlyFinancialSummary> {
        fn month_of(date: NaiveDate) -> NaiveDate {
            date.with_day(1).unwrap_or(date)
        }

        let mut months: BTreeMap<NaiveDate, (Decimal, Decimal, Decimal)> = BTreeMap::new();
        for trip in self.trips.values().filter(|t| t.status == TripStatus::Completed) {
            let day = trip.completed_at.unwrap_or(trip.created_at).date_naive();
            months.entry(month_of(day)).or_default().0 += trip.revenue.unwrap_or_default();
        }
        for log in self.fuel_logs.values() {
            months.entry(month_of(log.fuel_date)).or_default().1 += log.total_cost;
        }
        for log in self.maintenance.values() {
            months.entry(month_of(log.service_date)).or_default().2 += log.cost;
        }

        months
            .into_iter()
            .rev()
            .take(limit.max(0) as usize)
            .map(|(month, (revenue, fuel, maintenance))| MonthlyFinancialSummary {
                month,
                month_label: month.format("%b %Y").to_string(),
                total_revenue: Some(revenue),
                total_fuel_cost: Some(fuel),
                total_maintenance_cost: Some(maintenance),
                net_profit: Some(revenue - fuel - maintenance),
            })
            .collect()
    }

    fn kpi(&self) -> FleetKpiSummary {
        let count = |status: VehicleStatus| {
            self.vehicles.values().filter(|v| v.status == status).count() as i64
        };
        let active_fleet = count(VehicleStatus::OnTrip);
        let total_vehicles = self.vehicles.len() as i64 - count(VehicleStatus::Retired);

        FleetKpiSummary {
            active_fleet,
            available_vehicles: count(VehicleStatus::Available),
            in_shop_vehicles: count(VehicleStatus::InShop),
            total_vehicles,
            pending_trips: self
                .trips
                .values()
                .filter(|t| t.status == TripStatus::Pending)
                .count() as i64,
            utilization_rate: if total_vehicles > 0 {
                round2(active_fleet as f64 / total_vehicles as f64 * 100.0)
            } else {
                0.0
            },
        }
    }

    fn driver_performance(&self) -> Vec<DriverPerformanceSummary> {
        let mut rows: Vec<DriverPerformanceSummary> = self
            .drivers
            .values()
            .map(|driver| {
                let trips: Vec<&Trip> = self
                    .trips
                    .values()
                    .filter(|t| t.driver_id == driver.id)
                    .collect();
                let completed = trips
                    .iter()
                    .filter(|t| t.status == TripStatus::Completed)
                    .count() as i64;

                DriverPerformanceSummary {
                    driver_id: driver.id,
                    full_name: driver.full_name.clone(),
                    safety_score: driver.safety_score,
                    complaints: driver.complaints,
                    completed_trips: completed,
                    completion_rate: (!trips.is_empty())
                        .then(|| round2(completed as f64 / trips.len() as f64 * 100.0)),
                }
            })
            .collect();

        rows.sort_by(|a, b| b.safety_score.cmp(&a.safety_score));
        rows
    }
}

#[async_trait]
impl AnalyticsRepository for MemoryRepository {
    async fn vehicle_cost_summary(&self) -> AppResult<Vec<VehicleCostSummary>> {
        Ok(self.state.read().await.cost_summary())
    }

    async fn vehicle_fuel_efficiency(&self) -> AppResult<Vec<VehicleFuelEfficiency>> {
        Ok(self.state.read().await.fuel_efficiency())
    }

    async fn monthly_financial_summary(&self, limit: i64) -> AppResult<Vec<MonthlyFinancialSummary>> {
        Ok(self.state.read().await.monthly_summary(limit))
    }

    async fn fleet_kpi_summary(&self) -> AppResult<FleetKpiSummary> {
        Ok(self.state.read().await.kpi())
    }

    async fn driver_performance_summary(&self) -> AppResult<Vec<DriverPerformanceSummary>> {
        Ok(self.state.read().await.driver_performance())
    }
}

fn to_json_rows<T: Serialize>(rows: impl IntoIterator<Item = T>) -> AppResult<Vec<serde_json::Value>> {
    rows.into_iter()
        .map(|row| serde_json::to_value(row).map_err(|e| AppError::Internal(e.to_string())))
        .collect()
}

/// Igualdad sobre la representación textual, como `column::text = $n`
fn column_matches(row: &serde_json::Value, filter: &ColumnFilter) -> bool {
    match row.get(filter.column) {
        Some(serde_json::Value::String(value)) => *value == filter.value,
        Some(serde_json::Value::Null) | None => false,
        Some(other) => other.to_string() == filter.value,
    }
}

#[async_trait]
impl TableQueryRepository for MemoryRepository {
    async fn query_table(
        &self,
        table: FleetTable,
        filters: &[ColumnFilter],
        limit: i64,
    ) -> AppResult<Vec<serde_json::Value>> {
        let rows = match table {
            FleetTable::Vehicles => to_json_rows(self.list_vehicles().await?)?,
            FleetTable::Drivers => to_json_rows(self.list_drivers().await?)?,
            FleetTable::Trips => to_json_rows(self.list_trips().await?)?,
            FleetTable::MaintenanceLogs => to_json_rows(self.list_maintenance().await?)?,
            FleetTable::FuelLogs => to_json_rows(self.list_fuel_logs().await?)?,
            FleetTable::VehicleCostSummary => to_json_rows(self.vehicle_cost_summary().await?)?,
            FleetTable::DriverPerformanceSummary => {
                to_json_rows(self.driver_performance_summary().await?)?
            }
            FleetTable::FleetKpiSummary => to_json_rows([self.fleet_kpi_summary().await?])?,
            FleetTable::MonthlyFinancialSummary => {
                to_json_rows(self.monthly_financial_summary(i64::MAX).await?)?
            }
            FleetTable::VehicleFuelEfficiency => to_json_rows(self.vehicle_fuel_efficiency().await?)?,
        };

        Ok(rows
            .into_iter()
            .filter(|row| filters.iter().all(|filter| column_matches(row, filter)))
            .take(limit.max(0) as usize)
            .collect())
    }
}

impl FleetRepository for MemoryRepository {
    fn store_name(&self) -> &'static str {
        "memory"
    }
}
