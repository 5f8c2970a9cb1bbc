//! Implementación Postgres de los repositorios

mod analytics;
mod drivers;
mod fuel_logs;
mod maintenance;
mod table_query;
mod trips;
mod vehicles;

use sqlx::PgPool;

use super::FleetRepository;
use crate::utils::errors::{
    db_error_code, duplicate_error, AppError, FOREIGN_KEY_VIOLATION, UNIQUE_VIOLATION,
};

pub(crate) const VEHICLE_COLUMNS: &str = "id, name, license_plate, model, type, \
     max_capacity_kg::float8 AS max_capacity_kg, odometer_km::float8 AS odometer_km, \
     status, region, acquisition_cost, created_at";

pub(crate) const DRIVER_COLUMNS: &str = "id, full_name, email, phone, license_number, \
     license_expiry, license_category, status, safety_score, complaints, total_trips, notes, \
     created_at";

pub(crate) const TRIP_COLUMNS: &str = "id, vehicle_id, driver_id, origin, destination, \
     cargo_weight_kg::float8 AS cargo_weight_kg, cargo_description, estimated_fuel_cost, revenue, \
     status, start_odometer::float8 AS start_odometer, end_odometer::float8 AS end_odometer, \
     distance_km::float8 AS distance_km, dispatched_at, completed_at, created_at";

pub(crate) const MAINTENANCE_COLUMNS: &str = "id, vehicle_id, service_type, description, cost, \
     service_date, mechanic, is_completed, created_at";

pub(crate) const FUEL_LOG_COLUMNS: &str = "id, trip_id, vehicle_id, liters::float8 AS liters, \
     total_cost, misc_expense, fuel_date, created_at";

/// Repositorio sobre el backend Postgres
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl FleetRepository for PgRepository {
    fn store_name(&self) -> &'static str {
        "postgres"
    }
}

/// Traducir violaciones de restricciones a errores de la aplicación
pub(crate) fn map_write_error(
    error: sqlx::Error,
    duplicate: Option<(&'static str, &'static str)>,
) -> AppError {
    match db_error_code(&error).as_deref() {
        Some(UNIQUE_VIOLATION) => match duplicate {
            Some((field, message)) => duplicate_error(field, message),
            None => AppError::Database(error),
        },
        Some(FOREIGN_KEY_VIOLATION) => {
            AppError::ForeignKeyConflict("Record is referenced by other records".to_string())
        }
        _ => AppError::Database(error),
    }
}
