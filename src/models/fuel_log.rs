//! Modelo de FuelLog
//!
//! Registros de combustible y gastos varios por viaje.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct FuelLog {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub vehicle_id: Uuid,
    pub liters: f64,
    pub total_cost: Decimal,
    pub misc_expense: Decimal,
    pub fuel_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFuelLog {
    pub trip_id: Uuid,
    pub vehicle_id: Uuid,
    pub liters: f64,
    pub total_cost: Decimal,
    pub misc_expense: Decimal,
    pub fuel_date: NaiveDate,
}

/// Registro de combustible unido a la distancia del viaje y al nombre del
/// vehículo; es la entrada de los cálculos de eficiencia.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct FuelLogWithTrip {
    pub id: Uuid,
    pub fuel_date: NaiveDate,
    pub liters: f64,
    pub total_cost: Decimal,
    pub distance_km: Option<f64>,
    pub vehicle_name: Option<String>,
}
