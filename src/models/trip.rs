//! Modelo de Trip
//!
//! Un viaje referencia un vehículo y un conductor. `distance_km` es una
//! columna generada por el backend (end_odometer - start_odometer).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::driver::DriverStatus;
use super::vehicle::VehicleStatus;
use super::ParseEnumError;

/// Estado del viaje
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TripStatus {
    Pending,
    #[serde(rename = "On Way")]
    OnWay,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Pending => "Pending",
            TripStatus::OnWay => "On Way",
            TripStatus::Completed => "Completed",
            TripStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TripStatus::Completed | TripStatus::Cancelled)
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Pending" => Ok(TripStatus::Pending),
            "On Way" => Ok(TripStatus::OnWay),
            "Completed" => Ok(TripStatus::Completed),
            "Cancelled" => Ok(TripStatus::Cancelled),
            other => Err(ParseEnumError::new("trip status", other)),
        }
    }
}

impl TryFrom<String> for TripStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Trip principal - mapea a la tabla trips
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Trip {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub cargo_weight_kg: f64,
    pub cargo_description: Option<String>,
    pub estimated_fuel_cost: Option<Decimal>,
    pub revenue: Option<Decimal>,
    #[sqlx(try_from = "String")]
    pub status: TripStatus,
    pub start_odometer: Option<f64>,
    pub end_odometer: Option<f64>,
    pub distance_km: Option<f64>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Trip {
    /// Coincidencia de búsqueda libre sobre id, origen, destino y estado
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.id.to_string().contains(&term)
            || self.origin.to_lowercase().contains(&term)
            || self.destination.to_lowercase().contains(&term)
            || self.status.as_str().to_lowercase().contains(&term)
    }
}

/// Datos validados para insertar un viaje (siempre en Pending)
#[derive(Debug, Clone)]
pub struct NewTrip {
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub cargo_weight_kg: f64,
    pub cargo_description: Option<String>,
    pub estimated_fuel_cost: Option<Decimal>,
    pub revenue: Option<Decimal>,
}

/// Transición completa de un viaje: la fila del viaje y las filas
/// acompañantes de vehículo y conductor se escriben como una unidad.
#[derive(Debug, Clone, PartialEq)]
pub struct TripTransition {
    pub trip_id: Uuid,
    pub from: TripStatus,
    pub to: TripStatus,
    pub start_odometer: Option<f64>,
    pub end_odometer: Option<f64>,
    pub vehicle: Option<CompanionWrite<VehicleStatus>>,
    pub driver: Option<CompanionWrite<DriverStatus>>,
    /// Nuevo odómetro del vehículo al completar
    pub vehicle_odometer: Option<f64>,
    /// Estado que el vehículo debe conservar al aplicar la unidad
    pub vehicle_must_be: Option<VehicleStatus>,
    /// Estado del conductor que invalida la unidad
    pub driver_must_not_be: Option<DriverStatus>,
}

/// Escritura de estado sobre una fila enlazada
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompanionWrite<S> {
    pub id: Uuid,
    pub status: S,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!TripStatus::Pending.is_terminal());
        assert!(!TripStatus::OnWay.is_terminal());
        assert!(TripStatus::Completed.is_terminal());
        assert!(TripStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_matches_search() {
        let trip = Trip {
            id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            driver_id: Uuid::new_v4(),
            origin: "Bangalore".to_string(),
            destination: "Mumbai".to_string(),
            cargo_weight_kg: 1000.0,
            cargo_description: None,
            estimated_fuel_cost: None,
            revenue: None,
            status: TripStatus::OnWay,
            start_odometer: Some(100.0),
            end_odometer: None,
            distance_km: None,
            dispatched_at: None,
            completed_at: None,
            created_at: Utc::now(),
        };

        assert!(trip.matches_search("mumbai"));
        assert!(trip.matches_search("on way"));
        assert!(trip.matches_search(""));
        assert!(!trip.matches_search("chennai"));
    }
}
