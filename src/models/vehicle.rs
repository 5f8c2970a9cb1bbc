//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y sus enums de estado y tipo.
//! Mapea a la tabla `vehicles` del backend.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ParseEnumError;

/// Estado del vehículo - columna `status` (texto)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VehicleStatus {
    Available,
    #[serde(rename = "On Trip")]
    OnTrip,
    #[serde(rename = "In Shop")]
    InShop,
    Retired,
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 4] = [
        VehicleStatus::Available,
        VehicleStatus::OnTrip,
        VehicleStatus::InShop,
        VehicleStatus::Retired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "Available",
            VehicleStatus::OnTrip => "On Trip",
            VehicleStatus::InShop => "In Shop",
            VehicleStatus::Retired => "Retired",
        }
    }
}

/// Tipo de vehículo - también categoría de licencia del conductor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VehicleType {
    Truck,
    Van,
    Bike,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Truck => "Truck",
            VehicleType::Van => "Van",
            VehicleType::Bike => "Bike",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleStatus {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        VehicleStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| ParseEnumError::new("vehicle status", value))
    }
}

impl FromStr for VehicleType {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Truck" => Ok(VehicleType::Truck),
            "Van" => Ok(VehicleType::Van),
            "Bike" => Ok(VehicleType::Bike),
            other => Err(ParseEnumError::new("vehicle type", other)),
        }
    }
}

impl TryFrom<String> for VehicleStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for VehicleType {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Vehicle principal - mapea a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Vehicle {
    pub id: Uuid,
    pub name: String,
    pub license_plate: String,
    pub model: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type", try_from = "String")]
    pub vehicle_type: VehicleType,
    pub max_capacity_kg: f64,
    pub odometer_km: f64,
    #[sqlx(try_from = "String")]
    pub status: VehicleStatus,
    pub region: Option<String>,
    pub acquisition_cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

/// Datos validados para insertar un vehículo
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub name: String,
    pub license_plate: String,
    pub model: String,
    pub vehicle_type: VehicleType,
    pub max_capacity_kg: f64,
    pub odometer_km: f64,
    pub status: VehicleStatus,
    pub region: Option<String>,
    pub acquisition_cost: Option<Decimal>,
}

/// Cambios parciales sobre un vehículo existente
#[derive(Debug, Clone, Default)]
pub struct VehiclePatch {
    pub name: Option<String>,
    pub license_plate: Option<String>,
    pub model: Option<String>,
    pub vehicle_type: Option<VehicleType>,
    pub max_capacity_kg: Option<f64>,
    pub odometer_km: Option<f64>,
    pub status: Option<VehicleStatus>,
    /// `Some(None)` borra el valor
    pub region: Option<Option<String>>,
    pub acquisition_cost: Option<Option<Decimal>>,
}

impl VehiclePatch {
    /// Aplicar el patch sobre una copia del vehículo
    pub fn apply_to(&self, vehicle: &Vehicle) -> Vehicle {
        Vehicle {
            id: vehicle.id,
            name: self.name.clone().unwrap_or_else(|| vehicle.name.clone()),
            license_plate: self
                .license_plate
                .clone()
                .unwrap_or_else(|| vehicle.license_plate.clone()),
            model: self.model.clone().unwrap_or_else(|| vehicle.model.clone()),
            vehicle_type: self.vehicle_type.unwrap_or(vehicle.vehicle_type),
            max_capacity_kg: self.max_capacity_kg.unwrap_or(vehicle.max_capacity_kg),
            odometer_km: self.odometer_km.unwrap_or(vehicle.odometer_km),
            status: self.status.unwrap_or(vehicle.status),
            region: self.region.clone().unwrap_or_else(|| vehicle.region.clone()),
            acquisition_cost: self.acquisition_cost.unwrap_or(vehicle.acquisition_cost),
            created_at: vehicle.created_at,
        }
    }

    pub fn status_only(status: VehicleStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_status_round_trips_backend_labels() {
        for status in VehicleStatus::ALL {
            assert_eq!(status.as_str().parse::<VehicleStatus>().unwrap(), status);
        }
        assert!("on trip".parse::<VehicleStatus>().is_err());
    }

    #[test]
    fn test_vehicle_status_serde_uses_labels() {
        let json = serde_json::to_string(&VehicleStatus::OnTrip).unwrap();
        assert_eq!(json, "\"On Trip\"");
        let parsed: VehicleStatus = serde_json::from_str("\"In Shop\"").unwrap();
        assert_eq!(parsed, VehicleStatus::InShop);
    }

    #[test]
    fn test_patch_keeps_unchanged_fields() {
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            name: "Truck-1".to_string(),
            license_plate: "KA-01-AB-1234".to_string(),
            model: "Tata Prima".to_string(),
            vehicle_type: VehicleType::Truck,
            max_capacity_kg: 12000.0,
            odometer_km: 1500.0,
            status: VehicleStatus::Available,
            region: Some("South".to_string()),
            acquisition_cost: None,
            created_at: Utc::now(),
        };

        let patched = VehiclePatch::status_only(VehicleStatus::OnTrip).apply_to(&vehicle);
        assert_eq!(patched.status, VehicleStatus::OnTrip);
        assert_eq!(patched.license_plate, vehicle.license_plate);
        assert_eq!(patched.region, vehicle.region);

        let cleared = VehiclePatch {
            region: Some(None),
            ..Default::default()
        }
        .apply_to(&vehicle);
        assert_eq!(cleared.region, None);
        assert_eq!(cleared.status, VehicleStatus::Available);
    }
}
