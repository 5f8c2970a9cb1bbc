use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::nullable;
use crate::models::{NewVehicle, VehiclePatch, VehicleStatus, VehicleType};
use crate::utils::validation::{
    normalize_license_plate, validate_license_plate, validate_non_negative_amount,
    validate_positive_quantity,
};

fn default_vehicle_status() -> VehicleStatus {
    VehicleStatus::Available
}

// Request para crear un vehículo
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, message = "Vehicle name is required"))]
    pub name: String,

    #[validate(custom = "validate_license_plate")]
    pub license_plate: String,

    #[validate(length(min = 1, message = "Model is required"))]
    pub model: String,

    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,

    #[validate(custom = "validate_positive_quantity")]
    pub max_capacity_kg: f64,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Odometer cannot be negative"))]
    pub odometer_km: f64,

    #[serde(default = "default_vehicle_status")]
    pub status: VehicleStatus,

    pub region: Option<String>,

    #[validate(custom = "validate_non_negative_amount")]
    pub acquisition_cost: Option<Decimal>,
}

impl CreateVehicleRequest {
    pub fn into_new_vehicle(self) -> NewVehicle {
        NewVehicle {
            name: self.name.trim().to_string(),
            license_plate: normalize_license_plate(&self.license_plate),
            model: self.model.trim().to_string(),
            vehicle_type: self.vehicle_type,
            max_capacity_kg: self.max_capacity_kg,
            odometer_km: self.odometer_km,
            status: self.status,
            region: self.region.filter(|region| !region.trim().is_empty()),
            acquisition_cost: self.acquisition_cost,
        }
    }
}

// Request para actualizar un vehículo
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, message = "Vehicle name is required"))]
    pub name: Option<String>,

    #[validate(custom = "validate_license_plate")]
    pub license_plate: Option<String>,

    #[validate(length(min = 1, message = "Model is required"))]
    pub model: Option<String>,

    #[serde(rename = "type")]
    pub vehicle_type: Option<VehicleType>,

    #[validate(custom = "validate_positive_quantity")]
    pub max_capacity_kg: Option<f64>,

    #[validate(range(min = 0.0, message = "Odometer cannot be negative"))]
    pub odometer_km: Option<f64>,

    pub status: Option<VehicleStatus>,

    /// Ausente: sin cambios; `null`: borrar
    #[serde(default, deserialize_with = "nullable")]
    pub region: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    #[validate(custom = "validate_non_negative_amount")]
    pub acquisition_cost: Option<Option<Decimal>>,
}

impl UpdateVehicleRequest {
    pub fn into_patch(self) -> VehiclePatch {
        VehiclePatch {
            name: self.name.map(|name| name.trim().to_string()),
            license_plate: self.license_plate.as_deref().map(normalize_license_plate),
            model: self.model.map(|model| model.trim().to_string()),
            vehicle_type: self.vehicle_type,
            max_capacity_kg: self.max_capacity_kg,
            odometer_km: self.odometer_km,
            status: self.status,
            region: self.region.map(|region| {
                region
                    .map(|region| region.trim().to_string())
                    .filter(|region| !region.is_empty())
            }),
            acquisition_cost: self.acquisition_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> CreateVehicleRequest {
        serde_json::from_value(json!({
            "name": "Truck-1",
            "license_plate": " ka-01-ab-1234 ",
            "model": "Tata Prima",
            "type": "Truck",
            "max_capacity_kg": 12000
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults_and_plate_normalization() {
        let request = request();
        assert!(request.validate().is_ok());
        assert_eq!(request.status, VehicleStatus::Available);

        let new_vehicle = request.into_new_vehicle();
        assert_eq!(new_vehicle.license_plate, "KA-01-AB-1234");
        assert_eq!(new_vehicle.odometer_km, 0.0);
    }

    #[test]
    fn test_capacity_must_be_positive() {
        let mut request = request();
        request.max_capacity_kg = 0.0;
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("max_capacity_kg"));
    }

    #[test]
    fn test_negative_costs_rejected() {
        let mut request = request();
        request.odometer_km = -1.0;
        request.acquisition_cost = Some(Decimal::new(-100, 0));
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("odometer_km"));
        assert!(fields.contains_key("acquisition_cost"));
    }

    #[test]
    fn test_update_distinguishes_absent_from_null() {
        let untouched: UpdateVehicleRequest = serde_json::from_value(json!({ "name": "Truck-9" })).unwrap();
        let patch = untouched.into_patch();
        assert_eq!(patch.region, None);
        assert_eq!(patch.acquisition_cost, None);

        let cleared: UpdateVehicleRequest =
            serde_json::from_value(json!({ "region": null, "acquisition_cost": null })).unwrap();
        let patch = cleared.into_patch();
        assert_eq!(patch.region, Some(None));
        assert_eq!(patch.acquisition_cost, Some(None));

        let blank: UpdateVehicleRequest = serde_json::from_value(json!({ "region": "  " })).unwrap();
        assert_eq!(blank.into_patch().region, Some(None));
    }

    #[test]
    fn test_update_rejects_negative_acquisition_cost() {
        let request: UpdateVehicleRequest =
            serde_json::from_value(json!({ "acquisition_cost": "-5" })).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("acquisition_cost"));
    }
}
