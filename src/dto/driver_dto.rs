use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Driver, DriverPatch, DriverStatus, LicenseStatus, NewDriver, VehicleType};
use crate::utils::validation::{validate_email, validate_phone};

fn default_driver_status() -> DriverStatus {
    DriverStatus::OffDuty
}

fn default_safety_score() -> i32 {
    100
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

// Request para registrar un conductor
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub full_name: String,

    #[validate(custom = "validate_email")]
    pub email: Option<String>,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    #[validate(length(min = 3, message = "License number required"))]
    pub license_number: String,

    pub license_expiry: NaiveDate,

    pub license_category: VehicleType,

    #[serde(default = "default_driver_status")]
    pub status: DriverStatus,

    #[serde(default = "default_safety_score")]
    #[validate(range(min = 0, max = 100, message = "Safety score must be between 0 and 100"))]
    pub safety_score: i32,

    #[serde(default)]
    #[validate(range(min = 0, message = "Complaints cannot be negative"))]
    pub complaints: i32,

    pub notes: Option<String>,
}

impl CreateDriverRequest {
    pub fn into_new_driver(self) -> NewDriver {
        NewDriver {
            full_name: self.full_name.trim().to_string(),
            email: blank_to_none(self.email),
            phone: blank_to_none(self.phone),
            license_number: self.license_number.trim().to_string(),
            license_expiry: self.license_expiry,
            license_category: self.license_category,
            status: self.status,
            safety_score: self.safety_score,
            complaints: self.complaints,
            notes: blank_to_none(self.notes),
        }
    }
}

// Request para actualizar un conductor
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateDriverRequest {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub full_name: Option<String>,

    #[validate(custom = "validate_email")]
    pub email: Option<String>,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    #[validate(length(min = 3, message = "License number required"))]
    pub license_number: Option<String>,

    pub license_expiry: Option<NaiveDate>,

    pub license_category: Option<VehicleType>,

    pub status: Option<DriverStatus>,

    #[validate(range(min = 0, max = 100, message = "Safety score must be between 0 and 100"))]
    pub safety_score: Option<i32>,

    #[validate(range(min = 0, message = "Complaints cannot be negative"))]
    pub complaints: Option<i32>,

    pub notes: Option<String>,
}

impl UpdateDriverRequest {
    pub fn into_patch(self) -> DriverPatch {
        DriverPatch {
            full_name: self.full_name.map(|name| name.trim().to_string()),
            email: blank_to_none(self.email),
            phone: blank_to_none(self.phone),
            license_number: self.license_number.map(|number| number.trim().to_string()),
            license_expiry: self.license_expiry,
            license_category: self.license_category,
            status: self.status,
            safety_score: self.safety_score,
            complaints: self.complaints,
            notes: blank_to_none(self.notes),
        }
    }
}

// Response de conductor con el estado de licencia derivado
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverResponse {
    #[serde(flatten)]
    pub driver: Driver,
    pub license_status: LicenseStatus,
}

impl DriverResponse {
    pub fn new(driver: Driver, today: NaiveDate) -> Self {
        let license_status = driver.license_status(today);
        Self {
            driver,
            license_status,
        }
    }
}

// Contadores del roster de conductores
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DriverRosterStats {
    pub total: usize,
    pub on_duty: usize,
    pub off_duty: usize,
    pub suspended: usize,
    pub license_issues: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let request: CreateDriverRequest = serde_json::from_value(json!({
            "full_name": "Ravi Kumar",
            "license_number": "DL-09-2027",
            "license_expiry": "2027-05-01",
            "license_category": "Truck"
        }))
        .unwrap();

        assert!(request.validate().is_ok());
        assert_eq!(request.status, DriverStatus::OffDuty);
        assert_eq!(request.safety_score, 100);
        assert_eq!(request.complaints, 0);
    }

    #[test]
    fn test_field_rules() {
        let request: CreateDriverRequest = serde_json::from_value(json!({
            "full_name": "R",
            "email": "not-an-email",
            "phone": "12",
            "license_number": "DL",
            "license_expiry": "2027-05-01",
            "license_category": "Van",
            "safety_score": 120
        }))
        .unwrap();

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["full_name", "email", "phone", "license_number", "safety_score"] {
            assert!(fields.contains_key(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_blank_optional_fields_are_dropped() {
        let request: CreateDriverRequest = serde_json::from_value(json!({
            "full_name": "Ravi Kumar",
            "phone": "",
            "email": "",
            "license_number": "DL-09-2027",
            "license_expiry": "2027-05-01",
            "license_category": "Bike"
        }))
        .unwrap();

        assert!(request.validate().is_ok());
        let new_driver = request.into_new_driver();
        assert_eq!(new_driver.phone, None);
        assert_eq!(new_driver.email, None);
    }
}
