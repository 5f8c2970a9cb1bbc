//! Modelo de Driver
//!
//! Conductores, su estado de servicio y el estado de licencia derivado.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::vehicle::VehicleType;
use super::ParseEnumError;

/// Días antes del vencimiento en los que la licencia pasa a "Expiring Soon"
pub const LICENSE_EXPIRING_SOON_DAYS: i64 = 60;

/// Estado de servicio del conductor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DriverStatus {
    #[serde(rename = "On Duty")]
    OnDuty,
    #[serde(rename = "Off Duty")]
    OffDuty,
    Suspended,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::OnDuty => "On Duty",
            DriverStatus::OffDuty => "Off Duty",
            DriverStatus::Suspended => "Suspended",
        }
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriverStatus {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "On Duty" => Ok(DriverStatus::OnDuty),
            "Off Duty" => Ok(DriverStatus::OffDuty),
            "Suspended" => Ok(DriverStatus::Suspended),
            other => Err(ParseEnumError::new("driver status", other)),
        }
    }
}

impl TryFrom<String> for DriverStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Estado de licencia - calculado al leer, nunca se persiste
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LicenseStatus {
    Valid,
    #[serde(rename = "Expiring Soon")]
    ExpiringSoon,
    Expired,
}

impl LicenseStatus {
    /// Clasificar una fecha de vencimiento respecto a `today`
    pub fn from_expiry(expiry: NaiveDate, today: NaiveDate) -> Self {
        let days_left = (expiry - today).num_days();
        if days_left < 0 {
            LicenseStatus::Expired
        } else if days_left <= LICENSE_EXPIRING_SOON_DAYS {
            LicenseStatus::ExpiringSoon
        } else {
            LicenseStatus::Valid
        }
    }
}

/// Driver principal - mapea a la tabla drivers
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Driver {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub license_number: String,
    pub license_expiry: NaiveDate,
    #[sqlx(try_from = "String")]
    pub license_category: VehicleType,
    #[sqlx(try_from = "String")]
    pub status: DriverStatus,
    pub safety_score: i32,
    pub complaints: i32,
    pub total_trips: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Driver {
    pub fn license_status(&self, today: NaiveDate) -> LicenseStatus {
        LicenseStatus::from_expiry(self.license_expiry, today)
    }
}

/// Datos validados para insertar un conductor
#[derive(Debug, Clone)]
pub struct NewDriver {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub license_number: String,
    pub license_expiry: NaiveDate,
    pub license_category: VehicleType,
    pub status: DriverStatus,
    pub safety_score: i32,
    pub complaints: i32,
    pub notes: Option<String>,
}

/// Cambios parciales sobre un conductor
#[derive(Debug, Clone, Default)]
pub struct DriverPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub license_number: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    pub license_category: Option<VehicleType>,
    pub status: Option<DriverStatus>,
    pub safety_score: Option<i32>,
    pub complaints: Option<i32>,
    pub notes: Option<String>,
}

impl DriverPatch {
    pub fn apply_to(&self, driver: &Driver) -> Driver {
        Driver {
            id: driver.id,
            full_name: self.full_name.clone().unwrap_or_else(|| driver.full_name.clone()),
            email: self.email.clone().or_else(|| driver.email.clone()),
            phone: self.phone.clone().or_else(|| driver.phone.clone()),
            license_number: self
                .license_number
                .clone()
                .unwrap_or_else(|| driver.license_number.clone()),
            license_expiry: self.license_expiry.unwrap_or(driver.license_expiry),
            license_category: self.license_category.unwrap_or(driver.license_category),
            status: self.status.unwrap_or(driver.status),
            safety_score: self.safety_score.unwrap_or(driver.safety_score),
            complaints: self.complaints.unwrap_or(driver.complaints),
            total_trips: driver.total_trips,
            notes: self.notes.clone().or_else(|| driver.notes.clone()),
            created_at: driver.created_at,
        }
    }

    pub fn status_only(status: DriverStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_license_status_boundaries() {
        let today = date(2026, 3, 1);
        assert_eq!(LicenseStatus::from_expiry(date(2026, 2, 28), today), LicenseStatus::Expired);
        assert_eq!(LicenseStatus::from_expiry(today, today), LicenseStatus::ExpiringSoon);
        assert_eq!(
            LicenseStatus::from_expiry(today + chrono::Duration::days(60), today),
            LicenseStatus::ExpiringSoon
        );
        assert_eq!(
            LicenseStatus::from_expiry(today + chrono::Duration::days(61), today),
            LicenseStatus::Valid
        );
    }

    #[test]
    fn test_driver_status_labels() {
        assert_eq!("Off Duty".parse::<DriverStatus>().unwrap(), DriverStatus::OffDuty);
        assert_eq!(serde_json::to_string(&DriverStatus::OnDuty).unwrap(), "\"On Duty\"");
        assert!("Available".parse::<DriverStatus>().is_err());
    }
}
