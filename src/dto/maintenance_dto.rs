use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{MaintenancePatch, NewMaintenanceLog};
use crate::utils::validation::validate_non_negative_amount;

// Request para registrar un mantenimiento
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMaintenanceRequest {
    pub vehicle_id: Uuid,

    #[validate(length(min = 1, message = "Service type is required"))]
    pub service_type: String,

    pub description: Option<String>,

    #[validate(custom = "validate_non_negative_amount")]
    pub cost: Decimal,

    pub service_date: NaiveDate,

    pub mechanic: Option<String>,

    #[serde(default)]
    pub is_completed: bool,
}

impl CreateMaintenanceRequest {
    pub fn into_new_log(self) -> NewMaintenanceLog {
        NewMaintenanceLog {
            vehicle_id: self.vehicle_id,
            service_type: self.service_type.trim().to_string(),
            description: self.description.filter(|value| !value.trim().is_empty()),
            cost: self.cost,
            service_date: self.service_date,
            mechanic: self.mechanic.filter(|value| !value.trim().is_empty()),
            is_completed: self.is_completed,
        }
    }
}

// Request para actualizar un mantenimiento (`is_completed = true` lo cierra)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateMaintenanceRequest {
    #[validate(length(min = 1, message = "Service type is required"))]
    pub service_type: Option<String>,

    pub description: Option<String>,

    #[validate(custom = "validate_non_negative_amount")]
    pub cost: Option<Decimal>,

    pub service_date: Option<NaiveDate>,

    pub mechanic: Option<String>,

    pub is_completed: Option<bool>,
}

impl UpdateMaintenanceRequest {
    pub fn to_patch(&self) -> MaintenancePatch {
        MaintenancePatch {
            service_type: self.service_type.clone(),
            description: self.description.clone(),
            cost: self.cost,
            service_date: self.service_date,
            mechanic: self.mechanic.clone(),
        }
    }

    pub fn has_field_changes(&self) -> bool {
        self.service_type.is_some()
            || self.description.is_some()
            || self.cost.is_some()
            || self.service_date.is_some()
            || self.mechanic.is_some()
    }
}
