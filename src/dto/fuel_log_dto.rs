use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::validate_non_negative_amount;

// Request para registrar combustible y gastos de un viaje
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFuelLogRequest {
    pub trip_id: Uuid,

    #[validate(range(min = 0.0, message = "Liters cannot be negative"))]
    pub liters: f64,

    #[validate(custom = "validate_non_negative_amount")]
    pub total_cost: Decimal,

    #[serde(default)]
    #[validate(custom = "validate_non_negative_amount")]
    pub misc_expense: Decimal,

    pub fuel_date: NaiveDate,
}
