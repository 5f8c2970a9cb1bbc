//! Modelo de MaintenanceLog
//!
//! Un registro abierto (no completado) implica que el vehículo está "In Shop".

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct MaintenanceLog {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub service_type: String,
    pub description: Option<String>,
    pub cost: Decimal,
    pub service_date: NaiveDate,
    pub mechanic: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMaintenanceLog {
    pub vehicle_id: Uuid,
    pub service_type: String,
    pub description: Option<String>,
    pub cost: Decimal,
    pub service_date: NaiveDate,
    pub mechanic: Option<String>,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MaintenancePatch {
    pub service_type: Option<String>,
    pub description: Option<String>,
    pub cost: Option<Decimal>,
    pub service_date: Option<NaiveDate>,
    pub mechanic: Option<String>,
}

impl MaintenancePatch {
    pub fn apply_to(&self, log: &MaintenanceLog) -> MaintenanceLog {
        MaintenanceLog {
            service_type: self.service_type.clone().unwrap_or_else(|| log.service_type.clone()),
            description: self.description.clone().or_else(|| log.description.clone()),
            cost: self.cost.unwrap_or(log.cost),
            service_date: self.service_date.unwrap_or(log.service_date),
            mechanic: self.mechanic.clone().or_else(|| log.mechanic.clone()),
            ..log.clone()
        }
    }
}
