//! Modelos de Analytics
//!
//! Filas de las vistas precalculadas del backend (solo lectura).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Vista `vehicle_cost_summary`: costes, ingresos y ROI por vehículo
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct VehicleCostSummary {
    pub vehicle_id: Uuid,
    pub name: String,
    pub license_plate: String,
    pub total_revenue: Option<Decimal>,
    pub total_fuel_cost: Option<Decimal>,
    pub total_maintenance_cost: Option<Decimal>,
    pub roi_percentage: Option<f64>,
}

/// Vista `vehicle_fuel_efficiency`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct VehicleFuelEfficiency {
    pub vehicle_id: Uuid,
    pub name: String,
    pub total_distance_km: Option<f64>,
    pub total_liters: Option<f64>,
    pub km_per_liter: Option<f64>,
}

/// Vista `monthly_financial_summary`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct MonthlyFinancialSummary {
    pub month: NaiveDate,
    pub month_label: String,
    pub total_revenue: Option<Decimal>,
    pub total_fuel_cost: Option<Decimal>,
    pub total_maintenance_cost: Option<Decimal>,
    pub net_profit: Option<Decimal>,
}

/// Vista `fleet_kpi_summary` (una sola fila)
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, PartialEq)]
pub struct FleetKpiSummary {
    pub active_fleet: i64,
    pub available_vehicles: i64,
    pub in_shop_vehicles: i64,
    pub total_vehicles: i64,
    pub pending_trips: i64,
    pub utilization_rate: f64,
}

/// Vista `driver_performance_summary`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct DriverPerformanceSummary {
    pub driver_id: Uuid,
    pub full_name: String,
    pub safety_score: i32,
    pub complaints: i32,
    pub completed_trips: i64,
    pub completion_rate: Option<f64>,
}
