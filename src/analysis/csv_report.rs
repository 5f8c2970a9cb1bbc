//! Exportación CSV
//!
//! Los campos de texto van entre comillas dobles con las comillas internas
//! duplicadas; los números van sin comillas salvo en la exportación mensual,
//! donde todo va entre comillas.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::dead_stock::DeadStockVehicle;
use crate::models::{FuelLogWithTrip, MonthlyFinancialSummary, VehicleCostSummary};

pub const REPORT_FILENAME: &str = "fleet_analytics_report.csv";
pub const MONTHLY_EXPORT_FILENAME: &str = "monthly_financial_summary.csv";

/// Campo de texto entre comillas
pub fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn amount(value: Option<Decimal>) -> String {
    value.unwrap_or_default().normalize().to_string()
}

/// Número sin ceros sobrantes ("25", "12.5")
fn number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

pub struct ReportInput<'a> {
    pub monthly: &'a [MonthlyFinancialSummary],
    pub fuel_logs: &'a [FuelLogWithTrip],
    pub cost_summary: &'a [VehicleCostSummary],
    pub dead_stock: &'a [DeadStockVehicle],
    pub generated_at: DateTime<Utc>,
}

/// Informe completo por secciones
pub fn build_analytics_report(input: &ReportInput<'_>) -> String {
    let mut lines: Vec<String> = vec![
        "FLEETFLOW ANALYTICS REPORT".to_string(),
        format!(
            "Generated: {}",
            input.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        String::new(),
        "MONTHLY FINANCIAL SUMMARY".to_string(),
        "Month,Revenue (Rs),Fuel Cost (Rs),Maintenance (Rs),Net Profit (Rs)".to_string(),
    ];

    lines.extend(input.monthly.iter().map(|row| {
        format!(
            "{},{},{},{},{}",
            quote(&row.month_label),
            amount(row.total_revenue),
            amount(row.total_fuel_cost),
            amount(row.total_maintenance_cost),
            amount(row.net_profit)
        )
    }));

    lines.push(String::new());
    lines.push("FUEL EFFICIENCY PER TRIP".to_string());
    lines.push("Date,Vehicle,Liters,Distance (km),Km per Liter,Cost per Km (Rs)".to_string());
    lines.extend(input.fuel_logs.iter().filter_map(|log| {
        let km = log.distance_km.filter(|km| *km > 0.0)?;
        if log.liters <= 0.0 {
            return None;
        }
        let cost = rust_decimal::prelude::ToPrimitive::to_f64(&log.total_cost).unwrap_or(0.0);
        Some(format!(
            "{},{},{},{},{:.2},{:.2}",
            quote(&log.fuel_date.to_string()),
            quote(log.vehicle_name.as_deref().unwrap_or("")),
            number(log.liters),
            number(km),
            km / log.liters,
            cost / km
        ))
    }));

    lines.push(String::new());
    lines.push("VEHICLE ROI INDEX".to_string());
    lines.push("Vehicle,Revenue (Rs),Fuel Cost (Rs),Maintenance Cost (Rs),ROI %".to_string());
    lines.extend(input.cost_summary.iter().map(|row| {
        format!(
            "{},{},{},{},{:.1}",
            quote(&row.name),
            amount(row.total_revenue),
            amount(row.total_fuel_cost),
            amount(row.total_maintenance_cost),
            row.roi_percentage.unwrap_or(0.0)
        )
    }));

    lines.push(String::new());
    lines.push("DEAD STOCK (Idle 30+ Days)".to_string());
    lines.push("Vehicle,Status".to_string());
    lines.extend(
        input
            .dead_stock
            .iter()
            .map(|vehicle| format!("{},{}", quote(&vehicle.name), quote(vehicle.status.as_str()))),
    );

    lines.join("\n")
}

/// Exportación del resumen mensual; cada celda entre comillas
pub fn build_monthly_export(rows: &[MonthlyFinancialSummary]) -> String {
    let header = ["Month", "Revenue", "Fuel Cost", "Maintenance", "Net Profit"]
        .map(quote)
        .join(",");

    std::iter::once(header)
        .chain(rows.iter().map(|row| {
            [
                row.month_label.clone(),
                amount(row.total_revenue),
                amount(row.total_fuel_cost),
                amount(row.total_maintenance_cost),
                amount(row.net_profit),
            ]
            .iter()
            .map(|value| quote(value))
            .collect::<Vec<_>>()
            .join(",")
        }))
        .collect::<Vec<_>>()
        .join("\n")
}
