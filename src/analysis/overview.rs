//! Resumen de la flota para la cabecera de analytics

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{FleetKpiSummary, VehicleCostSummary};
use crate::utils::validation::round2;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FleetOverview {
    pub total_revenue: Decimal,
    pub total_fuel_cost: Decimal,
    pub total_maintenance_cost: Decimal,
    pub net_profit: Decimal,
    /// Media del ROI por vehículo
    pub fleet_roi: f64,
    pub utilization_rate: f64,
    pub dead_stock_count: usize,
}

pub fn build_overview(
    cost_summary: &[VehicleCostSummary],
    kpi: &FleetKpiSummary,
    dead_stock_count: usize,
) -> FleetOverview {
    let total_revenue: Decimal = cost_summary.iter().filter_map(|r| r.total_revenue).sum();
    let total_fuel_cost: Decimal = cost_summary.iter().filter_map(|r| r.total_fuel_cost).sum();
    let total_maintenance_cost: Decimal = cost_summary
        .iter()
        .filter_map(|r| r.total_maintenance_cost)
        .sum();

    let fleet_roi = if cost_summary.is_empty() {
        0.0
    } else {
        let sum: f64 = cost_summary
            .iter()
            .map(|r| r.roi_percentage.unwrap_or(0.0))
            .sum();
        round2(sum / cost_summary.len() as f64)
    };

    FleetOverview {
        total_revenue,
        total_fuel_cost,
        total_maintenance_cost,
        net_profit: total_revenue - total_fuel_cost - total_maintenance_cost,
        fleet_roi,
        utilization_rate: kpi.utilization_rate,
        dead_stock_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn row(revenue: i64, fuel: i64, maintenance: i64, roi: Option<f64>) -> VehicleCostSummary {
        VehicleCostSummary {
            vehicle_id: Uuid::new_v4(),
            name: "V".to_string(),
            license_plate: "P".to_string(),
            total_revenue: Some(Decimal::from(revenue)),
            total_fuel_cost: Some(Decimal::from(fuel)),
            total_maintenance_cost: Some(Decimal::from(maintenance)),
            roi_percentage: roi,
        }
    }

    #[test]
    fn test_totals_and_mean_roi() {
        let kpi = FleetKpiSummary {
            utilization_rate: 40.0,
            ..Default::default()
        };
        let overview = build_overview(
            &[row(10000, 2000, 1000, Some(240.0)), row(5000, 1000, 500, None)],
            &kpi,
            2,
        );

        assert_eq!(overview.total_revenue, Decimal::from(15000));
        assert_eq!(overview.net_profit, Decimal::from(10500));
        assert_eq!(overview.fleet_roi, 120.0);
        assert_eq!(overview.utilization_rate, 40.0);
        assert_eq!(overview.dead_stock_count, 2);
    }

    #[test]
    fn test_empty_fleet() {
        let overview = build_overview(&[], &FleetKpiSummary::default(), 0);
        assert_eq!(overview.fleet_roi, 0.0);
        assert_eq!(overview.net_profit, Decimal::ZERO);
    }
}
