use async_trait::async_trait;

use super::PgRepository;
use crate::models::{
    DriverPerformanceSummary, FleetKpiSummary, MonthlyFinancialSummary, VehicleCostSummary,
    VehicleFuelEfficiency,
};
use crate::repositories::AnalyticsRepository;
use crate::utils::errors::AppResult;

#[async_trait]
impl AnalyticsRepository for PgRepository {
    async fn vehicle_cost_summary(&self) -> AppResult<Vec<VehicleCostSummary>> {
        let rows = sqlx::query_as::<_, VehicleCostSummary>(
            r#"
            SELECT vehicle_id, name, license_plate, total_revenue, total_fuel_cost,
                   total_maintenance_cost, roi_percentage::float8 AS roi_percentage
            FROM vehicle_cost_summary
            ORDER BY roi_percentage DESC NULLS LAST
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    async fn vehicle_fuel_efficiency(&self) -> AppResult<Vec<VehicleFuelEfficiency>> {
        let rows = sqlx::query_as::<_, VehicleFuelEfficiency>(
            r#"
            SELECT vehicle_id, name, total_distance_km::float8 AS total_distance_km,
                   total_liters::float8 AS total_liters, km_per_liter::float8 AS km_per_liter
            FROM vehicle_fuel_efficiency
            ORDER BY km_per_liter DESC NULLS LAST
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    async fn monthly_financial_summary(&self, limit: i64) -> AppResult<Vec<MonthlyFinancialSummary>> {
        let rows = sqlx::query_as::<_, MonthlyFinancialSummary>(
            r#"
            SELECT month::date AS month, month_label, total_revenue, total_fuel_cost,
                   total_maintenance_cost, net_profit
            FROM monthly_financial_summary
            ORDER BY month DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    async fn fleet_kpi_summary(&self) -> AppResult<FleetKpiSummary> {
        let row = sqlx::query_as::<_, FleetKpiSummary>(
            r#"
            SELECT active_fleet::int8 AS active_fleet, available_vehicles::int8 AS available_vehicles,
                   in_shop_vehicles::int8 AS in_shop_vehicles, total_vehicles::int8 AS total_vehicles,
                   pending_trips::int8 AS pending_trips,
                   COALESCE(utilization_rate, 0)::float8 AS utilization_rate
            FROM fleet_kpi_summary
            LIMIT 1
            "#,
        )
        .fetch_optional(self.pool())
        .await?;

        Ok(row.unwrap_or_default())
    }

    async fn driver_performance_summary(&self) -> AppResult<Vec<DriverPerformanceSummary>> {
        let rows = sqlx::query_as::<_, DriverPerformanceSummary>(
            r#"
            SELECT driver_id, full_name, safety_score, complaints,
                   completed_trips::int8 AS completed_trips,
                   completion_rate::float8 AS completion_rate
            FROM driver_performance_summary
            ORDER BY safety_score DESC
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }
}
