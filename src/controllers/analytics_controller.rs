//! Controlador de analytics
//!
//! Lee las vistas del backend (con cache) y aplica las funciones puras de
//! `analysis`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::analysis::dead_stock::dead_stock_cutoff;
use crate::analysis::{
    build_analytics_report, build_fuel_chart, build_monthly_export, build_overview, classify_roi,
    find_dead_stock, DeadStockVehicle, FleetOverview, FuelChart, ReportInput, VehicleRoi,
};
use crate::cache::{QueryCache, QueryKey};
use crate::models::{
    DriverPerformanceSummary, FleetKpiSummary, FuelLogWithTrip, MonthlyFinancialSummary,
    VehicleCostSummary, VehicleFuelEfficiency,
};
use crate::repositories::FleetRepository;
use crate::state::AppState;
use crate::utils::errors::AppResult;

/// Meses de la tabla y de la exportación mensual
pub const MONTHLY_SUMMARY_MONTHS: i64 = 6;

#[derive(Debug, Clone, Serialize)]
pub struct FuelEfficiencyReport {
    #[serde(flatten)]
    pub chart: FuelChart,
    /// Totales por vehículo de la vista `vehicle_fuel_efficiency`
    pub vehicles: Vec<VehicleFuelEfficiency>,
}

pub struct AnalyticsController {
    repository: Arc<dyn FleetRepository>,
    cache: QueryCache,
}

impl AnalyticsController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repository.clone(),
            cache: state.cache.clone(),
        }
    }

    async fn cost_summary(&self) -> AppResult<Vec<VehicleCostSummary>> {
        self.cache
            .get_or_load(QueryKey::VehicleCostSummary, || {
                self.repository.vehicle_cost_summary()
            })
            .await
    }

    async fn fuel_log_details(&self) -> AppResult<Vec<FuelLogWithTrip>> {
        self.cache
            .get_or_load(QueryKey::FuelLogDetails, || self.repository.fuel_logs_with_trips())
            .await
    }

    pub async fn kpi(&self) -> AppResult<FleetKpiSummary> {
        self.cache
            .get_or_load(QueryKey::FleetKpi, || self.repository.fleet_kpi_summary())
            .await
    }

    pub async fn monthly(&self) -> AppResult<Vec<MonthlyFinancialSummary>> {
        self.cache
            .get_or_load(QueryKey::MonthlyFinancialSummary, || {
                self.repository.monthly_financial_summary(MONTHLY_SUMMARY_MONTHS)
            })
            .await
    }

    pub async fn driver_performance(&self) -> AppResult<Vec<DriverPerformanceSummary>> {
        self.cache
            .get_or_load(QueryKey::DriverPerformance, || {
                self.repository.driver_performance_summary()
            })
            .await
    }

    pub async fn fuel_efficiency(&self) -> AppResult<FuelEfficiencyReport> {
        let logs = self.fuel_log_details().await?;
        let vehicles = self
            .cache
            .get_or_load(QueryKey::VehicleFuelEfficiency, || {
                self.repository.vehicle_fuel_efficiency()
            })
            .await?;

        Ok(FuelEfficiencyReport {
            chart: build_fuel_chart(&logs),
            vehicles,
        })
    }

    pub async fn roi(&self) -> AppResult<Vec<VehicleRoi>> {
        Ok(classify_roi(self.cost_summary().await?))
    }

    pub async fn dead_stock_at(&self, now: DateTime<Utc>) -> AppResult<Vec<DeadStockVehicle>> {
        let vehicles = self
            .cache
            .get_or_load(QueryKey::Vehicles, || self.repository.list_vehicles())
            .await?;
        let recent_trips = self
            .repository
            .trips_created_since(dead_stock_cutoff(now))
            .await?;

        Ok(find_dead_stock(&vehicles, &recent_trips, now))
    }

    pub async fn dead_stock(&self) -> AppResult<Vec<DeadStockVehicle>> {
        self.dead_stock_at(Utc::now()).await
    }

    pub async fn overview(&self) -> AppResult<FleetOverview> {
        let cost_summary = self.cost_summary().await?;
        let kpi = self.kpi().await?;
        let dead_stock = self.dead_stock().await?;

        Ok(build_overview(&cost_summary, &kpi, dead_stock.len()))
    }

    /// CSV de la tabla mensual
    pub async fn monthly_export(&self) -> AppResult<String> {
        let monthly = self.monthly().await?;
        info!("📤 Exportación mensual: {} meses", monthly.len());
        Ok(build_monthly_export(&monthly))
    }

    /// Informe CSV completo por secciones
    pub async fn full_report(&self) -> AppResult<String> {
        let now = Utc::now();
        let monthly = self.monthly().await?;
        let fuel_logs = self.fuel_log_details().await?;
        let cost_summary = self.cost_summary().await?;
        let dead_stock = self.dead_stock_at(now).await?;

        let report = build_analytics_report(&ReportInput {
            monthly: &monthly,
            fuel_logs: &fuel_logs,
            cost_summary: &cost_summary,
            dead_stock: &dead_stock,
            generated_at: now,
        });

        info!(
            "📤 Informe de analytics generado: {} meses, {} registros de combustible, {} vehículos",
            monthly.len(),
            fuel_logs.len(),
            cost_summary.len()
        );

        Ok(report)
    }
}
