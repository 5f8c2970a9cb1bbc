use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::analysis::csv_report::{MONTHLY_EXPORT_FILENAME, REPORT_FILENAME};
use crate::analysis::{DeadStockVehicle, FleetOverview, VehicleRoi};
use crate::controllers::analytics_controller::FuelEfficiencyReport;
use crate::controllers::AnalyticsController;
use crate::models::{DriverPerformanceSummary, FleetKpiSummary, MonthlyFinancialSummary};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_analytics_router() -> Router<AppState> {
    Router::new()
        .route("/overview", get(get_overview))
        .route("/fuel-efficiency", get(get_fuel_efficiency))
        .route("/roi", get(get_roi))
        .route("/dead-stock", get(get_dead_stock))
        .route("/monthly", get(get_monthly))
        .route("/kpi", get(get_kpi))
        .route("/drivers", get(get_driver_performance))
        .route("/export", get(export_monthly_csv))
        .route("/report", get(export_full_report))
}

/// Respuesta `text/csv` descargable
fn csv_attachment(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

async fn get_overview(State(state): State<AppState>) -> Result<Json<FleetOverview>, AppError> {
    let overview = AnalyticsController::new(&state).overview().await?;
    Ok(Json(overview))
}

async fn get_fuel_efficiency(
    State(state): State<AppState>,
) -> Result<Json<FuelEfficiencyReport>, AppError> {
    let report = AnalyticsController::new(&state).fuel_efficiency().await?;
    Ok(Json(report))
}

async fn get_roi(State(state): State<AppState>) -> Result<Json<Vec<VehicleRoi>>, AppError> {
    let rows = AnalyticsController::new(&state).roi().await?;
    Ok(Json(rows))
}

async fn get_dead_stock(
    State(state): State<AppState>,
) -> Result<Json<Vec<DeadStockVehicle>>, AppError> {
    let vehicles = AnalyticsController::new(&state).dead_stock().await?;
    Ok(Json(vehicles))
}

async fn get_monthly(
    State(state): State<AppState>,
) -> Result<Json<Vec<MonthlyFinancialSummary>>, AppError> {
    let rows = AnalyticsController::new(&state).monthly().await?;
    Ok(Json(rows))
}

async fn get_kpi(State(state): State<AppState>) -> Result<Json<FleetKpiSummary>, AppError> {
    let kpi = AnalyticsController::new(&state).kpi().await?;
    Ok(Json(kpi))
}

async fn get_driver_performance(
    State(state): State<AppState>,
) -> Result<Json<Vec<DriverPerformanceSummary>>, AppError> {
    let rows = AnalyticsController::new(&state).driver_performance().await?;
    Ok(Json(rows))
}

async fn export_monthly_csv(State(state): State<AppState>) -> Result<Response, AppError> {
    let csv = AnalyticsController::new(&state).monthly_export().await?;
    Ok(csv_attachment(MONTHLY_EXPORT_FILENAME, csv))
}

async fn export_full_report(State(state): State<AppState>) -> Result<Response, AppError> {
    let csv = AnalyticsController::new(&state).full_report().await?;
    Ok(csv_attachment(REPORT_FILENAME, csv))
}
