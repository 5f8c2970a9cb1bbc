use axum::{extract::State, routing::get, Json, Router};

use crate::controllers::FuelLogController;
use crate::dto::fuel_log_dto::CreateFuelLogRequest;
use crate::dto::ApiResponse;
use crate::models::FuelLog;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_fuel_log_router() -> Router<AppState> {
    Router::new().route("/", get(list_fuel_logs).post(create_fuel_log))
}

async fn list_fuel_logs(State(state): State<AppState>) -> Result<Json<Vec<FuelLog>>, AppError> {
    let logs = FuelLogController::new(&state).list().await?;
    Ok(Json(logs))
}

async fn create_fuel_log(
    State(state): State<AppState>,
    Json(request): Json<CreateFuelLogRequest>,
) -> Result<Json<ApiResponse<FuelLog>>, AppError> {
    let response = FuelLogController::new(&state).create(request).await?;
    Ok(Json(response))
}
