use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::DriverController;
use crate::dto::driver_dto::{
    CreateDriverRequest, DriverResponse, DriverRosterStats, UpdateDriverRequest,
};
use crate::dto::ApiResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_drivers).post(create_driver))
        .route("/eligible", get(list_eligible_drivers))
        .route("/stats", get(get_roster_stats))
        .route("/:id", get(get_driver).put(update_driver))
}

async fn create_driver(
    State(state): State<AppState>,
    Json(request): Json<CreateDriverRequest>,
) -> Result<Json<ApiResponse<DriverResponse>>, AppError> {
    let response = DriverController::new(&state).create(request).await?;
    Ok(Json(response))
}

async fn list_drivers(State(state): State<AppState>) -> Result<Json<Vec<DriverResponse>>, AppError> {
    let drivers = DriverController::new(&state).list().await?;
    Ok(Json(drivers))
}

async fn get_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DriverResponse>, AppError> {
    let driver = DriverController::new(&state).get_by_id(id).await?;
    Ok(Json(driver))
}

async fn update_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDriverRequest>,
) -> Result<Json<ApiResponse<DriverResponse>>, AppError> {
    let response = DriverController::new(&state).update(id, request).await?;
    Ok(Json(response))
}

async fn list_eligible_drivers(
    State(state): State<AppState>,
) -> Result<Json<Vec<DriverResponse>>, AppError> {
    let drivers = DriverController::new(&state).eligible_for_trip().await?;
    Ok(Json(drivers))
}

async fn get_roster_stats(State(state): State<AppState>) -> Result<Json<DriverRosterStats>, AppError> {
    let stats = DriverController::new(&state).stats().await?;
    Ok(Json(stats))
}
