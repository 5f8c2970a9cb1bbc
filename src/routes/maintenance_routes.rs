use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::MaintenanceController;
use crate::dto::maintenance_dto::{CreateMaintenanceRequest, UpdateMaintenanceRequest};
use crate::dto::ApiResponse;
use crate::models::MaintenanceLog;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_maintenance_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_maintenance).post(create_maintenance))
        .route("/:id", get(get_maintenance).put(update_maintenance))
        .route("/:id/complete", post(complete_maintenance))
}

async fn list_maintenance(
    State(state): State<AppState>,
) -> Result<Json<Vec<MaintenanceLog>>, AppError> {
    let logs = MaintenanceController::new(&state).list().await?;
    Ok(Json(logs))
}

async fn create_maintenance(
    State(state): State<AppState>,
    Json(request): Json<CreateMaintenanceRequest>,
) -> Result<Json<ApiResponse<MaintenanceLog>>, AppError> {
    let response = MaintenanceController::new(&state).create(request).await?;
    Ok(Json(response))
}

async fn get_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MaintenanceLog>, AppError> {
    let log = MaintenanceController::new(&state).get_by_id(id).await?;
    Ok(Json(log))
}

async fn update_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMaintenanceRequest>,
) -> Result<Json<ApiResponse<MaintenanceLog>>, AppError> {
    let response = MaintenanceController::new(&state).update(id, request).await?;
    Ok(Json(response))
}

async fn complete_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MaintenanceLog>>, AppError> {
    let response = MaintenanceController::new(&state).complete(id).await?;
    Ok(Json(response))
}
