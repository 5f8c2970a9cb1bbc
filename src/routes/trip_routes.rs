use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::TripController;
use crate::dto::trip_dto::{
    CompleteTripRequest, CreateTripRequest, DispatchTripRequest, TripListQuery,
};
use crate::dto::ApiResponse;
use crate::models::Trip;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_trip_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trips).post(create_trip))
        .route("/:id", get(get_trip))
        .route("/:id/dispatch", post(dispatch_trip))
        .route("/:id/complete", post(complete_trip))
        .route("/:id/cancel", post(cancel_trip))
}

async fn list_trips(
    State(state): State<AppState>,
    Query(query): Query<TripListQuery>,
) -> Result<Json<Vec<Trip>>, AppError> {
    let trips = TripController::new(&state)
        .list(query.search.as_deref())
        .await?;
    Ok(Json(trips))
}

async fn create_trip(
    State(state): State<AppState>,
    Json(request): Json<CreateTripRequest>,
) -> Result<Json<ApiResponse<Trip>>, AppError> {
    let response = TripController::new(&state).create(request).await?;
    Ok(Json(response))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Trip>, AppError> {
    let trip = TripController::new(&state).get_by_id(id).await?;
    Ok(Json(trip))
}

async fn dispatch_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DispatchTripRequest>,
) -> Result<Json<ApiResponse<Trip>>, AppError> {
    let response = TripController::new(&state)
        .dispatch(id, request.start_odometer)
        .await?;
    Ok(Json(response))
}

async fn complete_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CompleteTripRequest>,
) -> Result<Json<ApiResponse<Trip>>, AppError> {
    let response = TripController::new(&state)
        .complete(id, request.end_odometer)
        .await?;
    Ok(Json(response))
}

async fn cancel_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Trip>>, AppError> {
    let response = TripController::new(&state).cancel(id).await?;
    Ok(Json(response))
}
