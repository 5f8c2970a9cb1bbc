//! Rutas HTTP
//!
//! Cada área expone su router; `create_api_router` los monta bajo `/api`.

pub mod analytics_routes;
pub mod assistant_routes;
pub mod driver_routes;
pub mod fuel_log_routes;
pub mod maintenance_routes;
pub mod trip_routes;
pub mod vehicle_routes;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/api/drivers", driver_routes::create_driver_router())
        .nest("/api/trips", trip_routes::create_trip_router())
        .nest("/api/maintenance", maintenance_routes::create_maintenance_router())
        .nest("/api/fuel-logs", fuel_log_routes::create_fuel_log_router())
        .nest("/api/analytics", analytics_routes::create_analytics_router())
        .nest("/api/ai", assistant_routes::create_assistant_router())
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "timestamp": chrono::Utc::now(),
        "store": state.repository.store_name(),
        "cache": state.cache.backend_name(),
        "cache_connected": state.cache.is_connected().await,
        "assistant": state.assistant.is_some(),
    }))
}
