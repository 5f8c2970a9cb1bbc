//! Fleet dashboard backend
//!
//! Servicio HTTP del dashboard de flota: registro de vehículos y
//! conductores, despacho de viajes, mantenimiento, combustible, analytics
//! derivados y asistente conversacional sobre el backend Postgres.

// Esquemas `json!` anidados de las herramientas del asistente
#![recursion_limit = "256"]

pub mod analysis;
pub mod cache;
pub mod clients;
pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::cors_layer;
use crate::state::AppState;

/// Router completo con CORS y trazas HTTP
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    routes::create_api_router()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
