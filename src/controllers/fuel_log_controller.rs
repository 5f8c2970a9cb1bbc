use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::cache::{Mutation, QueryCache, QueryKey};
use crate::dto::fuel_log_dto::CreateFuelLogRequest;
use crate::dto::ApiResponse;
use crate::models::{FuelLog, NewFuelLog};
use crate::repositories::FleetRepository;
use crate::state::AppState;
use crate::utils::errors::{validation_error, AppResult};

pub struct FuelLogController {
    repository: Arc<dyn FleetRepository>,
    cache: QueryCache,
}

impl FuelLogController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repository.clone(),
            cache: state.cache.clone(),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<FuelLog>> {
        self.cache
            .get_or_load(QueryKey::FuelLogs, || self.repository.list_fuel_logs())
            .await
    }

    /// El vehículo se toma siempre del viaje
    pub async fn create(&self, request: CreateFuelLogRequest) -> AppResult<ApiResponse<FuelLog>> {
        request.validate()?;

        let trip = self
            .repository
            .find_trip(request.trip_id)
            .await?
            .ok_or_else(|| validation_error("trip_id", "Selected trip does not exist"))?;

        let log = self
            .repository
            .insert_fuel_log(NewFuelLog {
                trip_id: trip.id,
                vehicle_id: trip.vehicle_id,
                liters: request.liters,
                total_cost: request.total_cost,
                misc_expense: request.misc_expense,
                fuel_date: request.fuel_date,
            })
            .await?;
        self.cache.invalidate(Mutation::CreateFuelLog).await;

        info!("⛽ Combustible registrado: {} L para el viaje {}", log.liters, trip.id);

        Ok(ApiResponse::success_with_message(
            log,
            "Fuel log saved successfully".to_string(),
        ))
    }
}
