use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::cache::{Mutation, QueryCache, QueryKey};
use crate::dto::trip_dto::{CreateTripRequest, UpdateTripRequest};
use crate::dto::ApiResponse;
use crate::models::{Trip, TripStatus};
use crate::repositories::FleetRepository;
use crate::services::fleet_rules::{check_cargo_capacity, is_trip_eligible_driver, is_trip_eligible_vehicle};
use crate::services::trip_lifecycle::{plan_transition, TripAction};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, validation_error, AppError, AppResult};

/// Traducir un cambio de estado genérico a la acción del ciclo de vida
pub fn action_for_update(request: &UpdateTripRequest) -> AppResult<TripAction> {
    match request.status {
        Some(TripStatus::OnWay) => request
            .start_odometer
            .map(|start_odometer| TripAction::Dispatch { start_odometer })
            .ok_or_else(|| validation_error("start_odometer", "Start odometer is required to dispatch a trip")),
        Some(TripStatus::Completed) => request
            .end_odometer
            .map(|end_odometer| TripAction::Complete { end_odometer })
            .ok_or_else(|| validation_error("end_odometer", "End odometer is required to complete a trip")),
        Some(TripStatus::Cancelled) => Ok(TripAction::Cancel),
        Some(TripStatus::Pending) => Err(AppError::Conflict(
            "A trip cannot be moved back to Pending".to_string(),
        )),
        None => Err(validation_error("status", "Only trip status changes are supported")),
    }
}

pub struct TripController {
    repository: Arc<dyn FleetRepository>,
    cache: QueryCache,
}

impl TripController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repository.clone(),
            cache: state.cache.clone(),
        }
    }

    pub async fn list(&self, search: Option<&str>) -> AppResult<Vec<Trip>> {
        let trips = self
            .cache
            .get_or_load(QueryKey::Trips, || self.repository.list_trips())
            .await?;

        Ok(match search {
            Some(term) => trips.into_iter().filter(|trip| trip.matches_search(term)).collect(),
            None => trips,
        })
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Trip> {
        self.repository
            .find_trip(id)
            .await?
            .ok_or_else(|| not_found_error("Trip", &id.to_string()))
    }

    pub async fn create(&self, request: CreateTripRequest) -> AppResult<ApiResponse<Trip>> {
        request.validate()?;

        let vehicle = self
            .repository
            .find_vehicle(request.vehicle_id)
            .await?
            .ok_or_else(|| validation_error("vehicle_id", "Selected vehicle does not exist"))?;
        if !is_trip_eligible_vehicle(&vehicle) {
            return Err(validation_error(
                "vehicle_id",
                format!("Vehicle {} is {} and cannot take a new trip", vehicle.name, vehicle.status),
            ));
        }

        let driver = self
            .repository
            .find_driver(request.driver_id)
            .await?
            .ok_or_else(|| validation_error("driver_id", "Selected driver does not exist"))?;
        if !is_trip_eligible_driver(&driver, Utc::now().date_naive()) {
            return Err(validation_error(
                "driver_id",
                format!("Driver {} is not eligible for a new trip", driver.full_name),
            ));
        }

        check_cargo_capacity(request.cargo_weight_kg, &vehicle)?;

        let trip = self.repository.insert_trip(request.into_new_trip()).await?;
        self.cache.invalidate(Mutation::CreateTrip).await;

        info!(
            "🗺️ Viaje creado: {} → {} ({} / {})",
            trip.origin, trip.destination, vehicle.name, driver.full_name
        );

        Ok(ApiResponse::success_with_message(
            trip,
            "Trip created successfully".to_string(),
        ))
    }

    /// Aplicar una acción del ciclo de vida: viaje, vehículo y conductor
    /// se escriben juntos o no se escribe nada
    pub async fn transition(&self, id: Uuid, action: TripAction) -> AppResult<ApiResponse<Trip>> {
        let trip = self.get_by_id(id).await?;
        let vehicle = self
            .repository
            .find_vehicle(trip.vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &trip.vehicle_id.to_string()))?;
        let driver = self
            .repository
            .find_driver(trip.driver_id)
            .await?
            .ok_or_else(|| not_found_error("Driver", &trip.driver_id.to_string()))?;

        let transition = plan_transition(&trip, &vehicle, &driver, action)?;
        let updated = self.repository.apply_transition(&transition).await?;
        self.cache.invalidate(Mutation::TransitionTrip).await;

        info!(
            "🔄 Viaje {} {}: {} → {}",
            id,
            action.name(),
            transition.from,
            transition.to
        );

        Ok(ApiResponse::success_with_message(
            updated,
            format!("Trip is now {}", transition.to),
        ))
    }

    pub async fn dispatch(&self, id: Uuid, start_odometer: f64) -> AppResult<ApiResponse<Trip>> {
        self.transition(id, TripAction::Dispatch { start_odometer }).await
    }

    pub async fn complete(&self, id: Uuid, end_odometer: f64) -> AppResult<ApiResponse<Trip>> {
        self.transition(id, TripAction::Complete { end_odometer }).await
    }

    pub async fn cancel(&self, id: Uuid) -> AppResult<ApiResponse<Trip>> {
        self.transition(id, TripAction::Cancel).await
    }

    /// Cambio de estado genérico (usado por el asistente)
    pub async fn update(&self, id: Uuid, request: UpdateTripRequest) -> AppResult<ApiResponse<Trip>> {
        let action = action_for_update(&request)?;
        self.transition(id, action).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_update_maps_to_lifecycle_action() {
        let dispatch = UpdateTripRequest {
            status: Some(TripStatus::OnWay),
            start_odometer: Some(1200.0),
            ..Default::default()
        };
        assert_eq!(
            action_for_update(&dispatch).unwrap(),
            TripAction::Dispatch { start_odometer: 1200.0 }
        );

        let cancel = UpdateTripRequest {
            status: Some(TripStatus::Cancelled),
            ..Default::default()
        };
        assert_eq!(action_for_update(&cancel).unwrap(), TripAction::Cancel);
    }

    #[test]
    fn test_status_update_requires_odometer() {
        let complete = UpdateTripRequest {
            status: Some(TripStatus::Completed),
            ..Default::default()
        };
        assert!(matches!(
            action_for_update(&complete),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_cannot_move_back_to_pending() {
        let pending = UpdateTripRequest {
            status: Some(TripStatus::Pending),
            ..Default::default()
        };
        assert!(matches!(action_for_update(&pending), Err(AppError::Conflict(_))));
        assert!(action_for_update(&UpdateTripRequest::default()).is_err());
    }
}
