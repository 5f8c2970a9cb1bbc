use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::cache::{Mutation, QueryCache, QueryKey};
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::dto::ApiResponse;
use crate::models::Vehicle;
use crate::repositories::FleetRepository;
use crate::services::fleet_rules::{
    check_vehicle_status_change, is_maintenance_eligible_vehicle, is_trip_eligible_vehicle,
};
use crate::state::AppState;
use crate::utils::errors::{duplicate_error, not_found_error, AppError, AppResult};

/// Mensaje cuando el backend rechaza el borrado por registros enlazados
pub const VEHICLE_IN_USE_MESSAGE: &str =
    "Vehicle has linked trips or maintenance records. Retire it instead.";

fn plate_taken(plate: &str) -> AppError {
    duplicate_error(
        "license_plate",
        format!("License plate \"{}\" is already registered to another vehicle", plate),
    )
}

pub struct VehicleController {
    repository: Arc<dyn FleetRepository>,
    cache: QueryCache,
}

impl VehicleController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repository.clone(),
            cache: state.cache.clone(),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<Vehicle>> {
        self.cache
            .get_or_load(QueryKey::Vehicles, || self.repository.list_vehicles())
            .await
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Vehicle> {
        self.repository
            .find_vehicle(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))
    }

    pub async fn create(&self, request: CreateVehicleRequest) -> AppResult<ApiResponse<Vehicle>> {
        request.validate()?;
        let new_vehicle = request.into_new_vehicle();

        // Comprobación previa; el backend vuelve a rechazarla con 23505 si hay carrera
        if self
            .repository
            .license_plate_exists(&new_vehicle.license_plate, None)
            .await?
        {
            return Err(plate_taken(&new_vehicle.license_plate));
        }

        let vehicle = self.repository.insert_vehicle(new_vehicle).await?;
        self.cache.invalidate(Mutation::CreateVehicle).await;

        info!("🚛 Vehículo creado: {} ({})", vehicle.name, vehicle.license_plate);

        Ok(ApiResponse::success_with_message(
            vehicle,
            "Vehicle registered successfully".to_string(),
        ))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateVehicleRequest,
    ) -> AppResult<ApiResponse<Vehicle>> {
        request.validate()?;
        let current = self.get_by_id(id).await?;
        let patch = request.into_patch();

        if let Some(plate) = patch.license_plate.as_deref() {
            if plate != current.license_plate
                && self.repository.license_plate_exists(plate, Some(id)).await?
            {
                return Err(plate_taken(plate));
            }
        }

        if let Some(status) = patch.status {
            check_vehicle_status_change(current.status, status)?;
        }

        let vehicle = self.repository.update_vehicle(id, patch).await?;
        self.cache.invalidate(Mutation::UpdateVehicle).await;

        info!("✏️ Vehículo actualizado: {} [{}]", vehicle.name, vehicle.status);

        Ok(ApiResponse::success_with_message(
            vehicle,
            "Vehicle updated successfully".to_string(),
        ))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<Uuid>> {
        let vehicle = self.get_by_id(id).await?;

        self.repository.delete_vehicle(id).await.map_err(|e| match e {
            AppError::ForeignKeyConflict(_) => {
                AppError::ForeignKeyConflict(VEHICLE_IN_USE_MESSAGE.to_string())
            }
            other => other,
        })?;
        self.cache.invalidate(Mutation::DeleteVehicle).await;

        info!("🗑️ Vehículo eliminado: {} ({})", vehicle.name, vehicle.license_plate);

        Ok(ApiResponse::success_with_message(
            id,
            "Vehicle deleted successfully".to_string(),
        ))
    }

    /// Vehículos ofrecidos al crear un viaje
    pub async fn eligible_for_trip(&self) -> AppResult<Vec<Vehicle>> {
        let vehicles = self.list().await?;
        Ok(vehicles.into_iter().filter(is_trip_eligible_vehicle).collect())
    }

    /// Vehículos ofrecidos al registrar mantenimiento
    pub async fn eligible_for_maintenance(&self) -> AppResult<Vec<Vehicle>> {
        let vehicles = self.list().await?;
        Ok(vehicles
            .into_iter()
            .filter(is_maintenance_eligible_vehicle)
            .collect())
    }
}
