use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::cache::{Mutation, QueryCache, QueryKey};
use crate::dto::maintenance_dto::{CreateMaintenanceRequest, UpdateMaintenanceRequest};
use crate::dto::ApiResponse;
use crate::models::MaintenanceLog;
use crate::repositories::FleetRepository;
use crate::services::fleet_rules::{is_maintenance_eligible_vehicle, status_for_new_maintenance};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, validation_error, AppError, AppResult};

pub struct MaintenanceController {
    repository: Arc<dyn FleetRepository>,
    cache: QueryCache,
}

impl MaintenanceController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repository.clone(),
            cache: state.cache.clone(),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<MaintenanceLog>> {
        self.cache
            .get_or_load(QueryKey::MaintenanceLogs, || self.repository.list_maintenance())
            .await
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<MaintenanceLog> {
        self.repository
            .find_maintenance(id)
            .await?
            .ok_or_else(|| not_found_error("Maintenance log", &id.to_string()))
    }

    /// Un registro abierto pone el vehículo "In Shop" en la misma escritura
    pub async fn create(
        &self,
        request: CreateMaintenanceRequest,
    ) -> AppResult<ApiResponse<MaintenanceLog>> {
        request.validate()?;

        let vehicle = self
            .repository
            .find_vehicle(request.vehicle_id)
            .await?
            .ok_or_else(|| validation_error("vehicle_id", "Selected vehicle does not exist"))?;
        if !is_maintenance_eligible_vehicle(&vehicle) {
            return Err(validation_error(
                "vehicle_id",
                format!("Vehicle {} is {} and cannot be serviced", vehicle.name, vehicle.status),
            ));
        }

        let vehicle_status = status_for_new_maintenance(request.is_completed, vehicle.status);
        let log = self
            .repository
            .insert_maintenance(request.into_new_log(), vehicle_status)
            .await?;
        self.cache.invalidate(Mutation::CreateMaintenance).await;

        info!(
            "🔧 Mantenimiento registrado: {} para {}{}",
            log.service_type,
            vehicle.name,
            if vehicle_status.is_some() { " (In Shop)" } else { "" }
        );

        Ok(ApiResponse::success_with_message(
            log,
            "Maintenance log created successfully".to_string(),
        ))
    }

    /// Cerrar un registro; el vehículo vuelve a Available si no quedan
    /// registros abiertos
    pub async fn complete(&self, id: Uuid) -> AppResult<ApiResponse<MaintenanceLog>> {
        let closure = self.repository.complete_maintenance(id).await?;
        self.cache.invalidate(Mutation::CompleteMaintenance).await;

        match &closure.released_vehicle {
            Some(vehicle) => info!("✅ Mantenimiento {} completado, {} disponible", id, vehicle.name),
            None => info!("✅ Mantenimiento {} completado", id),
        }

        Ok(ApiResponse::success_with_message(
            closure.log,
            "Maintenance marked as completed".to_string(),
        ))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateMaintenanceRequest,
    ) -> AppResult<ApiResponse<MaintenanceLog>> {
        request.validate()?;
        let current = self.get_by_id(id).await?;

        if current.is_completed && request.is_completed == Some(false) {
            return Err(AppError::Conflict(
                "A completed maintenance log cannot be reopened".to_string(),
            ));
        }

        let mut log = current.clone();
        if request.has_field_changes() {
            log = self.repository.update_maintenance(id, request.to_patch()).await?;
            self.cache.invalidate(Mutation::UpdateMaintenance).await;
            info!("✏️ Mantenimiento actualizado: {}", id);
        }

        if request.is_completed == Some(true) && !current.is_completed {
            return self.complete(id).await;
        }

        Ok(ApiResponse::success_with_message(
            log,
            "Maintenance log updated successfully".to_string(),
        ))
    }
}
