use async_trait::async_trait;
use uuid::Uuid;

use super::{map_write_error, PgRepository, MAINTENANCE_COLUMNS, VEHICLE_COLUMNS};
use crate::models::{
    MaintenanceLog, MaintenancePatch, NewMaintenanceLog, Vehicle, VehicleStatus,
};
use crate::repositories::{MaintenanceClosure, MaintenanceRepository};
use crate::services::fleet_rules::status_after_maintenance_closed;
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[async_trait]
impl MaintenanceRepository for PgRepository {
    async fn list_maintenance(&self) -> AppResult<Vec<MaintenanceLog>> {
        let logs = sqlx::query_as::<_, MaintenanceLog>(&format!(
            "SELECT {MAINTENANCE_COLUMNS} FROM maintenance_logs ORDER BY service_date DESC, created_at DESC"
        ))
        .fetch_all(self.pool())
        .await?;

        Ok(logs)
    }

    async fn find_maintenance(&self, id: Uuid) -> AppResult<Option<MaintenanceLog>> {
        let log = sqlx::query_as::<_, MaintenanceLog>(&format!(
            "SELECT {MAINTENANCE_COLUMNS} FROM maintenance_logs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(log)
    }

    async fn insert_maintenance(
        &self,
        log: NewMaintenanceLog,
        vehicle_status: Option<VehicleStatus>,
    ) -> AppResult<MaintenanceLog> {
        let mut tx = self.pool().begin().await?;

        let created = sqlx::query_as::<_, MaintenanceLog>(&format!(
            r#"
            INSERT INTO maintenance_logs (vehicle_id, service_type, description, cost, service_date, mechanic, is_completed)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {MAINTENANCE_COLUMNS}
            "#
        ))
        .bind(log.vehicle_id)
        .bind(&log.service_type)
        .bind(&log.description)
        .bind(log.cost)
        .bind(log.service_date)
        .bind(&log.mechanic)
        .bind(log.is_completed)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, None))?;

        if let Some(status) = vehicle_status {
            sqlx::query("UPDATE vehicles SET status = $2 WHERE id = $1")
                .bind(log.vehicle_id)
                .bind(status.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn update_maintenance(&self, id: Uuid, patch: MaintenancePatch) -> AppResult<MaintenanceLog> {
        let current = self
            .find_maintenance(id)
            .await?
            .ok_or_else(|| not_found_error("Maintenance log", &id.to_string()))?;
        let next = patch.apply_to(&current);

        let updated = sqlx::query_as::<_, MaintenanceLog>(&format!(
            r#"
            UPDATE maintenance_logs
            SET service_type = $2, description = $3, cost = $4, service_date = $5, mechanic = $6
            WHERE id = $1
            RETURNING {MAINTENANCE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&next.service_type)
        .bind(&next.description)
        .bind(next.cost)
        .bind(next.service_date)
        .bind(&next.mechanic)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| not_found_error("Maintenance log", &id.to_string()))?;

        Ok(updated)
    }

    async fn complete_maintenance(&self, id: Uuid) -> AppResult<MaintenanceClosure> {
        let mut tx = self.pool().begin().await?;

        let log = sqlx::query_as::<_, MaintenanceLog>(&format!(
            r#"
            UPDATE maintenance_logs SET is_completed = TRUE
            WHERE id = $1 AND is_completed = FALSE
            RETURNING {MAINTENANCE_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("Maintenance log {} is not open", id)))?;

        let (open_logs,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM maintenance_logs WHERE vehicle_id = $1 AND is_completed = FALSE",
        )
        .bind(log.vehicle_id)
        .fetch_one(&mut *tx)
        .await?;

        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1 FOR UPDATE"
        ))
        .bind(log.vehicle_id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut released_vehicle = None;
        if let Some(vehicle) = vehicle {
            if let Some(status) = status_after_maintenance_closed(vehicle.status, open_logs) {
                let updated = sqlx::query_as::<_, Vehicle>(&format!(
                    "UPDATE vehicles SET status = $2 WHERE id = $1 RETURNING {VEHICLE_COLUMNS}"
                ))
                .bind(vehicle.id)
                .bind(status.as_str())
                .fetch_one(&mut *tx)
                .await?;
                released_vehicle = Some(updated);
            }
        }

        tx.commit().await?;
        Ok(MaintenanceClosure {
            log,
            released_vehicle,
        })
    }
}
