use async_trait::async_trait;

use super::{map_write_error, PgRepository, FUEL_LOG_COLUMNS};
use crate::models::{FuelLog, FuelLogWithTrip, NewFuelLog};
use crate::repositories::FuelLogRepository;
use crate::utils::errors::AppResult;

#[async_trait]
impl FuelLogRepository for PgRepository {
    async fn list_fuel_logs(&self) -> AppResult<Vec<FuelLog>> {
        let logs = sqlx::query_as::<_, FuelLog>(&format!(
            "SELECT {FUEL_LOG_COLUMNS} FROM fuel_logs ORDER BY fuel_date DESC, created_at DESC"
        ))
        .fetch_all(self.pool())
        .await?;

        Ok(logs)
    }

    async fn insert_fuel_log(&self, log: NewFuelLog) -> AppResult<FuelLog> {
        let created = sqlx::query_as::<_, FuelLog>(&format!(
            r#"
            INSERT INTO fuel_logs (trip_id, vehicle_id, liters, total_cost, misc_expense, fuel_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {FUEL_LOG_COLUMNS}
            "#
        ))
        .bind(log.trip_id)
        .bind(log.vehicle_id)
        .bind(log.liters)
        .bind(log.total_cost)
        .bind(log.misc_expense)
        .bind(log.fuel_date)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_write_error(e, None))?;

        Ok(created)
    }

    async fn fuel_logs_with_trips(&self) -> AppResult<Vec<FuelLogWithTrip>> {
        let rows = sqlx::query_as::<_, FuelLogWithTrip>(
            r#"
            SELECT f.id, f.fuel_date, f.liters::float8 AS liters, f.total_cost,
                   t.distance_km::float8 AS distance_km, v.name AS vehicle_name
            FROM fuel_logs f
            LEFT JOIN trips t ON t.id = f.trip_id
            LEFT JOIN vehicles v ON v.id = f.vehicle_id
            ORDER BY f.fuel_date ASC, f.created_at ASC
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }
}
