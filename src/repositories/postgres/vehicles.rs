use async_trait::async_trait;
use uuid::Uuid;

use super::{map_write_error, PgRepository, VEHICLE_COLUMNS};
use crate::models::{NewVehicle, Vehicle, VehiclePatch};
use crate::repositories::{VehicleRepository, DUPLICATE_PLATE_MESSAGE};
use crate::utils::errors::{not_found_error, AppResult};

const PLATE_DUPLICATE: Option<(&str, &str)> = Some(("license_plate", DUPLICATE_PLATE_MESSAGE));

#[async_trait]
impl VehicleRepository for PgRepository {
    async fn list_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool())
        .await?;

        Ok(vehicles)
    }

    async fn find_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(vehicle)
    }

    async fn license_plate_exists(&self, plate: &str, exclude_id: Option<Uuid>) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM vehicles WHERE license_plate = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(plate)
        .bind(exclude_id)
        .fetch_one(self.pool())
        .await?;

        Ok(result.0)
    }

    async fn insert_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        let created = sqlx::query_as::<_, Vehicle>(&format!(
            r#"
            INSERT INTO vehicles (name, license_plate, model, type, max_capacity_kg, odometer_km, status, region, acquisition_cost)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {VEHICLE_COLUMNS}
            "#
        ))
        .bind(&vehicle.name)
        .bind(&vehicle.license_plate)
        .bind(&vehicle.model)
        .bind(vehicle.vehicle_type.as_str())
        .bind(vehicle.max_capacity_kg)
        .bind(vehicle.odometer_km)
        .bind(vehicle.status.as_str())
        .bind(&vehicle.region)
        .bind(vehicle.acquisition_cost)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_write_error(e, PLATE_DUPLICATE))?;

        Ok(created)
    }

    async fn update_vehicle(&self, id: Uuid, patch: VehiclePatch) -> AppResult<Vehicle> {
        let current = self
            .find_vehicle(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;
        let next = patch.apply_to(&current);

        let updated = sqlx::query_as::<_, Vehicle>(&format!(
            r#"
            UPDATE vehicles
            SET name = $2, license_plate = $3, model = $4, type = $5, max_capacity_kg = $6,
                odometer_km = $7, status = $8, region = $9, acquisition_cost = $10
            WHERE id = $1
            RETURNING {VEHICLE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&next.name)
        .bind(&next.license_plate)
        .bind(&next.model)
        .bind(next.vehicle_type.as_str())
        .bind(next.max_capacity_kg)
        .bind(next.odometer_km)
        .bind(next.status.as_str())
        .bind(&next.region)
        .bind(next.acquisition_cost)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_write_error(e, PLATE_DUPLICATE))?
        .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

        Ok(updated)
    }

    async fn delete_vehicle(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| map_write_error(e, None))?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Vehicle", &id.to_string()));
        }
        Ok(())
    }
}
