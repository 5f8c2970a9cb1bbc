use async_trait::async_trait;
use uuid::Uuid;

use super::{map_write_error, PgRepository, DRIVER_COLUMNS};
use crate::models::{Driver, DriverPatch, NewDriver};
use crate::repositories::{DriverRepository, DUPLICATE_LICENSE_MESSAGE};
use crate::utils::errors::{not_found_error, AppResult};

const LICENSE_DUPLICATE: Option<(&str, &str)> = Some(("license_number", DUPLICATE_LICENSE_MESSAGE));

#[async_trait]
impl DriverRepository for PgRepository {
    async fn list_drivers(&self) -> AppResult<Vec<Driver>> {
        let drivers = sqlx::query_as::<_, Driver>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers ORDER BY full_name ASC"
        ))
        .fetch_all(self.pool())
        .await?;

        Ok(drivers)
    }

    async fn find_driver(&self, id: Uuid) -> AppResult<Option<Driver>> {
        let driver = sqlx::query_as::<_, Driver>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(driver)
    }

    async fn license_number_exists(&self, number: &str, exclude_id: Option<Uuid>) -> AppResult<bool> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM drivers WHERE license_number = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(number)
        .bind(exclude_id)
        .fetch_one(self.pool())
        .await?;

        Ok(result.0)
    }

    async fn insert_driver(&self, driver: NewDriver) -> AppResult<Driver> {
        let created = sqlx::query_as::<_, Driver>(&format!(
            r#"
            INSERT INTO drivers (full_name, email, phone, license_number, license_expiry, license_category,
                                 status, safety_score, complaints, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {DRIVER_COLUMNS}
            "#
        ))
        .bind(&driver.full_name)
        .bind(&driver.email)
        .bind(&driver.phone)
        .bind(&driver.license_number)
        .bind(driver.license_expiry)
        .bind(driver.license_category.as_str())
        .bind(driver.status.as_str())
        .bind(driver.safety_score)
        .bind(driver.complaints)
        .bind(&driver.notes)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_write_error(e, LICENSE_DUPLICATE))?;

        Ok(created)
    }

    async fn update_driver(&self, id: Uuid, patch: DriverPatch) -> AppResult<Driver> {
        let current = self
            .find_driver(id)
            .await?
            .ok_or_else(|| not_found_error("Driver", &id.to_string()))?;
        let next = patch.apply_to(&current);

        let updated = sqlx::query_as::<_, Driver>(&format!(
            r#"
            UPDATE drivers
            SET full_name = $2, email = $3, phone = $4, license_number = $5, license_expiry = $6,
                license_category = $7, status = $8, safety_score = $9, complaints = $10, notes = $11
            WHERE id = $1
            RETURNING {DRIVER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&next.full_name)
        .bind(&next.email)
        .bind(&next.phone)
        .bind(&next.license_number)
        .bind(next.license_expiry)
        .bind(next.license_category.as_str())
        .bind(next.status.as_str())
        .bind(next.safety_score)
        .bind(next.complaints)
        .bind(&next.notes)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_write_error(e, LICENSE_DUPLICATE))?
        .ok_or_else(|| not_found_error("Driver", &id.to_string()))?;

        Ok(updated)
    }
}
