use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::cache::{Mutation, QueryCache, QueryKey};
use crate::dto::driver_dto::{
    CreateDriverRequest, DriverResponse, DriverRosterStats, UpdateDriverRequest,
};
use crate::dto::ApiResponse;
use crate::models::{Driver, DriverStatus, LicenseStatus};
use crate::repositories::{FleetRepository, DUPLICATE_LICENSE_MESSAGE};
use crate::services::fleet_rules::is_trip_eligible_driver;
use crate::state::AppState;
use crate::utils::errors::{duplicate_error, not_found_error, AppResult};

/// Contadores del roster a partir de las filas ya cargadas
pub fn roster_stats(drivers: &[Driver], today: NaiveDate) -> DriverRosterStats {
    let count = |status: DriverStatus| drivers.iter().filter(|d| d.status == status).count();

    DriverRosterStats {
        total: drivers.len(),
        on_duty: count(DriverStatus::OnDuty),
        off_duty: count(DriverStatus::OffDuty),
        suspended: count(DriverStatus::Suspended),
        license_issues: drivers
            .iter()
            .filter(|d| d.license_status(today) != LicenseStatus::Valid)
            .count(),
    }
}

pub struct DriverController {
    repository: Arc<dyn FleetRepository>,
    cache: QueryCache,
}

impl DriverController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repository.clone(),
            cache: state.cache.clone(),
        }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    async fn rows(&self) -> AppResult<Vec<Driver>> {
        self.cache
            .get_or_load(QueryKey::Drivers, || self.repository.list_drivers())
            .await
    }

    pub async fn list(&self) -> AppResult<Vec<DriverResponse>> {
        let today = Self::today();
        Ok(self
            .rows()
            .await?
            .into_iter()
            .map(|driver| DriverResponse::new(driver, today))
            .collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<DriverResponse> {
        let driver = self
            .repository
            .find_driver(id)
            .await?
            .ok_or_else(|| not_found_error("Driver", &id.to_string()))?;
        Ok(DriverResponse::new(driver, Self::today()))
    }

    pub async fn create(&self, request: CreateDriverRequest) -> AppResult<ApiResponse<DriverResponse>> {
        request.validate()?;
        let new_driver = request.into_new_driver();

        if self
            .repository
            .license_number_exists(&new_driver.license_number, None)
            .await?
        {
            return Err(duplicate_error("license_number", DUPLICATE_LICENSE_MESSAGE));
        }

        let driver = self.repository.insert_driver(new_driver).await?;
        self.cache.invalidate(Mutation::CreateDriver).await;

        info!("🧑‍✈️ Conductor registrado: {} ({})", driver.full_name, driver.license_number);

        Ok(ApiResponse::success_with_message(
            DriverResponse::new(driver, Self::today()),
            "Driver registered successfully".to_string(),
        ))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateDriverRequest,
    ) -> AppResult<ApiResponse<DriverResponse>> {
        request.validate()?;
        let current = self.get_by_id(id).await?;
        let patch = request.into_patch();

        if let Some(number) = patch.license_number.as_deref() {
            if number != current.driver.license_number
                && self.repository.license_number_exists(number, Some(id)).await?
            {
                return Err(duplicate_error("license_number", DUPLICATE_LICENSE_MESSAGE));
            }
        }

        let driver = self.repository.update_driver(id, patch).await?;
        self.cache.invalidate(Mutation::UpdateDriver).await;

        info!("✏️ Conductor actualizado: {} [{}]", driver.full_name, driver.status);

        Ok(ApiResponse::success_with_message(
            DriverResponse::new(driver, Self::today()),
            "Driver updated successfully".to_string(),
        ))
    }

    /// Conductores ofrecidos al crear un viaje
    pub async fn eligible_for_trip(&self) -> AppResult<Vec<DriverResponse>> {
        let today = Self::today();
        Ok(self
            .rows()
            .await?
            .into_iter()
            .filter(|driver| is_trip_eligible_driver(driver, today))
            .map(|driver| DriverResponse::new(driver, today))
            .collect())
    }

    pub async fn stats(&self) -> AppResult<DriverRosterStats> {
        let drivers = self.rows().await?;
        Ok(roster_stats(&drivers, Self::today()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VehicleType;

    fn driver(status: DriverStatus, expiry: NaiveDate) -> Driver {
        Driver {
            id: Uuid::new_v4(),
            full_name: "Meera Nair".to_string(),
            email: None,
            phone: None,
            license_number: format!("DL-{}", Uuid::new_v4()),
            license_expiry: expiry,
            license_category: VehicleType::Truck,
            status,
            safety_score: 92,
            complaints: 0,
            total_trips: 4,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_roster_stats() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let far = NaiveDate::from_ymd_opt(2028, 1, 1).unwrap();
        let soon = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let expired = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        let drivers = vec![
            driver(DriverStatus::OnDuty, far),
            driver(DriverStatus::OffDuty, soon),
            driver(DriverStatus::OffDuty, far),
            driver(DriverStatus::Suspended, expired),
        ];

        let stats = roster_stats(&drivers, today);
        assert_eq!(
            stats,
            DriverRosterStats {
                total: 4,
                on_duty: 1,
                off_duty: 2,
                suspended: 1,
                license_issues: 2,
            }
        );
    }
}
