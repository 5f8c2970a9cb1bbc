//! Reglas de negocio de la flota
//!
//! Funciones puras compartidas por los controladores y los repositorios:
//! capacidad de carga, elegibilidad de vehículos y conductores, y el
//! acoplamiento entre mantenimiento y estado del vehículo.

use chrono::NaiveDate;

use crate::models::{Driver, DriverStatus, LicenseStatus, Vehicle, VehicleStatus};
use crate::utils::errors::{validation_error, AppError, AppResult};
use crate::utils::validation::format_quantity;

/// La carga no puede superar la capacidad del vehículo
pub fn check_cargo_capacity(cargo_weight_kg: f64, vehicle: &Vehicle) -> AppResult<()> {
    let overage = cargo_weight_kg - vehicle.max_capacity_kg;
    if overage > 0.0 {
        return Err(validation_error(
            "cargo_weight_kg",
            format!(
                "Cargo weight exceeds vehicle capacity by {} kg",
                format_quantity(overage)
            ),
        ));
    }
    Ok(())
}

/// Vehículos ofrecidos para un viaje nuevo
pub fn is_trip_eligible_vehicle(vehicle: &Vehicle) -> bool {
    vehicle.status == VehicleStatus::Available
}

/// Vehículos ofrecidos para registrar mantenimiento
pub fn is_maintenance_eligible_vehicle(vehicle: &Vehicle) -> bool {
    !matches!(vehicle.status, VehicleStatus::OnTrip | VehicleStatus::Retired)
}

/// Conductores ofrecidos para un viaje nuevo: ni suspendidos, ni en
/// servicio, y con licencia vigente
pub fn is_trip_eligible_driver(driver: &Driver, today: NaiveDate) -> bool {
    !matches!(driver.status, DriverStatus::Suspended | DriverStatus::OnDuty)
        && driver.license_status(today) != LicenseStatus::Expired
}

/// Comprobar un cambio manual de estado del vehículo
pub fn check_vehicle_status_change(current: VehicleStatus, next: VehicleStatus) -> AppResult<()> {
    if current == VehicleStatus::OnTrip && next == VehicleStatus::Retired {
        return Err(AppError::Conflict(
            "Cannot retire a vehicle while it is On Trip".to_string(),
        ));
    }
    Ok(())
}

/// Estado del vehículo al abrir un registro de mantenimiento
pub fn status_for_new_maintenance(is_completed: bool, current: VehicleStatus) -> Option<VehicleStatus> {
    if is_completed || current == VehicleStatus::InShop {
        None
    } else {
        Some(VehicleStatus::InShop)
    }
}

/// Estado del vehículo al cerrar un registro; solo vuelve a Available
/// cuando no quedan registros abiertos
pub fn status_after_maintenance_closed(current: VehicleStatus, open_logs: i64) -> Option<VehicleStatus> {
    if open_logs == 0 && current == VehicleStatus::InShop {
        Some(VehicleStatus::Available)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VehicleType;
    use chrono::Utc;
    use uuid::Uuid;

    fn vehicle(status: VehicleStatus) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            name: "Van-05".to_string(),
            license_plate: "MH-12-XY-0005".to_string(),
            model: "Eicher Pro".to_string(),
            vehicle_type: VehicleType::Van,
            max_capacity_kg: 500.0,
            odometer_km: 0.0,
            status,
            region: None,
            acquisition_cost: None,
            created_at: Utc::now(),
        }
    }

    fn driver(status: DriverStatus, license_expiry: NaiveDate) -> Driver {
        Driver {
            id: Uuid::new_v4(),
            full_name: "Alex".to_string(),
            email: None,
            phone: None,
            license_number: "DL-1".to_string(),
            license_expiry,
            license_category: VehicleType::Van,
            status,
            safety_score: 100,
            complaints: 0,
            total_trips: 0,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_cargo_overage_reports_exact_amount() {
        let van = vehicle(VehicleStatus::Available);
        assert!(check_cargo_capacity(500.0, &van).is_ok());

        match check_cargo_capacity(1000.0, &van) {
            Err(AppError::Validation(errors)) => {
                let fields = errors.field_errors();
                assert_eq!(
                    fields["cargo_weight_kg"][0].message.as_deref(),
                    Some("Cargo weight exceeds vehicle capacity by 500 kg")
                );
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_driver_eligibility() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let valid = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();
        let expired = NaiveDate::from_ymd_opt(2025, 5, 31).unwrap();

        assert!(is_trip_eligible_driver(&driver(DriverStatus::OffDuty, valid), today));
        assert!(!is_trip_eligible_driver(&driver(DriverStatus::OnDuty, valid), today));
        assert!(!is_trip_eligible_driver(&driver(DriverStatus::Suspended, valid), today));
        assert!(!is_trip_eligible_driver(&driver(DriverStatus::OffDuty, expired), today));
    }

    #[test]
    fn test_vehicle_eligibility() {
        assert!(is_trip_eligible_vehicle(&vehicle(VehicleStatus::Available)));
        assert!(!is_trip_eligible_vehicle(&vehicle(VehicleStatus::InShop)));
        assert!(is_maintenance_eligible_vehicle(&vehicle(VehicleStatus::InShop)));
        assert!(!is_maintenance_eligible_vehicle(&vehicle(VehicleStatus::OnTrip)));
        assert!(!is_maintenance_eligible_vehicle(&vehicle(VehicleStatus::Retired)));
    }

    #[test]
    fn test_cannot_retire_on_trip_vehicle() {
        assert!(check_vehicle_status_change(VehicleStatus::OnTrip, VehicleStatus::Retired).is_err());
        assert!(check_vehicle_status_change(VehicleStatus::Available, VehicleStatus::Retired).is_ok());
    }

    #[test]
    fn test_maintenance_coupling() {
        assert_eq!(
            status_for_new_maintenance(false, VehicleStatus::Available),
            Some(VehicleStatus::InShop)
        );
        assert_eq!(status_for_new_maintenance(true, VehicleStatus::Available), None);
        assert_eq!(
            status_after_maintenance_closed(VehicleStatus::InShop, 0),
            Some(VehicleStatus::Available)
        );
        assert_eq!(status_after_maintenance_closed(VehicleStatus::InShop, 1), None);
        assert_eq!(status_after_maintenance_closed(VehicleStatus::Retired, 0), None);
    }
}
