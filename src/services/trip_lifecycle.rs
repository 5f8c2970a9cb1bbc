//! Ciclo de vida de los viajes
//!
//! ```text
//! Pending --dispatch--> On Way --complete--> Completed
//!    \                     \----cancel-----> Cancelled
//!     \-------cancel----------------------> Cancelled
//! ```
//!
//! `plan_transition` es puro: decide el nuevo estado del viaje y las
//! escrituras acompañantes sobre vehículo y conductor. El repositorio las
//! aplica como una unidad.

use crate::models::{
    CompanionWrite, Driver, DriverStatus, Trip, TripStatus, TripTransition, Vehicle, VehicleStatus,
};
use crate::utils::errors::{validation_error, AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TripAction {
    Dispatch { start_odometer: f64 },
    Complete { end_odometer: f64 },
    Cancel,
}

impl TripAction {
    pub fn name(&self) -> &'static str {
        match self {
            TripAction::Dispatch { .. } => "dispatch",
            TripAction::Complete { .. } => "complete",
            TripAction::Cancel => "cancel",
        }
    }
}

fn illegal(trip: &Trip, action: TripAction) -> AppError {
    AppError::Conflict(format!(
        "Cannot {} a trip that is {}",
        action.name(),
        trip.status
    ))
}

fn release(trip: &Trip) -> (Option<CompanionWrite<VehicleStatus>>, Option<CompanionWrite<DriverStatus>>) {
    (
        Some(CompanionWrite {
            id: trip.vehicle_id,
            status: VehicleStatus::Available,
        }),
        Some(CompanionWrite {
            id: trip.driver_id,
            status: DriverStatus::OffDuty,
        }),
    )
}

/// Planificar la transición de `trip` con el estado actual de su vehículo
/// y conductor
pub fn plan_transition(
    trip: &Trip,
    vehicle: &Vehicle,
    driver: &Driver,
    action: TripAction,
) -> AppResult<TripTransition> {
    let base = TripTransition {
        trip_id: trip.id,
        from: trip.status,
        to: trip.status,
        start_odometer: None,
        end_odometer: None,
        vehicle: None,
        driver: None,
        vehicle_odometer: None,
        vehicle_must_be: None,
        driver_must_not_be: None,
    };

    match (trip.status, action) {
        (TripStatus::Pending, TripAction::Dispatch { start_odometer }) => {
            if !start_odometer.is_finite() || start_odometer < 0.0 {
                return Err(validation_error(
                    "start_odometer",
                    "Start odometer must be a non-negative number",
                ));
            }
            if vehicle.status != VehicleStatus::Available {
                return Err(AppError::Conflict(format!(
                    "Vehicle {} is {} and cannot be dispatched",
                    vehicle.name, vehicle.status
                )));
            }
            if driver.status == DriverStatus::Suspended {
                return Err(AppError::Conflict(format!(
                    "Driver {} is Suspended and cannot be dispatched",
                    driver.full_name
                )));
            }

            Ok(TripTransition {
                to: TripStatus::OnWay,
                start_odometer: Some(start_odometer),
                vehicle: Some(CompanionWrite {
                    id: vehicle.id,
                    status: VehicleStatus::OnTrip,
                }),
                driver: Some(CompanionWrite {
                    id: driver.id,
                    status: DriverStatus::OnDuty,
                }),
                // Se vuelven a comprobar dentro de la unidad
                vehicle_must_be: Some(VehicleStatus::Available),
                driver_must_not_be: Some(DriverStatus::Suspended),
                ..base
            })
        }

        (TripStatus::OnWay, TripAction::Complete { end_odometer }) => {
            let start = trip.start_odometer.unwrap_or(0.0);
            if !end_odometer.is_finite() || end_odometer < start {
                return Err(validation_error(
                    "end_odometer",
                    format!("End odometer must be at least the start reading ({})", start),
                ));
            }

            let (vehicle_write, driver_write) = release(trip);
            Ok(TripTransition {
                to: TripStatus::Completed,
                end_odometer: Some(end_odometer),
                vehicle: vehicle_write,
                driver: driver_write,
                vehicle_odometer: Some(end_odometer),
                ..base
            })
        }

        // Un viaje pendiente todavía no ha reservado vehículo ni conductor
        (TripStatus::Pending, TripAction::Cancel) => Ok(TripTransition {
            to: TripStatus::Cancelled,
            ..base
        }),

        (TripStatus::OnWay, TripAction::Cancel) => {
            let (vehicle_write, driver_write) = release(trip);
            Ok(TripTransition {
                to: TripStatus::Cancelled,
                vehicle: vehicle_write,
                driver: driver_write,
                ..base
            })
        }

        _ => Err(illegal(trip, action)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VehicleType;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    struct Fixture {
        trip: Trip,
        vehicle: Vehicle,
        driver: Driver,
    }

    fn fixture(status: TripStatus) -> Fixture {
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            name: "Truck-1".to_string(),
            license_plate: "KA-01-AB-1234".to_string(),
            model: "Tata Prima".to_string(),
            vehicle_type: VehicleType::Truck,
            max_capacity_kg: 12000.0,
            odometer_km: 1000.0,
            status: VehicleStatus::Available,
            region: None,
            acquisition_cost: None,
            created_at: Utc::now(),
        };
        let driver = Driver {
            id: Uuid::new_v4(),
            full_name: "Ravi Kumar".to_string(),
            email: None,
            phone: None,
            license_number: "DL-09-2027".to_string(),
            license_expiry: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            license_category: VehicleType::Truck,
            status: DriverStatus::OffDuty,
            safety_score: 95,
            complaints: 0,
            total_trips: 3,
            notes: None,
            created_at: Utc::now(),
        };
        let trip = Trip {
            id: Uuid::new_v4(),
            vehicle_id: vehicle.id,
            driver_id: driver.id,
            origin: "Bangalore".to_string(),
            destination: "Chennai".to_string(),
            cargo_weight_kg: 8000.0,
            cargo_description: None,
            estimated_fuel_cost: None,
            revenue: None,
            status,
            start_odometer: (status == TripStatus::OnWay).then_some(1000.0),
            end_odometer: None,
            distance_km: None,
            dispatched_at: None,
            completed_at: None,
            created_at: Utc::now(),
        };
        Fixture { trip, vehicle, driver }
    }

    #[test]
    fn test_dispatch_claims_vehicle_and_driver() {
        let f = fixture(TripStatus::Pending);
        let plan = plan_transition(
            &f.trip,
            &f.vehicle,
            &f.driver,
            TripAction::Dispatch { start_odometer: 1000.0 },
        )
        .unwrap();

        assert_eq!(plan.to, TripStatus::OnWay);
        assert_eq!(plan.start_odometer, Some(1000.0));
        assert_eq!(plan.vehicle.unwrap().status, VehicleStatus::OnTrip);
        assert_eq!(plan.driver.unwrap().status, DriverStatus::OnDuty);
        assert_eq!(plan.vehicle_must_be, Some(VehicleStatus::Available));
        assert_eq!(plan.driver_must_not_be, Some(DriverStatus::Suspended));
    }

    #[test]
    fn test_dispatch_rejects_bad_odometer() {
        let f = fixture(TripStatus::Pending);
        for reading in [-1.0, f64::NAN] {
            let result = plan_transition(
                &f.trip,
                &f.vehicle,
                &f.driver,
                TripAction::Dispatch { start_odometer: reading },
            );
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn test_dispatch_requires_available_vehicle_and_unsuspended_driver() {
        let mut f = fixture(TripStatus::Pending);
        f.vehicle.status = VehicleStatus::InShop;
        let action = TripAction::Dispatch { start_odometer: 0.0 };
        assert!(matches!(
            plan_transition(&f.trip, &f.vehicle, &f.driver, action),
            Err(AppError::Conflict(_))
        ));

        f.vehicle.status = VehicleStatus::Available;
        f.driver.status = DriverStatus::Suspended;
        assert!(matches!(
            plan_transition(&f.trip, &f.vehicle, &f.driver, action),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_complete_releases_and_sets_odometer() {
        let f = fixture(TripStatus::OnWay);
        let plan = plan_transition(
            &f.trip,
            &f.vehicle,
            &f.driver,
            TripAction::Complete { end_odometer: 1350.0 },
        )
        .unwrap();

        assert_eq!(plan.to, TripStatus::Completed);
        assert_eq!(plan.end_odometer, Some(1350.0));
        assert_eq!(plan.vehicle_odometer, Some(1350.0));
        assert_eq!(plan.vehicle.unwrap().status, VehicleStatus::Available);
        assert_eq!(plan.driver.unwrap().status, DriverStatus::OffDuty);
    }

    #[test]
    fn test_complete_rejects_end_before_start() {
        let f = fixture(TripStatus::OnWay);
        let result = plan_transition(
            &f.trip,
            &f.vehicle,
            &f.driver,
            TripAction::Complete { end_odometer: 999.0 },
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_cancel_pending_has_no_companion_writes() {
        let f = fixture(TripStatus::Pending);
        let plan = plan_transition(&f.trip, &f.vehicle, &f.driver, TripAction::Cancel).unwrap();
        assert_eq!(plan.to, TripStatus::Cancelled);
        assert!(plan.vehicle.is_none());
        assert!(plan.driver.is_none());
        assert!(plan.vehicle_must_be.is_none());
    }

    #[test]
    fn test_cancel_on_way_reverts_both() {
        let f = fixture(TripStatus::OnWay);
        let plan = plan_transition(&f.trip, &f.vehicle, &f.driver, TripAction::Cancel).unwrap();
        assert_eq!(plan.vehicle.unwrap().status, VehicleStatus::Available);
        assert_eq!(plan.driver.unwrap().status, DriverStatus::OffDuty);
    }

    #[test]
    fn test_terminal_trips_reject_every_action() {
        for status in [TripStatus::Completed, TripStatus::Cancelled] {
            let f = fixture(status);
            for action in [
                TripAction::Dispatch { start_odometer: 0.0 },
                TripAction::Complete { end_odometer: 2000.0 },
                TripAction::Cancel,
            ] {
                assert!(matches!(
                    plan_transition(&f.trip, &f.vehicle, &f.driver, action),
                    Err(AppError::Conflict(_))
                ));
            }
        }
    }

    #[test]
    fn test_complete_requires_on_way() {
        let f = fixture(TripStatus::Pending);
        let result = plan_transition(
            &f.trip,
            &f.vehicle,
            &f.driver,
            TripAction::Complete { end_odometer: 1500.0 },
        );
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
