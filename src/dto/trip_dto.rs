use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{NewTrip, TripStatus};
use crate::utils::validation::{validate_non_negative_amount, validate_positive_quantity};

// Request para crear un viaje
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTripRequest {
    pub vehicle_id: Uuid,

    pub driver_id: Uuid,

    #[validate(length(min = 1, message = "Origin is required"))]
    pub origin: String,

    #[validate(length(min = 1, message = "Destination is required"))]
    pub destination: String,

    #[validate(custom = "validate_positive_quantity")]
    pub cargo_weight_kg: f64,

    pub cargo_description: Option<String>,

    #[validate(custom = "validate_non_negative_amount")]
    pub estimated_fuel_cost: Option<Decimal>,

    #[validate(custom = "validate_non_negative_amount")]
    pub revenue: Option<Decimal>,
}

impl CreateTripRequest {
    pub fn into_new_trip(self) -> NewTrip {
        NewTrip {
            vehicle_id: self.vehicle_id,
            driver_id: self.driver_id,
            origin: self.origin.trim().to_string(),
            destination: self.destination.trim().to_string(),
            cargo_weight_kg: self.cargo_weight_kg,
            cargo_description: self
                .cargo_description
                .filter(|description| !description.trim().is_empty()),
            estimated_fuel_cost: self.estimated_fuel_cost,
            revenue: self.revenue,
        }
    }
}

// Request para despachar un viaje (Pending -> On Way)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchTripRequest {
    pub start_odometer: f64,
}

// Request para completar un viaje (On Way -> Completed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteTripRequest {
    pub end_odometer: f64,
}

// Cambio de estado expresado como patch (usado por el asistente)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTripRequest {
    pub status: Option<TripStatus>,
    pub start_odometer: Option<f64>,
    pub end_odometer: Option<f64>,
}

// Filtros de listado
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripListQuery {
    pub search: Option<String>,
}
