//! DTOs de la API
//!
//! Requests entrantes (validados con `validator`) y responses serializadas.

pub mod api_response;
pub mod chat_dto;
pub mod driver_dto;
pub mod fuel_log_dto;
pub mod maintenance_dto;
pub mod trip_dto;
pub mod vehicle_dto;

pub use api_response::ApiResponse;

use serde::{Deserialize, Deserializer};

/// Campo anulable en un patch: con `#[serde(default)]` un campo ausente
/// queda en `None` y un `null` explícito en `Some(None)`
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
