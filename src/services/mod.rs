//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación: reglas de
//! la flota, ciclo de vida de los viajes y el asistente conversacional.

pub mod assistant_prompt;
pub mod assistant_service;
pub mod assistant_tools;
pub mod fleet_rules;
pub mod trip_lifecycle;

pub use assistant_service::{has_user_turn, AssistantService, ChatEvent};
pub use trip_lifecycle::{plan_transition, TripAction};
