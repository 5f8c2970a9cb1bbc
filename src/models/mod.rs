//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean a las tablas y
//! vistas del backend Postgres.

pub mod analytics;
pub mod driver;
pub mod fuel_log;
pub mod maintenance;
pub mod table;
pub mod trip;
pub mod vehicle;

pub use analytics::*;
pub use driver::*;
pub use fuel_log::*;
pub use maintenance::*;
pub use table::FleetTable;
pub use trip::*;
pub use vehicle::*;

use thiserror::Error;

/// Valor de texto que no corresponde a ninguna variante conocida
#[derive(Debug, Error, Clone, PartialEq)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
