//! Middleware del sistema
//!
//! CORS configurable desde `CORS_ORIGINS`.

pub mod cors;

pub use cors::*;
