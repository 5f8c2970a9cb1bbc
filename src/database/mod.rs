//! Módulo de base de datos
//!
//! Maneja la conexión con el backend PostgreSQL

pub mod connection;

pub use connection::{mask_database_url, DatabaseConnection};
