//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de formularios
//! y normalización de valores antes de enviarlos al backend.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use validator::ValidationError;

lazy_static! {
    /// Formato de email aceptado por los formularios
    pub static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex");

    /// Teléfono: prefijo internacional opcional, 10 a 15 dígitos con separadores
    pub static ref PHONE_REGEX: Regex =
        Regex::new(r"^\+?[0-9][0-9\s\-()]{8,18}[0-9]$").expect("phone regex");
}

/// Normalizar una matrícula: sin espacios exteriores y en mayúsculas
pub fn normalize_license_plate(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Redondear a dos decimales
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formatear una cantidad en kg sin ceros sobrantes ("500", "12.5")
pub fn format_quantity(value: f64) -> String {
    let rounded = round2(value);
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.message = Some("This field is required".into());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de email (vacío se acepta: el campo es opcional)
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || EMAIL_REGEX.is_match(value) {
        return Ok(());
    }
    let mut error = ValidationError::new("email");
    error.add_param("value".into(), &value.to_string());
    error.message = Some("Invalid email address".into());
    Err(error)
}

/// Validar formato de teléfono (vacío se acepta: el campo es opcional)
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    if !PHONE_REGEX.is_match(value) || !(10..=15).contains(&digits) {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        error.message = Some("Invalid phone number".into());
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea no negativo
pub fn validate_non_negative<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value);
        error.message = Some("Must be zero or greater".into());
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea positivo
pub fn validate_positive<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value <= T::zero() {
        let mut error = ValidationError::new("positive");
        error.add_param("value".into(), &value);
        error.message = Some("Must be greater than 0".into());
        return Err(error);
    }
    Ok(())
}

/// Variante para `#[validate(custom = ...)]` sobre cantidades (kg, km);
/// el derive pasa los `f64` por valor
pub fn validate_positive_quantity(value: f64) -> Result<(), ValidationError> {
    validate_positive(value)
}

/// Variante para `#[validate(custom = ...)]` sobre importes
pub fn validate_non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    validate_non_negative(*value)
}

/// Validar que una matrícula normalizada no quede vacía
pub fn validate_license_plate(value: &str) -> Result<(), ValidationError> {
    if normalize_license_plate(value).is_empty() {
        let mut error = ValidationError::new("license_plate");
        error.message = Some("License plate is required".into());
        return Err(error);
    }
    Ok(())
}
