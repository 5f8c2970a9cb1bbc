//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno. Las claves opcionales
//! caen a valores por defecto; sin `DATABASE_URL` se usa el almacén en
//! memoria y sin `REDIS_URL` la caché en proceso.

use anyhow::Context;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub redis_url: Option<String>,
    pub cache_ttl_seconds: u64,
    pub cors_origins: Vec<String>,
    // Asistente
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub chat_history_limit: usize,
    pub chat_max_steps: usize,
    pub chat_timeout_seconds: u64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            database_url: None,
            database_max_connections: 10,
            redis_url: None,
            cache_ttl_seconds: 300,
            cors_origins: Vec::new(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            chat_history_limit: 20,
            chat_max_steps: 5,
            chat_timeout_seconds: 30,
        }
    }
}

/// Variable opcional; vacía cuenta como ausente
fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parsed_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_var(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} must be a valid number, got '{}'", key, raw)),
        None => Ok(default),
    }
}

impl EnvironmentConfig {
    /// Cargar la configuración desde el entorno del proceso
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            environment: optional_var("ENVIRONMENT").unwrap_or(defaults.environment),
            port: parsed_var("PORT", defaults.port)?,
            host: optional_var("HOST").unwrap_or(defaults.host),
            database_url: optional_var("DATABASE_URL"),
            database_max_connections: parsed_var(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )?,
            redis_url: optional_var("REDIS_URL"),
            cache_ttl_seconds: parsed_var("CACHE_TTL_SECONDS", defaults.cache_ttl_seconds)?,
            cors_origins: optional_var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            gemini_api_key: optional_var("GEMINI_API_KEY"),
            gemini_model: optional_var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: optional_var("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            chat_history_limit: parsed_var("CHAT_HISTORY_LIMIT", defaults.chat_history_limit)?,
            chat_max_steps: parsed_var("CHAT_MAX_STEPS", defaults.chat_max_steps)?,
            chat_timeout_seconds: parsed_var(
                "CHAT_TIMEOUT_SECONDS",
                defaults.chat_timeout_seconds,
            )?,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn chat_timeout(&self) -> Duration {
        Duration::from_secs(self.chat_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EnvironmentConfig::default();
        assert!(config.is_development());
        assert_eq!(config.server_url(), "0.0.0.0:3000");
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.chat_history_limit, 20);
        assert_eq!(config.chat_max_steps, 5);
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert!(config.database_url.is_none());
    }
}
