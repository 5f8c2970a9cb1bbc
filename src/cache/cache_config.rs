//! Configuración de cache
//!
//! Este módulo contiene la configuración y la interfaz común de los
//! backends de cache (Redis o en proceso).

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::EnvironmentConfig;

/// Configuración del cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Sin URL se usa la cache en proceso
    pub redis_url: Option<String>,
    pub default_ttl: u64,
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            default_ttl: 300, // 5 minutos
            key_prefix: "fleet_dashboard".to_string(),
        }
    }
}

impl CacheConfig {
    pub fn from_environment(config: &EnvironmentConfig) -> Self {
        Self {
            redis_url: config.redis_url.clone(),
            default_ttl: config.cache_ttl_seconds,
            ..Default::default()
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }
}

/// Operaciones de cache sobre payloads JSON ya serializados
#[async_trait]
pub trait CacheOperations: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Nombre del backend para logs y `/health`
    fn backend_name(&self) -> &'static str;

    /// Comprobación de conectividad para `/health`
    async fn is_connected(&self) -> bool;
}
