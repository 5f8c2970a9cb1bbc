//! Cache de consultas
//!
//! Envoltorio tipado sobre el backend de cache. Los errores del backend
//! se registran y cuentan como fallo de cache; nunca abortan la petición.

use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::{CacheOperations, Mutation, QueryKey};
use crate::utils::errors::AppResult;

#[derive(Clone)]
pub struct QueryCache {
    backend: Arc<dyn CacheOperations>,
    ttl: Duration,
    prefix: String,
}

impl QueryCache {
    pub fn new(backend: Arc<dyn CacheOperations>, ttl: Duration, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            ttl,
            prefix: prefix.into(),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    pub async fn is_connected(&self) -> bool {
        self.backend.is_connected().await
    }

    fn make_key(&self, key: QueryKey) -> String {
        format!("{}:query:{}", self.prefix, key.as_str())
    }

    /// Leer de cache o cargar con `loader` y guardar el resultado
    pub async fn get_or_load<T, F, Fut>(&self, key: QueryKey, loader: F) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let cache_key = self.make_key(key);

        match self.backend.get(&cache_key).await {
            Ok(Some(payload)) => match serde_json::from_str(&payload) {
                Ok(value) => return Ok(value),
                Err(e) => warn!("⚠️ Payload de cache inválido para {}: {}", cache_key, e),
            },
            Ok(None) => {}
            Err(e) => warn!("⚠️ Error leyendo cache para clave {}: {}", cache_key, e),
        }

        let value = loader().await?;

        match serde_json::to_string(&value) {
            Ok(payload) => {
                if let Err(e) = self.backend.set(&cache_key, payload, self.ttl).await {
                    warn!("⚠️ Error guardando cache para clave {}: {}", cache_key, e);
                }
            }
            Err(e) => warn!("⚠️ No se pudo serializar {} para cache: {}", cache_key, e),
        }

        Ok(value)
    }

    /// Invalidar las consultas afectadas por una mutación
    pub async fn invalidate(&self, mutation: Mutation) {
        for key in mutation.invalidates() {
            let cache_key = self.make_key(*key);
            if let Err(e) = self.backend.delete(&cache_key).await {
                warn!("⚠️ Error invalidando cache {}: {}", cache_key, e);
            }
        }
        debug!("🗑️ Cache invalidada tras {:?}", mutation);
    }
}
