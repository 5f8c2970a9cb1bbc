//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::{CacheConfig, CacheOperations, MemoryCache, QueryCache, RedisClient};
use crate::clients::{ChatModel, GeminiClient};
use crate::config::{DatabaseConfig, EnvironmentConfig};
use crate::database::{mask_database_url, DatabaseConnection};
use crate::repositories::{FleetRepository, MemoryRepository, PgRepository};

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub repository: Arc<dyn FleetRepository>,
    pub cache: QueryCache,
    /// `None` cuando falta la API key del proveedor
    pub assistant: Option<Arc<dyn ChatModel>>,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        repository: Arc<dyn FleetRepository>,
        cache: QueryCache,
        assistant: Option<Arc<dyn ChatModel>>,
    ) -> Self {
        Self {
            config,
            repository,
            cache,
            assistant,
        }
    }

    /// Estado con repositorio y cache en memoria, sin asistente
    pub fn in_memory(config: EnvironmentConfig) -> Self {
        let cache_config = CacheConfig::from_environment(&config);
        let cache = QueryCache::new(
            Arc::new(MemoryCache::new()),
            cache_config.ttl(),
            cache_config.key_prefix,
        );
        Self::new(config, Arc::new(MemoryRepository::new()), cache, None)
    }

    pub fn with_repository(mut self, repository: Arc<dyn FleetRepository>) -> Self {
        self.repository = repository;
        self
    }

    pub fn with_assistant(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.assistant = Some(model);
        self
    }

    /// Construir el estado a partir de la configuración. Sin `DATABASE_URL`
    /// se usa el almacén en memoria; sin Redis, la cache en proceso.
    pub async fn from_config(config: EnvironmentConfig) -> anyhow::Result<Self> {
        let repository: Arc<dyn FleetRepository> = match DatabaseConfig::from_environment(&config) {
            Some(db_config) => {
                info!("🗄️ Conectando a {}", mask_database_url(&db_config.url));
                let connection = DatabaseConnection::connect(&db_config).await?;
                Arc::new(PgRepository::new(connection.into_pool()))
            }
            None => {
                warn!("⚠️ DATABASE_URL no configurada, usando almacén en memoria");
                Arc::new(MemoryRepository::new())
            }
        };

        let cache_config = CacheConfig::from_environment(&config);
        let backend: Arc<dyn CacheOperations> = match cache_config.redis_url.as_deref() {
            Some(url) => match RedisClient::new(url).await {
                Ok(client) => {
                    info!("✅ Redis conectado exitosamente");
                    Arc::new(client)
                }
                Err(e) => {
                    warn!("⚠️ Redis no disponible ({}), usando cache en memoria", e);
                    Arc::new(MemoryCache::new())
                }
            },
            None => Arc::new(MemoryCache::new()),
        };
        let cache = QueryCache::new(backend, cache_config.ttl(), cache_config.key_prefix.clone());

        let assistant: Option<Arc<dyn ChatModel>> = match GeminiClient::from_environment(&config)? {
            Some(client) => {
                info!("🤖 Asistente configurado con {}", config.gemini_model);
                Some(Arc::new(client))
            }
            None => {
                warn!("⚠️ GEMINI_API_KEY no configurada, el chat responderá 500");
                None
            }
        };

        Ok(Self::new(config, repository, cache, assistant))
    }
}
