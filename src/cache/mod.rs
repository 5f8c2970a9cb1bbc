//! Cache
//!
//! Este módulo contiene la cache de consultas y sus backends.

pub mod cache_config;
pub mod memory_cache;
pub mod query_cache;
pub mod query_keys;
pub mod redis_client;

pub use cache_config::{CacheConfig, CacheOperations};
pub use memory_cache::MemoryCache;
pub use query_cache::QueryCache;
pub use query_keys::{Mutation, QueryKey};
pub use redis_client::RedisClient;
