//! Key/value cache with per-entry TTL.
//!
//! Two backends: [`InMemoryCache`] (process-local map with a periodic sweep)
//! and [`RedisCache`] (namespaced keys, native expiry). Both are fail-open:
//! backend errors are logged and surface as misses.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub mod memory;
pub mod redis;

pub use self::memory::InMemoryCache;
pub use self::redis::RedisCache;

#[async_trait]
pub trait CacheService: Send + Sync {
    async fn get(&self, key: &str) -> Option<Value>;
    /// A zero `ttl` stores the value without expiry.
    async fn set(&self, key: &str, value: Value, ttl: Duration);
    async fn delete(&self, key: &str);
    /// Deletes `key` only while it holds `expected`, as one atomic step.
    /// Returns whether the entry was removed.
    async fn remove_if(&self, key: &str, expected: &Value) -> bool;
    async fn clear(&self);
}

/// Typed reads and writes on top of the JSON contract.
pub async fn get_as<T: DeserializeOwned>(cache: &dyn CacheService, key: &str) -> Option<T> {
    let value = cache.get(key).await?;
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(key, error = %e, "cached value has unexpected shape; ignoring");
            None
        }
    }
}

pub async fn set_as<T: Serialize + ?Sized>(cache: &dyn CacheService, key: &str, value: &T, ttl: Duration) {
    match serde_json::to_value(value) {
        Ok(v) => cache.set(key, v, ttl).await,
        Err(e) => tracing::warn!(key, error = %e, "value not cacheable"),
    }
}
