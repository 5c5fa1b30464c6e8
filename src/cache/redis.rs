//! Redis-backed cache. Keys live under `<namespace>:`; TTL is Redis expiry.

use std::time::Duration;

use ::redis::aio::ConnectionManager;
use ::redis::{AsyncCommands, RedisResult, Script};
use async_trait::async_trait;
use serde_json::Value;

use super::CacheService;

/// Deletes KEYS[1] when it holds ARGV[1]; returns the number removed.
const REMOVE_IF_EQ: &str = r"if redis.call('GET', KEYS[1]) == ARGV[1] then return redis.call('DEL', KEYS[1]) else return 0 end";

#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    namespace: String,
}

/// `<namespace>:<key>`
pub fn namespaced_key(namespace: &str, key: &str) -> String {
    format!("{namespace}:{key}")
}

/// `SCAN MATCH` pattern covering every key of the namespace.
pub fn scan_pattern(namespace: &str) -> String {
    format!("{}*", namespaced_key(namespace, ""))
}

/// Arguments of the `SET` command storing `payload` under `key`.
/// A zero TTL leaves out `PX`; sub-second TTLs round up to 1 ms.
pub fn set_args(key: String, payload: String, ttl: Duration) -> Vec<String> {
    let mut args = vec![key, payload];
    if !ttl.is_zero() {
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        args.push("PX".into());
        args.push(millis.to_string());
    }
    args
}

impl RedisCache {
    pub async fn connect(url: &str, namespace: impl Into<String>) -> RedisResult<Self> {
        let client = ::redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn, namespace: namespace.into() })
    }

    fn key(&self, key: &str) -> String { namespaced_key(&self.namespace, key) }

    async fn try_get(&self, key: &str) -> RedisResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(self.key(key)).await
    }

    async fn try_set(&self, key: &str, payload: String, ttl: Duration) -> RedisResult<()> {
        let mut conn = self.conn.clone();
        let mut cmd = ::redis::cmd("SET");
        for arg in set_args(self.key(key), payload, ttl) {
            cmd.arg(arg);
        }
        cmd.query_async(&mut conn).await
    }

    async fn try_remove_if(&self, key: &str, payload: String) -> RedisResult<bool> {
        let mut conn = self.conn.clone();
        let removed: i64 = Script::new(REMOVE_IF_EQ).key(self.key(key)).arg(payload).invoke_async(&mut conn).await?;
        Ok(removed > 0)
    }

    async fn try_clear(&self) -> RedisResult<usize> {
        let mut conn = self.conn.clone();
        let pattern = scan_pattern(&self.namespace);
        let mut cursor: u64 = 0;
        let mut removed = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = ::redis::cmd("SCAN")
                .arg(cursor).arg("MATCH").arg(&pattern).arg("COUNT").arg(200)
                .query_async(&mut conn).await?;
            if !keys.is_empty() {
                let n: usize = conn.del(&keys).await?;
                removed += n;
            }
            if next == 0 { break; }
            cursor = next;
        }
        Ok(removed)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let raw = match self.try_get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key, error = %e, "redis get failed; treating as miss");
                return None;
            }
        };
        serde_json::from_str(&raw)
            .map_err(|e| tracing::warn!(key, error = %e, "undecodable cache entry"))
            .ok()
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        if let Err(e) = self.try_set(key, value.to_string(), ttl).await {
            tracing::warn!(key, error = %e, "redis set failed");
        }
    }

    async fn delete(&self, key: &str) {
        let mut conn = self.conn.clone();
        let res: RedisResult<usize> = conn.del(self.key(key)).await;
        if let Err(e) = res {
            tracing::warn!(key, error = %e, "redis delete failed");
        }
    }

    async fn remove_if(&self, key: &str, expected: &Value) -> bool {
        self.try_remove_if(key, expected.to_string()).await.unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "redis conditional delete failed");
            false
        })
    }

    async fn clear(&self) {
        match self.try_clear().await {
            Ok(removed) => tracing::info!(namespace = %self.namespace, removed, "cache namespace cleared"),
            Err(e) => tracing::warn!(namespace = %self.namespace, error = %e, "redis clear failed"),
        }
    }
}
