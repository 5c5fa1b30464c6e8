//! Process-local cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::CacheService;

struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool { self.expires_at.is_some_and(|at| at <= now) }
}

type Entries = Mutex<HashMap<String, Entry>>;

pub struct InMemoryCache {
    entries: Arc<Entries>,
    sweeper: Option<JoinHandle<()>>,
}

fn lock(entries: &Entries) -> MutexGuard<'_, HashMap<String, Entry>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryCache {
    /// Cache without a background sweep; expired entries go on read.
    pub fn new() -> Self {
        Self { entries: Arc::new(Mutex::new(HashMap::new())), sweeper: None }
    }

    /// Cache with a sweep task removing expired entries every `interval`.
    /// Must be called inside a tokio runtime; the task ends when the cache drops.
    pub fn with_sweep(interval: Duration) -> Self {
        let entries = Arc::new(Mutex::new(HashMap::new()));
        let weak: Weak<Entries> = Arc::downgrade(&entries);
        let sweeper = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(entries) = weak.upgrade() else { break };
                let removed = sweep(&entries);
                if removed > 0 { tracing::debug!(removed, "cache sweep evicted expired entries"); }
            }
        });
        Self { entries, sweeper: Some(sweeper) }
    }

    /// Removes every expired entry now; returns how many were dropped.
    pub fn sweep(&self) -> usize { sweep(&self.entries) }

    /// Entries currently held, expired or not.
    pub fn len(&self) -> usize { lock(&self.entries).len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl Default for InMemoryCache {
    fn default() -> Self { Self::new() }
}

impl Drop for InMemoryCache {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.take() { handle.abort(); }
    }
}

fn sweep(entries: &Entries) -> usize {
    let now = Instant::now();
    let mut map = lock(entries);
    let before = map.len();
    map.retain(|_, e| !e.is_expired(now));
    before - map.len()
}

#[async_trait]
impl CacheService for InMemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        let mut map = lock(&self.entries);
        if map.get(key).is_some_and(|e| e.is_expired(now)) {
            map.remove(key);
            return None;
        }
        map.get(key).map(|e| e.value.clone())
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        // A deadline past the clock's range is treated as no expiry.
        let expires_at = if ttl.is_zero() { None } else { Instant::now().checked_add(ttl) };
        lock(&self.entries).insert(key.to_string(), Entry { value, expires_at });
    }

    async fn delete(&self, key: &str) {
        lock(&self.entries).remove(key);
    }

    async fn remove_if(&self, key: &str, expected: &Value) -> bool {
        let now = Instant::now();
        let mut map = lock(&self.entries);
        let matches = map.get(key).is_some_and(|e| !e.is_expired(now) && &e.value == expected);
        if matches { map.remove(key); }
        matches
    }

    async fn clear(&self) {
        lock(&self.entries).clear();
    }
}
