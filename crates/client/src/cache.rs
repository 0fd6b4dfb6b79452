//! Response cache keyed by resource and parameters.
//!
//! Keys are lists of segments such as `["book", "3"]`. Invalidating a key
//! marks every entry whose key starts with it as stale, so `["book"]` covers
//! every single-book entry while `["book", "3"]` covers one.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ClientResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new(family: &str) -> Self {
        Self(vec![family.to_string()])
    }

    pub fn with(mut self, segment: impl ToString) -> Self {
        self.0.push(segment.to_string());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Key families used by [`crate::BookShare`].
pub mod keys {
    use super::QueryKey;

    pub fn infinite_books() -> QueryKey {
        QueryKey::new("infinite-books")
    }

    pub fn infinite_my_books() -> QueryKey {
        QueryKey::new("infinite-mybooks")
    }

    pub fn user_dashboard() -> QueryKey {
        QueryKey::new("userDashboard")
    }

    pub fn user_profile() -> QueryKey {
        QueryKey::new("userProfile")
    }

    pub fn recent_books() -> QueryKey {
        QueryKey::new("recent-books")
    }

    pub fn book(id: u64) -> QueryKey {
        QueryKey::new("book").with(id)
    }

    pub fn all_requests() -> QueryKey {
        QueryKey::new("all-requests")
    }

    pub fn my_requests() -> QueryKey {
        QueryKey::new("my-requests")
    }

    pub fn user_requests() -> QueryKey {
        QueryKey::new("user-requests")
    }

    pub fn request(id: u64) -> QueryKey {
        QueryKey::new("request").with(id)
    }
}

#[derive(Debug)]
struct Entry {
    value: serde_json::Value,
    stale: bool,
    stored_at: Instant,
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<QueryKey, Entry>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cached value for `key`, unless it is missing, stale or no longer
    /// decodes as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entries = self.entries();
        let entry = entries.get(key).filter(|e| !e.stale)?;
        serde_json::from_value(entry.value.clone()).ok()
    }

    pub fn set<T: Serialize>(&self, key: QueryKey, value: &T) -> ClientResult<()> {
        let value = serde_json::to_value(value)?;
        self.entries().insert(
            key,
            Entry {
                value,
                stale: false,
                stored_at: Instant::now(),
            },
        );
        Ok(())
    }

    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        self.entries().get(key).is_some_and(|e| !e.stale)
    }

    /// When `key` was last stored, stale or not.
    pub fn stored_at(&self, key: &QueryKey) -> Option<Instant> {
        self.entries().get(key).map(|e| e.stored_at)
    }

    /// Mark every entry under `prefix` stale. Returns how many were fresh.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut invalidated = 0;
        for (key, entry) in self.entries().iter_mut() {
            if key.starts_with(prefix) && !entry.stale {
                entry.stale = true;
                invalidated += 1;
            }
        }
        tracing::debug!(key = %prefix, invalidated, "query cache invalidated");
        invalidated
    }

    pub fn remove(&self, key: &QueryKey) {
        self.entries().remove(key);
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Serve `key` from the cache, or run `fetch` and cache its result.
    ///
    /// The lock is not held while `fetch` runs, so two concurrent misses both
    /// fetch and the later one wins.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetch: F) -> ClientResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let value = fetch().await?;
        self.set(key, &value)?;
        Ok(value)
    }
}
