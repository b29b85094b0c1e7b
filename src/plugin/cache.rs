//! Keyed memoization of constructed plugins
//!
//! Entries live until [`PluginCache::clear`]; there is no eviction.

use crate::plugin::error::PluginResult;
use serde::Serialize;
use std::collections::HashMap;

/// Size and keys of a [`PluginCache`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

/// Stable cache key for a plugin kind and its options
pub fn cache_key<T: Serialize>(kind: &str, options: &T) -> PluginResult<String> {
    Ok(format!("{}-{}", kind, serde_json::to_string(options)?))
}

#[derive(Debug)]
pub struct PluginCache<T> {
    entries: HashMap<String, T>,
    /// Insertion order, for stable stats
    order: Vec<String>,
}

impl<T> Default for PluginCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T: Clone> PluginCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, building it on first request
    ///
    /// A failed `factory` caches nothing, so the next request retries.
    pub fn get_or_create<F>(&mut self, key: &str, factory: F) -> PluginResult<T>
    where
        F: FnOnce() -> PluginResult<T>,
    {
        if let Some(existing) = self.entries.get(key) {
            log::debug!("Using cached plugin {}", key);
            return Ok(existing.clone());
        }

        let created = factory()?;
        self.entries.insert(key.to_string(), created.clone());
        self.order.push(key.to_string());
        Ok(created)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        log::debug!("Plugin cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            keys: self.order.clone(),
        }
    }
}
