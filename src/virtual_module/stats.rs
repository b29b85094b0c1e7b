//! Usage counters for one virtual module

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Snapshot of a runtime's resolve/load activity
///
/// Only the runtime's `resolve_id` and `load` change these values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualModuleStats {
    pub module_id: String,
    pub resolve_count: u64,
    pub load_count: u64,
    pub last_loaded: Option<DateTime<Utc>>,
    /// Length in characters of the last served content
    pub content_length: usize,
}

impl VirtualModuleStats {
    pub fn new(module_id: impl Into<String>, content_length: usize) -> Self {
        Self {
            module_id: module_id.into(),
            resolve_count: 0,
            load_count: 0,
            last_loaded: None,
            content_length,
        }
    }

    pub(crate) fn record_resolve(&mut self) -> u64 {
        self.resolve_count += 1;
        self.resolve_count
    }

    pub(crate) fn record_load(&mut self) -> u64 {
        self.load_count += 1;
        self.last_loaded = Some(Utc::now());
        self.load_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_independent() {
        let mut stats = VirtualModuleStats::new("virtual:x", 3);
        assert_eq!(stats.record_resolve(), 1);
        assert_eq!(stats.record_resolve(), 2);
        assert_eq!(stats.load_count, 0);
        assert!(stats.last_loaded.is_none());

        assert_eq!(stats.record_load(), 1);
        assert!(stats.last_loaded.is_some());
        assert_eq!(stats.resolve_count, 2);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(VirtualModuleStats::new("virtual:x", 3)).unwrap();
        assert_eq!(json["moduleId"], "virtual:x");
        assert_eq!(json["resolveCount"], 0);
        assert_eq!(json["contentLength"], 3);
        assert!(json["lastLoaded"].is_null());
    }
}
