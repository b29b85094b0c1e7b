//! Folding module descriptors into the aggregate registry
//!
//! Merge rule for each contribution's `setting` block:
//! - arrays concatenate, base first, no deduplication
//! - objects merge field by field, recursively
//! - anything else is overwritten by the contribution
//!
//! After each contribution, the roots of its async sub-packages are appended
//! to `asyncPackageNames`, duplicates included.
//!
//! A contribution whose `setting` would leave the registry unreadable (a
//! `pageModules` that is not a flag map, say) is logged and left out. The
//! other contributions still merge.

use crate::core::error_handling::log_error_with_context;
use crate::modules::error::{ModuleError, ModuleResult};
use crate::modules::types::{AggregateRegistry, ModuleRecord, SubPackageConfig};
use serde_json::Value;

const ASYNC_PACKAGE_NAMES: &str = "asyncPackageNames";

/// Merges module records into a base registry
#[derive(Debug, Clone, Default)]
pub struct RegistryMerger {
    require_page_modules: bool,
}

impl RegistryMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only merge when the base registry declares `pageModules`
    pub fn require_page_modules(mut self, required: bool) -> Self {
        self.require_page_modules = required;
        self
    }

    pub fn merge(
        &self,
        base: &AggregateRegistry,
        contributions: &[ModuleRecord],
    ) -> ModuleResult<AggregateRegistry> {
        if self.require_page_modules && base.page_modules.is_none() {
            log::debug!(
                "Base registry has no pageModules flag, skipping {} contributions",
                contributions.len()
            );
            return Ok(base.clone());
        }

        let mut registry = base.clone();
        let mut accumulator = to_value(base, "base registry")?;

        for record in contributions {
            let mut trial = accumulator.clone();
            let setting = to_value(&record.descriptor.setting, &record.key)?;
            deep_merge(&mut trial, &setting);

            let sub_packages = record
                .descriptor
                .setting
                .sub_packages
                .as_deref()
                .unwrap_or(&[]);
            append_async_package_names(&mut trial, sub_packages);

            match serde_json::from_value::<AggregateRegistry>(trial.clone()) {
                Ok(merged) => {
                    registry = merged;
                    accumulator = trial;
                    log::debug!("Merged module '{}' into registry", record.key);
                }
                Err(source) => {
                    let error = ModuleError::Json {
                        context: format!("module '{}' setting", record.key),
                        source,
                    };
                    log_error_with_context(&error, "Merging module descriptor");
                }
            }
        }

        Ok(registry)
    }
}

fn to_value<T: serde::Serialize>(value: &T, context: &str) -> ModuleResult<Value> {
    serde_json::to_value(value).map_err(|source| ModuleError::Json {
        context: context.to_string(),
        source,
    })
}

/// Merge `source` into `target` with array-concatenating semantics
pub fn deep_merge(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Array(target_items), Value::Array(source_items)) => {
            target_items.extend(source_items.iter().cloned());
        }
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, source_value) in source_map {
                match target_map.get_mut(key) {
                    Some(existing) => deep_merge(existing, source_value),
                    None => {
                        target_map.insert(key.clone(), source_value.clone());
                    }
                }
            }
        }
        (target, source) => *target = source.clone(),
    }
}

/// Roots of the sub-packages flagged `asyncComponent: true`, in order
pub fn async_package_roots(sub_packages: &[SubPackageConfig]) -> impl Iterator<Item = &str> {
    sub_packages
        .iter()
        .filter(|pack| pack.is_async())
        .map(|pack| pack.root.as_str())
}

/// Append async roots to the accumulator's `asyncPackageNames`
///
/// The list is created when absent. Roots already present are appended
/// again.
pub fn append_async_package_names(accumulator: &mut Value, sub_packages: &[SubPackageConfig]) {
    let Value::Object(map) = accumulator else {
        return;
    };

    let names = map
        .entry(ASYNC_PACKAGE_NAMES)
        .or_insert_with(|| Value::Array(Vec::new()));
    if !names.is_array() {
        *names = Value::Array(Vec::new());
    }
    if let Value::Array(items) = names {
        items.extend(async_package_roots(sub_packages).map(|root| Value::String(root.to_string())));
    }
}

/// Remove repeated `asyncPackageNames`, keeping first occurrences
pub fn dedup_async_package_names(registry: &mut AggregateRegistry) {
    if let Some(names) = registry.async_package_names.as_mut() {
        let mut seen = std::collections::HashSet::new();
        names.retain(|name| seen.insert(name.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::types::{ModuleDescriptor, PageConfig};
    use serde_json::json;
    use std::path::PathBuf;

    fn record(key: &str, descriptor: ModuleDescriptor) -> ModuleRecord {
        ModuleRecord {
            descriptor,
            key: key.to_string(),
            file_path: PathBuf::from(format!("/app/src/modules/{}/module.json", key)),
        }
    }

    fn pages_record(key: &str, paths: &[&str]) -> ModuleRecord {
        record(
            key,
            ModuleDescriptor::with_pages(paths.iter().map(|p| PageConfig::new(*p)).collect()),
        )
    }

    fn page_paths(registry: &AggregateRegistry) -> Vec<&str> {
        registry.pages().iter().map(|p| p.path.as_str()).collect()
    }

    #[test]
    fn test_deep_merge_concatenates_arrays() {
        let mut target = json!({ "pages": [1, 2] });
        deep_merge(&mut target, &json!({ "pages": [2, 3] }));
        assert_eq!(target, json!({ "pages": [1, 2, 2, 3] }));
    }

    #[test]
    fn test_deep_merge_recurses_objects_and_overwrites_scalars() {
        let mut target = json!({ "globalStyle": { "color": "red", "size": 1 }, "easycom": true });
        deep_merge(
            &mut target,
            &json!({ "globalStyle": { "color": "blue", "weight": 2 }, "easycom": false }),
        );
        assert_eq!(
            target,
            json!({ "globalStyle": { "color": "blue", "size": 1, "weight": 2 }, "easycom": false })
        );
    }

    #[test]
    fn test_merge_pages_preserves_order() {
        let mut base = AggregateRegistry::default();
        base.pages = Some(vec![PageConfig::new("index")]);

        let merged = RegistryMerger::new()
            .merge(
                &base,
                &[pages_record("one", &["a", "b"]), pages_record("two", &["c"])],
            )
            .unwrap();

        assert_eq!(page_paths(&merged), vec!["index", "a", "b", "c"]);
    }

    #[test]
    fn test_merge_keeps_duplicate_pages() {
        let merged = RegistryMerger::new()
            .merge(
                &AggregateRegistry::default(),
                &[pages_record("one", &["a"]), pages_record("two", &["a"])],
            )
            .unwrap();
        assert_eq!(page_paths(&merged), vec!["a", "a"]);
    }

    #[test]
    fn test_async_package_names_allow_duplicates() {
        let mut first = ModuleDescriptor::with_pages(vec![]);
        first.setting.sub_packages = Some(vec![
            SubPackageConfig::new("pkgA", vec!["x".into()], true),
            SubPackageConfig::new("pkgB", vec![], false),
        ]);
        let mut second = ModuleDescriptor::with_pages(vec![]);
        second.setting.sub_packages = Some(vec![SubPackageConfig::new("pkgA", vec![], true)]);

        let merged = RegistryMerger::new()
            .merge(
                &AggregateRegistry::default(),
                &[record("one", first), record("two", second)],
            )
            .unwrap();

        assert_eq!(merged.async_package_names(), ["pkgA", "pkgA"]);
        assert_eq!(merged.sub_packages.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn test_async_package_names_initialized_without_sub_packages() {
        let merged = RegistryMerger::new()
            .merge(&AggregateRegistry::default(), &[pages_record("one", &["a"])])
            .unwrap();
        assert_eq!(merged.async_package_names, Some(vec![]));
    }

    #[test]
    fn test_no_contributions_returns_base() {
        let mut base = AggregateRegistry::default();
        base.pages = Some(vec![PageConfig::new("index")]);
        let merged = RegistryMerger::new().merge(&base, &[]).unwrap();
        assert_eq!(merged, base);
    }

    #[test]
    fn test_require_page_modules_gate() {
        let merger = RegistryMerger::new().require_page_modules(true);
        let contributions = [pages_record("one", &["a"])];

        let skipped = merger
            .merge(&AggregateRegistry::default(), &contributions)
            .unwrap();
        assert!(skipped.pages.is_none());

        let mut flagged = AggregateRegistry::default();
        flagged.page_modules = Some([("one".to_string(), true)].into_iter().collect());
        let merged = merger.merge(&flagged, &contributions).unwrap();
        assert_eq!(page_paths(&merged), vec!["a"]);
    }

    #[test]
    fn test_setting_extras_merge_into_registry() {
        let mut descriptor = ModuleDescriptor::with_pages(vec![]);
        descriptor
            .setting
            .extra
            .insert("preloadRule".to_string(), json!({ "pages/a": { "network": "all" } }));

        let merged = RegistryMerger::new()
            .merge(&AggregateRegistry::default(), &[record("one", descriptor)])
            .unwrap();
        assert_eq!(
            merged.extra["preloadRule"],
            json!({ "pages/a": { "network": "all" } })
        );
    }

    #[test]
    fn test_clashing_contribution_is_left_out() {
        let mut clashing = ModuleDescriptor::with_pages(vec![PageConfig::new("b")]);
        clashing
            .setting
            .extra
            .insert("pageModules".to_string(), json!(true));

        let merged = RegistryMerger::new()
            .merge(
                &AggregateRegistry::default(),
                &[pages_record("a", &["a"]), record("b", clashing), pages_record("c", &["c"])],
            )
            .unwrap();

        assert_eq!(page_paths(&merged), vec!["a", "c"]);
        assert!(merged.page_modules.is_none());
    }

    #[test]
    fn test_object_sub_package_pages_in_base_survive() {
        let base = AggregateRegistry::from_json(
            r#"{"subPackages":[{"root":"pkg","pages":[{"path":"detail"}]}]}"#,
        )
        .unwrap();
        let mut descriptor = ModuleDescriptor::with_pages(vec![]);
        descriptor.setting.sub_packages =
            Some(vec![SubPackageConfig::new("pkgA", vec!["x".into()], true)]);

        let merged = RegistryMerger::new()
            .merge(&base, &[record("one", descriptor)])
            .unwrap();

        let sub_packages = merged.sub_packages.unwrap();
        assert_eq!(sub_packages.len(), 2);
        assert_eq!(sub_packages[0]["pages"][0]["path"], "detail");
        assert_eq!(sub_packages[1]["pages"][0], "x");
        assert_eq!(merged.async_package_names.unwrap(), ["pkgA"]);
    }

    #[test]
    fn test_dedup_async_package_names() {
        let mut registry = AggregateRegistry {
            async_package_names: Some(vec!["a".into(), "b".into(), "a".into()]),
            ..Default::default()
        };
        dedup_async_package_names(&mut registry);
        assert_eq!(registry.async_package_names(), ["a", "b"]);
    }
}
