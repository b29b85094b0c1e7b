//! Route table virtual module
//!
//! Starts from the optional global route file and lays each module's
//! `route` map over it in merge order, so later modules win on key clashes.

use crate::modules::api::{FileAccess, ModuleRecord};
use crate::virtual_module::api::{VirtualModuleOptions, VirtualModuleRuntime};
use serde_json::{Map, Value};
use std::path::Path;

pub const ROUTE_MODULE_ID: &str = "virtual:PageModuleRoute/route";

/// Merge the global route file and every record's routes
pub fn build_route_table(
    files: &dyn FileAccess,
    global_config: &Path,
    records: &[ModuleRecord],
) -> Map<String, Value> {
    let mut routes = Map::new();

    if files.exists(global_config) {
        let text = files.read_text(global_config).unwrap_or_default();
        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        match serde_json::from_str::<Map<String, Value>>(text) {
            Ok(global) => {
                log::debug!("Loaded global route config {}", global_config.display());
                routes.extend(global);
            }
            Err(e) => log::error!(
                "Ignoring unparsable route config {}: {}",
                global_config.display(),
                e
            ),
        }
    }

    for record in records {
        if let Some(route) = &record.descriptor.route {
            routes.extend(
                route
                    .iter()
                    .map(|(name, target)| (name.clone(), Value::String(target.clone()))),
            );
            log::debug!("Merged routes of module '{}'", record.key);
        }
    }

    log::info!("Generated route table with {} routes", routes.len());
    routes
}

/// `export default <table>;` with the table as indented JSON
pub fn route_module_source(routes: &Map<String, Value>) -> String {
    let json = serde_json::to_string_pretty(routes).unwrap_or_else(|_| "{}".to_string());
    format!("export default {};", json)
}

pub fn page_module_route(
    files: &dyn FileAccess,
    global_config: &Path,
    records: &[ModuleRecord],
    enable_hmr: bool,
) -> VirtualModuleRuntime {
    let routes = build_route_table(files, global_config, records);
    let options =
        VirtualModuleOptions::new(ROUTE_MODULE_ID, route_module_source(&routes)).with_hmr(enable_hmr);
    VirtualModuleRuntime::new(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::api::{MemoryFileAccess, ModuleDescriptor};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn record(key: &str, routes: &[(&str, &str)]) -> ModuleRecord {
        let mut descriptor = ModuleDescriptor::with_pages(vec![]);
        if !routes.is_empty() {
            descriptor.route = Some(
                routes
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<BTreeMap<_, _>>(),
            );
        }
        ModuleRecord {
            descriptor,
            key: key.to_string(),
            file_path: PathBuf::from(format!("/app/src/modules/{}/module.json", key)),
        }
    }

    #[test]
    fn test_later_modules_win() {
        let files = MemoryFileAccess::new();
        files.insert(
            "/app/src/route.config.json",
            r#"{"home":"/pages/index","about":"/pages/about"}"#,
        );

        let routes = build_route_table(
            &files,
            Path::new("/app/src/route.config.json"),
            &[
                record("a", &[("home", "/pages/a")]),
                record("b", &[]),
                record("c", &[("home", "/pages/c"), ("cart", "/pages/cart")]),
            ],
        );

        assert_eq!(routes["home"], "/pages/c");
        assert_eq!(routes["about"], "/pages/about");
        assert_eq!(routes["cart"], "/pages/cart");
    }

    #[test]
    fn test_missing_or_bad_global_file() {
        let files = MemoryFileAccess::new();
        let records = [record("a", &[("home", "/pages/a")])];

        let routes = build_route_table(&files, Path::new("/missing.json"), &records);
        assert_eq!(routes.len(), 1);

        files.insert("/bad.json", "[not an object]");
        let routes = build_route_table(&files, Path::new("/bad.json"), &records);
        assert_eq!(routes["home"], "/pages/a");
    }

    #[test]
    fn test_route_module_content() {
        let files = MemoryFileAccess::new();
        let mut runtime = page_module_route(
            &files,
            Path::new("/none.json"),
            &[record("a", &[("home", "/pages/a")])],
            false,
        );

        let resolved = runtime.resolve_id(ROUTE_MODULE_ID).unwrap();
        assert_eq!(
            runtime.load(&resolved).unwrap(),
            "export default {\n  \"home\": \"/pages/a\"\n};"
        );
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(route_module_source(&Map::new()), "export default {};");
    }
}
