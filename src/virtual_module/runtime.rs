//! VirtualModuleRuntime
//!
//! Serves one in-memory source string under a synthetic module id. The host
//! build tool asks [`VirtualModuleRuntime::resolve_id`] for the public id
//! (`virtual:...`) and gets back the internal id (`\0virtual:...`), which it
//! then passes to [`VirtualModuleRuntime::load`].
//!
//! Content problems never break the build. Empty or rejected content is
//! replaced with an empty module; a failing transform falls back to the
//! untransformed content.
//!
//! The host invokes `resolve_id` and `load` sequentially per instance, so
//! both take `&mut self` and the runtime does no locking of its own.

use crate::core::error_handling::{log_error_with_context, BoxError};
use crate::virtual_module::error::ContentError;
use crate::virtual_module::stats::VirtualModuleStats;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Conventional prefix of public virtual module ids
pub const VIRTUAL_PREFIX: &str = "virtual:";

/// Marks an id as not backed by a file
pub const RESOLVED_PREFIX: char = '\0';

/// Served whenever configured content cannot be used
pub const EMPTY_MODULE: &str = "export default {};";

/// Id used when options name no module
pub const DEFAULT_MODULE_ID: &str = "virtual:my-module";

pub const DEFAULT_HMR_CALLBACK: &str =
    r#"console.log("Virtual module updated:", newModule.default)"#;

pub type ContentValidator = Arc<dyn Fn(&str) -> bool + Send + Sync>;
pub type ContentTransform = Arc<dyn Fn(&str) -> Result<String, BoxError> + Send + Sync>;
pub type ModuleCreatedCallback = Arc<dyn Fn(&str) + Send + Sync>;
pub type ModuleLoadedCallback = Arc<dyn Fn(&str, &str) + Send + Sync>;

#[derive(Clone)]
pub struct VirtualModuleOptions {
    pub module_id: String,
    /// `None` serves [`EMPTY_MODULE`]
    pub content: Option<String>,
    pub enable_hmr: bool,
    pub enable_logging: bool,
    /// Code run inside the generated hot-update handler
    pub hmr_callback: String,
    pub validate: Option<ContentValidator>,
    pub transform: Option<ContentTransform>,
    pub on_module_created: Option<ModuleCreatedCallback>,
    pub on_module_loaded: Option<ModuleLoadedCallback>,
}

impl Default for VirtualModuleOptions {
    fn default() -> Self {
        Self {
            module_id: DEFAULT_MODULE_ID.to_string(),
            content: None,
            enable_hmr: false,
            enable_logging: false,
            hmr_callback: DEFAULT_HMR_CALLBACK.to_string(),
            validate: None,
            transform: None,
            on_module_created: None,
            on_module_loaded: None,
        }
    }
}

impl fmt::Debug for VirtualModuleOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualModuleOptions")
            .field("module_id", &self.module_id)
            .field("content", &self.content)
            .field("enable_hmr", &self.enable_hmr)
            .field("enable_logging", &self.enable_logging)
            .field("hmr_callback", &self.hmr_callback)
            .field("validate", &self.validate.is_some())
            .field("transform", &self.transform.is_some())
            .finish_non_exhaustive()
    }
}

impl VirtualModuleOptions {
    pub fn new(module_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn with_hmr(mut self, enabled: bool) -> Self {
        self.enable_hmr = enabled;
        self
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    pub fn with_hmr_callback(mut self, code: impl Into<String>) -> Self {
        self.hmr_callback = code.into();
        self
    }

    pub fn with_validator(
        mut self,
        validate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.validate = Some(Arc::new(validate));
        self
    }

    pub fn with_transform(
        mut self,
        transform: impl Fn(&str) -> Result<String, BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn on_created(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_module_created = Some(Arc::new(callback));
        self
    }

    pub fn on_loaded(mut self, callback: impl Fn(&str, &str) + Send + Sync + 'static) -> Self {
        self.on_module_loaded = Some(Arc::new(callback));
        self
    }
}

/// Hot-update acceptance block appended to served content
pub fn hmr_block(callback: &str) -> String {
    format!(
        "\n\nif (import.meta.hot) {{\n  import.meta.hot.accept(newModule => {{\n    try {{\n      {}\n    }} catch (error) {{\n      console.error('Virtual module HMR callback failed:', error);\n    }}\n  }});\n}}",
        callback
    )
}

pub struct VirtualModuleRuntime {
    options: VirtualModuleOptions,
    resolved_id: String,
    stats: VirtualModuleStats,
}

impl fmt::Debug for VirtualModuleRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualModuleRuntime")
            .field("module_id", &self.options.module_id)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl VirtualModuleRuntime {
    pub fn new(options: VirtualModuleOptions) -> Self {
        let module_id = options.module_id.clone();
        if !module_id.starts_with(VIRTUAL_PREFIX) {
            log::warn!(
                "Virtual module id should start with '{}': {}",
                VIRTUAL_PREFIX,
                module_id
            );
        }

        let initial_length = options
            .content
            .as_deref()
            .unwrap_or(EMPTY_MODULE)
            .chars()
            .count();

        if options.enable_logging {
            log::debug!("Created virtual module {}", module_id);
        }
        if let Some(callback) = &options.on_module_created {
            callback(&module_id);
        }

        Self {
            resolved_id: format!("{}{}", RESOLVED_PREFIX, module_id),
            stats: VirtualModuleStats::new(module_id, initial_length),
            options,
        }
    }

    pub fn module_id(&self) -> &str {
        &self.options.module_id
    }

    pub fn resolved_id(&self) -> &str {
        &self.resolved_id
    }

    /// Replace the served content; counters are kept
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.options.content = Some(content.into());
    }

    /// Resolve the public id to the internal one, `None` for any other id
    pub fn resolve_id(&mut self, id: &str) -> Option<String> {
        if id != self.options.module_id {
            return None;
        }
        let count = self.stats.record_resolve();
        if self.options.enable_logging {
            log::debug!("Resolved virtual module {} ({} times)", id, count);
        }
        Some(self.resolved_id.clone())
    }

    /// Serve content for the internal id, `None` for any other id
    pub fn load(&mut self, id: &str) -> Option<String> {
        if id != self.resolved_id {
            return None;
        }
        let count = self.stats.record_load();
        if self.options.enable_logging {
            log::debug!("Loading virtual module {} ({} times)", self.module_id(), count);
        }

        let served = match self.checked_content() {
            Ok(content) => {
                let mut served = self.transformed(content);
                if self.options.enable_hmr {
                    served.push_str(&hmr_block(&self.options.hmr_callback));
                }
                if let Some(callback) = &self.options.on_module_loaded {
                    callback(&self.options.module_id, &served);
                }
                served
            }
            Err(e) => {
                log_error_with_context(&e, &format!("Loading virtual module {}", self.module_id()));
                EMPTY_MODULE.to_string()
            }
        };

        self.stats.content_length = served.chars().count();
        Some(served)
    }

    fn checked_content(&self) -> Result<&str, ContentError> {
        let content = self.options.content.as_deref().unwrap_or(EMPTY_MODULE);
        if content.is_empty() {
            return Err(ContentError::Empty {
                module_id: self.options.module_id.clone(),
            });
        }
        if let Some(validate) = &self.options.validate {
            if !validate(content) {
                return Err(ContentError::Rejected {
                    module_id: self.options.module_id.clone(),
                });
            }
        }
        Ok(content)
    }

    fn transformed(&self, content: &str) -> String {
        let Some(transform) = &self.options.transform else {
            return content.to_string();
        };
        match transform(content) {
            Ok(output) => {
                if self.options.enable_logging {
                    log::debug!("Transformed virtual module {}", self.module_id());
                }
                output
            }
            Err(source) => {
                let err = ContentError::Transform {
                    module_id: self.options.module_id.clone(),
                    source,
                };
                log::error!("{}; serving untransformed content", err);
                content.to_string()
            }
        }
    }

    pub fn build_start(&self) {
        if self.options.enable_logging {
            log::debug!("Virtual module {} build started", self.module_id());
        }
    }

    pub fn build_end(&self) {
        if self.options.enable_logging {
            log::debug!(
                "Virtual module {} build finished (resolved {}, loaded {}, {} chars)",
                self.module_id(),
                self.stats.resolve_count,
                self.stats.load_count,
                self.stats.content_length
            );
        }
    }

    pub fn stats(&self) -> VirtualModuleStats {
        self.stats.clone()
    }

    /// Statistics as indented JSON, for a dev-server endpoint
    pub fn stats_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.stats)
    }
}

/// One runtime per entry, adding the `virtual:` prefix to bare ids
///
/// A `module_id` set explicitly in the options wins over the map key.
pub fn create_virtual_modules(
    modules: BTreeMap<String, VirtualModuleOptions>,
) -> Vec<VirtualModuleRuntime> {
    modules
        .into_iter()
        .map(|(id, options)| {
            if options.module_id != DEFAULT_MODULE_ID {
                return VirtualModuleRuntime::new(options);
            }
            let module_id = if id.starts_with(VIRTUAL_PREFIX) {
                id
            } else {
                format!("{}{}", VIRTUAL_PREFIX, id)
            };
            VirtualModuleRuntime::new(VirtualModuleOptions {
                module_id,
                ..options
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn runtime(content: &str) -> VirtualModuleRuntime {
        VirtualModuleRuntime::new(VirtualModuleOptions::new("virtual:test", content))
    }

    #[test]
    fn test_resolve_matches_exact_id_only() {
        let mut rt = runtime("export default 1;");

        assert_eq!(rt.resolve_id("virtual:test").as_deref(), Some("\0virtual:test"));
        assert_eq!(rt.resolve_id("virtual:other"), None);
        assert_eq!(rt.resolve_id("virtual:test/extra"), None);
        assert_eq!(rt.resolve_id("virtual:test").as_deref(), Some("\0virtual:test"));

        assert_eq!(rt.stats().resolve_count, 2);
        assert_eq!(rt.stats().load_count, 0);
    }

    #[test]
    fn test_load_requires_resolved_id() {
        let mut rt = runtime("export default 1;");
        assert_eq!(rt.load("virtual:test"), None);
        assert_eq!(rt.stats().load_count, 0);

        assert_eq!(rt.load("\0virtual:test").as_deref(), Some("export default 1;"));
        let stats = rt.stats();
        assert_eq!(stats.load_count, 1);
        assert!(stats.last_loaded.is_some());
        assert_eq!(stats.content_length, "export default 1;".len());
    }

    #[test]
    fn test_default_content_is_empty_module() {
        let mut rt = VirtualModuleRuntime::new(VirtualModuleOptions {
            module_id: "virtual:blank".to_string(),
            ..Default::default()
        });
        assert_eq!(rt.load("\0virtual:blank").as_deref(), Some(EMPTY_MODULE));
    }

    #[test]
    fn test_empty_content_falls_back() {
        let mut rt = runtime("");
        assert_eq!(rt.load("\0virtual:test").as_deref(), Some(EMPTY_MODULE));
        assert_eq!(rt.stats().load_count, 1);
    }

    #[test]
    fn test_rejected_content_falls_back_without_hmr() {
        let mut rt = VirtualModuleRuntime::new(
            VirtualModuleOptions::new("virtual:test", "bad code")
                .with_hmr(true)
                .with_validator(|content| content.starts_with("export")),
        );
        assert_eq!(rt.load("\0virtual:test").as_deref(), Some(EMPTY_MODULE));
    }

    #[test]
    fn test_transform_applied() {
        let mut rt = VirtualModuleRuntime::new(
            VirtualModuleOptions::new("virtual:test", "export default 1;")
                .with_transform(|content| Ok(content.replace('1', "2"))),
        );
        assert_eq!(rt.load("\0virtual:test").as_deref(), Some("export default 2;"));
    }

    #[test]
    fn test_transform_failure_serves_original_content() {
        let mut rt = VirtualModuleRuntime::new(
            VirtualModuleOptions::new("virtual:test", "export default 1;")
                .with_transform(|_| Err("transform exploded".into())),
        );
        assert_eq!(rt.load("\0virtual:test").as_deref(), Some("export default 1;"));
    }

    #[test]
    fn test_hmr_block_appended() {
        let mut rt = VirtualModuleRuntime::new(
            VirtualModuleOptions::new("virtual:test", "export default 1;")
                .with_hmr(true)
                .with_hmr_callback("window.reload()"),
        );
        let served = rt.load("\0virtual:test").unwrap();

        assert!(served.starts_with("export default 1;\n\nif (import.meta.hot) {"));
        assert!(served.contains("import.meta.hot.accept(newModule => {"));
        assert!(served.contains("      window.reload()\n"));
        assert!(served.ends_with("  });\n}"));
        assert_eq!(rt.stats().content_length, served.chars().count());
    }

    #[test]
    fn test_default_hmr_callback() {
        let block = hmr_block(DEFAULT_HMR_CALLBACK);
        assert!(block.contains(r#"console.log("Virtual module updated:", newModule.default)"#));
    }

    #[test]
    fn test_callbacks_fire() {
        let created = Arc::new(Mutex::new(Vec::new()));
        let loaded = Arc::new(Mutex::new(Vec::new()));
        let created_log = created.clone();
        let loaded_log = loaded.clone();

        let mut rt = VirtualModuleRuntime::new(
            VirtualModuleOptions::new("virtual:test", "export default 1;")
                .on_created(move |id| created_log.lock().unwrap().push(id.to_string()))
                .on_loaded(move |id, content| {
                    loaded_log
                        .lock()
                        .unwrap()
                        .push(format!("{}={}", id, content))
                }),
        );
        rt.load("\0virtual:test");

        assert_eq!(*created.lock().unwrap(), vec!["virtual:test"]);
        assert_eq!(
            *loaded.lock().unwrap(),
            vec!["virtual:test=export default 1;"]
        );
    }

    #[test]
    fn test_instances_are_independent() {
        let mut first = runtime("export default 'a';");
        let mut second = VirtualModuleRuntime::new(VirtualModuleOptions::new(
            "virtual:second",
            "export default 'b';",
        ));

        assert_eq!(second.resolve_id("virtual:test"), None);
        assert_eq!(second.load("\0virtual:test"), None);
        assert!(first.resolve_id("virtual:test").is_some());
        assert_eq!(second.stats().resolve_count, 0);
    }

    #[test]
    fn test_set_content_keeps_counters() {
        let mut rt = runtime("export default 1;");
        rt.load("\0virtual:test");
        rt.set_content("export default 2;");
        assert_eq!(rt.load("\0virtual:test").as_deref(), Some("export default 2;"));
        assert_eq!(rt.stats().load_count, 2);
    }

    #[test]
    fn test_stats_json() {
        let mut rt = runtime("export default 1;");
        rt.resolve_id("virtual:test");
        let json: serde_json::Value = serde_json::from_str(&rt.stats_json().unwrap()).unwrap();
        assert_eq!(json["moduleId"], "virtual:test");
        assert_eq!(json["resolveCount"], 1);
    }

    #[test]
    fn test_create_virtual_modules_prefixes_ids() {
        let mut modules = BTreeMap::new();
        modules.insert("routes".to_string(), VirtualModuleOptions::default());
        modules.insert("virtual:hooks".to_string(), VirtualModuleOptions::default());

        let runtimes = create_virtual_modules(modules);
        let ids: Vec<&str> = runtimes.iter().map(|rt| rt.module_id()).collect();
        assert_eq!(ids, vec!["virtual:routes", "virtual:hooks"]);
    }

    #[test]
    fn test_create_virtual_modules_explicit_id_wins() {
        let mut modules = BTreeMap::new();
        modules.insert(
            "routes".to_string(),
            VirtualModuleOptions::new("virtual:PageModuleRoute/route", "export default {};"),
        );

        let runtimes = create_virtual_modules(modules);
        assert_eq!(runtimes[0].module_id(), "virtual:PageModuleRoute/route");
    }
}
