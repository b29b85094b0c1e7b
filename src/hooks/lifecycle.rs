//! Module lifecycle hooks
//!
//! Five buses cover loading and unloading a module plus error reporting.
//! A [`ModuleHooks`] value is created explicitly and passed to whoever needs
//! it; [`shared_module_hooks`] exists for callers that want one process-wide
//! instance.

use crate::hooks::bus::{HookBus, HookBusOptions, TapMode};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

/// Default tap limit for each lifecycle bus
pub const DEFAULT_MAX_TAPS_PER_HOOK: usize = 50;

/// Payload handed to every lifecycle tap
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LifecycleEvent {
    /// Operation being wrapped, e.g. `loadModule`
    pub method: String,
    pub args: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LifecycleEvent {
    pub fn new(method: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            method: method.into(),
            args,
            result: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModuleHooksOptions {
    pub enable_logging: bool,
    pub max_taps_per_hook: usize,
}

impl Default for ModuleHooksOptions {
    fn default() -> Self {
        Self {
            enable_logging: false,
            max_taps_per_hook: DEFAULT_MAX_TAPS_PER_HOOK,
        }
    }
}

/// Tap counts per lifecycle bus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleHookStats {
    pub before_load: usize,
    pub after_load: usize,
    pub before_unload: usize,
    pub after_unload: usize,
    pub on_error: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookModeCounts {
    pub sync: usize,
    pub async_series: usize,
    pub async_parallel: usize,
}

pub struct ModuleHooks {
    pub before_load: HookBus<LifecycleEvent>,
    pub after_load: HookBus<LifecycleEvent>,
    pub before_unload: HookBus<LifecycleEvent>,
    pub after_unload: HookBus<LifecycleEvent>,
    pub on_error: HookBus<LifecycleEvent>,
}

impl Default for ModuleHooks {
    fn default() -> Self {
        Self::new(ModuleHooksOptions::default())
    }
}

impl ModuleHooks {
    pub fn new(options: ModuleHooksOptions) -> Self {
        let bus = |name: &str| {
            HookBus::with_options(HookBusOptions {
                name: name.to_string(),
                max_taps: options.max_taps_per_hook,
                enable_logging: options.enable_logging,
            })
        };

        let hooks = Self {
            before_load: bus("beforeLoad"),
            after_load: bus("afterLoad"),
            before_unload: bus("beforeUnload"),
            after_unload: bus("afterUnload"),
            on_error: bus("onError"),
        };

        if options.enable_logging {
            log::debug!("Module hook manager initialised");
        }
        hooks
    }

    fn buses(&self) -> [&HookBus<LifecycleEvent>; 5] {
        [
            &self.before_load,
            &self.after_load,
            &self.before_unload,
            &self.after_unload,
            &self.on_error,
        ]
    }

    pub fn clear_all(&self) {
        let total = self.stats().total;
        for bus in self.buses() {
            bus.clear();
        }
        log::debug!("Cleared all module hooks ({} taps)", total);
    }

    pub fn stats(&self) -> ModuleHookStats {
        let before_load = self.before_load.tap_count();
        let after_load = self.after_load.tap_count();
        let before_unload = self.before_unload.tap_count();
        let after_unload = self.after_unload.tap_count();
        let on_error = self.on_error.tap_count();

        ModuleHookStats {
            before_load,
            after_load,
            before_unload,
            after_unload,
            on_error,
            total: before_load + after_load + before_unload + after_unload + on_error,
        }
    }

    /// Per-mode tap counts keyed by bus name
    pub fn detailed_stats(&self) -> BTreeMap<String, HookModeCounts> {
        self.buses()
            .into_iter()
            .map(|bus| {
                (
                    bus.name().to_string(),
                    HookModeCounts {
                        sync: bus.tap_count_by_mode(TapMode::Sync),
                        async_series: bus.tap_count_by_mode(TapMode::AsyncSeries),
                        async_parallel: bus.tap_count_by_mode(TapMode::AsyncParallel),
                    },
                )
            })
            .collect()
    }

    pub fn set_logging(&self, enabled: bool) {
        for bus in self.buses() {
            bus.set_logging(enabled);
        }
        if enabled {
            log::debug!("Module hook logging enabled");
        }
    }
}

static SHARED_MODULE_HOOKS: LazyLock<Arc<ModuleHooks>> = LazyLock::new(|| {
    log::trace!("Initializing shared module hooks");
    Arc::new(ModuleHooks::default())
});

/// Process-wide hook manager for callers that opt into sharing one
///
/// Each call returns the same instance. Nothing in this crate uses it
/// implicitly.
pub fn shared_module_hooks() -> Arc<ModuleHooks> {
    Arc::clone(&SHARED_MODULE_HOOKS)
}
