//! Public API for the hook system
//!
//! External modules should import from here rather than directly from
//! internal modules.

pub use crate::hooks::bus::{HookBus, HookBusOptions, TapMode, DEFAULT_MAX_TAPS};
pub use crate::hooks::error::{HookError, HookResult};
pub use crate::hooks::lifecycle::{
    shared_module_hooks, HookModeCounts, LifecycleEvent, ModuleHookStats, ModuleHooks,
    ModuleHooksOptions, DEFAULT_MAX_TAPS_PER_HOOK,
};
pub use crate::hooks::wrap::run_with_lifecycle;
