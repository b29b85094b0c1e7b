//! Virtual module importing every module's hook plugins

use crate::modules::api::ModuleRecord;
use crate::plugin::paths::{descriptor_dir, normalize_path, to_slash};
use crate::virtual_module::api::{VirtualModuleOptions, VirtualModuleRuntime};

pub const HOOK_MODULE_ID: &str = "virtual:PageModuleHook/plugins";

/// Source that imports each hook plugin and exports one instance of each
///
/// Hook paths resolve against the directory of the declaring descriptor.
/// Numbering starts at 1 and runs across all records; empty entries are
/// skipped without consuming a number.
pub fn hook_imports_source(records: &[ModuleRecord]) -> String {
    let mut imports = String::new();
    let mut instances = String::new();
    let mut index = 0;

    for record in records {
        let Some(hook_plugins) = &record.descriptor.hook_plugins else {
            continue;
        };
        let base = descriptor_dir(&record.file_path);

        for plugin in hook_plugins {
            if plugin.trim().is_empty() {
                log::warn!("Module '{}' has an empty hook plugin entry", record.key);
                continue;
            }
            index += 1;
            let path = to_slash(&normalize_path(&base.join(plugin)));
            imports.push_str(&format!("import Hook{} from '{}';\n", index, path));
            instances.push_str(&format!("new Hook{}(),", index));
            log::debug!("Added hook plugin {}:{}", record.key, plugin);
        }
    }

    log::info!("Generated {} hook plugins", index);
    format!("{}\nexport default [{}];", imports, instances)
}

pub fn page_module_hook(records: &[ModuleRecord], enable_hmr: bool) -> VirtualModuleRuntime {
    let options =
        VirtualModuleOptions::new(HOOK_MODULE_ID, hook_imports_source(records)).with_hmr(enable_hmr);
    VirtualModuleRuntime::new(options)
}
