//! Virtual modules as pipeline plugins

use crate::plugin::error::PluginResult;
use crate::plugin::traits::BuildPlugin;
use crate::virtual_module::api::VirtualModuleRuntime;

#[async_trait::async_trait]
impl BuildPlugin for VirtualModuleRuntime {
    fn name(&self) -> &str {
        self.module_id()
    }

    fn resolve_id(&mut self, id: &str) -> Option<String> {
        VirtualModuleRuntime::resolve_id(self, id)
    }

    fn load(&mut self, id: &str) -> Option<String> {
        VirtualModuleRuntime::load(self, id)
    }

    async fn build_start(&mut self) -> PluginResult<()> {
        VirtualModuleRuntime::build_start(self);
        Ok(())
    }

    async fn build_end(&mut self) -> PluginResult<()> {
        VirtualModuleRuntime::build_end(self);
        Ok(())
    }
}
