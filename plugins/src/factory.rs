use std::sync::Arc;

use mci_core::api::{AppConfig, PluginError, PluginRegistry, Plugins, PluginsFactory};

use crate::git::GitPlugin;
use crate::patch::{InMemoryPatchStore, PatchStore};
use crate::shell::ShellPlugin;

/// Registry holding every built-in plugin, not yet configured.
pub fn builtin_registry(patches: Arc<dyn PatchStore>) -> Result<PluginRegistry, PluginError> {
    let mut registry = PluginRegistry::new();
    registry.publish(Box::new(GitPlugin::new(patches)))?;
    registry.publish(Box::new(ShellPlugin::new()))?;
    Ok(registry)
}

/// Builds the sealed built-in plugin table from configuration.
pub struct BuiltinPluginsFactory {
    patches: Arc<dyn PatchStore>,
}

impl BuiltinPluginsFactory {
    pub fn new(patches: Arc<dyn PatchStore>) -> Self {
        Self { patches }
    }
}

impl Default for BuiltinPluginsFactory {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryPatchStore::new()))
    }
}

impl PluginsFactory for BuiltinPluginsFactory {
    fn build_plugins(&self, cfg: &AppConfig) -> Result<Plugins, PluginError> {
        let mut registry = builtin_registry(self.patches.clone())?;
        registry.configure_all(&cfg.plugins)?;
        registry.freeze()
    }
}
