use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router};

use crate::config::PluginOptions;
use crate::error::PluginError;

use super::traits::{Command, CommandSpec, Plugin};

/// Lifecycle of a plugin inside the write-phase registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    Registered,
    Configured,
}

struct Entry {
    plugin: Box<dyn Plugin>,
    state: PluginState,
}

/// Write-phase plugin table, built once at startup.
///
/// Plugins are published and configured here, then [`PluginRegistry::freeze`]
/// turns the table into the read-only [`Plugins`] used while serving.
#[derive(Default)]
pub struct PluginRegistry {
    entries: Vec<Entry>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, plugin: Box<dyn Plugin>) -> Result<(), PluginError> {
        let name = plugin.name().to_string();
        if self.position(&name).is_some() {
            return Err(PluginError::Duplicate(name));
        }

        tracing::debug!(plugin = %name, "plugin registered");
        self.entries.push(Entry {
            plugin,
            state: PluginState::Registered,
        });
        Ok(())
    }

    pub fn configure(&mut self, name: &str, options: &PluginOptions) -> Result<(), PluginError> {
        let idx = self
            .position(name)
            .ok_or_else(|| PluginError::UnknownPlugin(name.to_string()))?;
        configure_entry(&mut self.entries[idx], options)
    }

    /// Configure every registered plugin from its option table. Tables naming
    /// a plugin that was never registered are logged and skipped.
    pub fn configure_all(
        &mut self,
        options: &BTreeMap<String, PluginOptions>,
    ) -> Result<(), PluginError> {
        for name in options.keys() {
            if self.position(name).is_none() {
                tracing::warn!(plugin = %name, "options given for unregistered plugin");
            }
        }

        for entry in &mut self.entries {
            let opts = options
                .get(entry.plugin.name())
                .cloned()
                .unwrap_or_default();
            configure_entry(entry, &opts)?;
        }
        Ok(())
    }

    pub fn state(&self, name: &str) -> Option<PluginState> {
        self.position(name).map(|idx| self.entries[idx].state)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finish the write phase. Plugins not yet configured get empty options;
    /// the first configuration failure aborts.
    pub fn freeze(mut self) -> Result<Plugins, PluginError> {
        let empty = PluginOptions::new();
        for entry in &mut self.entries {
            if entry.state == PluginState::Registered {
                configure_entry(entry, &empty)?;
            }
        }

        let plugins: Vec<Box<dyn Plugin>> = self.entries.into_iter().map(|e| e.plugin).collect();
        tracing::info!(count = plugins.len(), "plugin registry sealed");
        Ok(Plugins { plugins })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.plugin.name() == name)
    }
}

fn configure_entry(entry: &mut Entry, options: &PluginOptions) -> Result<(), PluginError> {
    let name = entry.plugin.name().to_string();
    if entry.state == PluginState::Configured {
        return Err(PluginError::AlreadyConfigured(name));
    }

    entry
        .plugin
        .configure(options)
        .map_err(|source| PluginError::Configure {
            plugin: name.clone(),
            source,
        })?;
    entry.state = PluginState::Configured;
    tracing::debug!(plugin = %name, "plugin configured");
    Ok(())
}

/// Read-only plugin table shared by the scheduler and the API server.
pub struct Plugins {
    plugins: Vec<Box<dyn Plugin>>,
}

impl Plugins {
    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn new_command(
        &self,
        plugin_name: &str,
        command_name: &str,
    ) -> Result<Box<dyn Command>, PluginError> {
        let plugin = self
            .get(plugin_name)
            .ok_or_else(|| PluginError::UnknownPlugin(plugin_name.to_string()))?;
        plugin.new_command(command_name)
    }

    /// Create the command named by `spec` and hand it its parameters.
    pub fn resolve(&self, spec: &CommandSpec) -> Result<Box<dyn Command>, PluginError> {
        let mut command = self.new_command(&spec.plugin, &spec.command)?;
        command.parse_params(&spec.params)?;
        Ok(command)
    }

    /// Every plugin's routes nested under `/<plugin-name>`; anything else is a 404.
    pub fn api_router(&self) -> Router {
        let mut router = Router::new();
        for plugin in &self.plugins {
            if let Some(handler) = plugin.api_handler() {
                tracing::debug!(plugin = plugin.name(), "mounting plugin api");
                router = router.nest(&format!("/{}", plugin.name()), handler);
            }
        }
        router.fallback(not_found)
    }
}

impl std::fmt::Debug for Plugins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugins")
            .field("plugins", &self.names())
            .finish()
    }
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "success": false,
            "error": "not found",
            "error_code": "NOT_FOUND",
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandError;
    use crate::plugin::{CommandParams, ExecutionContext};
    use async_trait::async_trait;

    struct Echo {
        name: &'static str,
    }

    #[async_trait]
    impl Command for Echo {
        fn name(&self) -> &str {
            self.name
        }

        fn plugin(&self) -> &str {
            "echo"
        }

        fn parse_params(&mut self, params: &CommandParams) -> Result<(), CommandError> {
            if params.contains_key("bad") {
                return Err(CommandError::invalid_params(self.name, "bad param"));
            }
            Ok(())
        }

        async fn execute(&self, _ctx: &ExecutionContext) -> Result<(), CommandError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct EchoPlugin {
        fail_configure: bool,
    }

    impl Plugin for EchoPlugin {
        fn name(&self) -> &str {
            "echo"
        }

        fn configure(&mut self, _options: &PluginOptions) -> anyhow::Result<()> {
            if self.fail_configure {
                anyhow::bail!("missing credentials");
            }
            Ok(())
        }

        fn new_command(&self, command_name: &str) -> Result<Box<dyn Command>, PluginError> {
            match command_name {
                "say" => Ok(Box::new(Echo { name: "say" })),
                _ => Err(PluginError::unknown_command(self.name(), command_name)),
            }
        }
    }

    #[test]
    fn duplicate_publish_is_rejected() {
        let mut registry = PluginRegistry::new();
        registry.publish(Box::new(EchoPlugin::default())).unwrap();
        let err = registry
            .publish(Box::new(EchoPlugin::default()))
            .unwrap_err();
        assert!(matches!(err, PluginError::Duplicate(ref n) if n == "echo"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn configure_moves_state_once() {
        let mut registry = PluginRegistry::new();
        registry.publish(Box::new(EchoPlugin::default())).unwrap();
        assert_eq!(registry.state("echo"), Some(PluginState::Registered));

        registry.configure("echo", &PluginOptions::new()).unwrap();
        assert_eq!(registry.state("echo"), Some(PluginState::Configured));

        let err = registry
            .configure("echo", &PluginOptions::new())
            .unwrap_err();
        assert!(matches!(err, PluginError::AlreadyConfigured(_)));
        assert!(matches!(
            registry.configure("nope", &PluginOptions::new()),
            Err(PluginError::UnknownPlugin(_))
        ));
    }

    #[test]
    fn freeze_fails_on_configuration_error() {
        let mut registry = PluginRegistry::new();
        registry
            .publish(Box::new(EchoPlugin {
                fail_configure: true,
            }))
            .unwrap();

        let err = registry.freeze().err().unwrap();
        assert!(matches!(err, PluginError::Configure { ref plugin, .. } if plugin == "echo"));
    }

    #[test]
    fn resolve_passes_params_to_command() {
        let mut registry = PluginRegistry::new();
        registry.publish(Box::new(EchoPlugin::default())).unwrap();
        let plugins = registry.freeze().unwrap();

        let ok = CommandSpec {
            plugin: "echo".into(),
            command: "say".into(),
            params: CommandParams::new(),
        };
        assert_eq!(plugins.resolve(&ok).unwrap().name(), "say");

        let mut bad = ok.clone();
        bad.params.insert("bad".into(), serde_json::Value::Bool(true));
        assert!(matches!(
            plugins.resolve(&bad),
            Err(PluginError::Params(CommandError::InvalidParams { .. }))
        ));
    }
}
