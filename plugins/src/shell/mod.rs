//! Runs arbitrary scripts on the task host.

mod exec;

use mci_core::api::{Command, Plugin, PluginError, PluginOptions};
use serde::Deserialize;

pub use exec::ShellExecCommand;

pub const SHELL_PLUGIN_NAME: &str = "shell";
pub const EXEC_CMD_NAME: &str = "exec";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShellPluginOptions {
    /// Interpreter that runs a detached script under `nohup`.
    #[serde(default = "default_shell")]
    pub shell: String,
}

fn default_shell() -> String {
    "sh".to_string()
}

impl Default for ShellPluginOptions {
    fn default() -> Self {
        Self {
            shell: default_shell(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ShellPlugin {
    options: ShellPluginOptions,
}

impl ShellPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for ShellPlugin {
    fn name(&self) -> &str {
        SHELL_PLUGIN_NAME
    }

    fn configure(&mut self, options: &PluginOptions) -> anyhow::Result<()> {
        let parsed: ShellPluginOptions =
            serde_json::from_value(serde_json::Value::Object(options.clone()))?;
        if parsed.shell.trim().is_empty() {
            anyhow::bail!("shell must not be empty");
        }
        self.options = parsed;
        Ok(())
    }

    fn new_command(&self, command_name: &str) -> Result<Box<dyn Command>, PluginError> {
        match command_name {
            EXEC_CMD_NAME => Ok(Box::new(ShellExecCommand::new(self.options.shell.clone()))),
            _ => Err(PluginError::unknown_command(SHELL_PLUGIN_NAME, command_name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_shell_is_a_configuration_error() {
        let mut plugin = ShellPlugin::new();
        let opts: PluginOptions = serde_json::from_str(r#"{"shell":" "}"#).unwrap();
        assert!(plugin.configure(&opts).is_err());
        plugin.configure(&PluginOptions::new()).unwrap();
        assert!(plugin.api_handler().is_none());
    }
}
