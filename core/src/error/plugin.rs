use thiserror::Error;

use super::remote::RemoteCommandError;

/// Registry and dispatch-resolution failures.
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("plugin '{0}' is already registered")]
    Duplicate(String),

    #[error("unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("unknown command: {command} (plugin '{plugin}')")]
    UnknownCommand { plugin: String, command: String },

    #[error("plugin '{0}' is already configured")]
    AlreadyConfigured(String),

    #[error("failed to configure plugin '{plugin}': {source}")]
    Configure {
        plugin: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Params(#[from] CommandError),
}

impl PluginError {
    /// Shorthand used by plugin factories when a command kind is not recognised.
    pub fn unknown_command(plugin: &str, command: &str) -> Self {
        Self::UnknownCommand {
            plugin: plugin.to_string(),
            command: command.to_string(),
        }
    }
}

/// Failures raised while a command parses its parameters or executes.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("invalid parameters for {command}: {reason}")]
    InvalidParams { command: String, reason: String },

    #[error("{command} failed: {source}")]
    Remote {
        command: String,
        #[source]
        source: RemoteCommandError,
    },

    #[error("{command} failed: {reason}")]
    Failed { command: String, reason: String },
}

impl CommandError {
    pub fn invalid_params(command: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            command: command.to_string(),
            reason: reason.into(),
        }
    }

    pub fn remote(command: &str, source: RemoteCommandError) -> Self {
        Self::Remote {
            command: command.to_string(),
            source,
        }
    }
}
