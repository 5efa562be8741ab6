use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::PluginOptions;
use crate::error::{CommandError, PluginError};

use super::context::ExecutionContext;

/// Parameters attached to one command in a task's command list.
pub type CommandParams = serde_json::Map<String, serde_json::Value>;

/// One entry of a task's command list, naming the plugin that provides it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub plugin: String,
    pub command: String,
    #[serde(default)]
    pub params: CommandParams,
}

/// A unit of task logic, manufactured by a [`Plugin`].
#[async_trait]
pub trait Command: Send + Sync {
    /// Command-kind name this instance was created for.
    fn name(&self) -> &str;

    /// Name of the plugin that produced it.
    fn plugin(&self) -> &str;

    fn parse_params(&mut self, params: &CommandParams) -> Result<(), CommandError>;

    async fn execute(&self, ctx: &ExecutionContext) -> Result<(), CommandError>;
}

/// A named provider of commands and, optionally, of HTTP routes.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    /// Called once before the plugin starts serving.
    fn configure(&mut self, options: &PluginOptions) -> anyhow::Result<()>;

    fn new_command(&self, command_name: &str) -> Result<Box<dyn Command>, PluginError>;

    /// Routes mounted under `/<plugin-name>` by the API server.
    fn api_handler(&self) -> Option<axum::Router> {
        None
    }
}

/// Deserialize `params` into a command's typed parameter struct.
pub fn parse_params_into<T: DeserializeOwned>(
    command: &str,
    params: &CommandParams,
) -> Result<T, CommandError> {
    serde_json::from_value(serde_json::Value::Object(params.clone()))
        .map_err(|e| CommandError::invalid_params(command, e.to_string()))
}
