use thiserror::Error;

use super::plugin::{CommandError, PluginError};
use super::remote::RemoteCommandError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("plugin error: {0}")]
    Plugin(#[from] PluginError),
    #[error("command failed: {0}")]
    Command(#[from] CommandError),
    #[error("remote command failed: {0}")]
    Remote(#[from] RemoteCommandError),
    #[error("server error: {0}")]
    Server(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Failures reported by the durable task store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("task store unavailable: {0}")]
    Unavailable(String),
    #[error("query failed: {0}")]
    Query(String),
    #[error("malformed task record: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
