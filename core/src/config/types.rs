use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Options handed to one plugin's `configure`.
pub type PluginOptions = serde_json::Map<String, serde_json::Value>;

/// Side-channel file receiving output of detached remote commands.
pub const DEFAULT_BACKGROUND_LOG: &str = "/tmp/start";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub http_server: HttpServerConfig,

    /// Per-plugin option tables, keyed by plugin name.
    #[serde(default)]
    pub plugins: BTreeMap<String, PluginOptions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "mci_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Remote-shell client binary.
    #[serde(default = "default_remote_program")]
    pub program: String,

    /// Flags prepended to every host's own options.
    #[serde(default)]
    pub default_options: Vec<String>,

    #[serde(default = "default_background_log")]
    pub background_log: String,

    /// Replace the command text with a placeholder when logging invocations.
    #[serde(default)]
    pub redact_command_log: bool,
}

fn default_remote_program() -> String {
    "ssh".to_string()
}

fn default_background_log() -> String {
    DEFAULT_BACKGROUND_LOG.to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            program: default_remote_program(),
            default_options: Vec::new(),
            background_log: default_background_log(),
            redact_command_log: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Log dependency cycles found among undispatched tasks after each scan.
    #[serde(default = "default_detect_cycles")]
    pub detect_cycles: bool,
}

fn default_detect_cycles() -> bool {
    true
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            detect_cycles: default_detect_cycles(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_host")]
    pub host: String,

    #[serde(default = "default_http_port")]
    pub port: u16,
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    8080
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
        }
    }
}
