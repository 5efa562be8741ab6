//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `mci_core::api` instead of reaching into internal modules.

pub use crate::config::{
    get_mci_data_dir, load_default, load_from_path, AppConfig, HttpServerConfig, LoggingConfig, PluginOptions,
    RemoteConfig, SchedulerConfig,
};
pub use crate::context::{AppContext, PluginsFactory};
pub use crate::error::{CliError, CommandError, PluginError, RemoteCommandError, StoreError};
pub use crate::model::{HostTarget, ModulePatch, Patch, Task, TaskStatus};
pub use crate::plugin::{
    parse_params_into, Command, CommandParams, CommandSpec, ExecutionContext, Plugin,
    PluginRegistry, PluginState, Plugins, RepositorySource,
};
pub use crate::remote::{shell_quote, OutputSink, RemoteCommand, RemotePhase};
pub use crate::scheduler::{DependencyCache, StoreTaskFinder, TaskFinder};
pub use crate::store::{InMemoryTaskStore, TaskStore};
