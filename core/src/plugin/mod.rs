mod context;
mod registry;
mod traits;

pub use context::{ExecutionContext, RepositorySource};
pub use registry::{PluginRegistry, PluginState, Plugins};
pub use traits::{parse_params_into, Command, CommandParams, CommandSpec, Plugin};
