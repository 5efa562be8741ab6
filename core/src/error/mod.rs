#[allow(clippy::module_inception)]
pub mod error;
pub mod plugin;
pub mod remote;

pub use error::{CliError, StoreError};
pub use plugin::{CommandError, PluginError};
pub use remote::RemoteCommandError;
