mod load;
mod types;

pub use load::{get_mci_data_dir, load_default, load_from_path};
pub use types::{
    AppConfig, HttpServerConfig, LoggingConfig, PluginOptions, RemoteConfig, SchedulerConfig,
    DEFAULT_BACKGROUND_LOG,
};
