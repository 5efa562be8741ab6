use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::PluginError;
use crate::plugin::Plugins;
use crate::scheduler::StoreTaskFinder;
use crate::store::TaskStore;

/// Builds the sealed plugin table for a configuration.
pub trait PluginsFactory: Send + Sync {
    fn build_plugins(&self, cfg: &AppConfig) -> Result<Plugins, PluginError>;
}

/// Process-wide collaborators, constructed once at startup and passed to the
/// scheduler and API server.
#[derive(Clone)]
pub struct AppContext {
    cfg: AppConfig,
    store: Arc<dyn TaskStore>,
    plugins: Arc<Plugins>,
}

impl AppContext {
    pub fn new(
        cfg: AppConfig,
        store: Arc<dyn TaskStore>,
        factory: &dyn PluginsFactory,
    ) -> Result<Self, PluginError> {
        let plugins = factory.build_plugins(&cfg)?;
        Ok(Self::with_plugins(cfg, store, Arc::new(plugins)))
    }

    pub fn with_plugins(cfg: AppConfig, store: Arc<dyn TaskStore>, plugins: Arc<Plugins>) -> Self {
        Self {
            cfg,
            store,
            plugins,
        }
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.cfg
    }

    pub fn store(&self) -> Arc<dyn TaskStore> {
        self.store.clone()
    }

    pub fn plugins(&self) -> Arc<Plugins> {
        self.plugins.clone()
    }

    pub fn task_finder(&self) -> StoreTaskFinder {
        StoreTaskFinder::from_config(self.store.clone(), &self.cfg.scheduler)
    }
}
