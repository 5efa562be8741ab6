//! Fetches project source and applies patches with git.

mod api;
mod apply_patch;
mod get_project;

use std::sync::Arc;

use mci_core::api::{Command, Plugin, PluginError, PluginOptions};
use serde::Deserialize;

use crate::patch::PatchStore;

pub use apply_patch::{apply_patch_script, GitApplyPatchCommand};
pub use get_project::{get_project_script, GitGetProjectCommand};

pub const GIT_PLUGIN_NAME: &str = "git";
pub const GET_PROJECT_CMD_NAME: &str = "get_project";
pub const APPLY_PATCH_CMD_NAME: &str = "apply_patch";

pub const GIT_PATCH_PATH: &str = "patch";
pub const GIT_PATCH_FILE_PATH: &str = "patchfile";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitPluginOptions {
    /// Shallow-clone depth for `get_project`; full history when unset.
    #[serde(default)]
    pub clone_depth: Option<u32>,
}

pub struct GitPlugin {
    patches: Arc<dyn PatchStore>,
    options: GitPluginOptions,
}

impl GitPlugin {
    pub fn new(patches: Arc<dyn PatchStore>) -> Self {
        Self {
            patches,
            options: GitPluginOptions::default(),
        }
    }

    pub fn options(&self) -> &GitPluginOptions {
        &self.options
    }
}

impl Plugin for GitPlugin {
    fn name(&self) -> &str {
        GIT_PLUGIN_NAME
    }

    fn configure(&mut self, options: &PluginOptions) -> anyhow::Result<()> {
        self.options = serde_json::from_value(serde_json::Value::Object(options.clone()))?;
        Ok(())
    }

    fn new_command(&self, command_name: &str) -> Result<Box<dyn Command>, PluginError> {
        match command_name {
            GET_PROJECT_CMD_NAME => Ok(Box::new(GitGetProjectCommand::new(
                self.options.clone_depth,
            ))),
            APPLY_PATCH_CMD_NAME => Ok(Box::new(GitApplyPatchCommand::default())),
            _ => Err(PluginError::unknown_command(GIT_PLUGIN_NAME, command_name)),
        }
    }

    fn api_handler(&self) -> Option<axum::Router> {
        Some(api::router(self.patches.clone()))
    }
}
