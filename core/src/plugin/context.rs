use serde::{Deserialize, Serialize};

use crate::config::RemoteConfig;
use crate::model::{HostTarget, Patch, Task};
use crate::remote::RemoteCommand;

/// Where a project's source is fetched from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySource {
    pub url: String,
    #[serde(default)]
    pub branch: Option<String>,
}

/// Everything a command needs to run one task on its assigned host.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub task: Task,
    pub host: HostTarget,
    pub remote: RemoteConfig,
    /// Base directory on the host that relative command paths resolve against.
    pub work_dir: String,
    pub repository: Option<RepositorySource>,
    pub patch: Option<Patch>,
}

impl ExecutionContext {
    pub fn new(task: Task, host: HostTarget) -> Self {
        Self {
            task,
            host,
            remote: RemoteConfig::default(),
            work_dir: ".".to_string(),
            repository: None,
            patch: None,
        }
    }

    pub fn with_remote_config(mut self, remote: RemoteConfig) -> Self {
        self.remote = remote;
        self
    }

    pub fn with_work_dir(mut self, work_dir: impl Into<String>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub fn with_repository(mut self, repository: RepositorySource) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn with_patch(mut self, patch: Patch) -> Self {
        self.patch = Some(patch);
        self
    }

    /// Remote command on the task's host with process-wide defaults applied.
    pub fn remote(&self, command: impl Into<String>) -> RemoteCommand {
        RemoteCommand::for_host(&self.host, command).with_config(&self.remote)
    }

    /// `path` joined onto the working directory unless already absolute.
    pub fn resolve_path(&self, path: &str) -> String {
        if path.starts_with('/') || self.work_dir.is_empty() || self.work_dir == "." {
            path.to_string()
        } else {
            format!("{}/{}", self.work_dir.trim_end_matches('/'), path)
        }
    }
}
