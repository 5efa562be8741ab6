use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dispatch status of a task as recorded by the task store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Undispatched,
    Dispatched,
    Started,
    Success,
    Failed,
    Inactive,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Undispatched => "undispatched",
            TaskStatus::Dispatched => "dispatched",
            TaskStatus::Started => "started",
            TaskStatus::Success => "success",
            TaskStatus::Failed => "failed",
            TaskStatus::Inactive => "inactive",
        }
    }

    /// Only a successful task satisfies its dependents.
    pub fn satisfies_dependents(&self) -> bool {
        matches!(self, TaskStatus::Success)
    }
}

/// A schedulable unit of CI work, owned by the external task store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub project: String,

    #[serde(default)]
    pub revision: String,

    #[serde(default)]
    pub build_variant: String,

    #[serde(default)]
    pub depends_on: Vec<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_id: Option<String>,

    #[serde(default = "Utc::now")]
    pub create_time: DateTime<Utc>,
}

impl Task {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            project: String::new(),
            revision: String::new(),
            build_variant: String::new(),
            depends_on: Vec::new(),
            status: TaskStatus::Undispatched,
            patch_id: None,
            create_time: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_patch(&self) -> bool {
        self.patch_id.is_some()
    }
}
