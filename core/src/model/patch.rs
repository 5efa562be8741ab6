use serde::{Deserialize, Serialize};

/// A user-submitted change set to apply on top of a task's revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub id: String,

    #[serde(default)]
    pub project: String,

    /// Base revision the patch was made against.
    pub githash: String,

    #[serde(default)]
    pub patches: Vec<ModulePatch>,
}

/// Diff for one module of a project. An empty `name` means the project itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModulePatch {
    #[serde(default)]
    pub name: String,

    pub githash: String,

    /// Unified diff text.
    #[serde(default)]
    pub diff: String,
}

impl ModulePatch {
    pub fn is_empty(&self) -> bool {
        self.diff.trim().is_empty()
    }
}
