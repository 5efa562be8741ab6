//! Patch storage consumed by the git plugin.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use mci_core::api::Patch;

#[async_trait]
pub trait PatchStore: Send + Sync {
    async fn find_patch(&self, patch_id: &str) -> anyhow::Result<Option<Patch>>;

    /// Raw contents of a stored patch file.
    async fn find_patch_file(&self, file_id: &str) -> anyhow::Result<Option<String>>;
}

#[derive(Debug, Default)]
pub struct InMemoryPatchStore {
    patches: RwLock<HashMap<String, Patch>>,
    files: RwLock<HashMap<String, String>>,
}

impl InMemoryPatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_patch(&self, patch: Patch) {
        self.patches
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(patch.id.clone(), patch);
    }

    pub fn insert_file(&self, file_id: impl Into<String>, contents: impl Into<String>) {
        self.files
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(file_id.into(), contents.into());
    }
}

#[async_trait]
impl PatchStore for InMemoryPatchStore {
    async fn find_patch(&self, patch_id: &str) -> anyhow::Result<Option<Patch>> {
        Ok(self
            .patches
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(patch_id)
            .cloned())
    }

    async fn find_patch_file(&self, file_id: &str) -> anyhow::Result<Option<String>> {
        Ok(self
            .files
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(file_id)
            .cloned())
    }
}
