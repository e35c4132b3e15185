// Construction-time configuration for MemDb

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct MemoryDbOptions {
    /// Backing file for save/load/purge. `None` disables persistence.
    pub storage_path: Option<PathBuf>,
    /// Start with metrics recording switched on.
    pub metrics_enabled: bool,
}

impl MemoryDbOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn storage_path(mut self, path: impl AsRef<Path>) -> Self {
        self.storage_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }
}
