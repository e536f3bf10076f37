use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;

/// File dialogs and file I/O, supplied by the surrounding shell. Only used
/// when a session is loaded or saved.
#[async_trait]
pub trait SessionFiles: Send + Sync {
    /// Ask for a session to open. `None` when the user cancels.
    async fn open_path(&self, default_path: Option<&Path>) -> Option<PathBuf>;

    /// Ask where to save. `None` when the user cancels.
    async fn save_path(&self, default_path: Option<&Path>) -> Option<PathBuf>;

    async fn read_session(&self, path: &Path) -> Result<String>;

    async fn write_session(&self, text: &str, path: &Path) -> Result<()>;
}
