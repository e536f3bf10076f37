use std::path::{Path, PathBuf};

use async_trait::async_trait;
use kmreview_core::{ReviewError, config::is_session_file};
use log::debug;
use tokio::fs;

/// Stands in for the open/save dialogs: paths come from the command line,
/// and without one the newest session file in the default directory is used.
pub struct LocalFiles {
    session: Option<PathBuf>,
    output: Option<PathBuf>,
}

impl LocalFiles {
    pub fn new(session: Option<PathBuf>, output: Option<PathBuf>) -> Self {
        Self { session, output }
    }

    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }
}

async fn newest_session_in(dir: &Path) -> Option<PathBuf> {
    let mut entries = fs::read_dir(dir).await.ok()?;
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;

    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if !is_session_file(&path) {
            continue;
        }
        let Ok(modified) = entry.metadata().await.and_then(|m| m.modified()) else {
            continue;
        };
        if newest.as_ref().is_none_or(|(time, _)| modified > *time) {
            newest = Some((modified, path));
        }
    }

    newest.map(|(_, path)| path)
}

#[async_trait]
impl kmreview_core::SessionFiles for LocalFiles {
    async fn open_path(&self, default_path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = &self.session {
            return Some(path.clone());
        }
        let dir = default_path?;
        let found = newest_session_in(dir).await;
        debug!("picked {found:?} from {}", dir.display());
        found
    }

    async fn save_path(&self, default_path: Option<&Path>) -> Option<PathBuf> {
        self.output
            .clone()
            .or_else(|| default_path.map(Path::to_path_buf))
    }

    async fn read_session(&self, path: &Path) -> kmreview_core::Result<String> {
        match fs::read_to_string(path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ReviewError::SessionNotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_session(&self, text: &str, path: &Path) -> kmreview_core::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, text).await?;
        Ok(())
    }
}
