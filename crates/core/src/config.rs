use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    error::{Result, ReviewError},
    resolver::OverlapPolicy,
};

pub const SESSION_EXTENSION: &str = "jsonl";

pub const SESSION_DIR_VAR: &str = "KMREVIEW_SESSION_DIR";
pub const FETCH_TIMEOUT_VAR: &str = "KMREVIEW_FETCH_TIMEOUT_SECS";
pub const OVERLAP_POLICY_VAR: &str = "KMREVIEW_OVERLAP_POLICY";

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewConfig {
    /// Where open/save start when no path has been chosen yet.
    pub session_dir: PathBuf,
    pub fetch_timeout: Duration,
    pub overlap_policy: OverlapPolicy,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            session_dir: default_session_dir(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            overlap_policy: OverlapPolicy::default(),
        }
    }
}

impl ReviewConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset or blank values fall
    /// back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(dir) = get(SESSION_DIR_VAR) {
            config.session_dir = PathBuf::from(dir);
        }

        if let Some(secs) = get(FETCH_TIMEOUT_VAR) {
            let secs: u64 = secs.trim().parse().map_err(|_| ReviewError::Config {
                reason: format!("{FETCH_TIMEOUT_VAR} must be a whole number of seconds, got {secs:?}"),
            })?;
            config.fetch_timeout = Duration::from_secs(secs);
        }

        if let Some(policy) = get(OVERLAP_POLICY_VAR) {
            config.overlap_policy = policy.parse()?;
        }

        Ok(config)
    }
}

/// The user's documents directory, or the working directory without one.
pub fn default_session_dir() -> PathBuf {
    dirs::document_dir().unwrap_or_else(|| PathBuf::from("."))
}

pub fn is_session_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(SESSION_EXTENSION))
}
