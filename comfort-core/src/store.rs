use std::{fs, io, path::PathBuf};

use tracing::warn;

use crate::config::Config;

/// Keys the application persists under.
pub mod keys {
    pub const THEME: &str = "theme";
    pub const HISTORY: &str = "predictionHistory";
    pub const LAST_LOCATION: &str = "lastLocation";
}

/// File-per-key string store rooted at the platform data directory.
///
/// Persistence is an optimization here, not a correctness requirement:
/// none of the operations return an error. Underlying I/O faults are
/// logged and swallowed, leaving in-memory state as the source of truth.
#[derive(Debug, Clone)]
pub struct KvStore {
    root: PathBuf,
}

impl KvStore {
    /// Open the store at the platform data directory.
    pub fn open() -> anyhow::Result<Self> {
        Ok(Self { root: Config::data_dir()? })
    }

    /// Open a store rooted at an explicit directory.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(key, error = %e, "Failed to read store entry");
                None
            }
        }
    }

    pub fn set(&self, key: &str, value: &str) {
        if let Err(e) = fs::create_dir_all(&self.root) {
            warn!(key, error = %e, "Failed to create store directory");
            return;
        }
        if let Err(e) = fs::write(self.path_for(key), value) {
            warn!(key, error = %e, "Failed to write store entry");
        }
    }

    pub fn remove(&self, key: &str) {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(key, error = %e, "Failed to remove store entry"),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}
