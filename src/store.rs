//! Durable key-value storage for the notification marker.
//!
//! The gate never touches the filesystem directly; it is handed a
//! [`StateStore`]. Production uses [`FileStore`], a small JSON object on disk.
//! Tests use [`MemoryStore`].

use crate::error::{BulletinError, Result};
use crate::utils::truncate_for_log;
use std::collections::BTreeMap;
#[cfg(test)]
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, instrument, warn};

/// Key under which the last notification date (`YYYY-MM-DD`) is stored.
pub const LAST_NOTIFICATION_KEY: &str = "lastNotificationDate";

/// Get/set string values by key.
pub trait StateStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store; contents are lost on drop.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(key: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.values.insert(key.to_string(), value.to_string());
        store
    }
}

#[cfg(test)]
impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A JSON object file holding string values.
///
/// Every `set` rewrites the whole file through a sibling temp file and a
/// rename, so a reader never sees a half-written state.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the whole file. A missing, empty or unparseable file reads as empty;
    /// the next `set` replaces it.
    fn load(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(values) => Ok(values),
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        error = %e,
                        contents = %truncate_for_log(&raw, 200),
                        "state file is corrupt; treating it as empty"
                    );
                    Ok(BTreeMap::new())
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(BulletinError::Store(e)),
        }
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    #[instrument(level = "debug", skip(self, value), fields(path = %self.path.display()))]
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(BulletinError::Store)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&values)?).map_err(BulletinError::Store)?;
        fs::rename(&tmp, &self.path).map_err(BulletinError::Store)?;
        debug!("state persisted");
        Ok(())
    }
}
