use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, instrument, warn};

use super::KeyValueStore;
use crate::error::StoreError;

/// Key-value store persisted as a single JSON object.
///
/// The file is re-read on every access and rewritten on every mutation, so
/// two handles on the same path always agree. A missing file is an empty store.
/// A file that does not decode reads as `CorruptSessionData`; the next write
/// replaces it.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| StoreError::CorruptSessionData(format!("{}: {}", self.path.display(), e))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Current entries for a mutation, plus whether an undecodable file was
    /// dropped and must be rewritten.
    fn read_for_write(&self) -> Result<(BTreeMap<String, String>, bool), StoreError> {
        match self.read_all() {
            Ok(entries) => Ok((entries, false)),
            Err(StoreError::CorruptSessionData(reason)) => {
                warn!(%reason, "Replacing undecodable store file");
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries).map_err(|e| StoreError::Encode(e.to_string()))?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        debug!("Reading key");
        Ok(self.read_all()?.remove(key))
    }

    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        debug!("Writing key");
        let (mut entries, _) = self.read_for_write()?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries)
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        debug!("Removing key");
        let (mut entries, reset) = self.read_for_write()?;
        if entries.remove(key).is_some() || reset {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}
