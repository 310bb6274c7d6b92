//! Record storage
//!
//! [`LevelStorage`] is the persistence port. Two backends ship with the
//! crate: a JSON-file-per-owner store and an in-memory store.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::record::LevelRecord;
use crate::error::{LevelError, Result};
use crate::owner::OwnerId;

/// Persistence port for per-owner level records
pub trait LevelStorage: Send + Sync {
    /// Load an owner's record. `Ok(None)` if nothing was ever saved.
    fn load_record(&self, owner: &OwnerId) -> Result<Option<LevelRecord>>;

    /// Write an owner's record, replacing any previous one
    fn save_record(&self, owner: &OwnerId, record: &LevelRecord) -> Result<()>;
}

/// Default location of the `level-data` directory
pub fn default_data_directory() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "terralevel", "Terralevel") {
        let mut path = proj_dirs.data_local_dir().to_path_buf();
        path.push("level-data");
        path
    } else {
        // Fallback to current directory
        PathBuf::from("./level-data")
    }
}

/// One pretty-printed JSON file per owner
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    directory: PathBuf,
}

impl JsonFileStorage {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }

    /// Store under [`default_data_directory`]
    pub fn in_default_directory() -> Self {
        Self::new(default_data_directory())
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// File backing an owner's record
    ///
    /// Bytes outside `[A-Za-z0-9_-]` are percent-encoded, so distinct owner
    /// ids always map to distinct files.
    pub fn record_path(&self, owner: &OwnerId) -> PathBuf {
        self.directory.join(format!("{}.json", encode_file_stem(owner.as_str())))
    }
}

fn encode_file_stem(id: &str) -> String {
    let mut encoded = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

impl LevelStorage for JsonFileStorage {
    fn load_record(&self, owner: &OwnerId) -> Result<Option<LevelRecord>> {
        let path = self.record_path(owner);
        if !path.exists() {
            return Ok(None);
        }

        let data = fs::read_to_string(&path)?;
        let record = serde_json::from_str(&data)?;
        log::debug!("Loaded level data for {} from {:?}", owner, path);
        Ok(Some(record))
    }

    fn save_record(&self, owner: &OwnerId, record: &LevelRecord) -> Result<()> {
        let persistence = |reason: String| LevelError::Persistence {
            owner: owner.to_string(),
            reason,
        };

        fs::create_dir_all(&self.directory).map_err(|e| persistence(e.to_string()))?;

        let path = self.record_path(owner);
        let json = serde_json::to_string_pretty(record).map_err(|e| persistence(e.to_string()))?;
        fs::write(&path, json).map_err(|e| persistence(e.to_string()))?;

        log::debug!("Saved level data for {} to {:?}", owner, path);
        Ok(())
    }
}

/// Records kept in a map, lost on drop
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    records: Mutex<HashMap<OwnerId, LevelRecord>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, as if saved by an earlier process
    pub fn insert(&self, owner: OwnerId, record: LevelRecord) {
        self.records.lock().insert(owner, record);
    }

    /// Copy of the stored record
    pub fn get(&self, owner: &OwnerId) -> Option<LevelRecord> {
        self.records.lock().get(owner).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl LevelStorage for InMemoryStorage {
    fn load_record(&self, owner: &OwnerId) -> Result<Option<LevelRecord>> {
        Ok(self.get(owner))
    }

    fn save_record(&self, owner: &OwnerId, record: &LevelRecord) -> Result<()> {
        self.insert(owner.clone(), record.clone());
        Ok(())
    }
}
