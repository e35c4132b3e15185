// Flat-file persistence for MemDb
// The file holds one JSON document with an ordered list of key/value records.
// Save/load/purge reach the tree only through MemoryDb::select and
// MemoryDb::add; file I/O happens outside the tree lock, under the storage
// lock instead.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

use crate::errors::{IoContext, MemDbError, Result, Status};
use crate::keypath::KeyPath;
use crate::metrics::replace_comment;
use crate::store::MemoryDb;

/// One flattened key/value pair as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "VariableName", default)]
    pub records: Vec<Record>,
}

/// Backing file plus the lock that serializes every read-modify-write on it.
/// Always taken before the tree lock, never while holding it.
#[derive(Debug)]
pub(crate) struct Storage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Storage {
    pub(crate) fn new(path: PathBuf) -> Self {
        Storage {
            path,
            lock: Mutex::new(()),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock()
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// The path is set, the file exists (created if needed) and opens for
    /// reading and writing.
    pub(crate) fn is_available(&self) -> bool {
        if self.path.as_os_str().is_empty() {
            return false;
        }

        if !self.path.exists() {
            if let Err(e) = File::create(&self.path) {
                debug!("cannot create storage file {}: {}", self.path.display(), e);
                return false;
            }
        }

        match OpenOptions::new().read(true).write(true).open(&self.path) {
            Ok(_) => true,
            Err(e) => {
                debug!("cannot open storage file {}: {}", self.path.display(), e);
                false
            }
        }
    }

    /// `None` when the file is empty or whitespace-only.
    pub(crate) fn read(&self) -> Result<Option<Document>> {
        let data = fs::read_to_string(&self.path).io_context("reading storage file")?;
        if data.trim().is_empty() {
            return Ok(None);
        }

        let document = serde_json::from_str(&data).map_err(|e| {
            warn!("malformed storage file {}: {}", self.path.display(), e);
            MemDbError::from(e)
        })?;
        Ok(Some(document))
    }

    /// Replace the whole file with `document`.
    pub(crate) fn write(&self, document: &Document) -> Result<()> {
        let data = serde_json::to_string(document)?;
        fs::write(&self.path, data).io_context("writing storage file")
    }
}

impl MemoryDb {
    pub fn is_persistent_storage_enabled(&self) -> bool {
        self.storage.as_ref().map_or(false, Storage::is_available)
    }

    fn storage(&self) -> Result<&Storage> {
        match &self.storage {
            Some(storage) if storage.is_available() => Ok(storage),
            _ => Err(MemDbError::StorageUnavailable),
        }
    }

    /// Persist the current in-memory value of `key`.
    ///
    /// A record identical in both key and value is never written twice; a
    /// new value for an already saved key is appended as another record.
    pub fn save(&self, key: &str) -> Status {
        let timer = self.metrics.start();
        let mut processed = 0;
        let result = self.try_save(key, &mut processed);

        let comment = if result.is_ok() { "Done" } else { "Failed" };
        self.metrics.finish(timer, "Save", Some(key), processed, comment);
        result.into()
    }

    fn try_save(&self, key: &str, processed: &mut usize) -> Result<&'static str> {
        KeyPath::parse(key)?;
        let storage = self.storage()?;
        let _file = storage.lock();
        let mut document = storage.read()?.unwrap_or_default();

        let value = self
            .select(key)
            .ok_or_else(|| MemDbError::VariableNotFound { key: key.to_string() })?;

        *processed = document.records.len();
        let duplicate = document
            .records
            .iter()
            .any(|r| r.key == key && r.value == value);

        if !duplicate {
            document.records.push(Record {
                key: key.to_string(),
                value,
            });
            storage.write(&document)?;
            info!("saved {:?} to {}", key, storage.path().display());
        }

        Ok("Variable is saved")
    }

    /// Load every persisted record. Without `replace`, keys that already
    /// hold a value in memory keep it.
    pub fn load_all(&self, replace: bool) -> Status {
        let timer = self.metrics.start();
        let mut processed = 0;
        let result = self.try_load_all(replace, &mut processed);

        let comment = replace_comment(result.is_ok(), replace);
        self.metrics.finish(timer, "LoadAll", None, processed, comment);
        result.into()
    }

    fn try_load_all(&self, replace: bool, processed: &mut usize) -> Result<&'static str> {
        let storage = self.storage()?;
        let document = {
            let _file = storage.lock();
            storage.read()?.ok_or(MemDbError::EmptyFile)?
        };

        for record in &document.records {
            *processed += 1;
            if !replace && self.select(&record.key).is_some() {
                continue;
            }
            if let Err(e) = self.add(&record.key, Some(record.value.as_str())) {
                warn!("skipping stored record {:?}: {}", record.key, e);
            }
        }

        info!("loaded {} records from {}", processed, storage.path().display());
        Ok("Variables are loaded")
    }

    /// Load the first persisted record for `key`. Without `replace`, a key
    /// that already holds a value is a conflict.
    pub fn load(&self, replace: bool, key: &str) -> Status {
        let timer = self.metrics.start();
        let mut processed = 0;
        let result = self.try_load(replace, key, &mut processed);

        let comment = replace_comment(result.is_ok(), replace);
        self.metrics.finish(timer, "Load", Some(key), processed, comment);
        result.into()
    }

    fn try_load(&self, replace: bool, key: &str, processed: &mut usize) -> Result<&'static str> {
        KeyPath::parse(key)?;
        let storage = self.storage()?;
        let document = {
            let _file = storage.lock();
            storage.read()?.ok_or(MemDbError::EmptyFile)?
        };

        *processed = document.records.len();
        let record = document
            .records
            .iter()
            .find(|r| r.key == key)
            .ok_or_else(|| MemDbError::RecordNotFound { key: key.to_string() })?;

        if !replace && self.select(key).is_some() {
            return Err(MemDbError::Conflict { key: key.to_string() });
        }

        self.add(&record.key, Some(record.value.as_str()))?;
        Ok("Variable is loaded")
    }

    /// Delete the first persisted record for `key`. Memory is untouched.
    pub fn purge(&self, key: &str) -> Status {
        let timer = self.metrics.start();
        let mut processed = 0;
        let result = self.try_purge(key, &mut processed);

        let comment = if result.is_ok() { "Done" } else { "Failed" };
        self.metrics.finish(timer, "Purge", Some(key), processed, comment);
        result.into()
    }

    fn try_purge(&self, key: &str, processed: &mut usize) -> Result<&'static str> {
        KeyPath::parse(key)?;
        let storage = self.storage()?;
        let _file = storage.lock();
        let mut document = storage.read()?.ok_or(MemDbError::EmptyFile)?;

        *processed = document.records.len();
        let idx = document
            .records
            .iter()
            .position(|r| r.key == key)
            .ok_or_else(|| MemDbError::NotInFile { key: key.to_string() })?;

        document.records.remove(idx);
        storage.write(&document)?;
        info!("purged {:?} from {}", key, storage.path().display());
        Ok("Variable is purged from file")
    }
}
