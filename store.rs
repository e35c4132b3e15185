// MemoryDb: the lock-guarded, instrumented front of the trie store
// Every tree operation runs inside exactly one scoped lock acquisition.

use log::debug;
use parking_lot::Mutex;

use crate::errors::{MemDbError, Result};
use crate::keypath::KeyPath;
use crate::metrics::{MetricItem, MetricsRecorder, Timer};
use crate::options::MemoryDbOptions;
use crate::persistence::Storage;
use crate::trie::{normalize_value, TrieStore};

/// In-process hierarchical key-value store.
///
/// Keys are "/"-delimited paths, values are strings. The store is `Send +
/// Sync`; share it between threads with an `Arc`.
#[derive(Debug)]
pub struct MemoryDb {
    tree: Mutex<TrieStore>,
    pub(crate) metrics: MetricsRecorder,
    pub(crate) storage: Option<Storage>,
}

impl Default for MemoryDb {
    fn default() -> Self {
        MemoryDb::new()
    }
}

impl MemoryDb {
    /// Store without persistent storage.
    pub fn new() -> Self {
        Self::with_options(MemoryDbOptions::new())
    }

    /// Store backed by `path` for save/load/purge.
    pub fn with_file(path: impl AsRef<std::path::Path>) -> Self {
        Self::with_options(MemoryDbOptions::new().storage_path(path))
    }

    pub fn with_options(options: MemoryDbOptions) -> Self {
        MemoryDb {
            tree: Mutex::new(TrieStore::new()),
            metrics: MetricsRecorder::new(options.metrics_enabled),
            storage: options.storage_path.map(Storage::new),
        }
    }

    fn reject(&self, timer: Timer, operation: &'static str, key: &str, err: MemDbError) -> MemDbError {
        debug!("{} rejected {:?}: {}", operation, key, err);
        self.metrics.finish(timer, operation, Some(key), 0, "Failed");
        err
    }

    /// Set `key` to `value`. An empty, whitespace-only or missing value
    /// clears the key instead.
    pub fn add(&self, key: &str, value: Option<&str>) -> Result<()> {
        let timer = self.metrics.start();
        let path = match KeyPath::parse(key) {
            Ok(path) => path,
            Err(e) => return Err(self.reject(timer, "Add", key, e)),
        };

        let mut visited = 0;
        self.tree.lock().add(&path, normalize_value(value), &mut visited);

        self.metrics.finish(timer, "Add", Some(key), visited, "Done");
        Ok(())
    }

    /// Exact lookup of the value stored at `key`.
    ///
    /// Only the value is returned, not a `(key, value)` pair: the key would
    /// always be the caller's own argument. `None` covers an invalid key, a
    /// missing path, or a node whose value was cleared.
    pub fn select(&self, key: &str) -> Option<String> {
        let timer = self.metrics.start();
        let path = match KeyPath::parse(key) {
            Ok(path) => path,
            Err(e) => {
                self.reject(timer, "Select", key, e);
                return None;
            }
        };

        let mut visited = 0;
        let value = self.tree.lock().select(&path, &mut visited);

        self.metrics.finish(timer, "Select", Some(key), visited, "Done");
        value
    }

    /// Every key holding a value, in pre-order.
    pub fn list_all(&self) -> Vec<(String, String)> {
        let timer = self.metrics.start();
        let listed = self.tree.lock().list_all();
        self.metrics.finish(timer, "ListAll", None, listed.len(), "Done");
        listed
    }

    /// Every key at or below the directory `key`.
    pub fn list_dir(&self, key: &str) -> Result<Vec<(String, String)>> {
        let timer = self.metrics.start();
        let path = match KeyPath::parse(key) {
            Ok(path) => path,
            Err(e) => return Err(self.reject(timer, "ListDir", key, e)),
        };

        let mut visited = 0;
        let listed = self.tree.lock().list_dir(&path, &mut visited);

        self.metrics.finish(timer, "ListDir", Some(key), visited, "Done");
        Ok(listed)
    }

    pub fn remove_all(&self) {
        let timer = self.metrics.start();
        let mut visited = 0;
        self.tree.lock().remove_all(&mut visited);

        debug!("removed all {} nodes", visited);
        self.metrics.finish(timer, "RemoveAll", None, visited, "Done");
    }

    /// Remove the directory `key` and everything below it. Removing a
    /// path that does not exist succeeds.
    pub fn remove_dir(&self, key: &str) -> Result<()> {
        let timer = self.metrics.start();
        let path = match KeyPath::parse(key) {
            Ok(path) => path,
            Err(e) => return Err(self.reject(timer, "RemoveDir", key, e)),
        };

        let mut visited = 0;
        self.tree.lock().remove_dir(&path, &mut visited);

        debug!("removed directory {:?}", key);
        self.metrics.finish(timer, "RemoveDir", Some(key), visited, "Done");
        Ok(())
    }

    /// Resident nodes, counting valueless directories.
    pub fn node_count(&self) -> usize {
        self.tree.lock().node_count()
    }

    pub fn is_metric_enabled(&self) -> bool {
        self.metrics.is_enabled()
    }

    pub fn enable_metric(&self) {
        self.metrics.enable();
    }

    pub fn disable_metric(&self) {
        self.metrics.disable();
    }

    /// Return every buffered metric and clear the buffer.
    pub fn dump_metrics(&self) -> Vec<MetricItem> {
        self.metrics.drain()
    }
}
