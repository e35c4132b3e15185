// Async wrapper for MemoryDb
// Runs each blocking operation on tokio's blocking pool

use std::io;
use std::sync::Arc;

use tokio::task;

use crate::errors::{IoContext, Result, Status};
use crate::metrics::MetricItem;
use crate::store::MemoryDb;

/// Async wrapper around the synchronous MemoryDb.
/// Uses tokio::task::spawn_blocking so lock waits and file I/O never stall
/// the runtime.
#[derive(Debug, Clone)]
pub struct AsyncMemoryDb {
    inner: Arc<MemoryDb>,
}

fn join_error(e: task::JoinError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}

impl AsyncMemoryDb {
    pub fn new(db: MemoryDb) -> Self {
        AsyncMemoryDb { inner: Arc::new(db) }
    }

    pub fn from_arc(db: Arc<MemoryDb>) -> Self {
        AsyncMemoryDb { inner: db }
    }

    /// The wrapped store, for synchronous access.
    pub fn inner(&self) -> &Arc<MemoryDb> {
        &self.inner
    }

    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&MemoryDb) -> T + Send + 'static,
    {
        let db = self.inner.clone();
        task::spawn_blocking(move || op(&db))
            .await
            .map_err(join_error)
            .io_context("joining blocking task")
    }

    /// Set a key asynchronously
    pub async fn add(&self, key: &str, value: Option<&str>) -> Result<()> {
        let key = key.to_string();
        let value = value.map(str::to_string);
        self.run(move |db| db.add(&key, value.as_deref())).await?
    }

    /// Get a value by key asynchronously
    pub async fn select(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.run(move |db| db.select(&key)).await
    }

    pub async fn list_all(&self) -> Result<Vec<(String, String)>> {
        self.run(|db| db.list_all()).await
    }

    pub async fn list_dir(&self, key: &str) -> Result<Vec<(String, String)>> {
        let key = key.to_string();
        self.run(move |db| db.list_dir(&key)).await?
    }

    pub async fn remove_all(&self) -> Result<()> {
        self.run(|db| db.remove_all()).await
    }

    /// Delete an entire directory asynchronously
    pub async fn remove_dir(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.run(move |db| db.remove_dir(&key)).await?
    }

    pub async fn save(&self, key: &str) -> Result<Status> {
        let key = key.to_string();
        self.run(move |db| db.save(&key)).await
    }

    pub async fn load_all(&self, replace: bool) -> Result<Status> {
        self.run(move |db| db.load_all(replace)).await
    }

    pub async fn load(&self, replace: bool, key: &str) -> Result<Status> {
        let key = key.to_string();
        self.run(move |db| db.load(replace, &key)).await
    }

    pub async fn purge(&self, key: &str) -> Result<Status> {
        let key = key.to_string();
        self.run(move |db| db.purge(&key)).await
    }

    /// Batch add - multiple adds in a single blocking call
    pub async fn batch_add(&self, entries: Vec<(String, String)>) -> Result<()> {
        self.run(move |db| -> Result<()> {
            for (key, value) in entries {
                db.add(&key, Some(value.as_str()))?;
            }
            Ok(())
        })
        .await?
    }

    /// Batch select - multiple lookups in a single blocking call
    pub async fn batch_select(&self, keys: Vec<String>) -> Result<Vec<Option<String>>> {
        self.run(move |db| keys.iter().map(|k| db.select(k)).collect()).await
    }

    pub fn dump_metrics(&self) -> Vec<MetricItem> {
        self.inner.dump_metrics()
    }
}
