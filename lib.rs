//! # memdb
//!
//! In-process hierarchical key-value store. Keys are "/"-delimited paths,
//! values are strings. Supports exact lookup, directory listing, directory
//! removal and round-trip persistence to a flat JSON file.
//!
//! ```rust
//! use memdb::MemoryDb;
//!
//! let db = MemoryDb::new();
//! db.add("users/alice/name", Some("Alice")).unwrap();
//! db.add("users/bob/name", Some("Bob")).unwrap();
//!
//! assert_eq!(db.select("users/alice/name"), Some("Alice".to_string()));
//! assert_eq!(db.list_dir("users").unwrap().len(), 2);
//! ```

pub mod async_wrapper;
pub mod errors;
pub mod keypath;
pub mod metrics;
pub mod options;
pub mod persistence;
pub mod store;
pub mod trie;

pub use async_wrapper::AsyncMemoryDb;
pub use errors::{MemDbError, Result, Status};
pub use keypath::KeyPath;
pub use metrics::MetricItem;
pub use options::MemoryDbOptions;
pub use persistence::{Document, Record};
pub use store::MemoryDb;
