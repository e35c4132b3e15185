// Key parsing for MemDb
// Keys are "/"-delimited paths; empty segments are legal and significant

use crate::errors::{MemDbError, Result};

pub const SEPARATOR: char = '/';

/// A validated key split into its segments.
///
/// `"a/b/c"` has segments `["a", "b", "c"]`, `"/a/"` has `["", "a", ""]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath<'a> {
    raw: &'a str,
    segments: Vec<&'a str>,
}

impl<'a> KeyPath<'a> {
    /// Parse a key, rejecting empty and whitespace-only keys.
    pub fn parse(key: &'a str) -> Result<Self> {
        if key.trim().is_empty() {
            return Err(MemDbError::InvalidKey);
        }

        Ok(KeyPath {
            raw: key,
            segments: key.split(SEPARATOR).collect(),
        })
    }

    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }
}
