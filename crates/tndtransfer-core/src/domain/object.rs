//! Objects as seen through a blob-store listing.

use serde::{Deserialize, Serialize};

/// One entry returned by listing a prefix.
///
/// Blob stores have no real directories. Some tools create zero-byte
/// "directory marker" objects whose key ends with `/`; those are listed like
/// any other object and have to be skipped by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
}

impl ObjectEntry {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
        }
    }

    pub fn is_directory_marker(&self) -> bool {
        self.key.ends_with('/')
    }

}

/// Final `/`-separated segment of an object key.
pub fn base_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
