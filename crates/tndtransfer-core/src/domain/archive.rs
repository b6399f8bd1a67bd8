//! Archive artifact naming.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::object::base_name;
use super::session::{SessionLabel, SessionPrefix};

/// Key of an archive artifact: `temp/<label>-<YYYYMMDD_HHMMSS>.zip` (UTC).
///
/// The timestamp keeps two builds for the same label apart, as long as they
/// are at least one second apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchiveKey(String);

impl ArchiveKey {
    pub const FOLDER: &'static str = "temp/";

    pub fn new(label: &SessionLabel, built_at: DateTime<Utc>) -> Self {
        Self(format!(
            "{}{}-{}.zip",
            Self::FOLDER,
            label,
            built_at.format("%Y%m%d_%H%M%S")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How objects are named inside the archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryNaming {
    /// Key relative to the session prefix (`sub/b.txt`). Names never collide.
    #[default]
    RelativePath,

    /// Final path segment only (`b.txt`). Produces a flat archive; when two
    /// objects share a base name the one listed later replaces the other.
    BaseName,
}

impl EntryNaming {
    /// Entry name for `key` listed under `prefix`.
    pub fn entry_name(&self, prefix: &SessionPrefix, key: &str) -> String {
        let relative = prefix.strip(key).unwrap_or(key);
        match self {
            EntryNaming::RelativePath => relative.to_string(),
            EntryNaming::BaseName => base_name(relative).to_string(),
        }
    }
}
