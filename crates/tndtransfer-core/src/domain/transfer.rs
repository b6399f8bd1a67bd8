//! Results of upload and share operations.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::archive::ArchiveKey;
use super::ids::SessionId;
use super::session::SessionPrefix;

/// One file that reached the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedObject {
    pub local_path: PathBuf,
    pub key: String,
    pub bytes: u64,
}

/// One file that could not be pushed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedUpload {
    pub local_path: PathBuf,
    pub key: String,
    pub reason: String,
}

/// A completed folder upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderUpload {
    pub session: SessionId,
    pub prefix: SessionPrefix,
    pub uploaded: Vec<UploadedObject>,
}

impl FolderUpload {
    pub fn total_bytes(&self) -> u64 {
        self.uploaded.iter().map(|o| o.bytes).sum()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.uploaded.iter().map(|o| o.key.as_str())
    }
}

/// A shareable link to a freshly built archive artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveLink {
    pub key: ArchiveKey,
    pub url: String,

    /// Entry names inside the ZIP, in archive order.
    pub entries: Vec<String>,

    /// Size of the ZIP stream in bytes.
    pub size: u64,
}
