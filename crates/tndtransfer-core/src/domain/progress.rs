//! Transfer progress events.

use serde::{Deserialize, Serialize};

/// Cumulative progress of one object upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferProgress {
    pub key: String,

    /// Bytes pushed so far for this key (cumulative, not per chunk).
    pub bytes_transferred: u64,

    pub total_bytes: u64,
}

impl TransferProgress {
    pub fn is_complete(&self) -> bool {
        self.bytes_transferred >= self.total_bytes
    }
}
