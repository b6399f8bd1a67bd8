//! In-memory ZIP packing.
//!
//! The whole archive is assembled in a `Vec<u8>`, so memory use grows with the
//! size of the session being bundled.

use bytes::Bytes;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::domain::TransferError;

/// One file to put into the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub contents: Bytes,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// Collapse entries sharing a name. The later entry replaces the earlier one
/// but keeps its position.
pub fn dedupe_last_wins(entries: Vec<ArchiveEntry>) -> Vec<ArchiveEntry> {
    let mut out: Vec<ArchiveEntry> = Vec::with_capacity(entries.len());
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(entries.len());
    for entry in entries {
        match positions.get(&entry.name) {
            Some(&index) => {
                tracing::warn!(name = %entry.name, "archive entry name collision, keeping the later object");
                out[index] = entry;
            }
            None => {
                positions.insert(entry.name.clone(), out.len());
                out.push(entry);
            }
        }
    }
    out
}

/// Pack `entries` into a Deflate-compressed ZIP stream.
///
/// Names must be unique (see [`dedupe_last_wins`]).
pub fn pack_entries(entries: &[ArchiveEntry]) -> Result<Vec<u8>, TransferError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        zip.start_file(entry.name.as_str(), options)?;
        zip.write_all(&entry.contents)
            .map_err(|e| TransferError::Archive(e.into()))?;
    }

    Ok(zip.finish()?.into_inner())
}
