//! Session label and key prefix.
//!
//! Every object uploaded in one transfer session lives under the same key
//! prefix: `"<uuid>/"` or `"<uuid>/<label>/"`. The prefix is the only handle a
//! caller gets back; there is no persisted session record.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::TransferError;
use super::ids::SessionId;

/// A human-readable label attached to a session prefix or an archive name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionLabel(String);

impl SessionLabel {
    /// Parse a label.
    ///
    /// Surrounding whitespace and `/` are trimmed. Returns `Ok(None)` when
    /// nothing is left, and `InvalidLabel` when the label would introduce an
    /// extra path segment.
    pub fn parse(raw: &str) -> Result<Option<Self>, TransferError> {
        let trimmed = raw.trim().trim_matches('/').trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
            return Err(TransferError::InvalidLabel(raw.to_string()));
        }
        Ok(Some(Self(trimmed.to_string())))
    }

    /// Like [`SessionLabel::parse`], but an empty label is an error.
    pub fn required(raw: &str) -> Result<Self, TransferError> {
        Self::parse(raw)?.ok_or_else(|| TransferError::InvalidLabel(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key prefix shared by all objects of one session. Always ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionPrefix(String);

impl SessionPrefix {
    /// Build the prefix for a freshly generated session.
    pub fn for_session(id: &SessionId, label: Option<&SessionLabel>) -> Self {
        match label {
            Some(label) => Self(format!("{id}/{label}/")),
            None => Self(format!("{id}/")),
        }
    }

    /// Accept a prefix handed back by a caller, appending the trailing `/` if
    /// it was dropped along the way.
    pub fn parse(raw: &str) -> Result<Self, TransferError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().all(|c| c == '/') {
            return Err(TransferError::InvalidPrefix(raw.to_string()));
        }
        if trimmed.ends_with('/') {
            Ok(Self(trimmed.to_string()))
        } else {
            Ok(Self(format!("{trimmed}/")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full object key for a `/`-separated path relative to this prefix.
    pub fn key_for(&self, relative_path: &str) -> String {
        format!("{}{}", self.0, relative_path.trim_start_matches('/'))
    }

    /// The part of `key` after this prefix, if `key` belongs to it.
    pub fn strip<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.0.as_str())
    }
}

impl fmt::Display for SessionPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
