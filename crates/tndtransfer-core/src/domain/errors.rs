//! Errors - エラー型と分類
//!
//! 全オペレーションは `Result<T, TransferError>` を返します。
//! アップロードは bool、アーカイブ作成は例外、という不揃いな報告方法にはしません。

use std::path::PathBuf;

use super::session::SessionPrefix;
use super::transfer::{FailedUpload, UploadedObject};
use super::ttl::PresignTtl;
use crate::ports::StoreError;

/// ErrorKind はエラーの分類
///
/// # 分類
/// - LocalFilesystem: ローカルの読み込み・走査エラー
/// - Store: Blob store 側のエラー（list/get/put/presign）
/// - InvalidInput: label / prefix / ttl の検証エラー
/// - Archive: ZIP 組み立てのエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LocalFilesystem,
    Store,
    InvalidInput,
    Archive,
}

/// TransferError はドメインエラー
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("invalid label '{0}': labels must be a single non-empty path segment")]
    InvalidLabel(String),

    #[error("invalid prefix '{0}'")]
    InvalidPrefix(String),

    #[error("invalid ttl {0}s: must be between 1 and {max}", max = PresignTtl::MAX_SECS)]
    InvalidTtl(u64),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Some files of a folder upload failed. Objects that did make it are
    /// left in the store.
    #[error(
        "upload under {prefix} incomplete: {} of {} files failed",
        .failed.len(),
        .failed.len() + .uploaded.len()
    )]
    PartialUpload {
        prefix: SessionPrefix,
        uploaded: Vec<UploadedObject>,
        failed: Vec<FailedUpload>,
    },

    /// A local file could not be read part-way through a folder upload.
    /// Nothing after it is attempted; objects already sent stay under `prefix`.
    #[error("upload under {prefix} aborted at {}: {source}", .path.display())]
    UploadAborted {
        prefix: SessionPrefix,
        uploaded: Vec<UploadedObject>,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TransferError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::Io { .. }
            | TransferError::NotADirectory(_)
            | TransferError::UploadAborted { .. } => ErrorKind::LocalFilesystem,
            TransferError::InvalidLabel(_)
            | TransferError::InvalidPrefix(_)
            | TransferError::InvalidTtl(_) => ErrorKind::InvalidInput,
            TransferError::Store(_) | TransferError::PartialUpload { .. } => ErrorKind::Store,
            TransferError::Archive(_) => ErrorKind::Archive,
        }
    }

    /// 途中まで送ったアップロードの prefix（送信済み object の唯一の手がかり）
    pub fn session_prefix(&self) -> Option<&SessionPrefix> {
        match self {
            TransferError::PartialUpload { prefix, .. }
            | TransferError::UploadAborted { prefix, .. } => Some(prefix),
            _ => None,
        }
    }
}
