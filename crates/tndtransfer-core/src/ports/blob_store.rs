//! BlobStore port - Blob ストレージ（S3/MinIO/InMemory）
//!
//! BlobStore は `(bucket, key)` で参照される key-value ストアです。
//! ディレクトリの概念はなく、prefix 一致での list だけを提供します。
//!
//! # 実装
//! - **S3BlobStore**: aws-sdk-s3（本番用）
//! - **InMemoryBlobStore**: 開発・テスト用

use async_trait::async_trait;
use bytes::Bytes;

use super::progress::ProgressObserver;
use crate::domain::{ObjectEntry, PresignTtl};

/// StoreError は BlobStore の操作エラー
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("{operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },

    #[error("failed to presign {key}: {message}")]
    Presign { key: String, message: String },

    #[error("presigned url for {key} has expired")]
    Expired { key: String },
}

impl StoreError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }
}

/// BlobStore は外部の object storage への入口
///
/// # 設計原則
/// - list は prefix に何もなければ空の Vec を返す（エラーにしない）
/// - put の進捗は observer に累積バイト数で通知する
/// - presign は key の存在を確認しない（S3 と同じ挙動）
///
/// # Thread Safety
/// - `Send + Sync` を要求（`Arc<dyn BlobStore>` で共有するため）
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// `bytes` を `bucket/key` に書き込む
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        progress: Option<&dyn ProgressObserver>,
    ) -> Result<(), StoreError>;

    /// `prefix` で始まる全 object を key 順で返す
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectEntry>, StoreError>;

    /// object の中身を全てメモリに読み込む
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError>;

    /// `ttl` の間だけ有効な GET 用 URL を発行
    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        ttl: PresignTtl,
    ) -> Result<String, StoreError>;
}
