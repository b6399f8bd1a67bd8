//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryBlobStore**: 開発・テスト用の Blob store
//! - **S3BlobStore**: aws-sdk-s3 による本番用の Blob store

pub mod inmem_store;
pub mod s3_store;

// 主要な型を再エクスポート
pub use self::inmem_store::InMemoryBlobStore;
pub use self::s3_store::{S3BlobStore, S3Options};
