//! tndtransfer-core
//!
//! Folder upload and share-link building on top of an S3-compatible blob store.
//!
//! # モジュール構成
//! - **domain**: 値オブジェクト（SessionId, SessionPrefix, PresignTtl, ArchiveKey, errors）
//! - **ports**: 抽象化レイヤー（BlobStore, Clock, IdGenerator, ProgressObserver）
//! - **impls**: 実装（S3BlobStore, 開発・テスト用の InMemoryBlobStore）
//! - **app**: アプリケーションロジック（AppBuilder, TransferUploader, ShareLinkBuilder）
//! - **config**: 環境変数 / `.env` からの設定読み込み
//!
//! # Example
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use tndtransfer_core::app::AppBuilder;
//! use tndtransfer_core::domain::SessionLabel;
//! use tndtransfer_core::impls::InMemoryBlobStore;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let app = AppBuilder::new()
//!     .store(Arc::new(InMemoryBlobStore::new()))
//!     .bucket("files")
//!     .build()?;
//!
//! let upload = app.uploader.upload_folder(Path::new("./out"), Some("demo")).await?;
//! let urls = app.links.list_presigned_urls(&upload.prefix, app.default_ttl).await?;
//!
//! let label = SessionLabel::required("demo")?;
//! let archive = app.links.build_archive_link(&upload.prefix, &label, app.default_ttl).await?;
//! println!("{} files, archive at {}", urls.len(), archive.url);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use crate::app::{AppBuilder, TransferApp};
pub use crate::config::{ConfigError, TransferConfig};
pub use crate::domain::{PresignTtl, SessionPrefix, TransferError};
