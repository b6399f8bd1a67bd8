//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 1 つの store クライアントを Uploader と ShareLinkBuilder で共有する

use std::sync::Arc;

use super::share::ShareLinkBuilder;
use super::uploader::TransferUploader;
use crate::domain::{EntryNaming, PresignTtl};
use crate::ports::{BlobStore, Clock, IdGenerator, ProgressObserver, SystemClock, UlidGenerator};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new()
///     .store(Arc::new(S3BlobStore::connect(&options).await))
///     .bucket("my-bucket")
///     .progress(Arc::new(TracingProgress))
///     .build()?;
/// let upload = app.uploader.upload_folder(dir, Some("demo")).await?;
/// ```
///
/// # Fail-fast 設計
/// - store と bucket は必須
/// - 不足があれば BuildError を返す
pub struct AppBuilder {
    store: Option<Arc<dyn BlobStore>>,
    bucket: Option<String>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    progress: Option<Arc<dyn ProgressObserver>>,
    naming: EntryNaming,
    default_ttl: PresignTtl,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("a blob store must be provided")]
    MissingStore,

    #[error("a non-empty bucket name must be provided")]
    MissingBucket,
}

impl AppBuilder {
    /// 新しい AppBuilder を作成
    pub fn new() -> Self {
        Self {
            store: None,
            bucket: None,
            clock: None,
            ids: None,
            progress: None,
            naming: EntryNaming::default(),
            default_ttl: PresignTtl::default(),
        }
    }

    pub fn store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// 省略時は SystemClock
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// 省略時は clock を使う UlidGenerator
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn progress(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.progress = Some(observer);
        self
    }

    pub fn entry_naming(mut self, naming: EntryNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn default_ttl(mut self, ttl: PresignTtl) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// AppBuilder を検証して TransferApp を生成
    pub fn build(self) -> Result<TransferApp, BuildError> {
        let store = self.store.ok_or(BuildError::MissingStore)?;
        let bucket = self
            .bucket
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .ok_or(BuildError::MissingBucket)?;

        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };
        let ids: Arc<dyn IdGenerator> = match self.ids {
            Some(ids) => ids,
            None => Arc::new(UlidGenerator::new(clock.clone())),
        };

        let mut uploader = TransferUploader::new(store.clone(), bucket.clone(), ids);
        if let Some(observer) = self.progress {
            uploader = uploader.with_progress(observer);
        }
        let links = ShareLinkBuilder::new(store, bucket, clock).with_entry_naming(self.naming);

        Ok(TransferApp {
            uploader,
            links,
            default_ttl: self.default_ttl,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// TransferApp は組み立て済みのサービス一式
pub struct TransferApp {
    pub uploader: TransferUploader,
    pub links: ShareLinkBuilder,
    pub default_ttl: PresignTtl,
}
