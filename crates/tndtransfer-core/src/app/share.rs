//! ShareLinkBuilder - session prefix から共有リンクを作る
//!
//! 2 種類の共有方法があります：
//! - **list_presigned_urls**: object ごとに 1 つの presigned URL
//! - **build_archive_link**: 全 object を 1 つの ZIP にまとめ、
//!   `temp/<label>-<timestamp>.zip` に保存して、その URL を 1 つだけ返す
//!
//! アーカイブはメモリ上で組み立てます。`temp/` 以下の削除はこのクレートでは
//! 行わないので、バケット側のライフサイクルルールで期限を設定してください。

use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::archive::{ArchiveEntry, dedupe_last_wins, pack_entries};
use crate::domain::{
    ArchiveKey, ArchiveLink, EntryNaming, ObjectEntry, PresignTtl, SessionLabel, SessionPrefix,
    TransferError,
};
use crate::ports::{BlobStore, Clock};

pub struct ShareLinkBuilder {
    store: Arc<dyn BlobStore>,
    bucket: String,
    clock: Arc<dyn Clock>,
    naming: EntryNaming,
}

impl ShareLinkBuilder {
    pub fn new(store: Arc<dyn BlobStore>, bucket: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            clock,
            naming: EntryNaming::default(),
        }
    }

    /// アーカイブ内のエントリ名の付け方を変更
    pub fn with_entry_naming(mut self, naming: EntryNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn entry_naming(&self) -> EntryNaming {
        self.naming
    }

    /// prefix 以下の object ごとに presigned URL を発行
    ///
    /// - 何もなければ空の map（エラーではない）
    /// - `/` で終わる key（ディレクトリマーカー）は含めない
    /// - 個々の署名失敗はログに出してその key だけ外す
    pub async fn list_presigned_urls(
        &self,
        prefix: &SessionPrefix,
        ttl: PresignTtl,
    ) -> Result<BTreeMap<String, String>, TransferError> {
        let objects = self.list_files(prefix).await?;

        let mut urls = BTreeMap::new();
        for object in objects {
            match self.store.presign_get(&self.bucket, &object.key, ttl).await {
                Ok(url) => {
                    urls.insert(object.key, url);
                }
                Err(e) => {
                    tracing::warn!(
                        bucket = %self.bucket,
                        key = %object.key,
                        error = %e,
                        "skipping object that could not be presigned"
                    );
                }
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            prefix = %prefix,
            count = urls.len(),
            ttl_secs = ttl.as_secs(),
            "issued presigned urls"
        );
        Ok(urls)
    }

    /// prefix 以下を 1 つの ZIP にまとめて、その presigned URL を返す
    ///
    /// list / get / put / presign のどれかが失敗したらそのままエラーを返します。
    /// 途中までのアーカイブは作りません。
    pub async fn build_archive_link(
        &self,
        prefix: &SessionPrefix,
        label: &SessionLabel,
        ttl: PresignTtl,
    ) -> Result<ArchiveLink, TransferError> {
        let objects = self.list_files(prefix).await?;

        let mut entries = Vec::with_capacity(objects.len());
        for object in &objects {
            let contents: Bytes = self.store.get(&self.bucket, &object.key).await?;
            let name = self.naming.entry_name(prefix, &object.key);
            entries.push(ArchiveEntry::new(name, contents));
        }
        let entries = match self.naming {
            EntryNaming::RelativePath => entries,
            EntryNaming::BaseName => dedupe_last_wins(entries),
        };

        let zip = pack_entries(&entries)?;
        let size = zip.len() as u64;
        let key = ArchiveKey::new(label, self.clock.now());

        self.store
            .put(&self.bucket, key.as_str(), Bytes::from(zip), None)
            .await?;
        let url = self
            .store
            .presign_get(&self.bucket, key.as_str(), ttl)
            .await?;

        tracing::info!(
            bucket = %self.bucket,
            prefix = %prefix,
            archive = %key,
            entries = entries.len(),
            size,
            "built archive"
        );
        Ok(ArchiveLink {
            key,
            url,
            entries: entries.into_iter().map(|e| e.name).collect(),
            size,
        })
    }

    async fn list_files(&self, prefix: &SessionPrefix) -> Result<Vec<ObjectEntry>, TransferError> {
        let objects = self.store.list(&self.bucket, prefix.as_str()).await?;
        Ok(objects
            .into_iter()
            .filter(|o| !o.is_directory_marker())
            .collect())
    }
}
