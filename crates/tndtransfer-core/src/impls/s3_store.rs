//! S3BlobStore - aws-sdk-s3 による BlobStore 実装
//!
//! クライアントはプロセスごとに 1 度だけ作り、`Arc<dyn BlobStore>` として
//! Uploader と ShareLinkBuilder の両方に注入します。
//!
//! # 制約
//! - put は 1 リクエストの PutObject（multipart は扱わない）
//! - 進捗はリクエスト完了時に 1 チャンク分として通知する
//! - リトライは SDK のデフォルト以上には行わない

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

use crate::domain::{ObjectEntry, PresignTtl, TransferProgress};
use crate::ports::{BlobStore, ProgressObserver, StoreError};

/// S3 接続オプション
#[derive(Debug, Clone)]
pub struct S3Options {
    pub region: String,
    /// MinIO などの互換エンドポイント
    pub endpoint_url: Option<String>,
    /// `http://host/bucket/key` 形式でアクセスする（MinIO 向け）
    pub force_path_style: bool,
}

impl Default for S3Options {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            endpoint_url: None,
            force_path_style: false,
        }
    }
}

pub struct S3BlobStore {
    client: Client,
}

impl S3BlobStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// 認証情報は SDK のデフォルトチェーン（環境変数・プロファイルなど）から読む
    pub async fn connect(options: &S3Options) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(options.region.clone()));
        if let Some(endpoint) = &options.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(options.force_path_style)
            .build();

        tracing::debug!(
            region = %options.region,
            endpoint = ?options.endpoint_url,
            "s3 client configured"
        );
        Self::new(Client::from_conf(s3_config))
    }
}

fn backend_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> StoreError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    StoreError::backend(operation, DisplayErrorContext(&err).to_string())
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        progress: Option<&dyn ProgressObserver>,
    ) -> Result<(), StoreError> {
        let total = bytes.len() as u64;
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_length(total as i64)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| backend_error("put_object", e))?;

        if let Some(observer) = progress {
            observer.on_progress(&TransferProgress {
                key: key.to_string(),
                bytes_transferred: total,
                total_bytes: total,
            });
        }
        Ok(())
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectEntry>, StoreError> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut entries = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| backend_error("list_objects_v2", e))?;
            for object in page.contents() {
                if let Some(key) = object.key() {
                    let size = object.size().unwrap_or_default().max(0) as u64;
                    entries.push(ObjectEntry::new(key, size));
                }
            }
        }
        Ok(entries)
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        let output = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(output) => output,
            Err(SdkError::ServiceError(e)) if e.err().is_no_such_key() => {
                return Err(StoreError::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                });
            }
            Err(e) => return Err(backend_error("get_object", e)),
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::backend("get_object", e.to_string()))?;
        Ok(body.into_bytes())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        ttl: PresignTtl,
    ) -> Result<String, StoreError> {
        let presign_error = |message: String| StoreError::Presign {
            key: key.to_string(),
            message,
        };

        let config = PresigningConfig::expires_in(ttl.as_duration())
            .map_err(|e| presign_error(e.to_string()))?;
        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(config)
            .await
            .map_err(|e| presign_error(DisplayErrorContext(&e).to_string()))?;

        Ok(request.uri().to_string())
    }
}
