//! InMemoryBlobStore - 開発・テスト用の Blob store
//!
//! # 学習ポイント
//! - `std::sync::Mutex` を `.await` をまたがずに使う（ロックは同期区間だけ）
//! - BTreeMap による prefix の範囲走査
//! - presign URL を Clock で期限付きにして、テストで期限切れを再現する

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use url::Url;

use crate::domain::{ObjectEntry, PresignTtl, TransferProgress};
use crate::ports::{BlobStore, Clock, ProgressObserver, StoreError, SystemClock};

/// Scheme of URLs issued by [`InMemoryBlobStore::presign_get`].
pub const MEMORY_SCHEME: &str = "memory";

/// InMemoryBlobStore はプロセス内の Blob store
///
/// # 実装詳細
/// - `BTreeMap<(bucket, key), Bytes>` で object を管理
/// - put は `chunk_size` ごとに進捗を通知
/// - presign は `memory://<bucket>/?key=<key>&expires=<unix>` を返す
/// - `fail_put_on` / `fail_get_on` / `fail_list_on` / `fail_presign_on` で失敗を注入できる
///
/// # 使用例
/// ```ignore
/// let store = InMemoryBlobStore::new();
/// store.put("bucket", "a.txt", Bytes::from_static(b"hi"), None).await?;
/// let url = store.presign_get("bucket", "a.txt", PresignTtl::default()).await?;
/// assert_eq!(store.resolve_presigned(&url)?, Bytes::from_static(b"hi"));
/// ```
pub struct InMemoryBlobStore {
    objects: Mutex<BTreeMap<(String, String), Bytes>>,
    clock: Arc<dyn Clock>,
    chunk_size: usize,
    failing_puts: Mutex<HashSet<String>>,
    failing_gets: Mutex<HashSet<String>>,
    failing_lists: Mutex<HashSet<String>>,
    failing_presigns: Mutex<HashSet<String>>,
}

impl InMemoryBlobStore {
    pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

    /// 新しい InMemoryBlobStore を作成（SystemClock を使用）
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            clock,
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
            failing_puts: Mutex::new(HashSet::new()),
            failing_gets: Mutex::new(HashSet::new()),
            failing_lists: Mutex::new(HashSet::new()),
            failing_presigns: Mutex::new(HashSet::new()),
        }
    }

    /// 進捗通知のチャンクサイズを変更（0 は 1 として扱う）
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// 進捗通知なしで object を直接置く（ディレクトリマーカーの用意など）
    pub fn insert(&self, bucket: &str, key: &str, bytes: impl Into<Bytes>) {
        lock(&self.objects).insert((bucket.to_string(), key.to_string()), bytes.into());
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        lock(&self.objects)
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// bucket 内の全 key（key 順）
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        lock(&self.objects)
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    /// 以降、この key への put を失敗させる
    pub fn fail_put_on(&self, key: impl Into<String>) {
        lock(&self.failing_puts).insert(key.into());
    }

    /// 以降、この key の get を失敗させる
    pub fn fail_get_on(&self, key: impl Into<String>) {
        lock(&self.failing_gets).insert(key.into());
    }

    /// 以降、この prefix の list を失敗させる（prefix は完全一致）
    pub fn fail_list_on(&self, prefix: impl Into<String>) {
        lock(&self.failing_lists).insert(prefix.into());
    }

    /// 以降、この key の presign を失敗させる
    pub fn fail_presign_on(&self, key: impl Into<String>) {
        lock(&self.failing_presigns).insert(key.into());
    }

    /// `presign_get` が発行した URL を辿って中身を取得
    ///
    /// 期限切れなら `StoreError::Expired`、object がなければ `StoreError::NotFound`。
    pub fn resolve_presigned(&self, url: &str) -> Result<Bytes, StoreError> {
        let invalid = |message: &str| StoreError::backend("resolve_presigned", message);

        let url = Url::parse(url).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != MEMORY_SCHEME {
            return Err(invalid("not a memory:// url"));
        }
        let bucket = url.host_str().ok_or_else(|| invalid("missing bucket"))?;

        let mut key = None;
        let mut expires = None;
        for (name, value) in url.query_pairs() {
            match name.as_ref() {
                "key" => key = Some(value.into_owned()),
                "expires" => expires = value.parse::<i64>().ok(),
                _ => {}
            }
        }
        let key = key.ok_or_else(|| invalid("missing key"))?;
        let expires = expires.ok_or_else(|| invalid("missing expires"))?;

        if self.clock.now().timestamp() >= expires {
            return Err(StoreError::Expired { key });
        }

        self.object(bucket, &key).ok_or_else(|| StoreError::NotFound {
            bucket: bucket.to_string(),
            key,
        })
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    /// # 実装
    /// 1. 失敗注入の対象ならエラー
    /// 2. chunk_size ごとに累積バイト数を observer に通知
    /// 3. 最後に map へ書き込む
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        progress: Option<&dyn ProgressObserver>,
    ) -> Result<(), StoreError> {
        if lock(&self.failing_puts).contains(key) {
            return Err(StoreError::backend("put", format!("injected failure for {key}")));
        }

        if let Some(observer) = progress {
            let total = bytes.len() as u64;
            let mut sent = 0u64;
            for chunk in bytes.chunks(self.chunk_size) {
                sent += chunk.len() as u64;
                observer.on_progress(&TransferProgress {
                    key: key.to_string(),
                    bytes_transferred: sent,
                    total_bytes: total,
                });
            }
            if total == 0 {
                observer.on_progress(&TransferProgress {
                    key: key.to_string(),
                    bytes_transferred: 0,
                    total_bytes: 0,
                });
            }
        }

        self.insert(bucket, key, bytes);
        Ok(())
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectEntry>, StoreError> {
        if lock(&self.failing_lists).contains(prefix) {
            return Err(StoreError::backend("list", format!("injected failure for {prefix}")));
        }

        let objects = lock(&self.objects);
        let start = (bucket.to_string(), prefix.to_string());
        let entries = objects
            .range(start..)
            .take_while(|((b, k), _)| b == bucket && k.starts_with(prefix))
            .map(|((_, k), v)| ObjectEntry::new(k.clone(), v.len() as u64))
            .collect();
        Ok(entries)
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        if lock(&self.failing_gets).contains(key) {
            return Err(StoreError::backend("get", format!("injected failure for {key}")));
        }
        self.object(bucket, key).ok_or_else(|| StoreError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        ttl: PresignTtl,
    ) -> Result<String, StoreError> {
        if lock(&self.failing_presigns).contains(key) {
            return Err(StoreError::Presign {
                key: key.to_string(),
                message: "injected failure".to_string(),
            });
        }

        let expires = self.clock.now().timestamp() + ttl.as_secs() as i64;
        let mut url = Url::parse(&format!("{MEMORY_SCHEME}://{bucket}/")).map_err(|e| {
            StoreError::Presign {
                key: key.to_string(),
                message: e.to_string(),
            }
        })?;
        url.query_pairs_mut()
            .append_pair("key", key)
            .append_pair("expires", &expires.to_string());
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixedClock, FnProgress};
    use chrono::{Duration, TimeZone, Utc};

    const BUCKET: &str = "bucket";

    fn fixed_store() -> (Arc<FixedClock>, InMemoryBlobStore) {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        let store = InMemoryBlobStore::with_clock(clock.clone());
        (clock, store)
    }

    #[tokio::test]
    async fn put_then_get() {
        let store = InMemoryBlobStore::new();
        store
            .put(BUCKET, "a/b.txt", Bytes::from_static(b"hello"), None)
            .await
            .unwrap();

        let bytes = store.get(BUCKET, "a/b.txt").await.unwrap();
        assert_eq!(bytes, Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = InMemoryBlobStore::new();
        let err = store.get(BUCKET, "nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn put_reports_cumulative_progress_per_chunk() {
        let store = InMemoryBlobStore::new().with_chunk_size(4);
        let seen = Mutex::new(Vec::new());
        let observer = FnProgress(|p: &TransferProgress| {
            seen.lock().unwrap().push((p.bytes_transferred, p.total_bytes));
        });

        store
            .put(BUCKET, "k", Bytes::from_static(b"0123456789"), Some(&observer))
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![(4, 10), (8, 10), (10, 10)]);
    }

    #[tokio::test]
    async fn empty_put_reports_completion_once() {
        let store = InMemoryBlobStore::new();
        let seen = Mutex::new(Vec::new());
        let observer = FnProgress(|p: &TransferProgress| {
            seen.lock().unwrap().push(p.is_complete());
        });

        store
            .put(BUCKET, "empty", Bytes::new(), Some(&observer))
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![true]);
    }

    #[tokio::test]
    async fn list_is_scoped_to_bucket_and_prefix() {
        let store = InMemoryBlobStore::new();
        store.insert(BUCKET, "p/a.txt", "a");
        store.insert(BUCKET, "p/sub/", "");
        store.insert(BUCKET, "p/sub/b.txt", "bb");
        store.insert(BUCKET, "q/c.txt", "c");
        store.insert("other", "p/d.txt", "d");

        let keys: Vec<String> = store
            .list(BUCKET, "p/")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.key)
            .collect();

        assert_eq!(keys, vec!["p/a.txt", "p/sub/", "p/sub/b.txt"]);
    }

    #[tokio::test]
    async fn list_of_missing_prefix_is_empty() {
        let store = InMemoryBlobStore::new();
        store.insert(BUCKET, "p/a.txt", "a");
        assert!(store.list(BUCKET, "zzz/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn injected_put_failure() {
        let store = InMemoryBlobStore::new();
        store.fail_put_on("bad");

        let err = store
            .put(BUCKET, "bad", Bytes::from_static(b"x"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend { operation: "put", .. }));
        assert!(store.object(BUCKET, "bad").is_none());
    }

    #[tokio::test]
    async fn injected_get_and_list_failures() {
        let store = InMemoryBlobStore::new();
        store.insert(BUCKET, "p/a.txt", "a");
        store.fail_get_on("p/a.txt");
        store.fail_list_on("p/");

        let err = store.get(BUCKET, "p/a.txt").await.unwrap_err();
        assert!(matches!(err, StoreError::Backend { operation: "get", .. }));

        let err = store.list(BUCKET, "p/").await.unwrap_err();
        assert!(matches!(err, StoreError::Backend { operation: "list", .. }));

        // 他の prefix には影響しない
        assert_eq!(store.list(BUCKET, "p/a").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn presigned_url_resolves_until_expiry() {
        let (clock, store) = fixed_store();
        store.insert(BUCKET, "dir/a b.txt", "content");

        let ttl = PresignTtl::from_secs(60).unwrap();
        let url = store.presign_get(BUCKET, "dir/a b.txt", ttl).await.unwrap();
        assert!(url.starts_with("memory://bucket/"));

        assert_eq!(
            store.resolve_presigned(&url).unwrap(),
            Bytes::from_static(b"content")
        );

        clock.advance(Duration::seconds(59));
        assert!(store.resolve_presigned(&url).is_ok());

        clock.advance(Duration::seconds(1));
        assert!(matches!(
            store.resolve_presigned(&url),
            Err(StoreError::Expired { key }) if key == "dir/a b.txt"
        ));
    }

    #[tokio::test]
    async fn presign_does_not_require_the_object() {
        let store = InMemoryBlobStore::new();
        let url = store
            .presign_get(BUCKET, "later.txt", PresignTtl::default())
            .await
            .unwrap();

        assert!(matches!(
            store.resolve_presigned(&url),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn injected_presign_failure() {
        let store = InMemoryBlobStore::new();
        store.fail_presign_on("k");
        let err = store
            .presign_get(BUCKET, "k", PresignTtl::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Presign { .. }));
    }

    #[test]
    fn foreign_urls_are_rejected() {
        let store = InMemoryBlobStore::new();
        assert!(store.resolve_presigned("https://example.com/?key=a&expires=1").is_err());
        assert!(store.resolve_presigned("not a url").is_err());
    }
}
