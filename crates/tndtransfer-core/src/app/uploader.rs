//! TransferUploader - ローカルのフォルダを Blob store に送る
//!
//! # 流れ
//! 1. `local_dir` 以下の通常ファイルを列挙（ファイル名順、symlink は辿らない）
//! 2. SessionId を生成して prefix `"<uuid>/[<label>/]"` を組み立てる
//! 3. 1 ファイルずつ順番に `prefix + 相対パス` へ put
//!
//! 並列化もリトライもしません。失敗したファイルは記録して残りを続け、
//! 最後に `TransferError::PartialUpload` として返します（送信済みは消さない）。
//! ローカルの読み込みに失敗した場合はそこで止め、`UploadAborted` に prefix を残します。

use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::domain::{
    FailedUpload, FolderUpload, SessionLabel, SessionPrefix, TransferError, UploadedObject,
};
use crate::ports::{BlobStore, IdGenerator, ProgressObserver};

pub struct TransferUploader {
    store: Arc<dyn BlobStore>,
    bucket: String,
    ids: Arc<dyn IdGenerator>,
    progress: Option<Arc<dyn ProgressObserver>>,
}

impl TransferUploader {
    pub fn new(
        store: Arc<dyn BlobStore>,
        bucket: impl Into<String>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            ids,
            progress: None,
        }
    }

    /// 進捗 observer を設定
    pub fn with_progress(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.progress = Some(observer);
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// 1 ファイルを `remote_key` に送る
    ///
    /// store のエラーはログに出したうえで `TransferError::Store` として返します。
    pub async fn upload_file(
        &self,
        local_path: &Path,
        remote_key: &str,
    ) -> Result<UploadedObject, TransferError> {
        let contents = tokio::fs::read(local_path)
            .await
            .map_err(|e| TransferError::io(local_path, e))?;
        let bytes = contents.len() as u64;

        match self
            .store
            .put(
                &self.bucket,
                remote_key,
                Bytes::from(contents),
                self.progress.as_deref(),
            )
            .await
        {
            Ok(()) => {
                tracing::info!(
                    bucket = %self.bucket,
                    key = remote_key,
                    bytes,
                    "uploaded {}",
                    local_path.display()
                );
                Ok(UploadedObject {
                    local_path: local_path.to_path_buf(),
                    key: remote_key.to_string(),
                    bytes,
                })
            }
            Err(e) => {
                tracing::error!(
                    bucket = %self.bucket,
                    key = remote_key,
                    error = %e,
                    "failed to upload {}",
                    local_path.display()
                );
                Err(e.into())
            }
        }
    }

    /// フォルダ全体を新しい session prefix の下に送る
    ///
    /// # エラー
    /// - `NotADirectory`: `local_dir` がない、またはディレクトリではない
    /// - `InvalidLabel`: label が 1 セグメントに収まらない
    /// - `Io`: `local_dir` の確認・走査の失敗（まだ何も送っていない）
    /// - `UploadAborted`: ファイルの読み込み失敗。その時点で中断し、prefix と送信済み一覧を返す
    /// - `PartialUpload`: 一部のファイルの put が失敗した
    pub async fn upload_folder(
        &self,
        local_dir: &Path,
        label: Option<&str>,
    ) -> Result<FolderUpload, TransferError> {
        match tokio::fs::metadata(local_dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(TransferError::NotADirectory(local_dir.to_path_buf())),
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                return Err(TransferError::NotADirectory(local_dir.to_path_buf()));
            }
            Err(e) => return Err(TransferError::io(local_dir, e)),
        }

        let label = match label {
            Some(raw) => SessionLabel::parse(raw)?,
            None => None,
        };
        let files = collect_files(local_dir)?;

        let session = self.ids.generate_session_id();
        let prefix = SessionPrefix::for_session(&session, label.as_ref());
        tracing::info!(
            bucket = %self.bucket,
            prefix = %prefix,
            files = files.len(),
            "starting folder upload from {}",
            local_dir.display()
        );

        let mut uploaded = Vec::with_capacity(files.len());
        let mut failed = Vec::new();
        for (path, relative) in files {
            let key = prefix.key_for(&relative);
            match self.upload_file(&path, &key).await {
                Ok(object) => uploaded.push(object),
                Err(TransferError::Io { path, source }) => {
                    tracing::error!(
                        prefix = %prefix,
                        uploaded = uploaded.len(),
                        "aborting folder upload, cannot read {}",
                        path.display()
                    );
                    return Err(TransferError::UploadAborted {
                        prefix,
                        uploaded,
                        path,
                        source,
                    });
                }
                Err(e) => failed.push(FailedUpload {
                    local_path: path,
                    key,
                    reason: e.to_string(),
                }),
            }
        }

        if !failed.is_empty() {
            return Err(TransferError::PartialUpload {
                prefix,
                uploaded,
                failed,
            });
        }

        Ok(FolderUpload {
            session,
            prefix,
            uploaded,
        })
    }
}

/// `root` 以下の通常ファイルを `(絶対パス, "/" 区切りの相対パス)` で返す
pub fn collect_files(root: &Path) -> Result<Vec<(PathBuf, String)>, TransferError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            TransferError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push((entry.into_path(), relative));
    }
    Ok(files)
}
