//! ProgressObserver port - 転送進捗の通知
//!
//! 進捗表示は対話用のフィードバックのみで、再開（resume）には使いません。
//! コンソールに直接書き出す代わりに observer を注入します。

use crate::domain::TransferProgress;

/// ProgressObserver は put の進捗を受け取る
///
/// 1 チャンク送るごとに、その key の累積バイト数で呼ばれます。
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, progress: &TransferProgress);
}

/// 進捗を `tracing::debug!` に流す observer
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn on_progress(&self, progress: &TransferProgress) {
        tracing::debug!(
            key = %progress.key,
            transferred = progress.bytes_transferred,
            total = progress.total_bytes,
            "transfer progress"
        );
    }
}

/// クロージャを observer として使うためのラッパー
pub struct FnProgress<F>(pub F);

impl<F> ProgressObserver for FnProgress<F>
where
    F: Fn(&TransferProgress) + Send + Sync,
{
    fn on_progress(&self, progress: &TransferProgress) {
        (self.0)(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn fn_progress_forwards_events() {
        let seen = Mutex::new(Vec::new());
        let observer = FnProgress(|p: &TransferProgress| {
            seen.lock().unwrap().push(p.bytes_transferred);
        });

        for n in [4, 8, 10] {
            observer.on_progress(&TransferProgress {
                key: "k".into(),
                bytes_transferred: n,
                total_bytes: 10,
            });
        }

        assert_eq!(*seen.lock().unwrap(), vec![4, 8, 10]);
    }
}
