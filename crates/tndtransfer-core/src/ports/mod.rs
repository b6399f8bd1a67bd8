//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（S3 などの Blob storage、時計、乱数）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - Blob store のクライアントはプロセス単位で 1 つ作り、注入する（グローバルに持たない）
//! - 進捗表示は observer として注入する（標準出力に直接書かない）

pub mod blob_store;
pub mod clock;
pub mod id_generator;
pub mod progress;

// 主要な trait を再エクスポート
pub use self::blob_store::{BlobStore, StoreError};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::progress::{FnProgress, ProgressObserver, TracingProgress};
