//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: アプリケーションの構築とワイヤリング
//! - **TransferUploader**: フォルダのアップロード（session prefix の発行）
//! - **ShareLinkBuilder**: presigned URL / ZIP アーカイブの共有リンク
//! - **archive**: メモリ上での ZIP 組み立て

pub mod archive;
pub mod builder;
pub mod share;
pub mod uploader;

// 主要な型を再エクスポート
pub use self::builder::{AppBuilder, BuildError, TransferApp};
pub use self::share::ShareLinkBuilder;
pub use self::uploader::TransferUploader;
