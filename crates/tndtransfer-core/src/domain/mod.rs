//! Domain model (ids, session prefix, objects, archive naming, errors).
//!
//! ここには外部システム（Blob store, ファイルシステム）を前提としない
//! 値オブジェクトだけを置きます。

pub mod ids;
pub mod session;
pub mod object;
pub mod archive;
pub mod ttl;
pub mod progress;
pub mod transfer;
pub mod errors;

pub use self::ids::SessionId;
pub use self::session::{SessionLabel, SessionPrefix};
pub use self::object::ObjectEntry;
pub use self::archive::{ArchiveKey, EntryNaming};
pub use self::ttl::PresignTtl;
pub use self::progress::TransferProgress;
pub use self::transfer::{ArchiveLink, FailedUpload, FolderUpload, UploadedObject};
pub use self::errors::{ErrorKind, TransferError};
