//! Domain identifiers.
//!
//! # SessionId
//! 1 回のアップロード（= 1 つの共有単位）ごとに生成されるランダム ID です。
//! 内部表現は ULID ですが、Display では UUID 形式（ハイフン区切り）で出力します。
//!
//! ## ULID を使う理由
//! - **時刻でソート可能**: prefix の一覧が作成順に並ぶ
//! - **分散生成可能**: 調整なしで複数プロセスから生成できる
//! - **UUID互換**: 128-bit なので UUID 文字列としてそのまま使える

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;
use uuid::Uuid;

/// Identifier of one transfer session (the first segment of its key prefix).
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId {
    ulid: Ulid,
}

impl SessionId {
    /// ULID から SessionId を作成
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self { ulid }
    }

    /// 内部の ULID を取得
    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }

    /// UUID として取得（prefix に使う表現）
    pub fn as_uuid(&self) -> Uuid {
        Uuid::from(self.ulid)
    }
}

impl From<Ulid> for SessionId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_uuid().hyphenated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_hyphenated_uuid() {
        let id = SessionId::from_ulid(Ulid::new());
        let rendered = id.to_string();

        assert_eq!(rendered.len(), 36);
        assert_eq!(rendered.matches('-').count(), 4);
        assert_eq!(Uuid::parse_str(&rendered).unwrap(), id.as_uuid());
    }

    #[test]
    fn session_ids_are_sortable() {
        // ULID は時刻ベースなので、生成順序でソート可能
        let id1 = SessionId::from_ulid(Ulid::new());
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = SessionId::from_ulid(Ulid::new());

        assert!(id1 < id2);
        assert!(id1.to_string() < id2.to_string());
    }

    #[test]
    fn from_trait_works() {
        let ulid = Ulid::new();
        let id: SessionId = ulid.into();
        assert_eq!(id.as_ulid(), ulid);
    }

    #[test]
    fn session_id_can_be_serialized() {
        let id = SessionId::from_ulid(Ulid::new());
        let serialized = serde_json::to_string(&id).unwrap();
        let deserialized: SessionId = serde_json::from_str(&serialized).unwrap();
        assert_eq!(id, deserialized);
    }
}
