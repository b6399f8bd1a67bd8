//! IdGenerator port - ID 生成の抽象化
//!
//! 1 回のアップロードごとに新しい SessionId を払い出します。
//! テスト容易性のために、trait として抽象化しています。
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（本番用）

use crate::domain::SessionId;
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は SessionId を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数スレッドから使える）
pub trait IdGenerator: Send + Sync {
    /// 新しい SessionId を生成
    fn generate_session_id(&self) -> SessionId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
/// timestamp 部分は FixedClock で固定でき、残り 80-bit はランダムです。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    /// 新しい UlidGenerator を作成
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_session_id(&self) -> SessionId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        SessionId::from(ulid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixedClock, SystemClock};
    use chrono::{TimeZone, Utc};
    use std::collections::HashSet;
    use uuid::Uuid;

    #[test]
    fn session_prefixes_do_not_collide() {
        let id_gen = UlidGenerator::new(SystemClock);

        let uuids: HashSet<Uuid> = (0..1_000)
            .map(|_| id_gen.generate_session_id().as_uuid())
            .collect();

        assert_eq!(uuids.len(), 1_000);
    }

    #[test]
    fn fixed_clock_pins_the_timestamp_part() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let id_gen = UlidGenerator::new(FixedClock::new(fixed_time));

        let id1 = id_gen.generate_session_id();
        let id2 = id_gen.generate_session_id();

        // 時刻が同じでも 80-bit のランダム部で区別される
        assert_ne!(id1.as_uuid(), id2.as_uuid());
        for id in [id1, id2] {
            assert_eq!(id.as_ulid().timestamp_ms(), fixed_time.timestamp_millis() as u64);
        }
    }
}
