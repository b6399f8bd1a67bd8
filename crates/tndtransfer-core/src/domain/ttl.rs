//! Presigned URL lifetime.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::TransferError;

/// Validity window of a presigned URL, in whole seconds.
///
/// SigV4 presigned URLs cannot outlive 7 days, and a zero lifetime would hand
/// out a URL that is already expired, so both are rejected when the value is
/// built instead of surfacing later as a store error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct PresignTtl(u64);

impl PresignTtl {
    /// 3 days.
    pub const DEFAULT_SECS: u64 = 259_200;

    /// 7 days.
    pub const MAX_SECS: u64 = 604_800;

    pub fn from_secs(secs: u64) -> Result<Self, TransferError> {
        if secs == 0 || secs > Self::MAX_SECS {
            return Err(TransferError::InvalidTtl(secs));
        }
        Ok(Self(secs))
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for PresignTtl {
    fn default() -> Self {
        Self(Self::DEFAULT_SECS)
    }
}

impl TryFrom<u64> for PresignTtl {
    type Error = TransferError;

    fn try_from(secs: u64) -> Result<Self, Self::Error> {
        Self::from_secs(secs)
    }
}

impl From<PresignTtl> for u64 {
    fn from(ttl: PresignTtl) -> Self {
        ttl.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_is_three_days() {
        assert_eq!(PresignTtl::default().as_secs(), 259_200);
        assert_eq!(
            PresignTtl::default().as_duration(),
            Duration::from_secs(3 * 24 * 60 * 60)
        );
    }

    #[rstest]
    #[case::zero(0)]
    #[case::over_a_week(PresignTtl::MAX_SECS + 1)]
    fn out_of_range_ttl_is_rejected(#[case] secs: u64) {
        assert!(matches!(
            PresignTtl::from_secs(secs),
            Err(TransferError::InvalidTtl(s)) if s == secs
        ));
    }

    #[rstest]
    #[case::one_second(1)]
    #[case::one_hour(3_600)]
    #[case::max(PresignTtl::MAX_SECS)]
    fn in_range_ttl_is_accepted(#[case] secs: u64) {
        assert_eq!(PresignTtl::from_secs(secs).unwrap().as_secs(), secs);
    }

    #[test]
    fn deserialization_validates() {
        assert!(serde_json::from_str::<PresignTtl>("0").is_err());
        let ttl: PresignTtl = serde_json::from_str("60").unwrap();
        assert_eq!(ttl.as_secs(), 60);
    }
}
