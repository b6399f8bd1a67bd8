//! Configuration.
//!
//! Values are read from environment variables, after loading a `.env` file
//! when one is present:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `BUCKET_NAME` | required |
//! | `AWS_REGION` | `us-east-1` |
//! | `S3_ENDPOINT_URL` | unset (AWS) |
//! | `S3_FORCE_PATH_STYLE` | `false` |
//! | `SHARE_TTL_SECS` | `259200` |
//!
//! Credentials are left to the AWS default provider chain.

use crate::domain::PresignTtl;
use crate::impls::S3Options;

pub const BUCKET_NAME: &str = "BUCKET_NAME";
pub const AWS_REGION: &str = "AWS_REGION";
pub const S3_ENDPOINT_URL: &str = "S3_ENDPOINT_URL";
pub const S3_FORCE_PATH_STYLE: &str = "S3_FORCE_PATH_STYLE";
pub const SHARE_TTL_SECS: &str = "SHARE_TTL_SECS";

const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value '{value}' for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferConfig {
    pub bucket: String,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    pub default_ttl: PresignTtl,
}

impl TransferConfig {
    /// Load `.env` (if any), then read the process environment.
    ///
    /// `overrides` is consulted first for every variable; return `None` to
    /// fall through to the environment.
    pub fn from_env_with<F>(overrides: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("loaded environment from {}", path.display());
        }
        Self::from_lookup(|name| overrides(name).or_else(|| std::env::var(name).ok()))
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bucket = get(BUCKET_NAME).ok_or(ConfigError::Missing(BUCKET_NAME))?;
        let region = get(AWS_REGION).unwrap_or_else(|| DEFAULT_REGION.to_string());
        let endpoint_url = get(S3_ENDPOINT_URL);

        let force_path_style = match get(S3_FORCE_PATH_STYLE) {
            None => false,
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                name: S3_FORCE_PATH_STYLE,
                value: raw.clone(),
                reason: "expected true/false".to_string(),
            })?,
        };

        let default_ttl = match get(SHARE_TTL_SECS) {
            None => PresignTtl::default(),
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| e.to_string())
                .and_then(|secs| PresignTtl::from_secs(secs).map_err(|e| e.to_string()))
                .map_err(|reason| ConfigError::Invalid {
                    name: SHARE_TTL_SECS,
                    value: raw.clone(),
                    reason,
                })?,
        };

        Ok(Self {
            bucket,
            region,
            endpoint_url,
            force_path_style,
            default_ttl,
        })
    }

    pub fn s3_options(&self) -> S3Options {
        S3Options {
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
            force_path_style: self.force_path_style,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<TransferConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TransferConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[(BUCKET_NAME, "files")]).unwrap();

        assert_eq!(config.bucket, "files");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.endpoint_url, None);
        assert!(!config.force_path_style);
        assert_eq!(config.default_ttl.as_secs(), 259_200);
    }

    #[rstest]
    #[case::absent(&[])]
    #[case::blank(&[(BUCKET_NAME, "  ")])]
    fn bucket_is_required(#[case] vars: &[(&str, &str)]) {
        assert!(matches!(load(vars), Err(ConfigError::Missing(BUCKET_NAME))));
    }

    #[test]
    fn all_values_are_read() {
        let config = load(&[
            (BUCKET_NAME, "files"),
            (AWS_REGION, "eu-west-1"),
            (S3_ENDPOINT_URL, "http://127.0.0.1:9000"),
            (S3_FORCE_PATH_STYLE, "true"),
            (SHARE_TTL_SECS, "3600"),
        ])
        .unwrap();

        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.endpoint_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert!(config.force_path_style);
        assert_eq!(config.default_ttl.as_secs(), 3_600);

        let options = config.s3_options();
        assert_eq!(options.region, "eu-west-1");
        assert!(options.force_path_style);
    }

    #[test]
    fn overrides_win_over_the_environment() {
        let config = TransferConfig::from_env_with(|name| match name {
            BUCKET_NAME => Some("from-flag".to_string()),
            SHARE_TTL_SECS => Some("120".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.bucket, "from-flag");
        assert_eq!(config.default_ttl.as_secs(), 120);
    }

    #[rstest]
    #[case::not_a_number(SHARE_TTL_SECS, "soon")]
    #[case::zero_ttl(SHARE_TTL_SECS, "0")]
    #[case::too_long(SHARE_TTL_SECS, "604801")]
    #[case::bad_bool(S3_FORCE_PATH_STYLE, "maybe")]
    fn invalid_values_are_rejected(#[case] name: &str, #[case] value: &str) {
        let err = load(&[(BUCKET_NAME, "files"), (name, value)]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: n, .. } if n == name));
    }
}
