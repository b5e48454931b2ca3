use serde::{Deserialize, Serialize};

use crate::domain::error::{EngineError, EngineResult};
use super::oid::OidPattern;

/// Centralized defaults for the entitlement engine.
/// All opinionated defaults should be defined here for consistency.
pub struct EngineDefaults;

impl EngineDefaults {
    // Download-URL extension class
    pub const DOWNLOAD_URL_OID_PREFIX: &'static str = "1.3.6.1.4.1.2312.9.2."; // entitlement content namespace
    pub const DOWNLOAD_URL_OID_SUFFIX: &'static str = ".1.6"; // download URL field

    // Certificate reader limits
    pub const MAX_CERTIFICATE_PEM_SIZE: usize = 256 * 1024; // 256 KB - entitlement certs carry many extensions
    pub const MAX_EXTENSIONS: usize = 10_000;
}

/// Configurable per-call limits for certificate decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Max size of the PEM input, in bytes.
    pub max_certificate_pem_size: usize,
    /// Max number of extensions accepted from one certificate.
    pub max_extensions: usize,
}

impl LimitsConfig {
    /// Opinionated production defaults.
    pub fn defaults() -> Self {
        Self {
            max_certificate_pem_size: EngineDefaults::MAX_CERTIFICATE_PEM_SIZE,
            max_extensions: EngineDefaults::MAX_EXTENSIONS,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Configuration for the authorization evaluator.
///
/// Deserializes from JSON; missing fields take the [`EngineDefaults`] values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizationConfig {
    /// OID pattern the download-URL extension must match at its start.
    pub download_url_oid_prefix: String,
    /// OID pattern the same extension must also match at its end.
    pub download_url_oid_suffix: String,
    pub limits: LimitsConfig,
}

impl AuthorizationConfig {
    pub fn secure_default() -> Self {
        Self {
            download_url_oid_prefix: EngineDefaults::DOWNLOAD_URL_OID_PREFIX.to_string(),
            download_url_oid_suffix: EngineDefaults::DOWNLOAD_URL_OID_SUFFIX.to_string(),
            limits: LimitsConfig::defaults(),
        }
    }

    pub fn from_json(json: &str) -> EngineResult<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks the patterns parse and the limits are usable.
    pub fn validate(&self) -> EngineResult<()> {
        self.patterns().map(|_| ())?;
        if self.limits.max_certificate_pem_size == 0 {
            return Err(EngineError::Config("max_certificate_pem_size must be > 0".into()));
        }
        Ok(())
    }

    pub(crate) fn patterns(&self) -> EngineResult<(OidPattern, OidPattern)> {
        let prefix = OidPattern::parse(&self.download_url_oid_prefix)?;
        let suffix = OidPattern::parse(&self.download_url_oid_suffix)?;
        Ok((prefix, suffix))
    }
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self::secure_default()
    }
}
