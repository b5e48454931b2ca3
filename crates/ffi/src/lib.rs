use std::collections::HashMap;

use anyhow::Context;
use entitlement_engine::domain::error::EngineError;
use entitlement_engine::domain::types as dt;
use entitlement_engine::{read_extensions, Authorizer};

uniffi::setup_scaffolding!();

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum FfiError {
    #[error("{message}")]
    Generic { message: String },
}

impl From<EngineError> for FfiError {
    fn from(e: EngineError) -> Self {
        FfiError::Generic {
            message: e.to_string(),
        }
    }
}

impl From<anyhow::Error> for FfiError {
    fn from(e: anyhow::Error) -> Self {
        FfiError::Generic {
            message: format!("{e:#}"),
        }
    }
}

// ===== FFI types mirroring the public Rust API (FFI-friendly) =====

#[derive(uniffi::Record, Debug, Clone, Copy)]
pub struct FfiLimitsConfig {
    pub max_certificate_pem_size: u64,
    pub max_extensions: u64,
}

impl From<FfiLimitsConfig> for dt::LimitsConfig {
    fn from(v: FfiLimitsConfig) -> Self {
        dt::LimitsConfig {
            max_certificate_pem_size: v.max_certificate_pem_size as usize,
            max_extensions: v.max_extensions as usize,
        }
    }
}

impl FfiLimitsConfig {
    pub fn defaults() -> Self {
        let d = dt::LimitsConfig::defaults();
        Self {
            max_certificate_pem_size: d.max_certificate_pem_size as u64,
            max_extensions: d.max_extensions as u64,
        }
    }
}

#[derive(uniffi::Record, Debug, Clone)]
pub struct FfiAuthorizationConfig {
    pub download_url_oid_prefix: String,
    pub download_url_oid_suffix: String,
    pub limits: FfiLimitsConfig,
}

impl From<FfiAuthorizationConfig> for dt::AuthorizationConfig {
    fn from(v: FfiAuthorizationConfig) -> Self {
        dt::AuthorizationConfig {
            download_url_oid_prefix: v.download_url_oid_prefix,
            download_url_oid_suffix: v.download_url_oid_suffix,
            limits: v.limits.into(),
        }
    }
}

#[derive(uniffi::Record, Debug, Clone)]
pub struct FfiDecision {
    pub allowed: bool,
    pub matched_oid: Option<String>,
    pub matched_value: Option<String>,
}

impl From<dt::Decision> for FfiDecision {
    fn from(v: dt::Decision) -> Self {
        FfiDecision { allowed: v.allowed, matched_oid: v.matched_oid, matched_value: v.matched_value }
    }
}

fn authorizer(cfg: Option<FfiAuthorizationConfig>) -> Result<Authorizer, FfiError> {
    match cfg {
        Some(c) => Ok(Authorizer::new(&c.into())?),
        None => Ok(Authorizer::default()),
    }
}

// ===== High-level API, mirroring Rust surface =====

#[uniffi::export]
pub fn default_authorization_config_ffi() -> FfiAuthorizationConfig {
    let d = dt::AuthorizationConfig::secure_default();
    FfiAuthorizationConfig {
        download_url_oid_prefix: d.download_url_oid_prefix,
        download_url_oid_suffix: d.download_url_oid_suffix,
        limits: FfiLimitsConfig::defaults(),
    }
}

#[uniffi::export]
pub fn is_authorized_ffi(destination: String, extensions: HashMap<String, String>) -> bool {
    Authorizer::default().authorize_pairs(&destination, &extensions)
}

#[uniffi::export]
pub fn decide_ffi(
    destination: String,
    extensions: HashMap<String, String>,
    cfg: Option<FfiAuthorizationConfig>,
) -> Result<FfiDecision, FfiError> {
    // Sorted so the reported match does not depend on hash order.
    let extensions: dt::ExtensionSet = extensions.into_iter().collect();
    Ok(authorizer(cfg)?.decide(&destination, &extensions).into())
}

#[uniffi::export]
pub fn certificate_extensions_ffi(
    cert_pem: String,
    limits: Option<FfiLimitsConfig>,
) -> Result<HashMap<String, String>, FfiError> {
    let mut cfg = dt::AuthorizationConfig::secure_default();
    if let Some(l) = limits {
        cfg.limits = l.into();
    }
    let set = read_extensions(dt::CertificateSource::pem(cert_pem), &cfg)?;
    Ok(set.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
}

#[uniffi::export]
pub fn is_valid_ffi(destination: String, cert_pem: String) -> Result<bool, FfiError> {
    entitlement_engine::is_valid(&destination, cert_pem.as_bytes()).map_err(FfiError::from)
}

/// Install a stderr `tracing` subscriber for hosts that cannot do it from
/// Rust. `filter` uses `RUST_LOG` syntax; defaults to `RUST_LOG` or `info`.
#[uniffi::export]
pub fn init_logging_ffi(filter: Option<String>) -> Result<(), FfiError> {
    init_logging(filter.as_deref()).map_err(FfiError::from)
}

fn init_logging(filter: Option<&str>) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let filter = match filter {
        Some(f) => EnvFilter::try_new(f).with_context(|| format!("invalid log filter {f:?}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("logging already initialized: {e}"))
}

// ===== Unit profiles =====

#[cfg(feature = "profiles")]
mod profiles {
    use std::sync::Arc;

    use entitlement_engine::{ProfileManager, UnitProfile};

    use super::FfiError;

    #[derive(uniffi::Record, Debug, Clone)]
    pub struct FfiUnitProfile {
        pub consumer_id: String,
        pub content_type: String,
        /// Profile as a JSON document.
        pub profile_json: String,
        pub profile_hash: String,
    }

    impl From<UnitProfile> for FfiUnitProfile {
        fn from(v: UnitProfile) -> Self {
            FfiUnitProfile {
                consumer_id: v.consumer_id,
                content_type: v.content_type,
                profile_json: v.profile.to_string(),
                profile_hash: v.profile_hash,
            }
        }
    }

    fn parse_profile(json: &str) -> Result<serde_json::Value, FfiError> {
        serde_json::from_str(json).map_err(|e| FfiError::Generic { message: format!("invalid profile JSON: {e}") })
    }

    #[derive(uniffi::Object, Debug, Default)]
    pub struct FfiProfileManager {
        inner: ProfileManager,
    }

    #[uniffi::export]
    impl FfiProfileManager {
        #[uniffi::constructor]
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn register_consumer(&self, consumer_id: String) {
            self.inner.register_consumer(&consumer_id)
        }

        pub fn unregister_consumer(&self, consumer_id: String) -> Result<(), FfiError> {
            Ok(self.inner.unregister_consumer(&consumer_id)?)
        }

        pub fn create(&self, consumer_id: String, content_type: String, profile_json: String) -> Result<FfiUnitProfile, FfiError> {
            let profile = parse_profile(&profile_json)?;
            Ok(self.inner.create(&consumer_id, &content_type, profile)?.into())
        }

        /// Returns true when the stored profile changed.
        pub fn update(&self, consumer_id: String, content_type: String, profile_json: String) -> Result<bool, FfiError> {
            let profile = parse_profile(&profile_json)?;
            Ok(self.inner.update(&consumer_id, &content_type, profile)?.changed)
        }

        pub fn get_profile(&self, consumer_id: String, content_type: String) -> Result<FfiUnitProfile, FfiError> {
            Ok(self.inner.get_profile(&consumer_id, &content_type)?.into())
        }

        pub fn get_profiles(&self, consumer_id: String) -> Vec<FfiUnitProfile> {
            self.inner.get_profiles(&consumer_id).into_iter().map(Into::into).collect()
        }

        pub fn delete(&self, consumer_id: String, content_type: String) -> Result<(), FfiError> {
            self.inner.delete(&consumer_id, &content_type).map(|_| ()).map_err(FfiError::from)
        }

        pub fn consumer_deleted(&self, consumer_id: String) -> u64 {
            self.inner.consumer_deleted(&consumer_id) as u64
        }
    }
}

#[cfg(feature = "profiles")]
pub use profiles::{FfiProfileManager, FfiUnitProfile};
