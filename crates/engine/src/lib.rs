// crates/engine/src/lib.rs

//! Public facade for the Entitlement Engine.
//! Exposes a stable API and re-exports types for consumers (web handlers, FFI).

pub mod adapters;
pub mod domain;

use domain::error::EngineResult;
use domain::types::{AuthorizationConfig, CertificateSource, Decision, ExtensionSet};

// High-level helpers for the default download-URL policy.
// These give request handlers a simple entrypoint.

/// Whether a certificate's extensions grant access to `destination`.
pub fn is_authorized(destination: &str, extensions: &ExtensionSet) -> bool {
    Authorizer::default().is_authorized(destination, extensions)
}

pub fn decide(destination: &str, extensions: &ExtensionSet) -> Decision {
    Authorizer::default().decide(destination, extensions)
}

/// Read the extensions of a PEM certificate. No chain, expiry or revocation
/// checks are made.
pub fn read_extensions(source: CertificateSource, cfg: &AuthorizationConfig) -> EngineResult<ExtensionSet> {
    #[cfg(not(feature = "x509"))]
    {
        let _ = (source, cfg);
        return Err(domain::error::EngineError::Feature("x509"));
    }
    #[cfg(feature = "x509")]
    {
        adapters::x509::read_extensions(&source, &cfg.limits)
    }
}

/// Whether the PEM-encoded client certificate may access `destination`.
pub fn is_valid(destination: &str, cert_pem: &[u8]) -> EngineResult<bool> {
    let cfg = AuthorizationConfig::secure_default();
    let extensions = read_extensions(CertificateSource::pem(cert_pem), &cfg)?;
    Ok(Authorizer::default().is_authorized(destination, &extensions))
}

// Re-exports for convenience
pub use domain::authorize::{Authorizer, DownloadUrlMatcher};
pub use domain::error::EngineError;
pub use domain::types::{EngineDefaults, LimitsConfig, OidAnchor, OidPattern};
#[cfg(feature = "profiles")]
pub use domain::profile::{ProfileManager, ProfileUpdate, UnitProfile};
