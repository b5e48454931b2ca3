// crates/engine/src/domain/authorize.rs

//! Certificate-based content authorization.
//!
//! An entitlement certificate lists the content it grants as download-URL
//! extensions. A request is allowed when one of those URLs is contained in
//! the destination being fetched.

use once_cell::sync::Lazy;
use tracing::{debug, Span};

use crate::domain::error::EngineResult;
use crate::domain::types::{AuthorizationConfig, Decision, ExtensionSet, OidAnchor, OidPattern};

/// Built-in download-URL class: `1.3.6.1.4.1.2312.9.2.` and `.1.6`.
static DEFAULT_MATCHER: Lazy<DownloadUrlMatcher> = Lazy::new(|| DownloadUrlMatcher {
    prefix: OidPattern::from_arcs(OidAnchor::Start, &["1", "3", "6", "1", "4", "1", "2312", "9", "2"]),
    suffix: OidPattern::from_arcs(OidAnchor::End, &["1", "6"]),
});

/// Recognizes download-URL extensions by OID. Both patterns must hold on
/// the same OID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadUrlMatcher {
    prefix: OidPattern,
    suffix: OidPattern,
}

impl DownloadUrlMatcher {
    pub fn new(prefix: OidPattern, suffix: OidPattern) -> Self {
        Self { prefix, suffix }
    }

    pub fn from_config(cfg: &AuthorizationConfig) -> EngineResult<Self> {
        let (prefix, suffix) = cfg.patterns()?;
        Ok(Self { prefix, suffix })
    }

    pub fn builtin() -> &'static DownloadUrlMatcher {
        &DEFAULT_MATCHER
    }

    pub fn matches(&self, oid: &str) -> bool {
        self.prefix.matches(oid) && self.suffix.matches(oid)
    }

    pub fn prefix(&self) -> &OidPattern {
        &self.prefix
    }

    pub fn suffix(&self) -> &OidPattern {
        &self.suffix
    }
}

impl Default for DownloadUrlMatcher {
    fn default() -> Self {
        DEFAULT_MATCHER.clone()
    }
}

/// Authorization predicate evaluator.
///
/// Stateless apart from its matcher and the span its diagnostics are
/// recorded under, so one instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct Authorizer {
    matcher: DownloadUrlMatcher,
    span: Span,
}

impl Authorizer {
    pub fn new(cfg: &AuthorizationConfig) -> EngineResult<Self> {
        Self::with_span(cfg, default_span())
    }

    /// Like [`Authorizer::new`] but logs under the caller's span.
    pub fn with_span(cfg: &AuthorizationConfig, span: Span) -> EngineResult<Self> {
        cfg.validate()?;
        Ok(Self { matcher: DownloadUrlMatcher::from_config(cfg)?, span })
    }

    pub fn matcher(&self) -> &DownloadUrlMatcher {
        &self.matcher
    }

    pub fn is_authorized(&self, destination: &str, extensions: &ExtensionSet) -> bool {
        self.decide(destination, extensions).allowed
    }

    pub fn decide(&self, destination: &str, extensions: &ExtensionSet) -> Decision {
        self.decide_pairs(destination, extensions.iter())
    }

    /// [`Authorizer::is_authorized`] over any `(oid, value)` source, e.g. a
    /// `HashMap` or a `Vec` of pairs. The answer does not depend on order.
    pub fn authorize_pairs<I, K, V>(&self, destination: &str, pairs: I) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.decide_pairs(destination, pairs).allowed
    }

    /// Evaluates pairs until the first download-URL extension whose value is
    /// contained in `destination`.
    ///
    /// Containment is a plain substring test: an extension value of `/content`
    /// grants `/content/anything` and also `/x/content`. An empty value grants
    /// every non-empty destination.
    pub fn decide_pairs<I, K, V>(&self, destination: &str, pairs: I) -> Decision
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let _entered = self.span.enter();

        if destination.is_empty() {
            debug!("empty destination, denying");
            return Decision::denied();
        }
        debug!(destination, "checking entitlement");

        for (oid, value) in pairs {
            let (oid, value) = (oid.as_ref(), value.as_ref());
            if !self.matcher.matches(oid) {
                continue;
            }
            debug!(oid, url = value, "download URL extension");
            if destination.contains(value) {
                return Decision::granted(oid, value);
            }
        }
        Decision::denied()
    }
}

impl Default for Authorizer {
    fn default() -> Self {
        Self { matcher: DownloadUrlMatcher::default(), span: default_span() }
    }
}

fn default_span() -> Span {
    tracing::debug_span!("entitlement_authorize")
}
