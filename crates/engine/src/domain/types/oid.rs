use std::fmt;
use std::str::FromStr;

use crate::domain::error::{EngineError, EngineResult};

/// Where a pattern is pinned against the OID it is tested on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidAnchor {
    /// `1.3.6.`: the leading arcs must match.
    Start,
    /// `.1.6`: the trailing arcs must match.
    End,
    /// `2.5.29.15`: every arc must match.
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Arc {
    Any,
    Value(String),
}

impl Arc {
    fn matches(&self, arc: &str) -> bool {
        match self {
            Arc::Any => true,
            Arc::Value(v) => v == arc,
        }
    }
}

/// Dotted OID pattern with wildcard arcs.
///
/// Pattern syntax:
/// - `1.3.6.1.4.1.2312.9.2.` matches OIDs starting with those arcs
/// - `.1.6` matches OIDs ending with those arcs
/// - `1.3.*.1` matches a whole OID, `*` standing for any single arc
///
/// Anchored patterns need at least one arc beyond the pattern, so
/// `1.3.` does not match the OID `1.3` itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OidPattern {
    anchor: OidAnchor,
    arcs: Vec<Arc>,
    source: String,
}

impl OidPattern {
    pub fn parse(pattern: &str) -> EngineResult<Self> {
        let trimmed = pattern.trim();
        let (anchor, body) = match (trimmed.strip_prefix('.'), trimmed.strip_suffix('.')) {
            (Some(_), Some(_)) => {
                return Err(EngineError::Config(format!(
                    "OID pattern cannot be anchored at both ends: {pattern:?}"
                )))
            }
            (Some(rest), None) => (OidAnchor::End, rest),
            (None, Some(rest)) => (OidAnchor::Start, rest),
            (None, None) => (OidAnchor::Exact, trimmed),
        };
        if body.is_empty() {
            return Err(EngineError::Config(format!("empty OID pattern: {pattern:?}")));
        }

        let arcs = body
            .split('.')
            .map(|arc| match arc {
                "*" => Ok(Arc::Any),
                a if !a.is_empty() && a.bytes().all(|b| b.is_ascii_digit()) => {
                    Ok(Arc::Value(a.to_string()))
                }
                a => Err(EngineError::Config(format!(
                    "invalid arc {a:?} in OID pattern {pattern:?}"
                ))),
            })
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(Self { anchor, arcs, source: trimmed.to_string() })
    }

    /// Builds a pattern from known-good arcs; `"*"` is the wildcard arc.
    pub(crate) fn from_arcs(anchor: OidAnchor, arcs: &[&str]) -> Self {
        let body = arcs.join(".");
        let source = match anchor {
            OidAnchor::Start => format!("{body}."),
            OidAnchor::End => format!(".{body}"),
            OidAnchor::Exact => body,
        };
        let arcs = arcs
            .iter()
            .map(|a| if *a == "*" { Arc::Any } else { Arc::Value(a.to_string()) })
            .collect();
        Self { anchor, arcs, source }
    }

    pub fn anchor(&self) -> OidAnchor {
        self.anchor
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Tests a dotted OID string against this pattern. Never fails; a
    /// malformed OID simply does not match.
    pub fn matches(&self, oid: &str) -> bool {
        let arcs: Vec<&str> = oid.split('.').collect();
        let n = self.arcs.len();
        match self.anchor {
            OidAnchor::Exact => {
                arcs.len() == n && self.arcs.iter().zip(&arcs).all(|(p, a)| p.matches(a))
            }
            OidAnchor::Start => {
                arcs.len() > n && self.arcs.iter().zip(&arcs).all(|(p, a)| p.matches(a))
            }
            OidAnchor::End => {
                arcs.len() > n
                    && self
                        .arcs
                        .iter()
                        .zip(&arcs[arcs.len() - n..])
                        .all(|(p, a)| p.matches(a))
            }
        }
    }
}

impl FromStr for OidPattern {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OidPattern::parse(s)
    }
}

impl fmt::Display for OidPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
