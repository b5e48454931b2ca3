use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Custom extensions of a decoded certificate, keyed by dotted OID.
///
/// Iteration order is the sorted OID order, but nothing that consumes the
/// set may depend on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionSet(BTreeMap<String, String>);

impl ExtensionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an extension, returning the previous value for the OID.
    pub fn insert(&mut self, oid: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(oid.into(), value.into())
    }

    pub fn get(&self, oid: &str) -> Option<&str> {
        self.0.get(oid).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ExtensionSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a ExtensionSet {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Outcome of an authorization check, with the extension that granted it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_oid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_value: Option<String>,
}

impl Decision {
    pub fn denied() -> Self {
        Self::default()
    }

    pub fn granted(oid: &str, value: &str) -> Self {
        Self {
            allowed: true,
            matched_oid: Some(oid.to_string()),
            matched_value: Some(value.to_string()),
        }
    }
}
