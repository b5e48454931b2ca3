// crates/engine/src/domain/profile.rs

//! Consumer unit profiles.
//!
//! A consumer reports, per content type, the units it has installed. The
//! manager keeps the latest report for each `(consumer, content type)` pair
//! along with a hash of it so callers can tell when a report changed.

use std::collections::{BTreeMap, HashSet};
use std::io::{self, Write};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::domain::error::{EngineError, EngineResult};

const CONSUMER: &str = "consumer";
const PROFILE: &str = "unit profile";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitProfile {
    pub consumer_id: String,
    pub content_type: String,
    pub profile: Value,
    pub profile_hash: String,
}

impl UnitProfile {
    pub fn new(consumer_id: &str, content_type: &str, profile: Value) -> EngineResult<Self> {
        let profile_hash = Self::calculate_hash(&profile)?;
        Ok(Self {
            consumer_id: consumer_id.to_string(),
            content_type: content_type.to_string(),
            profile,
            profile_hash,
        })
    }

    /// SHA-256 (lowercase hex) of the profile's canonical JSON text.
    ///
    /// The text is what `json.dumps(profile, sort_keys=True)` produces:
    /// keys sorted, `", "` and `": "` separators, and every character
    /// outside printable ASCII written as a `\uXXXX` escape. Hashes stored
    /// by Python services therefore compare equal. Floats are the exception,
    /// since Rust and Python do not always print them alike.
    pub fn calculate_hash(profile: &Value) -> EngineResult<String> {
        let canonical = canonical_json(profile)?;
        Ok(hex::encode(Sha256::digest(&canonical)))
    }
}

fn canonical_json(profile: &Value) -> EngineResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, AsciiJsonFormatter);
    profile.serialize(&mut ser)?;
    Ok(out)
}

/// `serde_json` formatter matching Python's default `json.dumps` layout.
struct AsciiJsonFormatter;

impl Formatter for AsciiJsonFormatter {
    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    // Quotes, backslashes and C0 controls never reach here; serde_json
    // escapes those itself. DEL and non-ASCII become UTF-16 escapes.
    fn write_string_fragment<W: ?Sized + Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if (' '..='~').contains(&ch) {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

/// Result of an upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub profile: UnitProfile,
    /// False when the stored hash already matched the new report.
    pub changed: bool,
}

type ProfileKey = (String, String);

#[derive(Debug, Default)]
struct Inner {
    consumers: HashSet<String>,
    profiles: BTreeMap<ProfileKey, UnitProfile>,
}

impl Inner {
    fn require_consumer(&self, consumer_id: &str) -> EngineResult<()> {
        if self.consumers.contains(consumer_id) {
            Ok(())
        } else {
            Err(missing(CONSUMER, consumer_id))
        }
    }

    fn remove_consumer_profiles(&mut self, consumer_id: &str) -> usize {
        let before = self.profiles.len();
        self.profiles.retain(|(c, _), _| c != consumer_id);
        before - self.profiles.len()
    }
}

/// In-memory unit profile store, safe to share between threads.
#[derive(Debug, Default)]
pub struct ProfileManager {
    inner: RwLock<Inner>,
}

impl ProfileManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a consumer. Registering an existing consumer is a no-op.
    pub fn register_consumer(&self, consumer_id: &str) {
        if self.inner.write().consumers.insert(consumer_id.to_string()) {
            info!(consumer_id, "consumer registered");
        }
    }

    /// Unregisters a consumer and drops its profiles.
    pub fn unregister_consumer(&self, consumer_id: &str) -> EngineResult<()> {
        let mut inner = self.inner.write();
        if !inner.consumers.remove(consumer_id) {
            return Err(missing(CONSUMER, consumer_id));
        }
        let removed = inner.remove_consumer_profiles(consumer_id);
        info!(consumer_id, removed, "consumer unregistered");
        Ok(())
    }

    pub fn create(&self, consumer_id: &str, content_type: &str, profile: Value) -> EngineResult<UnitProfile> {
        let mut inner = self.inner.write();
        inner.require_consumer(consumer_id)?;
        let key = (consumer_id.to_string(), content_type.to_string());
        if inner.profiles.contains_key(&key) {
            return Err(EngineError::DuplicateResource { kind: PROFILE, id: profile_id(consumer_id, content_type) });
        }
        let created = UnitProfile::new(consumer_id, content_type, profile)?;
        debug!(consumer_id, content_type, hash = %created.profile_hash, "unit profile created");
        inner.profiles.insert(key, created.clone());
        Ok(created)
    }

    /// Creates or replaces the profile for `(consumer_id, content_type)`.
    pub fn update(&self, consumer_id: &str, content_type: &str, profile: Value) -> EngineResult<ProfileUpdate> {
        let mut inner = self.inner.write();
        inner.require_consumer(consumer_id)?;
        let updated = UnitProfile::new(consumer_id, content_type, profile)?;
        let key = (consumer_id.to_string(), content_type.to_string());
        let changed = inner
            .profiles
            .get(&key)
            .map_or(true, |existing| existing.profile_hash != updated.profile_hash);
        if changed {
            debug!(consumer_id, content_type, hash = %updated.profile_hash, "unit profile updated");
        }
        inner.profiles.insert(key, updated.clone());
        Ok(ProfileUpdate { profile: updated, changed })
    }

    pub fn get_profile(&self, consumer_id: &str, content_type: &str) -> EngineResult<UnitProfile> {
        let key = (consumer_id.to_string(), content_type.to_string());
        self.inner
            .read()
            .profiles
            .get(&key)
            .cloned()
            .ok_or_else(|| missing(PROFILE, &profile_id(consumer_id, content_type)))
    }

    /// All profiles reported by a consumer, sorted by content type.
    pub fn get_profiles(&self, consumer_id: &str) -> Vec<UnitProfile> {
        self.inner
            .read()
            .profiles
            .values()
            .filter(|p| p.consumer_id == consumer_id)
            .cloned()
            .collect()
    }

    pub fn delete(&self, consumer_id: &str, content_type: &str) -> EngineResult<UnitProfile> {
        let mut inner = self.inner.write();
        inner.require_consumer(consumer_id)?;
        let key = (consumer_id.to_string(), content_type.to_string());
        let removed = inner
            .profiles
            .remove(&key)
            .ok_or_else(|| missing(PROFILE, &profile_id(consumer_id, content_type)))?;
        debug!(consumer_id, content_type, "unit profile deleted");
        Ok(removed)
    }

    /// Drops every profile of a deleted consumer; returns how many went.
    pub fn consumer_deleted(&self, consumer_id: &str) -> usize {
        let removed = self.inner.write().remove_consumer_profiles(consumer_id);
        debug!(consumer_id, removed, "consumer profiles purged");
        removed
    }
}

fn missing(kind: &'static str, id: &str) -> EngineError {
    EngineError::MissingResource { kind, id: id.to_string() }
}

fn profile_id(consumer_id: &str, content_type: &str) -> String {
    format!("{consumer_id}/{content_type}")
}
