//! Version records and the ordered registry built from them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single published documentation version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Label shown in the selector and path segment the version is published under.
    pub display_name: String,
    /// Whether this is the default version readers land on.
    #[serde(default)]
    pub primary: bool,
    /// Build provenance (ref name, kind, timestamp). Carried through untouched.
    #[serde(flatten)]
    pub provenance: Map<String, Value>,
}

impl VersionRecord {
    /// Create a non-primary record without provenance.
    #[must_use]
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            primary: false,
            provenance: Map::new(),
        }
    }

    /// Mark the record as the primary version.
    #[must_use]
    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    /// Attach a provenance field.
    #[must_use]
    pub fn with_provenance(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.provenance.insert(key.into(), value.into());
        self
    }
}

/// Error returned when a registry violates its invariants.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("version registry is empty")]
    Empty,
    #[error("version display name cannot be empty")]
    EmptyName,
    #[error("version display name `{0}` is not a URL-safe path segment")]
    InvalidName(String),
    #[error("duplicate version display name `{0}`")]
    Duplicate(String),
}

/// Whether `name` can be published as a path segment that browsers report
/// unchanged in `location.href`.
///
/// Allowed are ASCII letters, digits and `-._~+`. `.` and `..` are rejected.
#[must_use]
pub fn is_url_safe_segment(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~' | b'+'))
}

/// Ordered, non-empty list of versions with unique display names.
///
/// Order is display order in the selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<VersionRecord>", into = "Vec<VersionRecord>")]
pub struct VersionRegistry {
    records: Vec<VersionRecord>,
}

impl VersionRegistry {
    /// Build a registry, validating names.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if `records` is empty, or a display name is
    /// empty, not a URL-safe path segment, or appears twice.
    pub fn new(records: Vec<VersionRecord>) -> Result<Self, RegistryError> {
        if records.is_empty() {
            return Err(RegistryError::Empty);
        }
        for (i, record) in records.iter().enumerate() {
            let name = record.display_name.as_str();
            if name.is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if !is_url_safe_segment(name) {
                return Err(RegistryError::InvalidName(name.to_owned()));
            }
            if records[..i].iter().any(|r| r.display_name == name) {
                return Err(RegistryError::Duplicate(name.to_owned()));
            }
        }
        Ok(Self { records })
    }

    /// Look up a version by display name.
    #[must_use]
    pub fn get(&self, display_name: &str) -> Option<&VersionRecord> {
        self.records.iter().find(|r| r.display_name == display_name)
    }

    /// The first record flagged primary, if any.
    #[must_use]
    pub fn primary(&self) -> Option<&VersionRecord> {
        self.records.iter().find(|r| r.primary)
    }

    /// Records in display order.
    pub fn iter(&self) -> impl Iterator<Item = &VersionRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl TryFrom<Vec<VersionRecord>> for VersionRegistry {
    type Error = RegistryError;

    fn try_from(records: Vec<VersionRecord>) -> Result<Self, Self::Error> {
        Self::new(records)
    }
}

impl From<VersionRegistry> for Vec<VersionRecord> {
    fn from(registry: VersionRegistry) -> Self {
        registry.records
    }
}
