//! Current-version inference and cross-version destination URLs.

use serde::{Deserialize, Serialize};

use crate::location::{Location, page_identifier};
use crate::{FileManifest, VersionRecord, VersionRegistry};

/// Data embedded into every generated page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitcherData {
    /// Registered versions in display order.
    pub versions: VersionRegistry,
    /// Pages per version. Absent means navigation is unchecked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<FileManifest>,
    /// Selector of the element the control is inserted into.
    pub inject_selector: String,
}

impl SwitcherData {
    /// Parse the embedded JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the registry is invalid.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to the embedded JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if provenance values cannot be serialized.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Error returned when the current URL cannot be tied to one version.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    #[error("no registered version appears as a path segment of `{url}`")]
    NoMatch { url: String },
    #[error("several versions ({}) appear as path segments of `{url}`", .candidates.join(", "))]
    Ambiguous {
        url: String,
        candidates: Vec<String>,
    },
}

/// Error returned when a destination URL cannot be computed.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error("unknown target version `{0}`")]
    UnknownTarget(String),
}

/// One entry of the rendered version selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    pub selected: bool,
}

/// The current page's version and where it sits in the URL.
struct Located<'u, 'r> {
    location: Location<'u>,
    start: usize,
    record: &'r VersionRecord,
}

/// Resolves versions from URLs and computes cross-version links.
///
/// A pure function of its inputs: the registry, the optional manifest, and
/// the URL passed to each call.
#[derive(Debug, Clone)]
pub struct Switcher {
    registry: VersionRegistry,
    manifest: Option<FileManifest>,
}

impl Switcher {
    #[must_use]
    pub fn new(registry: VersionRegistry, manifest: Option<FileManifest>) -> Self {
        Self { registry, manifest }
    }

    #[must_use]
    pub fn registry(&self) -> &VersionRegistry {
        &self.registry
    }

    /// The version the page at `url` belongs to.
    ///
    /// A version matches when its display name equals one of the URL's path
    /// segments. If a single version matches several segments, the leftmost
    /// one counts.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::NoMatch`] if no version matches and
    /// [`InferenceError::Ambiguous`] if more than one distinct version does.
    pub fn current_version(&self, url: &str) -> Result<&VersionRecord, InferenceError> {
        self.locate(url).map(|located| located.record)
    }

    /// Selector entries in registry order, with the current version selected.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError`] if the current version cannot be determined.
    pub fn options(&self, url: &str) -> Result<Vec<SelectOption>, InferenceError> {
        let current = self.current_version(url)?;
        Ok(self
            .registry
            .iter()
            .map(|record| SelectOption {
                label: record.display_name.clone(),
                value: record.display_name.clone(),
                selected: record.display_name == current.display_name,
            })
            .collect())
    }

    /// URL to navigate to when `target` is picked while viewing `url`.
    ///
    /// The path after the version segment, query and fragment included, is
    /// kept when the manifest lists that page for `target` or when there is
    /// no manifest. Otherwise the target's `index.html` is used.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::UnknownTarget`] if `target` is not
    /// registered, or [`NavigationError::Inference`] if the current version
    /// cannot be determined.
    pub fn destination(&self, url: &str, target: &str) -> Result<String, NavigationError> {
        if self.registry.get(target).is_none() {
            return Err(NavigationError::UnknownTarget(target.to_owned()));
        }

        let located = self.locate(url)?;
        let split = located
            .location
            .split_at_segment(located.start, located.record.display_name.len());

        let keep_path = match &self.manifest {
            Some(manifest) => manifest.contains(target, &page_identifier(split.remainder)),
            None => true,
        };
        let remainder = if keep_path {
            split.remainder
        } else {
            "index.html"
        };

        Ok(format!("{}{target}/{remainder}", split.base))
    }

    fn locate<'u>(&self, url: &'u str) -> Result<Located<'u, '_>, InferenceError> {
        let location = Location::parse(url);
        let mut first: Option<(usize, &VersionRecord)> = None;
        let mut candidates: Vec<String> = Vec::new();

        for (start, segment) in location.segments() {
            let Some(record) = self.registry.get(segment) else {
                continue;
            };
            if first.is_none() {
                first = Some((start, record));
            }
            if !candidates.iter().any(|c| c == segment) {
                candidates.push(segment.to_owned());
            }
        }

        match first {
            None => Err(InferenceError::NoMatch {
                url: url.to_owned(),
            }),
            Some(_) if candidates.len() > 1 => Err(InferenceError::Ambiguous {
                url: url.to_owned(),
                candidates,
            }),
            Some((start, record)) => Ok(Located {
                location,
                start,
                record,
            }),
        }
    }
}
