//! Per-version sets of published pages.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Maps each version's display name to the pages published under it.
///
/// Page identifiers are paths relative to the version root with `/`
/// separators, e.g. `index.html` or `api/module.html`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileManifest {
    versions: BTreeMap<String, BTreeSet<String>>,
}

impl FileManifest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add pages to a version, creating the entry if needed.
    pub fn insert<I, S>(&mut self, version: impl Into<String>, pages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.versions
            .entry(version.into())
            .or_default()
            .extend(pages.into_iter().map(Into::into));
    }

    /// Whether `page` is known to exist under `version`.
    ///
    /// A version with no entry has no known pages.
    #[must_use]
    pub fn contains(&self, version: &str, page: &str) -> bool {
        self.versions
            .get(version)
            .is_some_and(|pages| pages.contains(page))
    }

    /// Pages recorded for a version.
    #[must_use]
    pub fn pages(&self, version: &str) -> Option<&BTreeSet<String>> {
        self.versions.get(version)
    }

    /// Number of versions with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}
