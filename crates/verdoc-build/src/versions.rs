//! Turning git refs into named, ordered documentation versions.

use std::cmp::Ordering;
use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;
use verdoc_config::{RepositoryConfig, SortOrder, VersionsConfig};
use verdoc_switcher::{VersionRecord, VersionRegistry, is_url_safe_segment};
use verdoc_vcs::GitRef;

use crate::{ASSETS_DIR, BuildError};

/// Display names that would collide with files at the output root.
const RESERVED_NAMES: [&str; 2] = [ASSETS_DIR, "index.html"];

/// Error returned when the selected refs cannot form a version list.
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("No branches or tags match the configured pattern and filters")]
    NoVersions,
    #[error("Ref `{0}` has an empty display name after renaming")]
    EmptyName(String),
    #[error("Refs `{first}` and `{second}` both map to version `{name}`")]
    Duplicate {
        name: String,
        first: String,
        second: String,
    },
    #[error("Version name `{name}` (from ref `{git_ref}`) is reserved")]
    Reserved { name: String, git_ref: String },
    #[error(
        "Version name `{name}` (from ref `{git_ref}`) is not a URL-safe path segment; \
         add a rename rule"
    )]
    UnsafeName { name: String, git_ref: String },
    #[error("No version or ref named `{0}`")]
    CurrentNotFound(String),
    #[error("Invalid regex `{pattern}`: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A ref selected for publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    /// Path segment and selector label.
    pub display_name: String,
    pub git_ref: GitRef,
}

/// The versions to build, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPlan {
    pub versions: Vec<Version>,
    /// Display name of the version the site root redirects to.
    pub primary: String,
}

impl VersionPlan {
    /// Registry embedded into the generated site.
    ///
    /// Each record carries the ref's name, kind, remote flag, commit and
    /// timestamp as provenance.
    ///
    /// # Errors
    ///
    /// Returns an error if a ref cannot be serialized or the plan violates
    /// registry invariants.
    pub fn registry(&self) -> Result<VersionRegistry, BuildError> {
        let records = self
            .versions
            .iter()
            .map(|version| {
                let mut record = VersionRecord::new(&version.display_name)
                    .with_primary(version.display_name == self.primary);
                if let Value::Object(fields) = serde_json::to_value(&version.git_ref)? {
                    record.provenance = fields;
                }
                Ok(record)
            })
            .collect::<Result<_, BuildError>>()?;
        Ok(VersionRegistry::new(records)?)
    }
}

/// Filtering, naming and ordering rules.
#[derive(Debug, Default)]
pub struct VersionPolicy {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
    rename: Vec<(Regex, String)>,
    sort: SortOrder,
    order: Vec<String>,
    current: Option<String>,
}

fn compile(pattern: &str) -> Result<Regex, VersionError> {
    Regex::new(pattern).map_err(|source| VersionError::Regex {
        pattern: pattern.to_owned(),
        source,
    })
}

impl VersionPolicy {
    /// Build the policy from the `[repository]` filters and `[versions]` table.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::Regex`] if a filter or rename pattern is invalid.
    pub fn from_config(
        repository: &RepositoryConfig,
        versions: &VersionsConfig,
    ) -> Result<Self, VersionError> {
        Ok(Self {
            include: repository
                .include
                .iter()
                .map(|p| compile(p))
                .collect::<Result<_, _>>()?,
            exclude: repository
                .exclude
                .iter()
                .map(|p| compile(p))
                .collect::<Result<_, _>>()?,
            rename: versions
                .rename
                .iter()
                .map(|rule| Ok((compile(&rule.pattern)?, rule.replace.clone())))
                .collect::<Result<_, VersionError>>()?,
            sort: versions.sort,
            order: versions.order.clone(),
            current: versions.current.clone(),
        })
    }

    /// Whether a ref survives the include and exclude filters.
    fn accepts(&self, name: &str) -> bool {
        (self.include.is_empty() || self.include.iter().any(|re| re.is_match(name)))
            && !self.exclude.iter().any(|re| re.is_match(name))
    }

    /// Display name for a ref: rename rules in order, then `/` becomes `-`.
    #[must_use]
    pub fn display_name(&self, ref_name: &str) -> String {
        let mut name = ref_name.to_owned();
        for (pattern, replace) in &self.rename {
            name = pattern.replace_all(&name, replace.as_str()).into_owned();
        }
        name.replace('/', "-")
    }

    /// Select, name and order versions from `refs`.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is selected, two refs share a display name,
    /// a name is reserved, empty or not URL-safe, or the configured current
    /// version is unknown.
    pub fn plan(&self, refs: Vec<GitRef>) -> Result<VersionPlan, VersionError> {
        let mut versions = Vec::new();
        let mut seen: HashMap<String, String> = HashMap::new();

        for git_ref in refs {
            if !self.accepts(&git_ref.name) {
                tracing::debug!(git_ref = %git_ref.name, "Ref filtered out");
                continue;
            }
            let display_name = self.display_name(&git_ref.name);
            if display_name.is_empty() {
                return Err(VersionError::EmptyName(git_ref.name));
            }
            if RESERVED_NAMES.contains(&display_name.as_str()) {
                return Err(VersionError::Reserved {
                    name: display_name,
                    git_ref: git_ref.name,
                });
            }
            if !is_url_safe_segment(&display_name) {
                return Err(VersionError::UnsafeName {
                    name: display_name,
                    git_ref: git_ref.name,
                });
            }
            if let Some(first) = seen.insert(display_name.clone(), git_ref.name.clone()) {
                return Err(VersionError::Duplicate {
                    name: display_name,
                    first,
                    second: git_ref.name,
                });
            }
            versions.push(Version {
                display_name,
                git_ref,
            });
        }

        if versions.is_empty() {
            return Err(VersionError::NoVersions);
        }

        self.sort(&mut versions);
        let primary = self.primary(&versions)?;
        Ok(VersionPlan { versions, primary })
    }

    fn sort(&self, versions: &mut [Version]) {
        match self.sort {
            SortOrder::Natural => {
                versions.sort_by(|a, b| natural_cmp(&b.display_name, &a.display_name));
            }
            SortOrder::Date => versions.sort_by(|a, b| {
                b.git_ref
                    .timestamp
                    .cmp(&a.git_ref.timestamp)
                    .then_with(|| natural_cmp(&b.display_name, &a.display_name))
            }),
        }

        for name in &self.order {
            if !versions.iter().any(|v| &v.display_name == name) {
                tracing::warn!(version = %name, "Pinned version not found");
            }
        }
        // Stable, so unpinned versions keep their sorted order.
        versions.sort_by_key(|v| {
            self.order
                .iter()
                .position(|name| name == &v.display_name)
                .unwrap_or(usize::MAX)
        });
    }

    fn primary(&self, versions: &[Version]) -> Result<String, VersionError> {
        let Some(current) = &self.current else {
            return Ok(versions[0].display_name.clone());
        };
        versions
            .iter()
            .find(|v| &v.display_name == current)
            .or_else(|| versions.iter().find(|v| &v.git_ref.name == current))
            .map(|v| v.display_name.clone())
            .ok_or_else(|| VersionError::CurrentNotFound(current.clone()))
    }
}

/// Piece of a natural sort key.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Chunk<'a> {
    Text(&'a str),
    Number(u64),
}

/// Split into alternating text and digit runs, always starting and ending
/// with a (possibly empty) text run.
fn natural_key(s: &str) -> Vec<Chunk<'_>> {
    let mut key = Vec::new();
    let mut rest = s;
    loop {
        let text_end = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        key.push(Chunk::Text(&rest[..text_end]));
        rest = &rest[text_end..];
        if rest.is_empty() {
            return key;
        }
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        key.push(Chunk::Number(rest[..digits_end].parse().unwrap_or(u64::MAX)));
        rest = &rest[digits_end..];
    }
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a).cmp(&natural_key(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use verdoc_config::RenameRule;

    fn policy(configure: impl FnOnce(&mut RepositoryConfig, &mut VersionsConfig)) -> VersionPolicy {
        let mut repository = RepositoryConfig::default();
        let mut versions = VersionsConfig::default();
        configure(&mut repository, &mut versions);
        VersionPolicy::from_config(&repository, &versions).unwrap()
    }

    fn names(plan: &VersionPlan) -> Vec<&str> {
        plan.versions
            .iter()
            .map(|v| v.display_name.as_str())
            .collect()
    }

    fn tags(names: &[&str]) -> Vec<GitRef> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| GitRef::tag(*name, format!("c{i}"), i64::try_from(i).unwrap()))
            .collect()
    }

    #[test]
    fn natural_sort_descending() {
        let plan = VersionPolicy::default()
            .plan(tags(&["v1.9", "v1.10", "v1.2", "v2.0"]))
            .unwrap();
        assert_eq!(names(&plan), vec!["v2.0", "v1.10", "v1.9", "v1.2"]);
        assert_eq!(plan.primary, "v2.0");
    }

    #[test]
    fn natural_sort_longer_version_first() {
        let plan = VersionPolicy::default()
            .plan(tags(&["1.0", "1.0.1"]))
            .unwrap();
        assert_eq!(names(&plan), vec!["1.0.1", "1.0"]);
    }

    #[test]
    fn natural_sort_text_before_numbers() {
        let plan = VersionPolicy::default()
            .plan(tags(&["2.0", "main", "10.0"]))
            .unwrap();
        assert_eq!(names(&plan), vec!["main", "10.0", "2.0"]);
    }

    #[test]
    fn natural_key_chunks() {
        assert_eq!(
            natural_key("v1.10"),
            vec![
                Chunk::Text("v"),
                Chunk::Number(1),
                Chunk::Text("."),
                Chunk::Number(10),
                Chunk::Text(""),
            ]
        );
        assert_eq!(natural_key(""), vec![Chunk::Text("")]);
    }

    #[test]
    fn date_sort_newest_first() {
        let refs = vec![
            GitRef::branch("a", "c1", 300),
            GitRef::branch("b", "c2", 100),
            GitRef::branch("c", "c3", 200),
        ];
        let plan = policy(|_, v| v.sort = SortOrder::Date).plan(refs).unwrap();
        assert_eq!(names(&plan), vec!["a", "c", "b"]);
    }

    #[test]
    fn order_pins_versions_first() {
        let plan = policy(|_, v| v.order = vec!["main".to_owned(), "missing".to_owned()])
            .plan(tags(&["1.0", "main", "2.0"]))
            .unwrap();
        // `main` already sorts first naturally; pin something else too.
        assert_eq!(names(&plan), vec!["main", "2.0", "1.0"]);

        let plan = policy(|_, v| v.order = vec!["1.0".to_owned()])
            .plan(tags(&["1.0", "main", "2.0"]))
            .unwrap();
        assert_eq!(names(&plan), vec!["1.0", "main", "2.0"]);
        assert_eq!(plan.primary, "1.0");
    }

    #[test]
    fn rename_then_slashes_become_dashes() {
        let policy = policy(|_, v| {
            v.rename = vec![RenameRule {
                pattern: "^origin/".to_owned(),
                replace: String::new(),
            }];
        });
        assert_eq!(policy.display_name("origin/release/2.0"), "release-2.0");
        assert_eq!(policy.display_name("v1.0"), "v1.0");
    }

    #[test]
    fn rename_with_capture_groups() {
        let policy = policy(|_, v| {
            v.rename = vec![RenameRule {
                pattern: r"^release/(\d+\.\d+)$".to_owned(),
                replace: "$1".to_owned(),
            }];
        });
        assert_eq!(policy.display_name("release/3.1"), "3.1");
    }

    #[test]
    fn include_and_exclude_filters() {
        let plan = policy(|r, _| {
            r.include = vec![r"^v\d".to_owned()];
            r.exclude = vec!["-rc".to_owned()];
        })
        .plan(tags(&["v1.0", "v2.0-rc1", "nightly", "v2.0"]))
        .unwrap();
        assert_eq!(names(&plan), vec!["v2.0", "v1.0"]);
    }

    #[test]
    fn nothing_selected() {
        let err = policy(|r, _| r.include = vec!["^x".to_owned()])
            .plan(tags(&["v1.0"]))
            .unwrap_err();
        assert!(matches!(err, VersionError::NoVersions));
        assert!(matches!(
            VersionPolicy::default().plan(Vec::new()),
            Err(VersionError::NoVersions)
        ));
    }

    #[test]
    fn duplicate_display_names() {
        let refs = vec![
            GitRef::branch("release/1.0", "a", 0),
            GitRef::tag("release-1.0", "b", 0),
        ];
        let err = VersionPolicy::default().plan(refs).unwrap_err();
        match err {
            VersionError::Duplicate {
                name,
                first,
                second,
            } => {
                assert_eq!(name, "release-1.0");
                assert_eq!(first, "release/1.0");
                assert_eq!(second, "release-1.0");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reserved_names_rejected() {
        let err = VersionPolicy::default()
            .plan(tags(&["_verdoc"]))
            .unwrap_err();
        assert!(matches!(err, VersionError::Reserved { .. }));
    }

    #[test]
    fn names_browsers_would_escape_rejected() {
        let err = VersionPolicy::default()
            .plan(tags(&["v1.0", "fix#12"]))
            .unwrap_err();
        assert!(
            matches!(err, VersionError::UnsafeName { ref name, ref git_ref } if name == "fix#12" && git_ref == "fix#12")
        );

        let err = VersionPolicy::default()
            .plan(tags(&["версия-1"]))
            .unwrap_err();
        assert!(matches!(err, VersionError::UnsafeName { .. }));

        // A rename rule can make the name publishable.
        let plan = policy(|_, v| {
            v.rename = vec![RenameRule {
                pattern: "#".to_owned(),
                replace: "-".to_owned(),
            }];
        })
        .plan(tags(&["fix#12"]))
        .unwrap();
        assert_eq!(names(&plan), vec!["fix-12"]);
    }

    #[test]
    fn empty_name_after_rename() {
        let err = policy(|_, v| {
            v.rename = vec![RenameRule {
                pattern: ".*".to_owned(),
                replace: String::new(),
            }];
        })
        .plan(tags(&["v1.0"]))
        .unwrap_err();
        assert!(matches!(err, VersionError::EmptyName(name) if name == "v1.0"));
    }

    #[test]
    fn current_by_display_name_or_ref() {
        let refs = || vec![
            GitRef::branch("release/1.0", "a", 0),
            GitRef::branch("release/2.0", "b", 0),
        ];

        let plan = policy(|_, v| v.current = Some("release-1.0".to_owned()))
            .plan(refs())
            .unwrap();
        assert_eq!(plan.primary, "release-1.0");

        let plan = policy(|_, v| v.current = Some("release/1.0".to_owned()))
            .plan(refs())
            .unwrap();
        assert_eq!(plan.primary, "release-1.0");

        let err = policy(|_, v| v.current = Some("3.0".to_owned()))
            .plan(refs())
            .unwrap_err();
        assert!(matches!(err, VersionError::CurrentNotFound(name) if name == "3.0"));
    }

    #[test]
    fn invalid_regex() {
        let repository = RepositoryConfig {
            include: vec!["(".to_owned()],
            ..RepositoryConfig::default()
        };
        let err = VersionPolicy::from_config(&repository, &VersionsConfig::default()).unwrap_err();
        assert!(matches!(err, VersionError::Regex { .. }));
    }

    #[test]
    fn registry_carries_primary_and_provenance() {
        let plan = VersionPolicy::default()
            .plan(vec![
                GitRef::remote_branch("origin/main", "abc", 7),
                GitRef::tag("v1.0", "def", 3),
            ])
            .unwrap();
        let registry = plan.registry().unwrap();

        assert_eq!(registry.primary().unwrap().display_name, "v1.0");
        let tag = registry.get("v1.0").unwrap();
        assert_eq!(tag.provenance["ref"], "v1.0");
        assert_eq!(tag.provenance["kind"], "tag");
        assert_eq!(tag.provenance["commit"], "def");
        assert_eq!(tag.provenance["timestamp"], 3);

        let branch = registry.get("origin-main").unwrap();
        assert!(!branch.primary);
        assert_eq!(branch.provenance["ref"], "origin/main");
        assert_eq!(branch.provenance["remote"], true);
    }
}
