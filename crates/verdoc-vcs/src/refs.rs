//! Branch and tag descriptions.

use serde::Serialize;

use crate::VcsError;

/// Whether a ref is a branch or a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    Branch,
    Tag,
}

/// A branch or tag that documentation can be built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitRef {
    /// Short name, e.g. `main`, `origin/release/2.0` or `v1.0`.
    #[serde(rename = "ref")]
    pub name: String,
    pub kind: RefKind,
    /// Remote-tracking branch. Always false for tags.
    pub remote: bool,
    /// Hex id of the commit the ref points to (tags peeled).
    pub commit: String,
    /// Commit time in seconds since the Unix epoch.
    pub timestamp: i64,
}

impl GitRef {
    /// A local branch.
    pub fn branch(name: impl Into<String>, commit: impl Into<String>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            kind: RefKind::Branch,
            remote: false,
            commit: commit.into(),
            timestamp,
        }
    }

    /// A remote-tracking branch.
    pub fn remote_branch(
        name: impl Into<String>,
        commit: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            remote: true,
            ..Self::branch(name, commit, timestamp)
        }
    }

    /// A tag.
    pub fn tag(name: impl Into<String>, commit: impl Into<String>, timestamp: i64) -> Self {
        Self {
            kind: RefKind::Tag,
            ..Self::branch(name, commit, timestamp)
        }
    }
}

/// Which refs to list. Tags are always included.
#[derive(Debug, Clone, Default)]
pub struct RefQuery {
    local_branches: bool,
    remote_branches: bool,
    pattern: Option<glob::Pattern>,
}

impl RefQuery {
    #[must_use]
    pub fn new(local_branches: bool, remote_branches: bool) -> Self {
        Self {
            local_branches,
            remote_branches,
            pattern: None,
        }
    }

    /// Restrict to short names matching a glob (`*` also matches `/`).
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Pattern`] if the glob is invalid.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, VcsError> {
        let compiled = glob::Pattern::new(pattern).map_err(|e| VcsError::Pattern {
            pattern: pattern.to_owned(),
            message: e.to_string(),
        })?;
        self.pattern = Some(compiled);
        Ok(self)
    }

    #[must_use]
    pub fn local_branches(&self) -> bool {
        self.local_branches
    }

    #[must_use]
    pub fn remote_branches(&self) -> bool {
        self.remote_branches
    }

    /// Whether `git_ref` is selected by this query.
    #[must_use]
    pub fn matches(&self, git_ref: &GitRef) -> bool {
        let kind_selected = match (git_ref.kind, git_ref.remote) {
            (RefKind::Tag, _) => true,
            (RefKind::Branch, false) => self.local_branches,
            (RefKind::Branch, true) => self.remote_branches,
        };
        kind_selected
            && self
                .pattern
                .as_ref()
                .is_none_or(|pattern| pattern.matches(&git_ref.name))
    }
}

/// What HEAD points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// A local branch (short name).
    Branch(String),
    /// A detached commit (hex id).
    Detached(String),
}

/// Where to move the worktree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutTarget {
    /// Detach at a commit.
    Commit(String),
    /// Switch to a local branch.
    Branch(String),
}

impl From<&GitRef> for CheckoutTarget {
    fn from(git_ref: &GitRef) -> Self {
        Self::Commit(git_ref.commit.clone())
    }
}

impl From<&Head> for CheckoutTarget {
    fn from(head: &Head) -> Self {
        match head {
            Head::Branch(name) => Self::Branch(name.clone()),
            Head::Detached(id) => Self::Commit(id.clone()),
        }
    }
}
