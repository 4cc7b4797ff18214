//! Mock repository implementation for testing.
//!
//! Provides [`MockRepository`] for unit testing without a git checkout.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::{CheckoutTarget, GitRef, Head, RefQuery, Repository, VcsError};

/// Mock repository for testing.
///
/// Holds refs in memory and records every checkout. Use the builder methods
/// to configure the mock with test data.
///
/// # Example
///
/// ```ignore
/// use verdoc_vcs::{GitRef, MockRepository, RefQuery, Repository};
///
/// let repo = MockRepository::new("/repo")
///     .with_ref(GitRef::tag("v1.0", "abc", 0));
///
/// let refs = repo.refs(&RefQuery::new(false, false)).unwrap();
/// assert_eq!(refs.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockRepository {
    workdir: PathBuf,
    refs: Vec<GitRef>,
    head: RwLock<Head>,
    dirty: bool,
    checkouts: RwLock<Vec<CheckoutTarget>>,
}

impl MockRepository {
    /// Create an empty mock on `main`.
    #[must_use]
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            refs: Vec::new(),
            head: RwLock::new(Head::Branch("main".to_owned())),
            dirty: false,
            checkouts: RwLock::new(Vec::new()),
        }
    }

    /// Add a ref.
    #[must_use]
    pub fn with_ref(mut self, git_ref: GitRef) -> Self {
        self.refs.push(git_ref);
        self
    }

    /// Set the initial HEAD.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_head(self, head: Head) -> Self {
        *self.head.write().unwrap() = head;
        self
    }

    /// Report uncommitted changes.
    #[must_use]
    pub fn with_dirty(mut self, dirty: bool) -> Self {
        self.dirty = dirty;
        self
    }

    /// Every checkout performed so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn checkouts(&self) -> Vec<CheckoutTarget> {
        self.checkouts.read().unwrap().clone()
    }
}

impl Repository for MockRepository {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn refs(&self, query: &RefQuery) -> Result<Vec<GitRef>, VcsError> {
        Ok(self
            .refs
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect())
    }

    fn head(&self) -> Result<Head, VcsError> {
        Ok(self.head.read().unwrap().clone())
    }

    fn is_clean(&self) -> Result<bool, VcsError> {
        Ok(!self.dirty)
    }

    fn checkout(&self, target: &CheckoutTarget) -> Result<(), VcsError> {
        if self.dirty {
            return Err(VcsError::Dirty(self.workdir.clone()));
        }
        *self.head.write().unwrap() = match target {
            CheckoutTarget::Branch(name) => Head::Branch(name.clone()),
            CheckoutTarget::Commit(id) => Head::Detached(id.clone()),
        };
        self.checkouts.write().unwrap().push(target.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_checkouts() {
        let repo = MockRepository::new("/repo").with_ref(GitRef::tag("v1.0", "abc", 0));
        let tag = repo.refs(&RefQuery::new(false, false)).unwrap().remove(0);

        repo.checkout(&CheckoutTarget::from(&tag)).unwrap();
        assert_eq!(repo.head().unwrap(), Head::Detached("abc".to_owned()));

        repo.checkout(&CheckoutTarget::Branch("main".to_owned()))
            .unwrap();
        assert_eq!(
            repo.checkouts(),
            vec![
                CheckoutTarget::Commit("abc".to_owned()),
                CheckoutTarget::Branch("main".to_owned()),
            ]
        );
    }

    #[test]
    fn dirty_refuses_checkout() {
        let repo = MockRepository::new("/repo").with_dirty(true);
        assert!(!repo.is_clean().unwrap());
        assert!(
            repo.checkout(&CheckoutTarget::Branch("main".to_owned()))
                .is_err()
        );
    }
}
