//! Repository trait and error types.

use std::path::{Path, PathBuf};

use crate::{CheckoutTarget, GitRef, Head, RefQuery};

/// Error returned by repository operations.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    #[error("Not a git repository with a worktree: {}", .path.display())]
    Open { path: PathBuf, message: String },
    #[error("Git error: {0}")]
    Git(String),
    #[error("Invalid ref pattern `{pattern}`: {message}")]
    Pattern { pattern: String, message: String },
    #[error("Repository has uncommitted changes: {}", .0.display())]
    Dirty(PathBuf),
    #[error("Failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("`git {args}` failed: {stderr}")]
    Command { args: String, stderr: String },
}

/// The operations the build pipeline needs from version control.
pub trait Repository {
    /// Worktree root.
    fn workdir(&self) -> &Path;

    /// Branches and tags selected by `query`.
    fn refs(&self, query: &RefQuery) -> Result<Vec<GitRef>, VcsError>;

    /// What HEAD currently points at.
    fn head(&self) -> Result<Head, VcsError>;

    /// Whether the worktree has no uncommitted changes.
    fn is_clean(&self) -> Result<bool, VcsError>;

    /// Move the worktree to `target`.
    ///
    /// Implementations refuse to run on a dirty worktree.
    fn checkout(&self, target: &CheckoutTarget) -> Result<(), VcsError>;
}
