//! [`Repository`] backed by a real git repository.
//!
//! Refs, HEAD and worktree status are read with `gix`. Checkouts shell out to
//! the `git` binary.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::{CheckoutTarget, GitRef, Head, RefKind, RefQuery, Repository, VcsError};

/// A git repository with a worktree.
pub struct GitRepository {
    repo: gix::Repository,
    workdir: PathBuf,
}

fn git_err(err: impl Display) -> VcsError {
    VcsError::Git(err.to_string())
}

impl GitRepository {
    /// Open the repository containing `path`.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::Open`] if no repository is found or it is bare.
    pub fn open(path: &Path) -> Result<Self, VcsError> {
        let repo = gix::discover(path).map_err(|e| VcsError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| VcsError::Open {
                path: path.to_path_buf(),
                message: "repository is bare".to_owned(),
            })?
            .to_path_buf();
        tracing::debug!(workdir = %workdir.display(), "Opened git repository");
        Ok(Self { repo, workdir })
    }

    /// Describe a reference, peeling tags to their commit.
    fn describe(
        &self,
        reference: &gix::Reference<'_>,
        kind: RefKind,
        remote: bool,
    ) -> Result<GitRef, VcsError> {
        let full_name = reference.name().as_bstr().to_string();
        let rev = format!("{full_name}^{{commit}}");
        let id = self.repo.rev_parse_single(rev.as_str()).map_err(git_err)?;
        let commit = id
            .object()
            .map_err(git_err)?
            .try_into_commit()
            .map_err(git_err)?;
        let time = commit.time().map_err(git_err)?;

        Ok(GitRef {
            name: reference.name().shorten().to_string(),
            kind,
            remote,
            commit: id.to_string(),
            timestamp: time.seconds,
        })
    }

    /// Run `git` in the worktree, returning stdout.
    fn git(&self, args: &[&str]) -> Result<String, VcsError> {
        tracing::debug!(args = %args.join(" "), "Running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()?;

        if !output.status.success() {
            return Err(VcsError::Command {
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Repository for GitRepository {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn refs(&self, query: &RefQuery) -> Result<Vec<GitRef>, VcsError> {
        let platform = self.repo.references().map_err(git_err)?;
        let mut refs = Vec::new();

        if query.local_branches() {
            for reference in platform.local_branches().map_err(git_err)? {
                let reference = reference.map_err(git_err)?;
                refs.push(self.describe(&reference, RefKind::Branch, false)?);
            }
        }

        if query.remote_branches() {
            for reference in platform.remote_branches().map_err(git_err)? {
                let reference = reference.map_err(git_err)?;
                // `origin/HEAD` is a symbolic alias of another remote branch.
                if reference.name().shorten().ends_with(b"/HEAD") {
                    continue;
                }
                refs.push(self.describe(&reference, RefKind::Branch, true)?);
            }
        }

        for reference in platform.tags().map_err(git_err)? {
            let reference = reference.map_err(git_err)?;
            refs.push(self.describe(&reference, RefKind::Tag, false)?);
        }

        refs.retain(|r| query.matches(r));
        tracing::debug!(count = refs.len(), "Listed refs");
        Ok(refs)
    }

    fn head(&self) -> Result<Head, VcsError> {
        match self.repo.head_name().map_err(git_err)? {
            Some(name) => Ok(Head::Branch(name.as_ref().shorten().to_string())),
            None => Ok(Head::Detached(
                self.repo.head_id().map_err(git_err)?.to_string(),
            )),
        }
    }

    fn is_clean(&self) -> Result<bool, VcsError> {
        let dirty = self.repo.is_dirty().map_err(git_err)?;
        Ok(!dirty)
    }

    fn checkout(&self, target: &CheckoutTarget) -> Result<(), VcsError> {
        if !self.is_clean()? {
            return Err(VcsError::Dirty(self.workdir.clone()));
        }
        match target {
            CheckoutTarget::Commit(id) => self.git(&["checkout", "--quiet", "--detach", id])?,
            CheckoutTarget::Branch(name) => self.git(&["checkout", "--quiet", name])?,
        };
        tracing::debug!(target = ?target, "Checked out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
    }

    fn run(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args([
                "-c",
                "user.name=verdoc",
                "-c",
                "user.email=verdoc@example.com",
                "-c",
                "commit.gpgsign=false",
                "-c",
                "tag.gpgsign=false",
            ])
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(status.status.success(), "git {args:?} failed: {status:?}");
    }

    /// Repository with `main`, `release/1.0` and an annotated `v1.0` tag.
    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path();
        run(path, &["init", "--quiet"]);
        run(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        std::fs::write(path.join("README"), "one\n").unwrap();
        run(path, &["add", "README"]);
        run(path, &["commit", "--quiet", "-m", "first"]);
        run(path, &["tag", "-a", "v1.0", "-m", "one"]);
        run(path, &["branch", "release/1.0"]);
        std::fs::write(path.join("README"), "two\n").unwrap();
        run(path, &["commit", "--quiet", "-am", "second"]);
        dir
    }

    #[test]
    fn open_rejects_plain_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("not-a-repo");
        std::fs::create_dir(&nested).unwrap();
        // A git repository may exist above the temp dir on some machines.
        if gix::discover(&nested).is_ok() {
            return;
        }
        assert!(matches!(
            GitRepository::open(&nested),
            Err(VcsError::Open { .. })
        ));
    }

    #[test]
    fn lists_local_branches_and_tags() {
        if !git_available() {
            return;
        }
        let dir = fixture();
        let repo = GitRepository::open(dir.path()).unwrap();

        let refs = repo.refs(&RefQuery::new(true, false)).unwrap();
        let mut names: Vec<_> = refs.iter().map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["main", "release/1.0", "v1.0"]);

        let tag = refs.iter().find(|r| r.name == "v1.0").unwrap();
        let release = refs.iter().find(|r| r.name == "release/1.0").unwrap();
        assert_eq!(tag.kind, RefKind::Tag);
        // The annotated tag is peeled to the commit it points at.
        assert_eq!(tag.commit, release.commit);
        assert!(tag.timestamp > 0);
    }

    #[test]
    fn remote_only_query_lists_tags() {
        if !git_available() {
            return;
        }
        let dir = fixture();
        let repo = GitRepository::open(dir.path()).unwrap();

        let refs = repo.refs(&RefQuery::new(false, true)).unwrap();
        let names: Vec<_> = refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["v1.0"]);
    }

    #[test]
    fn checkout_and_restore() {
        if !git_available() {
            return;
        }
        let dir = fixture();
        let repo = GitRepository::open(dir.path()).unwrap();
        assert_eq!(repo.head().unwrap(), Head::Branch("main".to_owned()));
        assert!(repo.is_clean().unwrap());

        let refs = repo.refs(&RefQuery::new(true, false)).unwrap();
        let tag = refs.iter().find(|r| r.name == "v1.0").unwrap();
        repo.checkout(&CheckoutTarget::from(tag)).unwrap();

        assert_eq!(repo.head().unwrap(), Head::Detached(tag.commit.clone()));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("README")).unwrap(),
            "one\n"
        );

        repo.checkout(&CheckoutTarget::Branch("main".to_owned()))
            .unwrap();
        assert_eq!(repo.head().unwrap(), Head::Branch("main".to_owned()));
    }

    #[test]
    fn checkout_refuses_dirty_worktree() {
        if !git_available() {
            return;
        }
        let dir = fixture();
        let repo = GitRepository::open(dir.path()).unwrap();
        std::fs::write(dir.path().join("README"), "edited\n").unwrap();

        let err = repo
            .checkout(&CheckoutTarget::Branch("release/1.0".to_owned()))
            .unwrap_err();
        assert!(matches!(err, VcsError::Dirty(_)));
    }
}
