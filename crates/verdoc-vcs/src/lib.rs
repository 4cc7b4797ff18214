//! Git ref enumeration and checkout for verdoc.
//!
//! Every documentation version is built from a branch or tag. This crate
//! provides a [`Repository`] trait covering the few operations the build
//! pipeline needs:
//!
//! - [`Repository::refs`] lists branches and tags matching a [`RefQuery`]
//! - [`Repository::head`] and [`Repository::checkout`] move the worktree
//!   between versions and back
//!
//! [`GitRepository`] reads refs with `gix` and checks out with the `git`
//! binary. [`MockRepository`] (behind the `mock` feature) keeps everything in
//! memory for tests.

mod git;
#[cfg(feature = "mock")]
mod mock;
mod refs;
mod repository;

pub use git::GitRepository;
#[cfg(feature = "mock")]
pub use mock::MockRepository;
pub use refs::{CheckoutTarget, GitRef, Head, RefKind, RefQuery};
pub use repository::{Repository, VcsError};
