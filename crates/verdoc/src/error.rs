//! CLI error types.

use verdoc_build::BuildError;
use verdoc_config::ConfigError;
use verdoc_vcs::VcsError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Vcs(#[from] VcsError),

    #[error("{0}")]
    Build(#[from] BuildError),
}
