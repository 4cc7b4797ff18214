//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod versions;

use std::path::PathBuf;

use clap::Args;
use verdoc_config::{CliSettings, Config, RefLocation};

use crate::error::CliError;

pub(crate) use build::BuildArgs;
pub(crate) use versions::VersionsArgs;

/// Options shared by commands that select versions.
#[derive(Args)]
pub(crate) struct SelectionArgs {
    /// Path to configuration file (default: auto-discover verdoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Repository root (overrides config, default: config directory).
    #[arg(short, long)]
    repo: Option<PathBuf>,

    /// Glob that branch and tag names must match (overrides config).
    #[arg(short, long)]
    pattern: Option<String>,

    /// Which branches to consider: all, local or remote (overrides config).
    #[arg(short, long)]
    location: Option<RefLocation>,

    /// Branch, tag or version name readers land on (overrides config).
    #[arg(long = "version", value_name = "VERSION")]
    current: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

impl SelectionArgs {
    fn settings(&self) -> CliSettings {
        CliSettings {
            repo: self.repo.clone(),
            pattern: self.pattern.clone(),
            location: self.location,
            current_version: self.current.clone(),
            ..CliSettings::default()
        }
    }

    fn load(&self, settings: &CliSettings) -> Result<Config, CliError> {
        Ok(Config::load(self.config.as_deref(), Some(settings))?)
    }
}
