//! `verdoc versions` command implementation.

use clap::Args;
use verdoc_config::CliSettings;
use verdoc_vcs::{GitRepository, RefKind};

use super::SelectionArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the versions command.
#[derive(Args)]
pub(crate) struct VersionsArgs {
    #[command(flatten)]
    selection: SelectionArgs,
}

impl VersionsArgs {
    pub(crate) fn verbose(&self) -> bool {
        self.selection.verbose
    }

    pub(crate) fn settings(&self) -> CliSettings {
        self.selection.settings()
    }

    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.selection.load(&self.settings())?;
        let repo = GitRepository::open(&config.repository_resolved.path)?;
        let plan = verdoc_build::plan(&config, &repo)?;

        output.highlight(&format!("{} versions", plan.versions.len()));
        for version in &plan.versions {
            let kind = match version.git_ref.kind {
                RefKind::Branch if version.git_ref.remote => "remote branch",
                RefKind::Branch => "branch",
                RefKind::Tag => "tag",
            };
            output.version(
                &version.display_name,
                &format!("{kind} {}", version.git_ref.name),
                version.display_name == plan.primary,
            );
        }
        Ok(())
    }
}
