//! `verdoc build` command implementation.

use std::path::PathBuf;

use clap::Args;
use verdoc_build::{CommandGenerator, VersionedSiteBuilder};
use verdoc_config::CliSettings;
use verdoc_vcs::{GitRepository, Repository};

use super::SelectionArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Output directory for the generated site (default: <repo>/docs/build).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Documentation source directory (default: directory of conf.py under docs/).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,
}

impl BuildArgs {
    pub(crate) fn verbose(&self) -> bool {
        self.selection.verbose
    }

    pub(crate) fn settings(&self) -> CliSettings {
        CliSettings {
            output_dir: self.output_dir.clone(),
            source_dir: self.source_dir.clone(),
            ..self.selection.settings()
        }
    }

    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.selection.load(&self.settings())?;

        let repo = GitRepository::open(&config.repository_resolved.path)?;
        let generator = CommandGenerator::from_config(&config.generator_resolved, repo.workdir());

        output.info(&format!("Repository: {}", repo.workdir().display()));
        output.info(&format!(
            "Output: {}",
            config.build_resolved.output_dir.display()
        ));

        let report = VersionedSiteBuilder::new(&config, &repo, &generator).build()?;

        output.separator();
        for version in &report.versions {
            output.version(
                &version.display_name,
                &format!("{} ({} pages)", version.git_ref, version.pages),
                version.display_name == report.primary,
            );
        }
        output.separator();
        output.success(&format!(
            "Built {} versions to {}",
            report.versions.len(),
            report.output_dir.display()
        ));
        Ok(())
    }
}
