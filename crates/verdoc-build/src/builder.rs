//! Versioned site builder.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use verdoc_assets::AssetError;
use verdoc_config::Config;
use verdoc_switcher::{FileManifest, RegistryError, SwitcherData};
use verdoc_vcs::{CheckoutTarget, RefQuery, Repository, VcsError};

use crate::generator::{CONF_PY, GenerateError, Generator, discover_source_dir};
use crate::template::{STYLESHEET, VERSIONS_JS, render_redirect, render_versions_script};
use crate::theme::{SwitcherSettings, ThemeError, detect_theme};
use crate::versions::{VersionError, VersionPlan, VersionPolicy};
use crate::{ASSETS_DIR, site};

/// Error returned by the versioned site builder.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Vcs(#[from] VcsError),
    #[error("{0}")]
    Version(#[from] VersionError),
    #[error("{0}")]
    Theme(#[from] ThemeError),
    #[error("{0}")]
    Asset(#[from] AssetError),
    #[error("{0}")]
    Generator(#[from] GenerateError),
    #[error("Invalid version registry: {0}")]
    Registry(#[from] RegistryError),
    #[error("Failed to serialize version data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Building version `{version}` failed: {source}")]
    Generate {
        version: String,
        #[source]
        source: GenerateError,
    },
    #[error(
        "Output directory {} contains the repository or its documentation sources",
        .0.display()
    )]
    UnsafeOutputDir(PathBuf),
}

/// Outcome of building one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltVersion {
    pub display_name: String,
    /// Short name of the ref it was built from.
    pub git_ref: String,
    /// Number of HTML pages published.
    pub pages: usize,
}

/// Outcome of a full build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    pub primary: String,
    /// Versions in display order.
    pub versions: Vec<BuiltVersion>,
}

/// Select and order the versions to build without touching the worktree.
///
/// # Errors
///
/// Returns an error if refs cannot be listed or no valid version list
/// results from them.
pub fn plan(config: &Config, repo: &dyn Repository) -> Result<VersionPlan, BuildError> {
    let repository = &config.repository_resolved;
    let mut query = RefQuery::new(
        repository.location.includes_local(),
        repository.location.includes_remote(),
    );
    if let Some(pattern) = &repository.pattern {
        query = query.with_pattern(pattern)?;
    }

    let refs = repo.refs(&query)?;
    tracing::info!(count = refs.len(), "Matched refs");

    let policy = VersionPolicy::from_config(repository, &config.versions)?;
    let plan = policy.plan(refs)?;
    tracing::info!(
        versions = ?plan.versions.iter().map(|v| &v.display_name).collect::<Vec<_>>(),
        primary = %plan.primary,
        "Selected versions"
    );
    Ok(plan)
}

/// Refuse output directories whose removal would take the worktree, its
/// `.git` directory or the documentation sources with it.
///
/// All paths must be normalized.
fn check_output_dir(
    output_dir: &Path,
    workdir: &Path,
    source_dir: &Path,
) -> Result<(), BuildError> {
    if workdir.starts_with(output_dir)
        || source_dir.starts_with(output_dir)
        || output_dir.starts_with(workdir.join(".git"))
    {
        return Err(BuildError::UnsafeOutputDir(output_dir.to_path_buf()));
    }
    Ok(())
}

/// Builds one documentation site per selected ref and combines them.
pub struct VersionedSiteBuilder<'a> {
    config: &'a Config,
    repo: &'a dyn Repository,
    generator: &'a dyn Generator,
    bundle: Option<Vec<(String, Vec<u8>)>>,
}

impl<'a> VersionedSiteBuilder<'a> {
    /// Create a new builder.
    #[must_use]
    pub fn new(config: &'a Config, repo: &'a dyn Repository, generator: &'a dyn Generator) -> Self {
        Self {
            config,
            repo,
            generator,
            bundle: None,
        }
    }

    /// Publish these files in `_verdoc/` instead of the compiled switcher bundle.
    #[must_use]
    pub fn with_bundle(mut self, files: Vec<(String, Vec<u8>)>) -> Self {
        self.bundle = Some(files);
        self
    }

    /// Directory holding the documentation sources in every checkout.
    fn source_dir(&self) -> Result<PathBuf, BuildError> {
        match &self.config.generator_resolved.source_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(discover_source_dir(self.repo.workdir())?),
        }
    }

    fn switcher_settings(&self, source_dir: &Path) -> Result<SwitcherSettings, BuildError> {
        let conf = source_dir.join(CONF_PY);
        let detected = if conf.is_file() {
            detect_theme(&conf)?
        } else {
            None
        };
        Ok(SwitcherSettings::resolve(
            &self.config.switcher_resolved,
            detected.as_deref(),
        )?)
    }

    /// Build the versioned site into the configured output directory.
    ///
    /// The original checkout is restored after the versions are built, also
    /// when one of them fails.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be resolved, the output
    /// directory would remove the worktree or sources, the worktree is dirty,
    /// a checkout or generator run fails, or output cannot be written.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let output_dir = &site::normalize(&self.config.build_resolved.output_dir)?;
        tracing::info!(output = %output_dir.display(), "Starting versioned build");

        let source_dir = site::normalize(&self.source_dir()?)?;
        let settings = self.switcher_settings(&source_dir)?;
        let plan = plan(self.config, self.repo)?;

        check_output_dir(output_dir, &site::normalize(self.repo.workdir())?, &source_dir)?;
        if !self.repo.is_clean()? {
            return Err(VcsError::Dirty(self.repo.workdir().to_path_buf()).into());
        }

        site::recreate_dir(output_dir)?;
        self.write_assets(output_dir, &settings.css)?;

        let head = self.repo.head()?;
        let built = self.build_versions(&plan, &source_dir, output_dir);
        tracing::info!(head = ?head, "Restoring original checkout");
        let restored = self.repo.checkout(&CheckoutTarget::from(&head));
        let (versions, manifest) = built?;
        restored?;

        let mut injected = 0;
        for version in &plan.versions {
            if let Some(pages) = manifest.pages(&version.display_name) {
                let pages: Vec<String> = pages.iter().cloned().collect();
                injected += site::inject_pages(&output_dir.join(&version.display_name), &pages)?;
            }
        }
        tracing::info!(pages = injected, "Injected switcher");

        fs::write(output_dir.join("index.html"), render_redirect(&plan.primary))?;

        let data = SwitcherData {
            versions: plan.registry()?,
            files: Some(manifest),
            inject_selector: settings.inject_selector,
        };
        fs::write(
            output_dir.join(ASSETS_DIR).join(VERSIONS_JS),
            render_versions_script(&data)?,
        )?;

        tracing::info!(versions = versions.len(), "Build complete");
        Ok(BuildReport {
            output_dir: output_dir.clone(),
            primary: plan.primary,
            versions,
        })
    }

    fn write_assets(&self, output_dir: &Path, css: &str) -> Result<(), BuildError> {
        let assets_dir = output_dir.join(ASSETS_DIR);
        fs::create_dir_all(&assets_dir)?;

        match &self.bundle {
            Some(files) => {
                for (name, data) in files {
                    fs::write(assets_dir.join(name), data)?;
                }
            }
            None => {
                for (name, data) in verdoc_assets::bundle()? {
                    fs::write(assets_dir.join(name), data)?;
                }
            }
        }
        fs::write(assets_dir.join(STYLESHEET), css)?;
        tracing::debug!(path = %assets_dir.display(), "Wrote switcher assets");
        Ok(())
    }

    fn build_versions(
        &self,
        plan: &VersionPlan,
        source_dir: &Path,
        output_dir: &Path,
    ) -> Result<(Vec<BuiltVersion>, FileManifest), BuildError> {
        let generator_config = &self.config.generator_resolved;
        let mut built = Vec::with_capacity(plan.versions.len());
        let mut manifest = FileManifest::new();

        for version in &plan.versions {
            tracing::info!(
                version = %version.display_name,
                git_ref = %version.git_ref.name,
                "Building version"
            );
            self.repo
                .checkout(&CheckoutTarget::from(&version.git_ref))?;

            let version_dir = output_dir.join(&version.display_name);
            fs::create_dir_all(&version_dir)?;
            self.generator
                .generate(source_dir, &version_dir)
                .map_err(|source| BuildError::Generate {
                    version: version.display_name.clone(),
                    source,
                })?;
            site::consolidate(
                &version_dir,
                generator_config.html_subdir.as_deref(),
                &generator_config.discard,
            )?;

            let pages = site::html_pages(&version_dir)?;
            if !pages.iter().any(|page| page == "index.html") {
                tracing::warn!(
                    version = %version.display_name,
                    "Version has no index.html; switching to it from a missing page will fail"
                );
            }
            built.push(BuiltVersion {
                display_name: version.display_name.clone(),
                git_ref: version.git_ref.name.clone(),
                pages: pages.len(),
            });
            manifest.insert(&version.display_name, pages);
        }

        Ok((built, manifest))
    }
}
