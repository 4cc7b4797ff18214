//! Running the documentation generator for one checked-out version.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use verdoc_config::GeneratorConfig;

/// Directory searched for `conf.py` when no source directory is configured.
const DOCS_DIR: &str = "docs";

/// Sphinx configuration file marking a documentation source directory.
pub(crate) const CONF_PY: &str = "conf.py";

/// Error returned by a generator run.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("`{command}` did not report `{marker}`: {stdout}")]
    MarkerMissing {
        command: String,
        marker: String,
        stdout: String,
    },
    #[error("No conf.py found under {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Produces the documentation of the current checkout.
pub trait Generator {
    /// Build the documentation in `source` into `output`.
    fn generate(&self, source: &Path, output: &Path) -> Result<(), GenerateError>;
}

/// Runs an external command such as `sphinx-build`.
///
/// `{source}` and `{output}` in the arguments are replaced with the paths
/// of each run.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    command: String,
    args: Vec<String>,
    success_marker: Option<String>,
    workdir: PathBuf,
}

impl CommandGenerator {
    /// Create a generator running in `workdir` (the repository worktree).
    #[must_use]
    pub fn new(command: impl Into<String>, args: Vec<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args,
            success_marker: None,
            workdir: workdir.into(),
        }
    }

    /// Require `marker` in the command's stdout for a run to count as successful.
    #[must_use]
    pub fn with_success_marker(mut self, marker: Option<String>) -> Self {
        self.success_marker = marker;
        self
    }

    /// Create a generator from the `[generator]` configuration.
    #[must_use]
    pub fn from_config(config: &GeneratorConfig, workdir: &Path) -> Self {
        Self::new(config.command.clone(), config.args.clone(), workdir)
            .with_success_marker(config.success_marker.clone())
    }

    fn args_for(&self, source: &Path, output: &Path) -> Vec<String> {
        let source = source.to_string_lossy();
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace("{source}", &source).replace("{output}", &output))
            .collect()
    }
}

impl Generator for CommandGenerator {
    fn generate(&self, source: &Path, output: &Path) -> Result<(), GenerateError> {
        let args = self.args_for(source, output);
        tracing::debug!(command = %self.command, args = ?args, "Running generator");

        let result = Command::new(&self.command)
            .args(&args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|source| GenerateError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&result.stdout);
        if !result.status.success() {
            return Err(GenerateError::Failed {
                command: self.command.clone(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_owned(),
            });
        }
        if let Some(marker) = &self.success_marker
            && !stdout.contains(marker.as_str())
        {
            return Err(GenerateError::MarkerMissing {
                command: self.command.clone(),
                marker: marker.clone(),
                stdout: stdout.trim().replace('\n', " "),
            });
        }
        Ok(())
    }
}

/// Find the directory holding `conf.py` under `<repo>/docs`.
///
/// Directories are searched top-down; files of a directory are checked
/// before its subdirectories, which are visited in name order.
///
/// # Errors
///
/// Returns [`GenerateError::SourceNotFound`] if no `conf.py` exists.
pub fn discover_source_dir(repo_root: &Path) -> Result<PathBuf, GenerateError> {
    let docs = repo_root.join(DOCS_DIR);
    if !docs.is_dir() {
        return Err(GenerateError::SourceNotFound(docs));
    }
    let found = find_conf(&docs)?.ok_or(GenerateError::SourceNotFound(docs))?;
    tracing::debug!(source = %found.display(), "Discovered documentation source");
    Ok(found)
}

fn find_conf(dir: &Path) -> Result<Option<PathBuf>, io::Error> {
    if dir.join(CONF_PY).is_file() {
        return Ok(Some(dir.to_path_buf()));
    }
    let mut subdirs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    subdirs.sort();
    for subdir in subdirs {
        if let Some(found) = find_conf(&subdir)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}
