//! Configuration management for verdoc.
//!
//! Parses `verdoc.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `repository.pattern`
//! - `versions.current`
//! - `generator.command`
//! - `switcher.inject_selector`

mod expand;

use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override repository root.
    pub repo: Option<PathBuf>,
    /// Override ref glob pattern.
    pub pattern: Option<String>,
    /// Override which branches are considered.
    pub location: Option<RefLocation>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override the primary version.
    pub current_version: Option<String>,
    /// Override the generator source directory.
    pub source_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "verdoc.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Repository configuration (paths are relative strings from TOML).
    repository: RepositoryConfigRaw,
    /// Version naming, ordering and primary selection.
    pub versions: VersionsConfig,
    /// Output configuration.
    build: BuildConfigRaw,
    /// Documentation generator configuration.
    generator: GeneratorConfigRaw,
    /// Version switcher configuration.
    switcher: SwitcherConfigRaw,

    /// Resolved repository configuration (set after loading).
    #[serde(skip)]
    pub repository_resolved: RepositoryConfig,
    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub build_resolved: BuildConfig,
    /// Resolved generator configuration (set after loading).
    #[serde(skip)]
    pub generator_resolved: GeneratorConfig,
    /// Resolved switcher configuration (set after loading).
    #[serde(skip)]
    pub switcher_resolved: SwitcherConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    #[allow(clippy::derivable_impls)]
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Which branches are considered when listing refs. Tags are always considered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefLocation {
    /// Local and remote-tracking branches.
    All,
    /// Local branches only.
    Local,
    /// Remote-tracking branches only.
    #[default]
    Remote,
}

impl RefLocation {
    /// Whether local branches are included.
    #[must_use]
    pub fn includes_local(self) -> bool {
        matches!(self, Self::All | Self::Local)
    }

    /// Whether remote-tracking branches are included.
    #[must_use]
    pub fn includes_remote(self) -> bool {
        matches!(self, Self::All | Self::Remote)
    }
}

impl FromStr for RefLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            other => Err(format!(
                "invalid ref location `{other}` (expected all, local or remote)"
            )),
        }
    }
}

/// Raw repository configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RepositoryConfigRaw {
    path: Option<String>,
    location: RefLocation,
    pattern: Option<String>,
    include: Vec<String>,
    exclude: Vec<String>,
}

/// Resolved repository configuration with absolute paths.
#[derive(Debug, Default)]
pub struct RepositoryConfig {
    /// Repository root.
    pub path: PathBuf,
    /// Which branches are considered.
    pub location: RefLocation,
    /// Glob pattern short ref names must match.
    pub pattern: Option<String>,
    /// Regexes of which a ref must match at least one (if non-empty).
    pub include: Vec<String>,
    /// Regexes of which a ref must match none.
    pub exclude: Vec<String>,
}

/// How versions are ordered in the selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Descending natural order of display names (`v10` before `v9`).
    #[default]
    Natural,
    /// Newest commit first.
    Date,
}

/// Rewrite applied to a ref name to produce a display name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RenameRule {
    /// Regex matched against the ref name.
    pub pattern: String,
    /// Replacement, may reference capture groups (`$1`).
    #[serde(default)]
    pub replace: String,
}

/// Version naming, ordering and primary selection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VersionsConfig {
    /// Display name or ref name of the primary version.
    pub current: Option<String>,
    /// Sort order.
    pub sort: SortOrder,
    /// Display names pinned to the front, in this order.
    pub order: Vec<String>,
    /// Rename rules applied in order.
    pub rename: Vec<RenameRule>,
}

/// Raw output configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    output_dir: Option<String>,
}

/// Resolved output configuration.
#[derive(Debug, Default)]
pub struct BuildConfig {
    /// Directory receiving every version and the root redirect.
    pub output_dir: PathBuf,
}

/// Raw generator configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct GeneratorConfigRaw {
    command: Option<String>,
    args: Option<Vec<String>>,
    source_dir: Option<String>,
    html_subdir: Option<String>,
    discard: Option<Vec<String>>,
    success_marker: Option<String>,
}

/// Resolved generator configuration.
#[derive(Debug)]
pub struct GeneratorConfig {
    /// Executable to run.
    pub command: String,
    /// Arguments; `{source}` and `{output}` are substituted.
    pub args: Vec<String>,
    /// Documentation source directory. `None` means discover `conf.py` under `docs/`.
    pub source_dir: Option<PathBuf>,
    /// Subdirectory of the output whose contents are moved to the version root.
    pub html_subdir: Option<String>,
    /// Output entries removed after each build.
    pub discard: Vec<String>,
    /// Text that must appear in the generator's stdout.
    pub success_marker: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: "sphinx-build".to_owned(),
            args: ["-M", "html", "{source}", "{output}"]
                .map(str::to_owned)
                .to_vec(),
            source_dir: None,
            html_subdir: Some("html".to_owned()),
            discard: vec!["doctrees".to_owned()],
            success_marker: Some("build succeeded".to_owned()),
        }
    }
}

/// Raw switcher configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SwitcherConfigRaw {
    theme: Option<String>,
    inject_selector: Option<String>,
    control_css: Option<String>,
}

/// Stylesheet for the version control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCss {
    /// A `.css` file to copy.
    File(PathBuf),
    /// Inline CSS text.
    Inline(String),
}

/// Resolved switcher configuration.
#[derive(Debug, Default)]
pub struct SwitcherConfig {
    /// Theme name. `None` means read `html_theme` from `conf.py`.
    pub theme: Option<String>,
    /// Explicit injection selector, overriding the theme default.
    pub inject_selector: Option<String>,
    /// Explicit control stylesheet, overriding the theme default.
    pub control_css: Option<ControlCss>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`generator.command`").
        field: String,
        /// Error message (e.g., "${`SPHINX_BUILD`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a regex field to compile.
fn require_regex(pattern: &str, field: &str) -> Result<(), ConfigError> {
    regex::Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| ConfigError::Validation(format!("{field} is not a valid regex: {e}")))
}

/// Require a name to be a single relative path component.
fn require_component(name: &str, field: &str) -> Result<(), ConfigError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ConfigError::Validation(format!(
            "{field} must be a single directory name, got `{name}`"
        ))),
    }
}

/// Treat empty strings from TOML as unset.
fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_owned)
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `verdoc.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings)?;
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    ///
    /// Relative paths are taken relative to the current directory.
    fn apply_cli_settings(&mut self, settings: &CliSettings) -> Result<(), ConfigError> {
        if let Some(repo) = &settings.repo {
            let repo = std::path::absolute(repo)?;
            self.repository_resolved.path.clone_from(&repo);
            // Defaults derived from the repository follow it.
            if self.build.output_dir.is_none() {
                self.build_resolved.output_dir = repo.join("docs").join("build");
            }
            if let Some(source_dir) = &self.generator.source_dir {
                self.generator_resolved.source_dir = Some(repo.join(source_dir));
            }
        }
        if let Some(pattern) = &settings.pattern {
            self.repository_resolved.pattern = Some(pattern.clone());
        }
        if let Some(location) = settings.location {
            self.repository_resolved.location = location;
        }
        if let Some(output_dir) = &settings.output_dir {
            self.build_resolved.output_dir = std::path::absolute(output_dir)?;
        }
        if let Some(current) = &settings.current_version {
            self.versions.current = Some(current.clone());
        }
        if let Some(source_dir) = &settings.source_dir {
            self.generator_resolved.source_dir = Some(std::path::absolute(source_dir)?);
        }
        Ok(())
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            repository: RepositoryConfigRaw::default(),
            versions: VersionsConfig::default(),
            build: BuildConfigRaw::default(),
            generator: GeneratorConfigRaw::default(),
            switcher: SwitcherConfigRaw::default(),
            repository_resolved: RepositoryConfig {
                path: base.to_path_buf(),
                ..RepositoryConfig::default()
            },
            build_resolved: BuildConfig {
                output_dir: base.join("docs").join("build"),
            },
            generator_resolved: GeneratorConfig::default(),
            switcher_resolved: SwitcherConfig::default(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => std::path::absolute(dir)?,
            _ => std::env::current_dir()?,
        };
        config.resolve_paths(&config_dir);
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading and resolution
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid values.
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_repository()?;
        self.validate_versions()?;
        self.validate_generator()?;
        Ok(())
    }

    /// Validate repository configuration.
    fn validate_repository(&self) -> Result<(), ConfigError> {
        let repository = &self.repository_resolved;
        if let Some(pattern) = &repository.pattern {
            require_non_empty(pattern, "repository.pattern")?;
            glob::Pattern::new(pattern).map_err(|e| {
                ConfigError::Validation(format!("repository.pattern is not a valid glob: {e}"))
            })?;
        }
        for pattern in &repository.include {
            require_regex(pattern, "repository.include")?;
        }
        for pattern in &repository.exclude {
            require_regex(pattern, "repository.exclude")?;
        }
        Ok(())
    }

    /// Validate versions configuration.
    fn validate_versions(&self) -> Result<(), ConfigError> {
        if let Some(current) = &self.versions.current {
            require_non_empty(current, "versions.current")?;
        }
        for name in &self.versions.order {
            require_non_empty(name, "versions.order")?;
        }
        for rule in &self.versions.rename {
            require_regex(&rule.pattern, "versions.rename.pattern")?;
        }
        Ok(())
    }

    /// Validate generator configuration.
    fn validate_generator(&self) -> Result<(), ConfigError> {
        let generator = &self.generator_resolved;
        require_non_empty(&generator.command, "generator.command")?;
        if let Some(subdir) = &generator.html_subdir {
            require_component(subdir, "generator.html_subdir")?;
        }
        for name in &generator.discard {
            require_component(name, "generator.discard")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_opt(&mut self.repository.pattern, "repository.pattern")?;
        expand::expand_opt(&mut self.versions.current, "versions.current")?;
        expand::expand_opt(&mut self.generator.command, "generator.command")?;
        expand::expand_opt(&mut self.switcher.inject_selector, "switcher.inject_selector")?;
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    ///
    /// The generator source directory is relative to the repository, since it
    /// is read from each checkout.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let repo = match &self.repository.path {
            Some(path) => config_dir.join(path),
            None => config_dir.to_path_buf(),
        };

        self.build_resolved = BuildConfig {
            output_dir: match &self.build.output_dir {
                Some(dir) => config_dir.join(dir),
                None => repo.join("docs").join("build"),
            },
        };

        let defaults = GeneratorConfig::default();
        let generator = &self.generator;
        self.generator_resolved = GeneratorConfig {
            command: generator.command.clone().unwrap_or(defaults.command),
            args: generator.args.clone().unwrap_or(defaults.args),
            source_dir: generator.source_dir.as_ref().map(|dir| repo.join(dir)),
            html_subdir: match generator.html_subdir.as_deref() {
                Some(subdir) => non_empty(Some(subdir)),
                None => defaults.html_subdir,
            },
            discard: generator.discard.clone().unwrap_or(defaults.discard),
            success_marker: match generator.success_marker.as_deref() {
                Some(marker) => non_empty(Some(marker)),
                None => defaults.success_marker,
            },
        };

        self.switcher_resolved = SwitcherConfig {
            theme: non_empty(self.switcher.theme.as_deref()),
            inject_selector: non_empty(self.switcher.inject_selector.as_deref()),
            control_css: non_empty(self.switcher.control_css.as_deref()).map(|css| {
                if css.trim_end().ends_with(".css") {
                    ControlCss::File(config_dir.join(css.trim_end()))
                } else {
                    ControlCss::Inline(css)
                }
            }),
        };

        self.repository_resolved = RepositoryConfig {
            path: repo,
            location: self.repository.location,
            pattern: non_empty(self.repository.pattern.as_deref()),
            include: self.repository.include.clone(),
            exclude: self.repository.exclude.clone(),
        };
    }
}
