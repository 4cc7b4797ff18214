//! Versioned documentation build pipeline for verdoc.
//!
//! Builds the documentation once per selected branch or tag and stitches the
//! results into one site:
//!
//! ```text
//! <output>/
//!   index.html          redirect to the primary version
//!   _verdoc/            switcher bundle, stylesheet, versions.js
//!   <version>/...       one generator output per version
//! ```

mod builder;
mod generator;
mod site;
mod template;
mod theme;
mod versions;

pub use builder::{BuildError, BuildReport, BuiltVersion, VersionedSiteBuilder, plan};
pub use generator::{CommandGenerator, GenerateError, Generator, discover_source_dir};
pub use theme::{SwitcherSettings, Theme, ThemeError, detect_theme};
pub use versions::{Version, VersionError, VersionPlan, VersionPolicy};

/// Directory under the output root holding shared switcher files.
pub const ASSETS_DIR: &str = "_verdoc";
