//! Built-in placement and styling of the switcher for common Sphinx themes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use verdoc_config::{ControlCss, SwitcherConfig};

/// Where the switcher goes in a theme's pages and how it is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub inject_selector: &'static str,
    pub css: &'static str,
}

const SIDEBAR_CSS: &str = "\
.verdoc-switcher { margin: 0 0 1em 0; }
.verdoc-switcher select { width: 100%; padding: 0.2em; font: inherit; }
";

const THEMES: &[Theme] = &[
    Theme {
        name: "alabaster",
        inject_selector: "div.sphinxsidebarwrapper",
        css: SIDEBAR_CSS,
    },
    Theme {
        name: "classic",
        inject_selector: "div.sphinxsidebarwrapper",
        css: "\
.verdoc-switcher { margin: 0.5em 0 1em 0; }
.verdoc-switcher select { width: 100%; padding: 0.2em; font: inherit; color: #000; }
",
    },
    Theme {
        name: "nature",
        inject_selector: "div.sphinxsidebarwrapper",
        css: SIDEBAR_CSS,
    },
    Theme {
        name: "sphinx_rtd_theme",
        inject_selector: "div.wy-side-nav-search",
        css: "\
.verdoc-switcher { margin: 0.5em 0; }
.verdoc-switcher select {
    width: 100%;
    padding: 0.2em 0.6em;
    border: 1px solid #2472a4;
    border-radius: 50px;
    background: #fcfcfc;
    color: #404040;
    font-size: 80%;
}
",
    },
    Theme {
        name: "furo",
        inject_selector: "div.sidebar-sticky",
        css: "\
.verdoc-switcher { padding: 0 var(--sidebar-item-spacing-horizontal, 1rem); margin-bottom: 1rem; }
.verdoc-switcher select {
    width: 100%;
    padding: 0.3rem;
    border: 1px solid var(--color-sidebar-search-border, #ccc);
    background: var(--color-sidebar-search-background, transparent);
    color: var(--color-sidebar-search-foreground, inherit);
    font: inherit;
}
",
    },
    Theme {
        name: "pydata_sphinx_theme",
        inject_selector: "div.bd-sidebar-primary",
        css: "\
.verdoc-switcher { margin-bottom: 1rem; }
.verdoc-switcher select {
    width: 100%;
    padding: 0.25rem 0.5rem;
    border: 1px solid var(--pst-color-border, #ccc);
    border-radius: 0.25rem;
    background: var(--pst-color-surface, transparent);
    color: var(--pst-color-text-base, inherit);
    font: inherit;
}
",
    },
    Theme {
        name: "sphinx_book_theme",
        inject_selector: "div.bd-sidebar-primary",
        css: "\
.verdoc-switcher { margin: 0 0 1rem 0; }
.verdoc-switcher select {
    width: 100%;
    padding: 0.25rem 0.5rem;
    border: 1px solid var(--pst-color-border, #ccc);
    border-radius: 0.25rem;
    font: inherit;
}
",
    },
];

static HTML_THEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^html_theme\s*=\s*['"]([^'"]+)['"]"#).expect("valid html_theme regex")
});

impl Theme {
    /// Look up a built-in theme by its Sphinx name.
    #[must_use]
    pub fn lookup(name: &str) -> Option<&'static Theme> {
        THEMES.iter().find(|theme| theme.name == name)
    }
}

/// Error returned when the switcher cannot be placed or styled.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    #[error(
        "Theme `{}` has no built-in inject location; set `switcher.inject_selector`",
        .0.as_deref().unwrap_or("<unknown>")
    )]
    NoInjectSelector(Option<String>),
    #[error(
        "Theme `{}` has no built-in stylesheet; set `switcher.control_css`",
        .0.as_deref().unwrap_or("<unknown>")
    )]
    NoCss(Option<String>),
    #[error("Failed to read control CSS {}: {source}", .path.display())]
    CssFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Resolved switcher placement and stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitcherSettings {
    /// Theme in effect, configured or detected.
    pub theme: Option<String>,
    pub inject_selector: String,
    pub css: String,
}

impl SwitcherSettings {
    /// Combine explicit settings with the built-in entry of the theme.
    ///
    /// The configured theme wins over `detected`. Explicit selector and CSS win
    /// over the theme's built-ins.
    ///
    /// # Errors
    ///
    /// Returns an error if the selector or CSS is neither configured nor
    /// built in, or a CSS file cannot be read.
    pub fn resolve(config: &SwitcherConfig, detected: Option<&str>) -> Result<Self, ThemeError> {
        let theme = config.theme.as_deref().or(detected).map(ToOwned::to_owned);
        let builtin = theme.as_deref().and_then(Theme::lookup);

        let inject_selector = match (&config.inject_selector, builtin) {
            (Some(selector), _) => selector.clone(),
            (None, Some(builtin)) => builtin.inject_selector.to_owned(),
            (None, None) => return Err(ThemeError::NoInjectSelector(theme)),
        };

        let css = match (&config.control_css, builtin) {
            (Some(ControlCss::Inline(css)), _) => css.clone(),
            (Some(ControlCss::File(path)), _) => {
                fs::read_to_string(path).map_err(|source| ThemeError::CssFile {
                    path: path.clone(),
                    source,
                })?
            }
            (None, Some(builtin)) => builtin.css.to_owned(),
            (None, None) => return Err(ThemeError::NoCss(theme)),
        };

        tracing::info!(
            theme = theme.as_deref().unwrap_or("<none>"),
            selector = %inject_selector,
            "Resolved switcher placement"
        );
        Ok(Self {
            theme,
            inject_selector,
            css,
        })
    }
}

/// Read `html_theme` from a Sphinx `conf.py`.
///
/// Returns `None` if the file does not assign a string literal to it.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn detect_theme(conf_py: &Path) -> Result<Option<String>, io::Error> {
    let content = fs::read_to_string(conf_py)?;
    let theme = HTML_THEME
        .captures(&content)
        .map(|caps| caps[1].to_owned());
    tracing::debug!(conf = %conf_py.display(), theme = ?theme, "Detected html_theme");
    Ok(theme)
}
