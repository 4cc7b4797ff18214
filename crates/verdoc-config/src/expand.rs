//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// `field` names the configuration key in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

/// Expand an optional value in place.
pub(crate) fn expand_opt(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(v) = value.as_deref() {
        *value = Some(expand_env(v, field)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_is_unchanged() {
        assert_eq!(
            expand_env("div.sphinxsidebarwrapper", "switcher.inject_selector").unwrap(),
            "div.sphinxsidebarwrapper"
        );
    }

    #[test]
    fn default_used_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("VERDOC_EXPAND_UNSET");
        }
        assert_eq!(
            expand_env("${VERDOC_EXPAND_UNSET:-release/*}", "repository.pattern").unwrap(),
            "release/*"
        );
    }

    #[test]
    fn missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("VERDOC_EXPAND_MISSING");
        }
        let err = expand_env("${VERDOC_EXPAND_MISSING}", "generator.command").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("VERDOC_EXPAND_MISSING"));
        assert!(msg.contains("generator.command"));
    }
}
