//! Placing the version selector into a page.
//!
//! The steps and their order live here; [`Page`] is the DOM binding.

use crate::{InferenceError, SelectOption, Switcher, SwitcherData};

/// Error returned when the selector cannot be placed.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum MountError {
    #[error("version switcher: no element matches `{0}`")]
    NoInjectionPoint(String),
    #[error("version switcher: {count} elements match `{selector}`, expected one")]
    AmbiguousInjectionPoint { selector: String, count: u32 },
    #[error("version switcher: {0}")]
    Inference(#[from] InferenceError),
    #[error("version switcher: {0}")]
    Dom(String),
}

/// The parts of a document the switcher reads and changes.
pub(crate) trait Page {
    /// Handle to the inserted control.
    type Control;

    /// Whether the document is still being parsed.
    fn is_loading(&self) -> bool;

    fn href(&self) -> Result<String, MountError>;

    fn count_matches(&self, selector: &str) -> Result<u32, MountError>;

    /// Insert a selector offering `options` as the first child of the
    /// element matching `selector`.
    fn insert_first(
        &self,
        selector: &str,
        options: &[SelectOption],
    ) -> Result<Self::Control, MountError>;
}

/// Mount now, or hand `data` to `defer` when the document is still loading.
///
/// Returns `None` when mounting was deferred.
pub(crate) fn initialize<P: Page>(
    page: &P,
    data: SwitcherData,
    defer: impl FnOnce(SwitcherData) -> Result<(), MountError>,
) -> Result<Option<(Switcher, P::Control)>, MountError> {
    if page.is_loading() {
        defer(data)?;
        return Ok(None);
    }
    mount(page, data).map(Some)
}

/// Resolve the current version and the injection point, then insert the
/// selector. The page is left untouched if either lookup fails.
pub(crate) fn mount<P: Page>(
    page: &P,
    data: SwitcherData,
) -> Result<(Switcher, P::Control), MountError> {
    let SwitcherData {
        versions,
        files,
        inject_selector,
    } = data;
    let switcher = Switcher::new(versions, files);
    let options = switcher.options(&page.href()?)?;

    match page.count_matches(&inject_selector)? {
        1 => {}
        0 => return Err(MountError::NoInjectionPoint(inject_selector)),
        count => {
            return Err(MountError::AmbiguousInjectionPoint {
                selector: inject_selector,
                count,
            });
        }
    }

    let control = page.insert_first(&inject_selector, &options)?;
    Ok((switcher, control))
}
