//! Version switcher bundle for verdoc.
//!
//! The switcher widget is compiled to WebAssembly by `wasm-pack` from the
//! `verdoc-switcher` crate. This crate provides a single API for reaching the
//! resulting files in both embedded and filesystem modes:
//!
//! - **`embed` feature on**: The bundle is compiled into the binary via `rust-embed`
//! - **`embed` feature off**: The bundle is read from `verdoc-switcher/pkg/` at runtime

use std::borrow::Cow;
#[cfg(not(feature = "embed"))]
use std::path::Path;

/// ES module loading the widget; imported by the generated `versions.js`.
pub const SWITCHER_JS: &str = "verdoc_switcher.js";

/// Compiled widget.
pub const SWITCHER_WASM: &str = "verdoc_switcher_bg.wasm";

/// Files a published site needs.
pub const BUNDLE: [&str; 2] = [SWITCHER_JS, SWITCHER_WASM];

/// Embedded switcher bundle (only available with `embed` feature).
#[cfg(feature = "embed")]
#[derive(rust_embed::RustEmbed)]
#[folder = "../verdoc-switcher/pkg"]
#[prefix = ""]
struct Assets;

/// Directory for filesystem-based bundle lookup (dev mode).
#[cfg(not(feature = "embed"))]
const DEV_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../verdoc-switcher/pkg");

/// Error returned when the bundle is incomplete.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error(
        "Switcher asset `{0}` is missing; run `wasm-pack build --target web` in \
         crates/verdoc-switcher or build with the `embed` feature"
    )]
    Missing(&'static str),
}

/// Get a bundle file by path (relative to `pkg/`).
///
/// Returns the file contents if the asset exists, `None` otherwise.
#[cfg(feature = "embed")]
pub fn get(path: &str) -> Option<Cow<'static, [u8]>> {
    Assets::get(path).map(|f| f.data)
}

/// Get a bundle file by path (relative to `pkg/`).
///
/// Returns the file contents if the asset exists, `None` otherwise.
#[cfg(not(feature = "embed"))]
pub fn get(path: &str) -> Option<Cow<'static, [u8]>> {
    let full_path = Path::new(DEV_DIR).join(path);
    std::fs::read(&full_path).ok().map(Cow::Owned)
}

/// Every file of the bundle, paired with its name.
///
/// # Errors
///
/// Returns [`AssetError::Missing`] for the first file that cannot be found.
pub fn bundle() -> Result<Vec<(&'static str, Cow<'static, [u8]>)>, AssetError> {
    BUNDLE
        .iter()
        .map(|&name| get(name).map(|data| (name, data)).ok_or(AssetError::Missing(name)))
        .collect()
}
