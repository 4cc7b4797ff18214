//! Version registry and version switcher for verdoc.
//!
//! The build pipeline produces a [`VersionRegistry`] and a [`FileManifest`]
//! and embeds them into every generated page as [`SwitcherData`]. At view
//! time the [`Switcher`] works out which version the current page belongs to
//! and where a reader should land when picking another version.
//!
//! Everything here is plain Rust and runs natively. The browser side (DOM
//! rendering and navigation) lives behind the `wasm` feature.
//!
//! # Example
//!
//! ```
//! use verdoc_switcher::{FileManifest, Switcher, VersionRecord, VersionRegistry};
//!
//! let registry = VersionRegistry::new(vec![
//!     VersionRecord::new("3.0"),
//!     VersionRecord::new("2.0"),
//! ])
//! .unwrap();
//! let mut manifest = FileManifest::new();
//! manifest.insert("3.0", ["index.html", "guide.html"]);
//!
//! let switcher = Switcher::new(registry, Some(manifest));
//! let dest = switcher
//!     .destination("https://example.com/root/2.0/guide.html", "3.0")
//!     .unwrap();
//! assert_eq!(dest, "https://example.com/root/3.0/guide.html");
//! ```

mod location;
mod manifest;
#[cfg(any(feature = "wasm", test))]
mod mount;
mod registry;
mod switcher;
#[cfg(feature = "wasm")]
mod wasm;

pub use manifest::FileManifest;
pub use registry::{RegistryError, VersionRecord, VersionRegistry, is_url_safe_segment};
pub use switcher::{InferenceError, NavigationError, SelectOption, Switcher, SwitcherData};
