//! Filesystem work on the output directory.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::template::{inject_head_tags, root_prefix};

/// Temporary name the HTML subdirectory is moved to while its contents are
/// lifted, so an entry with the same name as the subdirectory cannot collide.
const LIFT_DIR: &str = ".verdoc-lift";

/// Absolute form of `path` with `.` and `..` resolved, following symlinks
/// along the part of it that exists.
pub(crate) fn normalize(path: &Path) -> Result<PathBuf, io::Error> {
    let mut resolved = PathBuf::new();
    for component in std::path::absolute(path)?.components() {
        match component {
            Component::CurDir => continue,
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
        if resolved.exists() {
            resolved = resolved.canonicalize()?;
        }
    }
    Ok(resolved)
}

/// Remove `dir` if present and create it empty.
pub(crate) fn recreate_dir(dir: &Path) -> Result<(), io::Error> {
    if dir.exists() {
        tracing::info!(path = %dir.display(), "Cleaning output directory");
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)
}

/// Reshape one version's generator output into a flat site.
///
/// Drops `discard` entries, then moves everything inside `html_subdir` up to
/// `version_dir` and removes the emptied subdirectory.
pub(crate) fn consolidate(
    version_dir: &Path,
    html_subdir: Option<&str>,
    discard: &[String],
) -> Result<(), io::Error> {
    for name in discard {
        let path = version_dir.join(name);
        if path.is_dir() {
            tracing::debug!(path = %path.display(), "Removing");
            fs::remove_dir_all(&path)?;
        } else if path.exists() {
            fs::remove_file(&path)?;
        }
    }

    let Some(subdir) = html_subdir else {
        return Ok(());
    };
    let html = version_dir.join(subdir);
    if !html.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("generator output has no {} directory", html.display()),
        ));
    }

    let lifted = version_dir.join(LIFT_DIR);
    fs::rename(&html, &lifted)?;
    for entry in fs::read_dir(&lifted)? {
        let entry = entry?;
        let destination = version_dir.join(entry.file_name());
        tracing::debug!(from = %entry.path().display(), to = %destination.display(), "Moving");
        fs::rename(entry.path(), destination)?;
    }
    fs::remove_dir(&lifted)
}

/// Paths of all HTML files under `dir`, relative to it with `/` separators,
/// sorted.
pub(crate) fn html_pages(dir: &Path) -> Result<Vec<String>, io::Error> {
    let mut files = Vec::new();
    walk_dir(dir, dir, &mut files)?;
    files.retain(|relative| relative.ends_with(".html"));
    files.sort();
    Ok(files)
}

/// Add the switcher tags to every page of a version.
///
/// Returns the number of pages changed.
pub(crate) fn inject_pages(version_dir: &Path, pages: &[String]) -> Result<usize, io::Error> {
    let mut injected = 0;
    for page in pages {
        let path = version_dir.join(page);
        let html = fs::read_to_string(&path)?;
        match inject_head_tags(&html, &root_prefix(page)) {
            Some(updated) => {
                fs::write(&path, updated)?;
                injected += 1;
            }
            None => tracing::debug!(page = %page, "No </head>, page left as is"),
        }
    }
    Ok(injected)
}

fn walk_dir(base: &Path, current: &Path, files: &mut Vec<String>) -> Result<(), io::Error> {
    for entry in fs::read_dir(current)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            walk_dir(base, &path, files)?;
        } else if let Ok(relative) = path.strip_prefix(base) {
            files.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn normalize_resolves_dots() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::create_dir(root.join("docs")).unwrap();

        assert_eq!(normalize(&dir.path().join("docs/..")).unwrap(), root);
        assert_eq!(normalize(&dir.path().join("./docs/.")).unwrap(), root.join("docs"));
        assert_eq!(
            normalize(&dir.path().join("missing/../docs/new")).unwrap(),
            root.join("docs/new")
        );
        assert_eq!(
            normalize(Path::new(".")).unwrap(),
            std::env::current_dir().unwrap().canonicalize().unwrap()
        );
    }

    #[cfg(unix)]
    #[test]
    fn normalize_follows_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::create_dir(root.join("repo")).unwrap();
        std::os::unix::fs::symlink(root.join("repo"), root.join("link")).unwrap();

        assert_eq!(normalize(&root.join("link")).unwrap(), root.join("repo"));
        assert_eq!(normalize(&root.join("link/site")).unwrap(), root.join("repo/site"));
    }

    #[test]
    fn recreate_clears_contents() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        write(&out.join("stale/page.html"), "old");

        recreate_dir(&out).unwrap();
        assert!(out.is_dir());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn consolidate_lifts_html_and_discards() {
        let dir = tempfile::tempdir().unwrap();
        let version = dir.path().join("1.0");
        write(&version.join("doctrees/index.doctree"), "");
        write(&version.join("html/index.html"), "index");
        write(&version.join("html/_static/basic.css"), "css");

        consolidate(&version, Some("html"), &["doctrees".to_owned()]).unwrap();

        assert!(!version.join("doctrees").exists());
        assert!(!version.join("html").exists());
        assert_eq!(fs::read_to_string(version.join("index.html")).unwrap(), "index");
        assert!(version.join("_static/basic.css").is_file());
    }

    #[test]
    fn consolidate_handles_entry_named_like_subdir() {
        let dir = tempfile::tempdir().unwrap();
        let version = dir.path().join("1.0");
        write(&version.join("html/html/nested.html"), "nested");

        consolidate(&version, Some("html"), &[]).unwrap();

        assert_eq!(
            fs::read_to_string(version.join("html/nested.html")).unwrap(),
            "nested"
        );
        assert!(!version.join(LIFT_DIR).exists());
    }

    #[test]
    fn consolidate_without_subdir_only_discards() {
        let dir = tempfile::tempdir().unwrap();
        let version = dir.path().join("1.0");
        write(&version.join("index.html"), "index");
        write(&version.join(".buildinfo"), "");

        consolidate(&version, None, &[".buildinfo".to_owned()]).unwrap();

        assert!(version.join("index.html").is_file());
        assert!(!version.join(".buildinfo").exists());
    }

    #[test]
    fn consolidate_missing_subdir() {
        let dir = tempfile::tempdir().unwrap();
        let err = consolidate(dir.path(), Some("html"), &[]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn lists_html_pages() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("index.html"), "");
        write(&dir.path().join("api/module.html"), "");
        write(&dir.path().join("_static/app.js"), "");

        assert_eq!(
            html_pages(dir.path()).unwrap(),
            vec!["api/module.html", "index.html"]
        );
    }

    #[test]
    fn injects_with_depth_relative_prefix() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("index.html"), "<head></head>");
        write(&dir.path().join("api/module.html"), "<head></head>");
        write(&dir.path().join("fragment.html"), "<p>no head</p>");
        let pages = html_pages(dir.path()).unwrap();

        assert_eq!(inject_pages(dir.path(), &pages).unwrap(), 2);

        let index = fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(index.contains("src=\"../_verdoc/versions.js\""));
        let module = fs::read_to_string(dir.path().join("api/module.html")).unwrap();
        assert!(module.contains("src=\"../../_verdoc/versions.js\""));
        let fragment = fs::read_to_string(dir.path().join("fragment.html")).unwrap();
        assert_eq!(fragment, "<p>no head</p>");
    }
}
