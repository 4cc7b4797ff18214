//! Generated HTML and JavaScript.

use verdoc_assets::SWITCHER_JS;
use verdoc_switcher::SwitcherData;

use crate::ASSETS_DIR;

/// Stylesheet written next to the switcher bundle.
pub(crate) const STYLESHEET: &str = "verdoc.css";

/// Module that loads the switcher with the site's version data.
pub(crate) const VERSIONS_JS: &str = "versions.js";

/// Marks pages that already carry the switcher tags.
const MARKER: &str = "<!-- verdoc -->";

/// Render the site root page redirecting to the primary version.
pub(crate) fn render_redirect(primary: &str) -> String {
    let target = escape(&format!("{primary}/index.html"));
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="0; url={target}">
<link rel="canonical" href="{target}">
<title>Redirecting</title>
</head>
<body>
<p>Redirecting to <a href="{target}">{target}</a>...</p>
</body>
</html>
"#
    )
}

/// Render `versions.js`.
///
/// The switcher bundle sits next to it, so the import is relative to the
/// module itself.
pub(crate) fn render_versions_script(data: &SwitcherData) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string_pretty(data)?;
    Ok(format!(
        r#"// Generated by verdoc. Do not edit.
import init, {{ initialize }} from "./{SWITCHER_JS}";

const VERDOC_DATA = {json};

await init();
initialize(JSON.stringify(VERDOC_DATA));
"#
    ))
}

/// Prefix leading from a page at `relative_path` inside a version directory
/// back to the output root.
pub(crate) fn root_prefix(relative_path: &str) -> String {
    "../".repeat(relative_path.matches('/').count() + 1)
}

/// Insert the switcher stylesheet and module before `</head>`.
///
/// Returns `None` if the page has no `</head>` or was already processed.
pub(crate) fn inject_head_tags(html: &str, prefix: &str) -> Option<String> {
    if html.contains(MARKER) {
        return None;
    }
    // ASCII lowercasing keeps byte offsets intact.
    let position = html.to_ascii_lowercase().find("</head>")?;
    let prefix = escape(prefix);
    let tags = format!(
        "{MARKER}\n<link rel=\"stylesheet\" href=\"{prefix}{ASSETS_DIR}/{STYLESHEET}\">\n\
         <script type=\"module\" src=\"{prefix}{ASSETS_DIR}/{VERSIONS_JS}\"></script>\n"
    );

    let mut result = String::with_capacity(html.len() + tags.len());
    result.push_str(&html[..position]);
    result.push_str(&tags);
    result.push_str(&html[position..]);
    Some(result)
}

/// Escape HTML special characters.
fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use verdoc_switcher::{FileManifest, VersionRecord, VersionRegistry};

    #[test]
    fn escape_special_characters() {
        assert_eq!(escape("<script>"), "&lt;script&gt;");
        assert_eq!(escape("a&b"), "a&amp;b");
        assert_eq!(escape("\"hello\""), "&quot;hello&quot;");
    }

    #[test]
    fn redirect_points_at_primary_index() {
        let html = render_redirect("2.0");
        assert!(html.contains(r#"content="0; url=2.0/index.html""#));
        assert!(html.contains(r#"<a href="2.0/index.html">"#));
    }

    #[test]
    fn redirect_escapes_name() {
        let html = render_redirect("a&b");
        assert!(html.contains("url=a&amp;b/index.html"));
    }

    #[test]
    fn versions_script_embeds_data() {
        let mut files = FileManifest::new();
        files.insert("1.0", ["index.html"]);
        let data = SwitcherData {
            versions: VersionRegistry::new(vec![VersionRecord::new("1.0").with_primary(true)])
                .unwrap(),
            files: Some(files),
            inject_selector: "div.sphinxsidebarwrapper".to_owned(),
        };

        let script = render_versions_script(&data).unwrap();
        assert!(script.contains(r#"import init, { initialize } from "./verdoc_switcher.js";"#));
        assert!(script.contains("initialize(JSON.stringify(VERDOC_DATA));"));

        let json = script
            .split_once("const VERDOC_DATA = ")
            .and_then(|(_, rest)| rest.split_once(";\n\nawait"))
            .map(|(json, _)| json)
            .unwrap();
        assert_eq!(SwitcherData::from_json(json).unwrap(), data);
    }

    #[test]
    fn root_prefix_by_depth() {
        assert_eq!(root_prefix("index.html"), "../");
        assert_eq!(root_prefix("api/module.html"), "../../");
        assert_eq!(root_prefix("a/b/c.html"), "../../../");
    }

    #[test]
    fn injects_before_head_close() {
        let html = "<html><head><title>x</title></head><body></body></html>";
        let result = inject_head_tags(html, "../").unwrap();
        assert_eq!(
            result,
            "<html><head><title>x</title><!-- verdoc -->\n\
             <link rel=\"stylesheet\" href=\"../_verdoc/verdoc.css\">\n\
             <script type=\"module\" src=\"../_verdoc/versions.js\"></script>\n\
             </head><body></body></html>"
        );
    }

    #[test]
    fn injects_case_insensitively() {
        let html = "<HTML><HEAD></HEAD></HTML>";
        let result = inject_head_tags(html, "../../").unwrap();
        assert!(result.contains("href=\"../../_verdoc/verdoc.css\""));
        assert!(result.ends_with("</HEAD></HTML>"));
    }

    #[test]
    fn skips_pages_without_head() {
        assert_eq!(inject_head_tags("<p>fragment</p>", "../"), None);
    }

    #[test]
    fn injection_is_idempotent() {
        let once = inject_head_tags("<head></head>", "../").unwrap();
        assert_eq!(inject_head_tags(&once, "../"), None);
    }
}
