//! Minimal URL splitting for path-segment matching.
//!
//! Only the path is inspected. Scheme and authority are skipped, and the
//! path ends at the first `?` or `#`.

use percent_encoding::percent_decode_str;

/// A URL with the byte range of its path located.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Location<'a> {
    href: &'a str,
    path_start: usize,
    path_end: usize,
}

/// A URL split around a version segment.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Split<'a> {
    /// Everything before the version segment, ending with `/` when non-empty.
    pub base: &'a str,
    /// Everything after the version segment and its trailing `/`.
    pub remainder: &'a str,
}

impl<'a> Location<'a> {
    pub(crate) fn parse(href: &'a str) -> Self {
        let path_end = href.find(['?', '#']).unwrap_or(href.len());
        let path_start = match href[..path_end].find("://") {
            Some(scheme_end) => {
                let authority_start = scheme_end + 3;
                href[authority_start..path_end]
                    .find('/')
                    .map_or(path_end, |slash| authority_start + slash)
            }
            None => 0,
        };
        Self {
            href,
            path_start,
            path_end,
        }
    }

    /// Path segments paired with their byte offset into the URL.
    pub(crate) fn segments(&self) -> impl Iterator<Item = (usize, &'a str)> {
        let mut offset = self.path_start;
        self.href[self.path_start..self.path_end]
            .split('/')
            .map(move |segment| {
                let start = offset;
                offset += segment.len() + 1;
                (start, segment)
            })
    }

    /// Split the URL around the segment starting at `start` with length `len`.
    pub(crate) fn split_at_segment(&self, start: usize, len: usize) -> Split<'a> {
        let end = start + len;
        let rest = &self.href[end..];
        Split {
            base: &self.href[..start],
            remainder: rest.strip_prefix('/').unwrap_or(rest),
        }
    }
}

/// The page identifier of a remainder: query and fragment dropped,
/// percent-escapes decoded, directory URLs resolved to their `index.html`.
pub(crate) fn page_identifier(remainder: &str) -> String {
    let end = remainder.find(['?', '#']).unwrap_or(remainder.len());
    let path = percent_decode_str(&remainder[..end]).decode_utf8_lossy();
    if path.is_empty() || path.ends_with('/') {
        format!("{path}index.html")
    } else {
        path.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn segments(href: &str) -> Vec<&str> {
        Location::parse(href).segments().map(|(_, s)| s).collect()
    }

    #[test]
    fn segments_skip_scheme_and_authority() {
        assert_eq!(
            segments("https://docs.example.com/root/2.0/guide.html"),
            vec!["", "root", "2.0", "guide.html"]
        );
    }

    #[test]
    fn segments_stop_at_query_and_fragment() {
        assert_eq!(
            segments("https://example.com/2.0/guide.html?q=1.0#1.0"),
            vec!["", "2.0", "guide.html"]
        );
    }

    #[test]
    fn segments_of_host_only_url() {
        assert_eq!(segments("https://example.com"), vec![""]);
        assert_eq!(segments("https://example.com#2.0"), vec![""]);
    }

    #[test]
    fn segments_of_file_url() {
        assert_eq!(
            segments("file:///home/me/build/1.0/index.html"),
            vec!["", "home", "me", "build", "1.0", "index.html"]
        );
    }

    #[test]
    fn segments_of_relative_path() {
        assert_eq!(segments("2.0/guide.html"), vec!["2.0", "guide.html"]);
    }

    #[test]
    fn split_around_segment() {
        let href = "https://example.com/root/2.0/guide.html#section";
        let location = Location::parse(href);
        let (start, segment) = location.segments().find(|(_, s)| *s == "2.0").unwrap();

        assert_eq!(
            location.split_at_segment(start, segment.len()),
            Split {
                base: "https://example.com/root/",
                remainder: "guide.html#section",
            }
        );
    }

    #[test]
    fn split_when_segment_is_last() {
        let href = "https://example.com/root/2.0";
        let location = Location::parse(href);
        let (start, segment) = location.segments().last().unwrap();

        let split = location.split_at_segment(start, segment.len());
        assert_eq!(split.base, "https://example.com/root/");
        assert_eq!(split.remainder, "");
    }

    #[test]
    fn page_identifier_strips_query_and_fragment() {
        assert_eq!(page_identifier("guide.html#section"), "guide.html");
        assert_eq!(page_identifier("search.html?q=x"), "search.html");
        assert_eq!(page_identifier("api/module.html"), "api/module.html");
    }

    #[test]
    fn page_identifier_decodes_escapes() {
        assert_eq!(page_identifier("my%20page.html"), "my page.html");
        assert_eq!(
            page_identifier("%D1%81%D1%82%D1%80/index.html#x"),
            "стр/index.html"
        );
    }

    #[test]
    fn page_identifier_resolves_directories() {
        assert_eq!(page_identifier(""), "index.html");
        assert_eq!(page_identifier("#top"), "index.html");
        assert_eq!(page_identifier("api/"), "api/index.html");
    }
}
