//! Asset link extraction for asset-mirror
//!
//! Pattern-based scanning of raw page text. No markup parsing is done: a link
//! counts when it appears as `href="..."` and carries one of the known asset
//! extensions.

use std::collections::HashSet;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Extensions recognised as downloadable assets
pub const ASSET_EXTENSIONS: &[&str] = &[
    "pdf", "png", "jpg", "webp", "zip", "rar", "stl", "7z", "json", "txt",
];

// The extension must end the value, or be followed by a query or fragment
static ASSET_HREF_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r#"href="([^"]+\.(?i:{})(?:[?#][^"]*)?)""#,
        ASSET_EXTENSIONS.join("|")
    );
    Regex::new(&pattern).expect("asset href pattern is valid")
});

/// Returns every asset link found in `text`, in order of appearance.
///
/// Values are returned verbatim, query strings included. Duplicates are kept.
pub fn extract_asset_links(text: &str) -> Vec<String> {
    let mut links = Vec::new();

    for caps in ASSET_HREF_RE.captures_iter(text) {
        match caps.get(1) {
            Some(value) => links.push(value.as_str().to_string()),
            None => warn!("Unexpected match format: {:?}", caps.get(0).map(|m| m.as_str())),
        }
    }

    debug!("Extracted {} asset links", links.len());
    links
}

/// Keeps the first occurrence of each link, preserving order.
pub fn dedup_links(links: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(links.len());
    links
        .into_iter()
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

/// Checks that `candidate` is an absolute, well-formed URL with a scheme.
pub fn is_valid_url(candidate: &str) -> bool {
    Url::parse(candidate).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_supported_extensions_only() {
        let html = r#"<a href="a.pdf">A</a> <a href="b.PNG?x=1">B</a> <a href="c.doc">C</a>"#;
        assert_eq!(extract_asset_links(html), vec!["a.pdf", "b.PNG?x=1"]);
    }

    #[test]
    fn test_extract_keeps_order_and_duplicates() {
        let html = concat!(
            r#"<img href="https://cdn.example.com/x/photo.jpg">"#,
            r#"<a href="https://example.com/data.json">"#,
            r#"<a href="https://cdn.example.com/x/photo.jpg">"#,
            r#"<a href="https://example.com/model.stl?v=3&amp;dl=1">"#,
        );
        assert_eq!(
            extract_asset_links(html),
            vec![
                "https://cdn.example.com/x/photo.jpg",
                "https://example.com/data.json",
                "https://cdn.example.com/x/photo.jpg",
                "https://example.com/model.stl?v=3&amp;dl=1",
            ]
        );
    }

    #[test]
    fn test_extract_requires_extension_at_end_of_path() {
        let html = concat!(
            r#"<a href="https://docs.zipline.com/guide">docs</a>"#,
            r#"<a href="https://www.stl.example.org/">home</a>"#,
            r#"<a href="https://example.com/report.pdf.html">page</a>"#,
            r#"<a href="https://example.com/manual.pdf#page=2">manual</a>"#,
            r#"<a href="https://example.com/scan.JPG">scan</a>"#,
        );
        assert_eq!(
            extract_asset_links(html),
            vec![
                "https://example.com/manual.pdf#page=2",
                "https://example.com/scan.JPG",
            ]
        );
    }

    #[test]
    fn test_extract_ignores_other_attribute_forms() {
        let html = r#"<a href='single.pdf'> <a href = "spaced.pdf"> <a src="img.png">"#;
        assert!(extract_asset_links(html).is_empty());
    }

    #[test]
    fn test_extract_malformed_markup() {
        assert!(extract_asset_links("").is_empty());
        assert!(extract_asset_links(r#"<a href="broken.pdf"#).is_empty());
        assert!(extract_asset_links("<<<>>> href=\"\" \u{0}").is_empty());
    }

    #[test]
    fn test_dedup_first_occurrence_wins() {
        let links = ["x", "y", "x", "z", "y"].iter().map(|s| s.to_string()).collect();
        assert_eq!(dedup_links(links), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_dedup_empty() {
        assert!(dedup_links(Vec::new()).is_empty());
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://host/path"));
        assert!(is_valid_url("http://example.com/files/a.pdf?x=1"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("a.pdf"));
        assert!(!is_valid_url("/wp/uploads/a.pdf"));
        assert!(!is_valid_url(""));
    }
}
