//! Local filename derivation for asset URLs
//!
//! Turns an asset URL into a lowercase name made of `[a-z0-9_]` plus the
//! original extension. The mapping is deterministic, so the same URL always
//! lands on the same file in the output directory.

use url::Url;

/// Returns the extension (leading dot included) of the last path segment of `url`.
///
/// Only the path component counts: host, query and fragment are ignored.
/// Values that are not absolute URLs are cut at the first `?` or `#`.
/// Returns an empty string when the segment has no dot.
pub fn extension_of(url: &str) -> String {
    let parsed = Url::parse(url).ok();
    let path = match &parsed {
        Some(parsed) => parsed.path(),
        None => url.split(['?', '#']).next().unwrap_or(url),
    };
    let segment = path.rsplit('/').next().unwrap_or(path);

    match segment.rfind('.') {
        Some(idx) => segment[idx..].to_string(),
        None => String::new(),
    }
}

/// Last `/`-delimited segment of `url`, ignoring trailing slashes.
fn base_name(url: &str) -> &str {
    let trimmed = url.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Replaces every run of characters outside `[a-z0-9]` with one underscore.
///
/// Runs of underscores already present are folded into the same single
/// underscore, since `_` is itself outside the allowed set.
fn underscore_runs(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_run = false;

    for c in input.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }

    out
}

/// Derives a filesystem-safe filename from an asset URL.
///
/// # Examples
///
/// - `"https://example.com/docs/Report.pdf"` → `"report.pdf"`
/// - `"https://example.com/a/File Name.PDF?x=1"` → `"file_name_x_1.pdf"`
/// - `"https://example.com/a/readme"` → `"readme"`
pub fn sanitize_filename(url: &str) -> String {
    let lower = url.to_lowercase();
    let ext = extension_of(&lower);

    let mut name = underscore_runs(base_name(&lower));
    if let Some(stripped) = name.strip_prefix('_') {
        name = stripped.to_string();
    }

    // `.ext` became `_ext` above; drop it so the extension isn't doubled.
    if ext.len() > 1 {
        let marker = format!("_{}", &ext[1..]);
        if let Some(idx) = name.find(&marker) {
            name.replace_range(idx..idx + marker.len(), "");
        }
    }

    name.push_str(&ext);

    match name.find('?') {
        Some(idx) => name[..idx].to_string(),
        None => name,
    }
}
