//! Shared helpers for the scrapers.

use std::borrow::Cow;

use regex::Regex;
use url::Url;

/// Compiles a static regex pattern, panicking with the pattern on failure.
///
/// Only used for compile-time constant patterns behind `LazyLock`.
#[must_use]
pub fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Cleans scraped label text: percent-decoding, `&nbsp;` and NBSP to spaces,
/// common entities, then trim.
///
/// Text that is not valid percent-encoding is kept as-is.
#[must_use]
pub fn normalize_label(raw: &str) -> String {
    let decoded: Cow<'_, str> = if raw.contains('%') {
        urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
    } else {
        Cow::Borrowed(raw)
    };
    decoded
        .replace("&nbsp;", " ")
        .replace('\u{a0}', " ")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Resolves `value` against `base`: absolute http(s) URLs are returned
/// unchanged, protocol-relative ones get `https:`, the rest is joined.
#[must_use]
pub fn absolutize_url(value: &str, base: &Url) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if value.starts_with("http://") || value.starts_with("https://") {
        return Some(value.to_string());
    }
    if value.starts_with("//") {
        return Some(format!("https:{value}"));
    }
    base.join(value).ok().map(|url| url.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label_decodes_percent_encoding() {
        assert_eq!(
            normalize_label("%D7%94%D7%A8%D7%91"),
            "\u{5d4}\u{5e8}\u{5d1}"
        );
    }

    #[test]
    fn test_normalize_label_replaces_nbsp_and_trims() {
        assert_eq!(normalize_label("  Rav A&nbsp;"), "Rav A");
        assert_eq!(normalize_label("Rav\u{a0}B"), "Rav B");
    }

    #[test]
    fn test_normalize_label_keeps_invalid_percent_text() {
        assert_eq!(normalize_label("100% pure"), "100% pure");
    }

    #[test]
    fn test_absolutize_url_variants() {
        let base = Url::parse("https://meirtv.com/").unwrap();
        assert_eq!(
            absolutize_url("https://cdn.example/a.mp3", &base).as_deref(),
            Some("https://cdn.example/a.mp3")
        );
        assert_eq!(
            absolutize_url("//cdn.example/a.mp3", &base).as_deref(),
            Some("https://cdn.example/a.mp3")
        );
        assert_eq!(
            absolutize_url("/wp-content/a.mp3", &base).as_deref(),
            Some("https://meirtv.com/wp-content/a.mp3")
        );
        assert_eq!(absolutize_url("  ", &base), None);
    }
}
