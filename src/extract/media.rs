//! Audio source lookup on a lesson page.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::utils::{absolutize_url, compile_static_regex};

/// First `<source src>` nested in an `<audio>` element.
static AUDIO_SOURCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?is)<audio\b[^>]*>.*?<source\b[^>]*?\ssrc\s*=\s*["']([^"']+)["']"#)
});

/// `<audio src>` without nested sources.
static AUDIO_SRC_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?is)<audio\b[^>]*?\ssrc\s*=\s*["']([^"']+)["']"#)
});

/// Returns the raw media URL of the first audio element on the page.
#[must_use]
pub fn extract_media_url(page_html: &str) -> Option<String> {
    [&*AUDIO_SOURCE_RE, &*AUDIO_SRC_ATTR_RE]
        .into_iter()
        .find_map(|regex| regex.captures(page_html))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().replace("&amp;", "&"))
        .filter(|src| !src.is_empty())
}

/// Makes a media URL absolute against the site origin.
#[must_use]
pub fn resolve_media_url(src: &str, origin: &Url) -> Option<String> {
    absolutize_url(src, origin)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_nested_source() {
        let html = r#"<div><audio controls preload="none">
            <source type="audio/mpeg" src="/wp-content/uploads/a.mp3?_=1" />
        </audio></div>"#;
        assert_eq!(
            extract_media_url(html).as_deref(),
            Some("/wp-content/uploads/a.mp3?_=1")
        );
    }

    #[test]
    fn test_first_audio_wins() {
        let html = r#"<audio><source src="https://cdn/1.mp3"></audio><audio><source src="https://cdn/2.mp3"></audio>"#;
        assert_eq!(extract_media_url(html).as_deref(), Some("https://cdn/1.mp3"));
    }

    #[test]
    fn test_falls_back_to_audio_src_attribute() {
        let html = r#"<audio class="player" src="https://cdn/x.mp3"></audio>"#;
        assert_eq!(extract_media_url(html).as_deref(), Some("https://cdn/x.mp3"));
    }

    #[test]
    fn test_source_outside_audio_is_ignored() {
        let html = r#"<video><source src="/v.mp4"></video><p>no audio</p>"#;
        assert_eq!(extract_media_url(html), None);
    }

    #[test]
    fn test_resolve_relative_against_origin() {
        let origin = Url::parse("https://meirtv.com").unwrap();
        assert_eq!(
            resolve_media_url("/x.mp3", &origin).as_deref(),
            Some("https://meirtv.com/x.mp3")
        );
        assert_eq!(
            resolve_media_url("https://cdn.example/x.mp3", &origin).as_deref(),
            Some("https://cdn.example/x.mp3")
        );
    }
}
