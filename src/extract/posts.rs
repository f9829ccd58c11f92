//! Lesson and link scraping from the posts fragment of a grid response.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use super::utils::{compile_static_regex, normalize_label};
use crate::catalog::{FacetKind, FacetOption, Lesson};

static POST_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"wpgb-post-(\d+)"));

/// Fields of one lesson card, in the order they appear on the card.
static LESSON_CARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(concat!(
        r"(?s)wpgb-post-(\d+)",
        r#".*?href="(?:https?://[^/"]+)?/rabbis/([^/"]+)/?"[^>]*>([^<]+)</a>"#,
        r#".*?href="(?:https?://[^/"]+)?/shiurim-series/([^/"]+)/?"[^>]*>([^<]+)</a>"#,
        r"(?:.*?פרק:\s*(\d+))",
        r"(?:.*?(\d+/\d+/\d+))",
        r"(?:.*?(\d+)\s*דקות)",
        r#".*?href="(?:https?://[^/"]+)?/shiurim/(\d+)/?"[^>]*>([^<]+)</a>"#,
    ))
});

static RABBI_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"href="(?:https?://[^/"]+)?/rabbis/([^/"]+)/?"[^>]*>([^<]+)</a>"#)
});

static SERIES_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r#"href="(?:https?://[^/"]+)?/shiurim-series/([^/"]+)/?"[^>]*>([^<]+)</a>"#,
    )
});

/// Extracts lessons from a posts fragment, in source order.
///
/// The fragment is cut into one block per post card and each block is
/// matched on its own, so a card missing a field yields nothing without
/// shifting fields between neighbouring cards.
#[must_use]
pub fn extract_lessons(html: &str) -> Vec<Lesson> {
    post_blocks(html)
        .into_iter()
        .filter_map(|block| {
            let lesson = LESSON_CARD_RE
                .captures(block)
                .and_then(|caps| lesson_from_captures(&caps));
            if lesson.is_none() {
                debug!(
                    block_len = block.len(),
                    "skipping post card without complete lesson fields"
                );
            }
            lesson
        })
        .collect()
}

/// Recovers facet options from entity links in a posts fragment.
///
/// Used when the facet itself is missing from a response. Only rabbis and
/// series are linked from cards; other kinds yield nothing. Options are
/// deduplicated by id, first occurrence wins, and carry a count of 0.
/// Ids are the raw link slugs, matching what the facet markup sends back.
#[must_use]
pub fn extract_linked_options(html: &str, kind: FacetKind) -> Vec<FacetOption> {
    let regex: &Regex = match kind {
        FacetKind::Rabbis => &RABBI_LINK_RE,
        FacetKind::Series => &SERIES_LINK_RE,
        FacetKind::Subjects | FacetKind::Topics | FacetKind::Occasions => return Vec::new(),
    };

    let mut seen = HashSet::new();
    regex
        .captures_iter(html)
        .filter_map(|caps| {
            let id = caps.get(1)?.as_str().trim().to_string();
            let name = normalize_label(caps.get(2)?.as_str());
            if id.is_empty() || name.is_empty() || !seen.insert(id.clone()) {
                return None;
            }
            Some(FacetOption { id, name, count: 0 })
        })
        .collect()
}

/// Splits `html` at every post marker whose id differs from the current one.
///
/// A card may repeat its own marker (e.g. in both `id` and `class`); those
/// repeats stay in the same block.
fn post_blocks(html: &str) -> Vec<&str> {
    let mut starts: Vec<usize> = Vec::new();
    let mut current_id: Option<&str> = None;
    for caps in POST_MARKER_RE.captures_iter(html) {
        let (Some(whole), Some(id)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if current_id != Some(id.as_str()) {
            starts.push(whole.start());
            current_id = Some(id.as_str());
        }
    }

    starts
        .iter()
        .enumerate()
        .map(|(index, &start)| {
            let end = starts.get(index + 1).copied().unwrap_or(html.len());
            &html[start..end]
        })
        .collect()
}

/// Builds a lesson; any name that is blank once cleaned drops the card.
fn lesson_from_captures(caps: &Captures<'_>) -> Option<Lesson> {
    let text = |index: usize| caps.get(index).map(|m| m.as_str());
    let label = |index: usize| {
        text(index)
            .map(normalize_label)
            .filter(|label| !label.is_empty())
    };
    Some(Lesson {
        id: text(1)?.to_string(),
        rabbi_id: text(2)?.trim().to_string(),
        rabbi_name: label(3)?,
        series_id: text(4)?.trim().to_string(),
        series_name: label(5)?,
        chapter: text(6)?.parse().ok()?,
        date: text(7)?.to_string(),
        duration: text(8)?.parse().ok()?,
        post_id: text(9)?.to_string(),
        name: label(10)?,
    })
}
