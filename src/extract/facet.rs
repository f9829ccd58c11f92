//! Facet option scraping.
//!
//! The grid plugin renders facets in one of two markups depending on the
//! facet type:
//!
//! - **option/value**: `<option value="ID">Label&nbsp;(12)</option>`, the
//!   count in parentheses, sometimes padded as `(&nbsp;12)`.
//! - **data attribute**: `<div data-facet-value="ID"><span>Label</span>
//!   <span class="wpgb-facet-count">12</span>`, the count in its own element.
//!
//! Layouts are tried in that order and the first one producing records wins.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use super::utils::{compile_static_regex, normalize_label};
use crate::catalog::FacetOption;

/// Layout A. The leading whitespace keeps `data-facet-value` from matching.
static OPTION_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r#"\svalue="([^"]*)"[^>]*>([^<]*?)\s*\(\s*(?:&nbsp;?)?\s*(\d+)\s*(?:&nbsp;?)?\s*\)"#,
    )
});

/// Layout B: label possibly wrapped in tags, count in a following element.
static DATA_ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r#"data-facet-value="([^"]*)"[^>]*>(?:\s*<[^/][^>]*>)*\s*([^<]+?)\s*(?:<[^>]*>\s*)+\(?\s*(?:&nbsp;?)?\s*(\d+)\s*\)?\s*<"#,
    )
});

/// Extracts facet options from a facet HTML fragment.
///
/// Never fails: unknown markup yields an empty vector, and a single item
/// with an empty id or an unparsable count is skipped.
#[must_use]
pub fn extract_facet_options(html: &str) -> Vec<FacetOption> {
    for regex in [&*OPTION_VALUE_RE, &*DATA_ATTRIBUTE_RE] {
        let options: Vec<FacetOption> = regex
            .captures_iter(html)
            .filter_map(|caps| option_from_captures(&caps))
            .collect();
        if !options.is_empty() {
            return options;
        }
    }
    Vec::new()
}

fn option_from_captures(caps: &Captures<'_>) -> Option<FacetOption> {
    // Ids go back to the server verbatim as filter values, so only labels are decoded.
    let id = caps.get(1)?.as_str().trim().to_string();
    if id.is_empty() {
        // "All" / reset entries carry an empty value.
        return None;
    }
    let name = caps.get(2).map(|m| normalize_label(m.as_str()))?;
    let raw_count = caps.get(3)?.as_str();
    let Ok(count) = raw_count.parse::<u32>() else {
        debug!(id = %id, count = %raw_count, "skipping facet option with unparsable count");
        return None;
    };
    Some(FacetOption { id, name, count })
}
