//! JSON envelope returned by the grid endpoint.
//!
//! `posts` is either one rendered HTML string or a list of per-post objects
//! depending on the plugin version; `facets` is an object keyed by facet id,
//! or `[]` when PHP serializes an empty map. Both shapes are resolved here so
//! the rest of the crate only sees HTML strings.

use serde::Deserialize;
use serde_json::Value;

/// Decoded grid response.
#[derive(Debug, Default, Deserialize)]
pub struct GridResponse {
    #[serde(default)]
    facets: Value,
    #[serde(default)]
    posts: PostsPayload,
}

/// The `posts` member in any of its known shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PostsPayload {
    /// Single pre-rendered HTML fragment.
    Html(String),
    /// One object per post, each with its own HTML.
    Items(Vec<PostItem>),
    /// Absent, `null`, or an unrecognized shape.
    Other(Value),
}

impl Default for PostsPayload {
    fn default() -> Self {
        Self::Other(Value::Null)
    }
}

/// One entry of an array-shaped `posts` member. Only its markup is used.
#[derive(Debug, Deserialize)]
pub struct PostItem {
    #[serde(default)]
    pub html: Option<String>,
}

impl PostsPayload {
    /// Flattens the payload into one HTML fragment, items joined in order.
    #[must_use]
    pub fn into_html(self) -> String {
        match self {
            Self::Html(html) => html,
            Self::Items(items) => items
                .into_iter()
                .filter_map(|item| item.html)
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Other(_) => String::new(),
        }
    }
}

impl GridResponse {
    /// HTML of the facet with the given id, if present and a string.
    #[must_use]
    pub fn facet_html(&self, facet_id: &str) -> Option<&str> {
        self.facets
            .get(facet_id)
            .and_then(|facet| facet.get("html"))
            .and_then(Value::as_str)
    }

    /// Consumes the response, returning the normalized posts HTML.
    #[must_use]
    pub fn into_posts_html(self) -> String {
        self.posts.into_html()
    }
}
