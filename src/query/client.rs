//! Grid endpoint client.

use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, instrument};
use url::{Url, form_urlencoded};

use super::error::QueryError;
use super::payload::GridResponse;
use crate::catalog::{FacetKind, FacetOption, Filters, Lesson};
use crate::extract::{extract_facet_options, extract_lessons, extract_linked_options};
use crate::http::{HttpTimeouts, build_site_client};

/// Default site origin.
pub const DEFAULT_BASE_URL: &str = "https://meirtv.com";

/// Path of the WordPress AJAX endpoint, relative to the site origin.
const AJAX_PATH: &str = "wp-admin/admin-ajax.php";

/// What to list from one grid query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// The options of one facet.
    Facet(FacetKind),
    /// The lesson cards of the requested page.
    Lessons,
}

/// Result of [`SiteClient::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Options(Vec<FacetOption>),
    Lessons(Vec<Lesson>),
}

impl Listing {
    /// Number of records in the listing.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Options(options) => options.len(),
            Self::Lessons(lessons) => lessons.len(),
        }
    }

    /// Returns true when the listing holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Client for the site's facet grid endpoint.
///
/// Construct once and clone freely; clones share the connection pool.
/// Each call issues exactly one request and awaits it.
#[derive(Debug, Clone)]
pub struct SiteClient {
    client: Client,
    base_url: Url,
    endpoint: Url,
}

impl SiteClient {
    /// Creates a client for `base_url` with default query timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidBaseUrl`] for a non-http(s) or unparsable
    /// base URL, [`QueryError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, QueryError> {
        Self::with_timeouts(base_url, HttpTimeouts::QUERY)
    }

    /// Creates a client with explicit timeouts.
    ///
    /// # Errors
    ///
    /// Same as [`SiteClient::new`].
    pub fn with_timeouts(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, QueryError> {
        let base_url = parse_site_base(base_url)?;
        let endpoint = base_url
            .join(AJAX_PATH)
            .map_err(|_| QueryError::invalid_base_url(base_url.as_str()))?;
        let client = build_site_client(timeouts, query_headers())
            .map_err(|source| QueryError::ClientBuild { source })?;
        Ok(Self {
            client,
            base_url,
            endpoint,
        })
    }

    /// Site origin this client talks to, always ending with `/`.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Lists records of `kind` matching `filters` on grid page `page`.
    ///
    /// Facet listings fall back to scanning post links when the response
    /// carries no usable facet markup (rabbis and series only).
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] for transport failures, non-success statuses,
    /// and bodies that are not a JSON object.
    #[instrument(skip(self, filters))]
    pub async fn list(
        &self,
        kind: ListKind,
        filters: &Filters,
        page: u32,
    ) -> Result<Listing, QueryError> {
        let response = self.fetch_grid(filters, page).await?;
        let listing = match kind {
            ListKind::Lessons => Listing::Lessons(extract_lessons(&response.into_posts_html())),
            ListKind::Facet(facet) => Listing::Options(options_from_response(response, facet)),
        };
        debug!(records = listing.len(), "grid listing extracted");
        Ok(listing)
    }

    /// Lists the options of `kind` on the first page.
    ///
    /// # Errors
    ///
    /// Same as [`SiteClient::list`].
    pub async fn options(
        &self,
        kind: FacetKind,
        filters: &Filters,
    ) -> Result<Vec<FacetOption>, QueryError> {
        match self.list(ListKind::Facet(kind), filters, 1).await? {
            Listing::Options(options) => Ok(options),
            Listing::Lessons(_) => Ok(Vec::new()),
        }
    }

    /// Lists the lessons on grid page `page`.
    ///
    /// # Errors
    ///
    /// Same as [`SiteClient::list`].
    pub async fn lessons(&self, filters: &Filters, page: u32) -> Result<Vec<Lesson>, QueryError> {
        match self.list(ListKind::Lessons, filters, page).await? {
            Listing::Lessons(lessons) => Ok(lessons),
            Listing::Options(_) => Ok(Vec::new()),
        }
    }

    async fn fetch_grid(&self, filters: &Filters, page: u32) -> Result<GridResponse, QueryError> {
        let url = self.endpoint.as_str();
        let body = grid_form_body(filters, page);
        debug!(url, body = %body, "posting grid query");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(
                CONTENT_TYPE,
                "application/x-www-form-urlencoded; charset=UTF-8",
            )
            .body(body)
            .send()
            .await
            .map_err(|e| QueryError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::http_status(url, status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| QueryError::from_reqwest(url, e))?;
        serde_json::from_str::<GridResponse>(&text)
            .map_err(|e| QueryError::invalid_body(url, e.to_string()))
    }
}

/// Encodes the grid form: fixed action/grid fields, the page, then filters.
#[must_use]
pub fn grid_form_body(filters: &Filters, page: u32) -> String {
    let mut form = form_urlencoded::Serializer::new(String::new());
    form.append_pair("action", "wpgb_get_posts")
        .append_pair("grid", "1")
        .append_pair("paged", &page.max(1).to_string());
    for (name, value) in filters.form_params() {
        form.append_pair(name, value);
    }
    form.finish()
}

fn options_from_response(response: GridResponse, kind: FacetKind) -> Vec<FacetOption> {
    let options = response
        .facet_html(kind.facet_id())
        .map(extract_facet_options)
        .unwrap_or_default();
    if !options.is_empty() || kind.link_segment().is_none() {
        return options;
    }
    debug!(facet = %kind, "facet markup missing or empty; scanning post links");
    extract_linked_options(&response.into_posts_html(), kind)
}

fn query_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
    );
    headers.insert(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static("XMLHttpRequest"),
    );
    headers
}

/// Parses a site origin, requiring http(s) and normalizing to a trailing `/`
/// so relative joins keep any path prefix.
pub(crate) fn parse_site_base(raw: &str) -> Result<Url, QueryError> {
    let mut url = Url::parse(raw.trim()).map_err(|_| QueryError::invalid_base_url(raw))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(QueryError::invalid_base_url(raw));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_form_body_without_filters() {
        assert_eq!(
            grid_form_body(&Filters::new(), 1),
            "action=wpgb_get_posts&grid=1&paged=1"
        );
    }

    #[test]
    fn test_form_body_encodes_filter_names_and_values() {
        let filters = Filters::new()
            .with(FacetKind::Rabbis, "12")
            .with(FacetKind::Series, "\u{5d0} b");
        assert_eq!(
            grid_form_body(&filters, 3),
            "action=wpgb_get_posts&grid=1&paged=3&facets%5Brabbis%5D=12&facets%5Bshiurim-series%5D=%D7%90+b"
        );
    }

    #[test]
    fn test_page_zero_is_sent_as_first_page() {
        assert!(grid_form_body(&Filters::new(), 0).ends_with("paged=1"));
    }

    #[test]
    fn test_parse_site_base_normalizes_trailing_slash() {
        let url = parse_site_base("https://meirtv.com").unwrap();
        assert_eq!(url.as_str(), "https://meirtv.com/");
        let url = parse_site_base("http://127.0.0.1:8080/mirror").unwrap();
        assert_eq!(
            url.join(AJAX_PATH).unwrap().as_str(),
            "http://127.0.0.1:8080/mirror/wp-admin/admin-ajax.php"
        );
    }

    #[test]
    fn test_parse_site_base_rejects_other_schemes() {
        assert!(matches!(
            parse_site_base("ftp://meirtv.com"),
            Err(QueryError::InvalidBaseUrl { .. })
        ));
        assert!(parse_site_base("not a url").is_err());
    }

    #[test]
    fn test_facet_fallback_only_for_linked_kinds() {
        let response: GridResponse = serde_json::from_str(
            r#"{"facets": [], "posts": "<a href=\"/shiurim-series/s1/\">S1</a>"}"#,
        )
        .unwrap();
        assert_eq!(
            options_from_response(response, FacetKind::Series),
            vec![FacetOption::new("s1", "S1", 0)]
        );

        let response: GridResponse = serde_json::from_str(
            r#"{"facets": [], "posts": "<a href=\"/shiurim-series/s1/\">S1</a>"}"#,
        )
        .unwrap();
        assert!(options_from_response(response, FacetKind::Topics).is_empty());
    }
}
