//! Request handlers for the local API.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use super::ApiState;
use crate::catalog::{FacetKind, Filters};
use crate::download::{DEFAULT_GROUP_NAME, DEFAULT_LESSON_NAME, DownloadRequest};
use crate::query::QueryError;

/// Filter query parameters shared by the listing routes.
///
/// Each route only reads the filters that precede its own facet.
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    rabbi_id: Option<String>,
    series_id: Option<String>,
    subject_id: Option<String>,
    topic_id: Option<String>,
    occasion_id: Option<String>,
    page: Option<String>,
}

impl FilterParams {
    /// Filters narrowed to the facets before `upto` (all facets for `None`).
    fn filters(&self, upto: Option<FacetKind>) -> Filters {
        let mut filters = Filters::new();
        let values = [
            (FacetKind::Rabbis, &self.rabbi_id),
            (FacetKind::Series, &self.series_id),
            (FacetKind::Subjects, &self.subject_id),
            (FacetKind::Topics, &self.topic_id),
            (FacetKind::Occasions, &self.occasion_id),
        ];
        for (kind, value) in values {
            if Some(kind) == upto {
                break;
            }
            if let Some(value) = value {
                filters = filters.with(kind, value.clone());
            }
        }
        filters
    }

    /// Requested page; missing or unparsable values mean page 1.
    fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|page| *page > 0)
            .unwrap_or(1)
    }
}

/// Body of `POST /api/download`.
#[derive(Debug, Deserialize)]
pub struct DownloadBody {
    #[serde(default)]
    lesson_id: Value,
    lesson_name: Option<String>,
    rabbi_name: Option<String>,
    series_name: Option<String>,
    #[serde(default)]
    chapter: Value,
}

impl DownloadBody {
    fn into_request(self) -> Option<DownloadRequest> {
        let lesson_id = scalar_text(&self.lesson_id).filter(|id| !id.trim().is_empty())?;
        Some(DownloadRequest {
            lesson_id,
            lesson_name: non_blank(self.lesson_name, DEFAULT_LESSON_NAME),
            rabbi_name: non_blank(self.rabbi_name, DEFAULT_GROUP_NAME),
            series_name: non_blank(self.series_name, DEFAULT_GROUP_NAME),
            chapter: parse_chapter(&self.chapter),
        })
    }
}

/// Accepts `"12"` or `12`; anything else is chapter 0.
fn parse_chapter(value: &Value) -> u32 {
    match value {
        Value::Number(number) => number
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
        Value::String(text) => text.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn non_blank(value: Option<String>, default: &str) -> String {
    value
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

pub async fn config(State(state): State<ApiState>) -> Json<Value> {
    Json(json!({
        "download_path": state.downloader.root().display().to_string(),
        "base_url": state.site.base_url().as_str().trim_end_matches('/'),
    }))
}

pub async fn rabbis(State(state): State<ApiState>, Query(params): Query<FilterParams>) -> Response {
    facet_listing(&state, FacetKind::Rabbis, &params).await
}

pub async fn series(State(state): State<ApiState>, Query(params): Query<FilterParams>) -> Response {
    facet_listing(&state, FacetKind::Series, &params).await
}

pub async fn subjects(
    State(state): State<ApiState>,
    Query(params): Query<FilterParams>,
) -> Response {
    facet_listing(&state, FacetKind::Subjects, &params).await
}

pub async fn topics(State(state): State<ApiState>, Query(params): Query<FilterParams>) -> Response {
    facet_listing(&state, FacetKind::Topics, &params).await
}

pub async fn occasions(
    State(state): State<ApiState>,
    Query(params): Query<FilterParams>,
) -> Response {
    facet_listing(&state, FacetKind::Occasions, &params).await
}

pub async fn lessons(State(state): State<ApiState>, Query(params): Query<FilterParams>) -> Response {
    let page = params.page();
    match state.site.lessons(&params.filters(None), page).await {
        Ok(lessons) => (StatusCode::OK, Json(json!({"lessons": lessons, "page": page})))
            .into_response(),
        Err(error) => upstream_error(&error),
    }
}

pub async fn download(State(state): State<ApiState>, Json(body): Json<DownloadBody>) -> Response {
    let Some(request) = body.into_request() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "lesson_id is required"})),
        )
            .into_response();
    };

    match state.downloader.download(&request, |_| {}).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "filepath": outcome.path.display().to_string(),
                "filename": outcome.filename,
            })),
        )
            .into_response(),
        Err(error) if error.is_media_not_found() => (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "Audio not found on lesson page"})),
        )
            .into_response(),
        Err(error) => {
            warn!(lesson_id = %request.lesson_id, error = %error, "download request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false, "error": error.to_string()})),
            )
                .into_response()
        }
    }
}

async fn facet_listing(state: &ApiState, kind: FacetKind, params: &FilterParams) -> Response {
    match state.site.options(kind, &params.filters(Some(kind))).await {
        Ok(options) => {
            let mut body = serde_json::Map::new();
            body.insert(kind.as_str().to_string(), json!(options));
            (StatusCode::OK, Json(Value::Object(body))).into_response()
        }
        Err(error) => upstream_error(&error),
    }
}

fn upstream_error(error: &QueryError) -> Response {
    warn!(error = %error, "grid query failed");
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({"error": error.to_string()})),
    )
        .into_response()
}
