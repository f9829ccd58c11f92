//! Local HTTP API for the browser front end.
//!
//! Thin JSON adapter over the query layer and the download routine:
//!
//! | Route | Response |
//! |---|---|
//! | `GET /api/rabbis` | `{rabbis: [...]}` |
//! | `GET /api/series?rabbi_id=` | `{series: [...]}` |
//! | `GET /api/subjects?rabbi_id=&series_id=` | `{subjects: [...]}` |
//! | `GET /api/topics?...&subject_id=` | `{topics: [...]}` |
//! | `GET /api/occasions?...&topic_id=` | `{occasions: [...]}` |
//! | `GET /api/lessons?...&occasion_id=&page=` | `{lessons: [...], page}` |
//! | `POST /api/download` | `{success, filepath, filename}` |
//! | `GET /api/config` | `{download_path, base_url}` |
//! | `GET /health` | `{status: "ok"}` |

mod handlers;

use axum::Router;
use axum::http::{Method, header};
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::download::LessonDownloader;
use crate::query::SiteClient;

/// Shared state for all handlers.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub site: SiteClient,
    pub downloader: LessonDownloader,
}

impl ApiState {
    /// Bundles the query client and downloader.
    #[must_use]
    pub fn new(site: SiteClient, downloader: LessonDownloader) -> Self {
        Self { site, downloader }
    }
}

/// Builds the API router with tracing and permissive CORS.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/config", get(handlers::config))
        .route("/api/rabbis", get(handlers::rabbis))
        .route("/api/series", get(handlers::series))
        .route("/api/subjects", get(handlers::subjects))
        .route("/api/topics", get(handlers::topics))
        .route("/api/occasions", get(handlers::occasions))
        .route("/api/lessons", get(handlers::lessons))
        .route("/api/download", post(handlers::download))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Serves the API on `listener` until the process stops.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve(listener: TcpListener, state: ApiState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "API server listening");
    }
    axum::serve(listener, router(state)).await
}
