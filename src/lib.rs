//! Meir Downloader Core Library
//!
//! Browse and download lecture audio from meirtv.com. The site exposes its
//! catalog only through a WP Grid Builder AJAX endpoint that returns
//! rendered HTML, so listings are scraped and lessons are downloaded from
//! the audio element of each lesson page.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`catalog`] - Facets, options, lessons and filters
//! - [`extract`] - Regex scrapers for facet, post and lesson page markup
//! - [`query`] - Grid endpoint client producing catalog records
//! - [`download`] - Streaming lesson downloads and the concurrent manager
//! - [`server`] - Local JSON API for the browser front end

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod download;
pub mod extract;
pub mod http;
pub mod query;
pub mod server;
mod user_agent;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use catalog::{FacetKind, FacetOption, Filters, Lesson};
pub use download::{
    DownloadError, DownloadEvent, DownloadManager, DownloadOutcome, DownloadRequest,
    LessonDownloader,
};
pub use http::HttpTimeouts;
pub use query::{DEFAULT_BASE_URL, ListKind, Listing, QueryError, SiteClient};
pub use server::{ApiState, router};
pub use user_agent::BROWSER_USER_AGENT;
