//! Query layer for the site's WP Grid Builder endpoint.
//!
//! Every listing is one form-encoded `POST` to `wp-admin/admin-ajax.php`
//! with `action=wpgb_get_posts`. The JSON reply carries rendered facet and
//! post HTML, which is handed to [`crate::extract`].
//!
//! # Example
//!
//! ```no_run
//! use meir_downloader_core::catalog::{FacetKind, Filters};
//! use meir_downloader_core::query::SiteClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SiteClient::new("https://meirtv.com")?;
//! let rabbis = client.options(FacetKind::Rabbis, &Filters::new()).await?;
//! let lessons = client
//!     .lessons(&Filters::new().with(FacetKind::Rabbis, &rabbis[0].id), 1)
//!     .await?;
//! println!("{} lessons", lessons.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
pub mod payload;

pub use client::{DEFAULT_BASE_URL, ListKind, Listing, SiteClient, grid_form_body};
pub(crate) use client::parse_site_base;
pub use error::QueryError;
