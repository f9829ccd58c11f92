//! Pattern-based extraction of catalog records from site HTML.
//!
//! The site only exposes rendered HTML fragments, so every record is
//! scraped with regular expressions. Extraction never fails: markup that
//! does not match yields empty results, and a malformed item is skipped
//! without affecting the rest of the batch.

mod facet;
mod media;
mod posts;
mod utils;

pub use facet::extract_facet_options;
pub use media::{extract_media_url, resolve_media_url};
pub use posts::{extract_lessons, extract_linked_options};
