//! CLI command handlers.

mod browse;
mod download;
mod serve;

pub use browse::{run_facet_command, run_lessons_command};
pub use download::run_download_command;
pub use serve::run_serve_command;
