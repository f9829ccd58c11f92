//! Lesson audio downloads.
//!
//! [`LessonDownloader`] performs one download: it loads the lesson page,
//! finds the embedded audio source and streams it to
//! `<root>/<speaker>/<series>/<NNN>-<lesson name>.mp3`.
//! [`DownloadManager`] runs many of them concurrently and tracks their state.
//!
//! # Features
//!
//! - Streaming writes through an 8 KiB buffer (memory use independent of file size)
//! - Percentage progress when the server declares a content length
//! - Configurable timeouts (30s connect, 5min read by default)
//! - Structured error types with the failing URL or path
//! - Same-name files are overwritten; partial files are not cleaned up
//!
//! # Example
//!
//! ```no_run
//! use meir_downloader_core::download::{DownloadRequest, LessonDownloader};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = LessonDownloader::new("https://meirtv.com", "./lessons")?;
//! let outcome = downloader
//!     .download(&DownloadRequest::new("12345"), |percent| println!("{percent}%"))
//!     .await?;
//! println!("Downloaded: {}", outcome.path.display());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;
mod filename;
mod manager;

pub use client::{DownloadOutcome, DownloadRequest, LessonDownloader};
pub use constants::{AUDIO_EXTENSION, CHUNK_SIZE, DEFAULT_GROUP_NAME, DEFAULT_LESSON_NAME};
pub use error::DownloadError;
pub use filename::{lesson_directory, lesson_filename, sanitize_path_segment};
pub use manager::{
    DownloadEvent, DownloadManager, DownloadSummary, DownloadTask, TaskId, TaskStatus,
};
