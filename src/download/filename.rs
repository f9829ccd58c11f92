//! Destination naming for downloaded lessons.
//!
//! Layout: `<root>/<speaker>/<series>/<NNN>-<lesson name>.mp3`. Names come
//! straight from scraped text, so every segment is sanitized before it
//! touches the file system.

use std::path::{Path, PathBuf};

use super::constants::{AUDIO_EXTENSION, UNKNOWN_SEGMENT};

/// File name for a lesson: zero-padded chapter, dash, sanitized name.
///
/// Chapter 7 "Intro" gives `007-Intro.mp3`. Chapters above 999 keep all
/// their digits.
#[must_use]
pub fn lesson_filename(chapter: u32, lesson_name: &str) -> String {
    format!(
        "{chapter:03}-{}.{AUDIO_EXTENSION}",
        sanitize_path_segment(lesson_name)
    )
}

/// Directory for a speaker/series pair under `root`.
#[must_use]
pub fn lesson_directory(root: &Path, rabbi_name: &str, series_name: &str) -> PathBuf {
    root.join(sanitize_path_segment(rabbi_name))
        .join(sanitize_path_segment(series_name))
}

/// Makes scraped text safe as a single path segment.
///
/// Removes path separators, characters reserved on common file systems and
/// control characters; trims surrounding whitespace and trailing dots.
/// Segments that end up empty, `.` or `..` become `Unknown`. Non-ASCII
/// letters (Hebrew titles) are kept.
#[must_use]
pub fn sanitize_path_segment(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .filter(|c| !c.is_control())
        .collect();
    let cleaned = cleaned.trim().trim_end_matches('.').trim_end();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        UNKNOWN_SEGMENT.to_string()
    } else {
        cleaned.to_string()
    }
}
