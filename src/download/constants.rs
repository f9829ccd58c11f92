//! Constants for the download module.

/// Write buffer size for streamed media (8 KiB).
pub const CHUNK_SIZE: usize = 8192;

/// Extension of every saved lesson file.
pub const AUDIO_EXTENSION: &str = "mp3";

/// Replacement for path segments that sanitize to nothing.
pub const UNKNOWN_SEGMENT: &str = "Unknown";

/// Default lesson name when a request omits it.
pub const DEFAULT_LESSON_NAME: &str = "lesson";

/// Default speaker/series name when a request omits it.
pub const DEFAULT_GROUP_NAME: &str = "unknown";
