//! Lesson download routine.
//!
//! A download is two requests: the lesson page (to find the audio source)
//! and the media file itself, which is streamed to disk.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::Serialize;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{CHUNK_SIZE, DEFAULT_GROUP_NAME, DEFAULT_LESSON_NAME};
use super::error::DownloadError;
use super::filename::{lesson_directory, lesson_filename};
use crate::catalog::Lesson;
use crate::extract::{extract_media_url, resolve_media_url};
use crate::http::{HttpTimeouts, build_site_client};
use crate::query::parse_site_base;

/// What to download and how to name it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Lesson page id, as in `/shiurim/<id>/`.
    pub lesson_id: String,
    pub lesson_name: String,
    pub rabbi_name: String,
    pub series_name: String,
    pub chapter: u32,
}

impl DownloadRequest {
    /// Request for `lesson_id` with default names and chapter 0.
    #[must_use]
    pub fn new(lesson_id: impl Into<String>) -> Self {
        Self {
            lesson_id: lesson_id.into(),
            lesson_name: DEFAULT_LESSON_NAME.to_string(),
            rabbi_name: DEFAULT_GROUP_NAME.to_string(),
            series_name: DEFAULT_GROUP_NAME.to_string(),
            chapter: 0,
        }
    }

    /// Request for a scraped lesson; uses the lesson page id.
    #[must_use]
    pub fn for_lesson(lesson: &Lesson) -> Self {
        Self {
            lesson_id: lesson.post_id.clone(),
            lesson_name: lesson.name.clone(),
            rabbi_name: lesson.rabbi_name.clone(),
            series_name: lesson.series_name.clone(),
            chapter: lesson.chapter,
        }
    }
}

/// Result of a finished download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadOutcome {
    /// Full path of the written file.
    pub path: PathBuf,
    /// File name component of `path`.
    pub filename: String,
    /// Bytes written to disk.
    pub bytes_written: u64,
    /// Length declared by the media server, if any.
    pub content_length: Option<u64>,
}

/// Downloads lesson audio into `<root>/<speaker>/<series>/`.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct LessonDownloader {
    client: Client,
    base_url: Url,
    root: PathBuf,
}

impl LessonDownloader {
    /// Creates a downloader with default download timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidUrl`] for an unusable base URL and
    /// [`DownloadError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, root: impl Into<PathBuf>) -> Result<Self, DownloadError> {
        Self::with_timeouts(base_url, root, HttpTimeouts::DOWNLOAD)
    }

    /// Creates a downloader with explicit timeouts.
    ///
    /// # Errors
    ///
    /// Same as [`LessonDownloader::new`].
    pub fn with_timeouts(
        base_url: &str,
        root: impl Into<PathBuf>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, DownloadError> {
        let base_url = parse_site_base(base_url).map_err(|_| DownloadError::invalid_url(base_url))?;
        let client = build_site_client(timeouts, HeaderMap::new())
            .map_err(|source| DownloadError::ClientBuild { source })?;
        Ok(Self {
            client,
            base_url,
            root: root.into(),
        })
    }

    /// Download root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where `request` will be written.
    #[must_use]
    pub fn destination_for(&self, request: &DownloadRequest) -> PathBuf {
        lesson_directory(&self.root, &request.rabbi_name, &request.series_name)
            .join(lesson_filename(request.chapter, &request.lesson_name))
    }

    /// URL of the lesson page for `lesson_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidUrl`] for a blank id.
    pub fn page_url(&self, lesson_id: &str) -> Result<Url, DownloadError> {
        let lesson_id = lesson_id.trim();
        if lesson_id.is_empty() {
            return Err(DownloadError::invalid_url(format!(
                "{}shiurim//",
                self.base_url
            )));
        }
        let relative = format!("shiurim/{}/", urlencoding::encode(lesson_id));
        self.base_url
            .join(&relative)
            .map_err(|_| DownloadError::invalid_url(relative))
    }

    /// Downloads one lesson, reporting progress as an integer percentage.
    ///
    /// `on_progress` is called only when the media server declares a
    /// content length, and only when the percentage increases. An existing
    /// file with the same name is overwritten; a partial file is left in
    /// place when streaming fails.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::MediaNotFound`] when the page has no audio source
    /// - [`DownloadError::HttpStatus`], [`DownloadError::Network`] and
    ///   [`DownloadError::Timeout`] for either request
    /// - [`DownloadError::Io`] when the directory or file cannot be written
    #[instrument(skip(self, request, on_progress), fields(lesson_id = %request.lesson_id))]
    pub async fn download<F>(
        &self,
        request: &DownloadRequest,
        mut on_progress: F,
    ) -> Result<DownloadOutcome, DownloadError>
    where
        F: FnMut(u8),
    {
        let page_url = self.page_url(&request.lesson_id)?;
        let page_html = self.fetch_page(&page_url).await?;

        let src = extract_media_url(&page_html)
            .ok_or_else(|| DownloadError::media_not_found(page_url.as_str()))?;
        let media_url =
            resolve_media_url(&src, &self.base_url).ok_or_else(|| DownloadError::invalid_url(&src))?;
        debug!(media_url = %media_url, "resolved lesson media");

        let path = self.destination_for(request);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| DownloadError::io(dir, e))?;
        }

        let response = self
            .client
            .get(&media_url)
            .send()
            .await
            .map_err(|e| DownloadError::from_reqwest(&media_url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(&media_url, status.as_u16()));
        }
        let content_length = response.content_length().filter(|len| *len > 0);

        let file = File::create(&path)
            .await
            .map_err(|e| DownloadError::io(&path, e))?;
        let bytes_written = stream_to_file(
            file,
            response,
            &media_url,
            &path,
            content_length,
            &mut on_progress,
        )
        .await?;

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(path = %path.display(), bytes = bytes_written, "lesson downloaded");

        Ok(DownloadOutcome {
            path,
            filename,
            bytes_written,
            content_length,
        })
    }

    async fn fetch_page(&self, page_url: &Url) -> Result<String, DownloadError> {
        let url = page_url.as_str();
        let response = self
            .client
            .get(page_url.clone())
            .send()
            .await
            .map_err(|e| DownloadError::from_reqwest(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }
        response
            .text()
            .await
            .map_err(|e| DownloadError::from_reqwest(url, e))
    }
}

/// Streams the response body through a fixed-size write buffer.
async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
    content_length: Option<u64>,
    on_progress: &mut impl FnMut(u8),
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;
    let mut last_percent: Option<u8> = None;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::from_reqwest(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;

        if let Some(total) = content_length {
            let percent = progress_percent(bytes_written, total);
            if last_percent.is_none_or(|last| percent > last) {
                on_progress(percent);
                last_percent = Some(percent);
            }
        }
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}

/// Integer percentage of `done` over `total`, capped at 100.
fn progress_percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (u128::from(done) * 100 / u128::from(total)).min(100);
    u8::try_from(percent).unwrap_or(100)
}
