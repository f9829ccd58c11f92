//! Download command handler: runs the selected lessons through the manager.

use std::collections::HashMap;
use std::io::{self, IsTerminal};

use anyhow::{Result, bail};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use meir_downloader_core::catalog::search_lessons;
use meir_downloader_core::download::{TaskId, TaskStatus};
use meir_downloader_core::{DownloadEvent, DownloadManager, Lesson, LessonDownloader, SiteClient};
use tracing::{info, warn};

use crate::app_config::AppConfig;
use crate::cli::DownloadArgs;

enum Step {
    Event(DownloadEvent),
    Finished,
    Interrupted,
}

pub async fn run_download_command(
    site: &SiteClient,
    downloader: LessonDownloader,
    config: &AppConfig,
    args: &DownloadArgs,
    quiet: bool,
) -> Result<()> {
    let mut lessons = site.lessons(&args.filters.to_filters(), args.page).await?;
    if let Some(needle) = args.search.as_deref() {
        lessons = search_lessons(lessons, needle);
    }
    let selected = select_lessons(lessons, &args.lessons, args.all)?;
    let total = selected.len();
    info!(
        lessons = total,
        root = %downloader.root().display(),
        "starting downloads"
    );

    let mut manager =
        DownloadManager::new(downloader).with_max_concurrent(config.max_concurrent_downloads);
    let mut progress = ProgressBars::new(io::stderr().is_terminal() && !quiet);
    for lesson in selected {
        let label = format!("{:03} {}", lesson.chapter, lesson.name);
        let id = manager.start(lesson);
        progress.add(id, label);
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        let step = tokio::select! {
            _ = &mut ctrl_c => Step::Interrupted,
            event = manager.next_event() => event.map_or(Step::Finished, Step::Event),
        };
        match step {
            Step::Event(event) => progress.apply(&event),
            Step::Finished => break,
            Step::Interrupted => {
                let cancelled = manager.cancel_all().await;
                progress.clear();
                warn!(cancelled, "interrupted, downloads cancelled");
                bail!("interrupted; {cancelled} download(s) cancelled");
            }
        }
    }

    let summary = manager.summary();
    for task in manager.tasks() {
        if let TaskStatus::Failed(reason) = &task.status {
            eprintln!("failed: {} ({reason})", task.lesson.name);
        }
    }
    info!(
        completed = summary.completed,
        failed = summary.failed,
        total,
        "downloads finished"
    );
    if summary.failed > 0 {
        bail!("{} of {total} download(s) failed", summary.failed);
    }
    Ok(())
}

/// Picks lessons by page id or grid post id, or every lesson with `all`.
fn select_lessons(lessons: Vec<Lesson>, ids: &[String], all: bool) -> Result<Vec<Lesson>> {
    if all {
        if lessons.is_empty() {
            bail!("no lessons found on this page");
        }
        return Ok(lessons);
    }
    if ids.is_empty() {
        bail!("choose lessons with --lesson ID or pass --all");
    }

    let selected: Vec<Lesson> = lessons
        .into_iter()
        .filter(|lesson| {
            ids.iter()
                .any(|id| id.trim() == lesson.post_id || id.trim() == lesson.id)
        })
        .collect();
    for id in ids {
        let id = id.trim();
        if !selected
            .iter()
            .any(|lesson| lesson.post_id == id || lesson.id == id)
        {
            warn!(lesson_id = id, "lesson not on this page");
        }
    }
    if selected.is_empty() {
        bail!("none of the requested lessons are on this page");
    }
    Ok(selected)
}

/// Per-task progress bars, or log lines when stderr is not a terminal.
struct ProgressBars {
    multi: Option<MultiProgress>,
    bars: HashMap<TaskId, ProgressBar>,
    labels: HashMap<TaskId, String>,
}

impl ProgressBars {
    fn new(enabled: bool) -> Self {
        Self {
            multi: enabled.then(MultiProgress::new),
            bars: HashMap::new(),
            labels: HashMap::new(),
        }
    }

    fn add(&mut self, id: TaskId, label: String) {
        if let Some(multi) = &self.multi {
            let bar = multi.add(ProgressBar::new(100));
            bar.set_style(
                ProgressStyle::with_template("{prefix:.bold} [{bar:30}] {pos:>3}% {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar.set_prefix(label.clone());
            self.bars.insert(id, bar);
        }
        self.labels.insert(id, label);
    }

    fn apply(&self, event: &DownloadEvent) {
        let id = event.task_id();
        let label = self.labels.get(&id).map_or("", String::as_str);
        match event {
            DownloadEvent::Progress { percent, .. } => {
                if let Some(bar) = self.bars.get(&id) {
                    bar.set_position(u64::from(*percent));
                }
            }
            DownloadEvent::Completed { path, bytes, .. } => {
                if let Some(bar) = self.bars.get(&id) {
                    bar.set_position(100);
                    bar.finish_with_message("done");
                } else {
                    info!(lesson = label, path = %path.display(), bytes, "download complete");
                }
            }
            DownloadEvent::Failed { reason, .. } => {
                if let Some(bar) = self.bars.get(&id) {
                    bar.abandon_with_message("failed");
                } else {
                    warn!(lesson = label, reason = %reason, "download failed");
                }
            }
        }
    }

    fn clear(&self) {
        if let Some(multi) = &self.multi {
            let _ = multi.clear();
        }
    }
}
