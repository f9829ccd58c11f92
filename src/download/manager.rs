//! Concurrent download manager.
//!
//! Each download runs on its own tokio task. Workers never touch the task
//! registry: they report through an unbounded channel, and the owner of the
//! [`DownloadManager`] applies those events in arrival order by calling
//! [`DownloadManager::next_event`]. The registry therefore has a single
//! writer and needs no locking.
//!
//! # Example
//!
//! ```no_run
//! use meir_downloader_core::download::{DownloadEvent, DownloadManager, LessonDownloader};
//! # use meir_downloader_core::catalog::Lesson;
//!
//! # async fn example(lessons: Vec<Lesson>) -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = LessonDownloader::new("https://meirtv.com", "./lessons")?;
//! let mut manager = DownloadManager::new(downloader).with_max_concurrent(4);
//! for lesson in lessons {
//!     manager.start(lesson);
//! }
//! while let Some(event) = manager.next_event().await {
//!     if let DownloadEvent::Failed { reason, .. } = event {
//!         eprintln!("failed: {reason}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::client::{DownloadRequest, LessonDownloader};
use crate::catalog::Lesson;

/// Identifier of a download started by a [`DownloadManager`].
pub type TaskId = u64;

/// Lifecycle of a tracked download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum TaskStatus {
    InProgress,
    Complete,
    Failed(String),
}

/// One download tracked by the manager.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadTask {
    pub id: TaskId,
    pub lesson: Lesson,
    /// Path the file is being written to.
    pub destination: PathBuf,
    pub status: TaskStatus,
    /// Last reported percentage, 0-100.
    pub progress: u8,
}

/// Message from a worker to the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    /// Percentage increased.
    Progress { id: TaskId, percent: u8 },
    /// File fully written.
    Completed {
        id: TaskId,
        path: PathBuf,
        bytes: u64,
    },
    /// Download stopped with an error.
    Failed {
        id: TaskId,
        reason: String,
        media_not_found: bool,
    },
}

impl DownloadEvent {
    /// Task the event belongs to.
    #[must_use]
    pub fn task_id(&self) -> TaskId {
        match self {
            Self::Progress { id, .. } | Self::Completed { id, .. } | Self::Failed { id, .. } => *id,
        }
    }
}

/// Overall counts across the manager's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DownloadSummary {
    pub active: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Owns the registry of active downloads and their worker tasks.
#[derive(Debug)]
pub struct DownloadManager {
    downloader: LessonDownloader,
    limiter: Option<Arc<Semaphore>>,
    tasks: BTreeMap<TaskId, DownloadTask>,
    handles: HashMap<TaskId, JoinHandle<()>>,
    events_tx: UnboundedSender<DownloadEvent>,
    events_rx: UnboundedReceiver<DownloadEvent>,
    next_id: TaskId,
    completed: usize,
    failed: usize,
}

impl DownloadManager {
    /// Creates a manager with no concurrency limit.
    #[must_use]
    pub fn new(downloader: LessonDownloader) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            downloader,
            limiter: None,
            tasks: BTreeMap::new(),
            handles: HashMap::new(),
            events_tx,
            events_rx,
            next_id: 1,
            completed: 0,
            failed: 0,
        }
    }

    /// Caps the number of downloads streaming at once. `0` means unlimited.
    ///
    /// Tasks over the cap stay `InProgress` at 0% until a slot frees up.
    #[must_use]
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.limiter = (max_concurrent > 0).then(|| Arc::new(Semaphore::new(max_concurrent)));
        self
    }

    /// Starts downloading `lesson` on a new task and registers it.
    pub fn start(&mut self, lesson: Lesson) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;

        let request = DownloadRequest::for_lesson(&lesson);
        let destination = self.downloader.destination_for(&request);
        self.tasks.insert(
            id,
            DownloadTask {
                id,
                lesson,
                destination,
                status: TaskStatus::InProgress,
                progress: 0,
            },
        );

        let downloader = self.downloader.clone();
        let limiter = self.limiter.clone();
        let reporter = WorkerReporter::new(id, self.events_tx.clone());
        let handle = tokio::spawn(async move {
            run_worker(id, &downloader, &request, limiter, reporter).await;
        });
        self.handles.insert(id, handle);
        debug!(task_id = id, "download started");
        id
    }

    /// Waits for the next worker event, applies it and returns it.
    ///
    /// Returns `None` once no download is in progress and every pending
    /// event has been drained. Events for tasks that were cancelled are
    /// discarded.
    pub async fn next_event(&mut self) -> Option<DownloadEvent> {
        loop {
            let event = if self.active_count() == 0 {
                self.events_rx.try_recv().ok()?
            } else {
                self.events_rx.recv().await?
            };
            if self.apply(&event) {
                return Some(event);
            }
        }
    }

    /// Cancels a download: aborts its worker, waits for it to stop, then
    /// drops the task. Returns false for unknown ids.
    ///
    /// The partially written file is left on disk.
    pub async fn cancel(&mut self, id: TaskId) -> bool {
        if let Some(handle) = self.handles.remove(&id) {
            handle.abort();
            // Cancelled or already finished; either way the worker is gone.
            let _ = handle.await;
        }
        let removed = self.tasks.remove(&id).is_some();
        if removed {
            info!(task_id = id, "download cancelled");
        }
        removed
    }

    /// Cancels every download still in progress.
    pub async fn cancel_all(&mut self) -> usize {
        let active: Vec<TaskId> = self
            .tasks
            .values()
            .filter(|task| task.status == TaskStatus::InProgress)
            .map(|task| task.id)
            .collect();
        let mut cancelled = 0;
        for id in active {
            if self.cancel(id).await {
                cancelled += 1;
            }
        }
        cancelled
    }

    /// Removes a failed task from the registry.
    pub fn dismiss(&mut self, id: TaskId) -> Option<DownloadTask> {
        let failed = self
            .tasks
            .get(&id)
            .is_some_and(|task| matches!(task.status, TaskStatus::Failed(_)));
        if failed { self.tasks.remove(&id) } else { None }
    }

    /// Looks up a tracked task.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&DownloadTask> {
        self.tasks.get(&id)
    }

    /// Tracked tasks in start order (in progress and failed).
    pub fn tasks(&self) -> impl Iterator<Item = &DownloadTask> {
        self.tasks.values()
    }

    /// Number of downloads still in progress.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.tasks
            .values()
            .filter(|task| task.status == TaskStatus::InProgress)
            .count()
    }

    /// Counts for an overall progress display.
    #[must_use]
    pub fn summary(&self) -> DownloadSummary {
        DownloadSummary {
            active: self.active_count(),
            completed: self.completed,
            failed: self.failed,
        }
    }

    /// Applies an event to the registry. Returns false if the task is unknown.
    fn apply(&mut self, event: &DownloadEvent) -> bool {
        let id = event.task_id();
        let Some(task) = self.tasks.get_mut(&id) else {
            debug!(task_id = id, "dropping event for untracked download");
            return false;
        };

        match event {
            DownloadEvent::Progress { percent, .. } => {
                if *percent > task.progress {
                    task.progress = *percent;
                }
            }
            DownloadEvent::Completed { .. } => {
                self.tasks.remove(&id);
                self.handles.remove(&id);
                self.completed += 1;
            }
            DownloadEvent::Failed { reason, .. } => {
                task.status = TaskStatus::Failed(reason.clone());
                self.handles.remove(&id);
                self.failed += 1;
            }
        }
        true
    }
}

impl Drop for DownloadManager {
    fn drop(&mut self) {
        for handle in self.handles.values() {
            handle.abort();
        }
    }
}

/// A worker's handle on the event channel.
///
/// If the worker is dropped before [`WorkerReporter::finish`] runs (it
/// panicked, or was aborted) a `Failed` event is sent instead, so the task
/// never stays `InProgress` with nothing left to report on it. Events for
/// aborted tasks are dropped by the manager like any other.
struct WorkerReporter {
    id: TaskId,
    events: UnboundedSender<DownloadEvent>,
    finished: bool,
}

impl WorkerReporter {
    fn new(id: TaskId, events: UnboundedSender<DownloadEvent>) -> Self {
        Self {
            id,
            events,
            finished: false,
        }
    }

    fn progress(&self, percent: u8) {
        // Send fails only when the manager is gone; nothing left to report to.
        let _ = self.events.send(DownloadEvent::Progress {
            id: self.id,
            percent,
        });
    }

    fn finish(mut self, event: DownloadEvent) {
        self.finished = true;
        let _ = self.events.send(event);
    }
}

impl Drop for WorkerReporter {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.events.send(DownloadEvent::Failed {
                id: self.id,
                reason: WORKER_STOPPED.to_string(),
                media_not_found: false,
            });
        }
    }
}

const WORKER_STOPPED: &str = "download worker stopped unexpectedly";

async fn run_worker(
    id: TaskId,
    downloader: &LessonDownloader,
    request: &DownloadRequest,
    limiter: Option<Arc<Semaphore>>,
    reporter: WorkerReporter,
) {
    let _permit = match limiter {
        Some(semaphore) => match semaphore.acquire_owned().await {
            Ok(permit) => Some(permit),
            Err(_) => {
                reporter.finish(DownloadEvent::Failed {
                    id,
                    reason: "download slots closed".to_string(),
                    media_not_found: false,
                });
                return;
            }
        },
        None => None,
    };

    let result = downloader
        .download(request, |percent| reporter.progress(percent))
        .await;

    let event = match result {
        Ok(outcome) => DownloadEvent::Completed {
            id,
            path: outcome.path,
            bytes: outcome.bytes_written,
        },
        Err(error) => {
            warn!(task_id = id, error = %error, "download failed");
            DownloadEvent::Failed {
                id,
                reason: error.to_string(),
                media_not_found: error.is_media_not_found(),
            }
        }
    };
    reporter.finish(event);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn lesson(post_id: &str) -> Lesson {
        Lesson {
            id: post_id.to_string(),
            post_id: post_id.to_string(),
            rabbi_id: "1".to_string(),
            rabbi_name: "Rav".to_string(),
            series_id: "s".to_string(),
            series_name: "Series".to_string(),
            chapter: 1,
            date: "1/1/2024".to_string(),
            duration: 10,
            name: format!("Lesson {post_id}"),
        }
    }

    fn manager() -> DownloadManager {
        // Port 9 (discard) on localhost; workers are not expected to succeed.
        let downloader = LessonDownloader::new("http://127.0.0.1:9", "/nonexistent-root").unwrap();
        DownloadManager::new(downloader)
    }

    fn insert_task(manager: &mut DownloadManager, id: TaskId) {
        manager.tasks.insert(
            id,
            DownloadTask {
                id,
                lesson: lesson(&id.to_string()),
                destination: PathBuf::from("/tmp/x.mp3"),
                status: TaskStatus::InProgress,
                progress: 0,
            },
        );
    }

    #[tokio::test]
    async fn test_progress_is_monotonic() {
        let mut manager = manager();
        insert_task(&mut manager, 1);
        assert!(manager.apply(&DownloadEvent::Progress { id: 1, percent: 40 }));
        assert!(manager.apply(&DownloadEvent::Progress { id: 1, percent: 30 }));
        assert_eq!(manager.task(1).unwrap().progress, 40);
    }

    #[tokio::test]
    async fn test_completed_task_leaves_registry() {
        let mut manager = manager();
        insert_task(&mut manager, 1);
        manager.apply(&DownloadEvent::Completed {
            id: 1,
            path: PathBuf::from("/tmp/x.mp3"),
            bytes: 3,
        });
        assert!(manager.task(1).is_none());
        assert_eq!(
            manager.summary(),
            DownloadSummary {
                active: 0,
                completed: 1,
                failed: 0
            }
        );
    }

    #[tokio::test]
    async fn test_failed_task_stays_until_dismissed() {
        let mut manager = manager();
        insert_task(&mut manager, 1);
        manager.apply(&DownloadEvent::Failed {
            id: 1,
            reason: "boom".to_string(),
            media_not_found: false,
        });
        assert_eq!(
            manager.task(1).unwrap().status,
            TaskStatus::Failed("boom".to_string())
        );
        assert_eq!(manager.summary().failed, 1);
        assert_eq!(manager.active_count(), 0);
        assert!(manager.dismiss(1).is_some());
        assert!(manager.task(1).is_none());
    }

    #[tokio::test]
    async fn test_events_for_unknown_tasks_are_dropped() {
        let mut manager = manager();
        assert!(!manager.apply(&DownloadEvent::Progress { id: 99, percent: 5 }));
        manager
            .events_tx
            .send(DownloadEvent::Progress { id: 99, percent: 5 })
            .unwrap();
        assert_eq!(manager.next_event().await, None);
    }

    #[tokio::test]
    async fn test_dismiss_ignores_in_progress_tasks() {
        let mut manager = manager();
        insert_task(&mut manager, 1);
        assert!(manager.dismiss(1).is_none());
        assert!(manager.task(1).is_some());
    }

    #[tokio::test]
    async fn test_cancel_unknown_id_returns_false() {
        let mut manager = manager();
        assert!(!manager.cancel(42).await);
    }

    #[test]
    fn test_with_max_concurrent_zero_is_unlimited() {
        assert!(manager().with_max_concurrent(0).limiter.is_none());
        assert!(manager().with_max_concurrent(2).limiter.is_some());
    }

    #[tokio::test]
    async fn test_panicking_worker_reports_failure() {
        let mut manager = manager();
        insert_task(&mut manager, 1);
        let reporter = WorkerReporter::new(1, manager.events_tx.clone());
        let handle = tokio::spawn(async move {
            let _reporter = reporter;
            panic!("worker crashed");
        });
        assert!(handle.await.unwrap_err().is_panic());

        let event = manager.next_event().await.unwrap();
        assert!(matches!(
            &event,
            DownloadEvent::Failed { id: 1, reason, media_not_found: false } if reason == WORKER_STOPPED
        ));
        assert!(matches!(
            &manager.task(1).unwrap().status,
            TaskStatus::Failed(reason) if reason == WORKER_STOPPED
        ));
        assert_eq!(manager.active_count(), 0);
        assert!(manager.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_finished_worker_sends_only_its_event() {
        let mut manager = manager();
        insert_task(&mut manager, 2);
        let reporter = WorkerReporter::new(2, manager.events_tx.clone());
        reporter.progress(40);
        reporter.finish(DownloadEvent::Completed {
            id: 2,
            path: PathBuf::from("/tmp/x.mp3"),
            bytes: 10,
        });

        assert!(matches!(
            manager.next_event().await,
            Some(DownloadEvent::Progress { id: 2, percent: 40 })
        ));
        assert!(matches!(
            manager.next_event().await,
            Some(DownloadEvent::Completed { id: 2, .. })
        ));
        assert!(manager.next_event().await.is_none());
        assert_eq!(manager.summary().failed, 0);
    }
}
