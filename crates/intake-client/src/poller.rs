//! Status poller: follows a patient's document indexing until it completes.
//!
//! Activation spawns a tokio task that fetches immediately and then once per
//! interval. The task owns the only timer; deactivation aborts it, so there
//! is never a dangling tick. Fetches within a task run one after another: a
//! tick is only awaited once the previous fetch has resolved, so a slow
//! response can never land after a newer one. A result is applied only if
//! the poller has not been deactivated or re-activated since the fetch
//! started.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use intake_core::{IndexingStatus, Outcome};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::api::StatusSource;

/// Final snapshot of a finished indexing run and how it ended.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub outcome: Outcome,
    pub status: IndexingStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    /// A fetched snapshot was applied.
    Snapshot(IndexingStatus),
    /// A fetch failed; polling continues on schedule.
    FetchFailed(String),
    /// Emitted once per activation, right after the completing snapshot.
    Completed(Completion),
}

/// Result of [`StatusPoller::retry_failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBatch {
    pub requested: usize,
    pub rejected: usize,
}

#[derive(Debug, Default)]
struct PollerState {
    snapshot: Option<IndexingStatus>,
    last_error: Option<String>,
    generation: u64,
    completed: bool,
}

fn lock(state: &Mutex<PollerState>) -> MutexGuard<'_, PollerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct StatusPoller {
    source: Arc<dyn StatusSource>,
    patient_id: String,
    interval: Duration,
    state: Arc<Mutex<PollerState>>,
    events: mpsc::UnboundedSender<PollEvent>,
    task: Option<JoinHandle<()>>,
}

impl StatusPoller {
    /// Create an inactive poller for `patient_id`. Events are delivered on
    /// the returned receiver.
    pub fn new(
        source: Arc<dyn StatusSource>,
        patient_id: impl Into<String>,
        interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<PollEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let poller = Self {
            source,
            patient_id: patient_id.into(),
            interval,
            state: Arc::new(Mutex::new(PollerState::default())),
            events: tx,
            task: None,
        };
        (poller, rx)
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    /// Start polling. No-op while a poll task is already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn activate(&mut self) {
        if self.is_active() {
            return;
        }
        let generation = {
            let mut state = lock(&self.state);
            state.generation += 1;
            state.completed = false;
            state.generation
        };
        info!(
            patient_id = %self.patient_id,
            interval_ms = self.interval.as_millis() as u64,
            "indexing status polling started"
        );
        self.task = Some(tokio::spawn(poll_loop(
            Arc::clone(&self.source),
            self.patient_id.clone(),
            self.interval,
            Arc::clone(&self.state),
            self.events.clone(),
            generation,
        )));
    }

    /// Stop polling. Any fetch still in flight is dropped and its result, if
    /// it somehow arrives, is ignored.
    pub fn deactivate(&mut self) {
        lock(&self.state).generation += 1;
        if let Some(task) = self.task.take() {
            task.abort();
            debug!(patient_id = %self.patient_id, "indexing status polling stopped");
        }
    }

    /// Whether a poll task is scheduled. Turns false by itself once a
    /// complete snapshot has been applied.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Last applied snapshot.
    pub fn snapshot(&self) -> Option<IndexingStatus> {
        lock(&self.state).snapshot.clone()
    }

    /// Message of the most recent failed fetch, cleared by the next
    /// successful one.
    pub fn last_error(&self) -> Option<String> {
        lock(&self.state).last_error.clone()
    }

    /// Ask the backend to retry every document the current snapshot marks as
    /// failed, then resume polling.
    ///
    /// Requests go out concurrently and independently. A rejected request is
    /// logged and counted but does not stop the others or the re-activation.
    pub async fn retry_failed(&mut self) -> RetryBatch {
        let failed = self
            .snapshot()
            .map(|s| s.failed_document_ids())
            .unwrap_or_default();

        let source = Arc::clone(&self.source);
        let results = join_all(failed.iter().map(|id| {
            let source = Arc::clone(&source);
            async move { (id, source.retry_document(id).await) }
        }))
        .await;

        let mut rejected = 0;
        for (id, result) in results {
            if let Err(e) = result {
                rejected += 1;
                warn!(document_id = %id, error = %e, "document retry request failed");
            }
        }
        info!(
            patient_id = %self.patient_id,
            requested = failed.len(),
            rejected,
            "retry of failed documents initiated"
        );

        self.deactivate();
        self.activate();

        RetryBatch {
            requested: failed.len(),
            rejected,
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn poll_loop(
    source: Arc<dyn StatusSource>,
    patient_id: String,
    interval: Duration,
    state: Arc<Mutex<PollerState>>,
    events: mpsc::UnboundedSender<PollEvent>,
    generation: u64,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if lock(&state).generation != generation {
            return;
        }

        let result = source.fetch_status(&patient_id).await;

        let mut st = lock(&state);
        if st.generation != generation {
            return;
        }
        match result {
            Ok(status) => {
                if !status.is_consistent() {
                    warn!(
                        patient_id = %patient_id,
                        total = status.total_documents,
                        indexed = status.indexed,
                        processing = status.processing,
                        failed = status.failed,
                        pending = status.pending,
                        "indexing status counters do not add up"
                    );
                }
                st.last_error = None;
                st.snapshot = Some(status.clone());
                debug!(
                    patient_id = %patient_id,
                    progress = status.progress,
                    complete = status.is_complete,
                    "indexing status applied"
                );
                let _ = events.send(PollEvent::Snapshot(status.clone()));

                if let Some(outcome) = status.outcome() {
                    if !st.completed {
                        st.completed = true;
                        match outcome {
                            Outcome::FullSuccess { indexed } => {
                                info!(patient_id = %patient_id, indexed, "indexing complete")
                            }
                            Outcome::PartialSuccess { indexed, failed } => warn!(
                                patient_id = %patient_id,
                                indexed,
                                failed,
                                "indexing complete with failures"
                            ),
                        }
                        let _ = events.send(PollEvent::Completed(Completion { outcome, status }));
                    }
                    return;
                }
            }
            Err(e) => {
                let message = e.to_string();
                warn!(patient_id = %patient_id, error = %message, "indexing status fetch failed");
                st.last_error = Some(message.clone());
                let _ = events.send(PollEvent::FetchFailed(message));
            }
        }
    }
}
