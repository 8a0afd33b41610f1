use std::time::Duration;

use tokio::sync::mpsc;
use tracing::warn;

use crate::error::IndexingError;
use crate::poller::{Completion, PollEvent, StatusPoller};

/// Drive `poller` until it reports completion, passing every event to
/// `on_event` as it arrives.
///
/// `events` must be the receiver returned alongside `poller` by
/// [`StatusPoller::new`]. With a `timeout`, gives up after that long and
/// deactivates the poller.
pub async fn run_indexing<F>(
    poller: &mut StatusPoller,
    events: &mut mpsc::UnboundedReceiver<PollEvent>,
    timeout: Option<Duration>,
    mut on_event: F,
) -> Result<Completion, IndexingError>
where
    F: FnMut(&PollEvent),
{
    poller.activate();

    let wait = async {
        while let Some(event) = events.recv().await {
            on_event(&event);
            if let PollEvent::Completed(completion) = event {
                return Ok(completion);
            }
        }
        Err(IndexingError::Stopped)
    };

    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, wait).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    patient_id = %poller.patient_id(),
                    timeout_secs = limit.as_secs(),
                    "gave up waiting for indexing"
                );
                Err(IndexingError::TimedOut(limit))
            }
        },
        None => wait.await,
    };

    if result.is_err() {
        poller.deactivate();
    }
    result
}
