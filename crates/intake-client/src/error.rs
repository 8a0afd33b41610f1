use std::time::Duration;

use intake_core::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {detail}")]
    Server { status: u16, detail: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a form submission did not produce a patient.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("patient creation failed: {0}")]
    Api(#[from] ClientError),
}

#[derive(Error, Debug)]
pub enum IndexingError {
    #[error("indexing did not complete within {0:?}")]
    TimedOut(Duration),
    /// The event channel closed before a completion arrived. Only happens
    /// when the receiver handed to [`run_indexing`](crate::run_indexing) is
    /// not the one paired with its poller and that other poller is gone.
    #[error("status event channel closed before indexing completed")]
    Stopped,
}

/// Best-effort human-readable detail from an error response body.
///
/// Prefers a top-level `detail` or `error` string, falls back to the compact
/// JSON text, and finally to the raw body.
pub(crate) fn error_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    for key in ["detail", "error"] {
        if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
            return msg.to_string();
        }
    }
    value.to_string()
}
