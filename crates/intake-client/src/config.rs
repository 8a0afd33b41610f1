use std::time::Duration;

/// Fixed delay between indexing status fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Connection settings for the intake backend.
///
/// Built explicitly and handed to [`ApiClient::new`](crate::ApiClient::new);
/// nothing in this crate reads the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend root such as `http://localhost:8000`, without trailing slash.
    pub base_url: String,
    pub poll_interval: Duration,
    /// Per-request timeout. `None` leaves reqwest's default (no timeout).
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: None,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}
