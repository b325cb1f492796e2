use std::time::Duration;

/// Timeout and slow-query settings for [`super::InstrumentedClient`].
///
/// The default has neither: queries run unbounded and nothing is flagged as slow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Query timeout duration. `None` means no timeout (default).
    pub query_timeout: Option<Duration>,
    /// Queries running longer than this are logged at `WARN`.
    pub slow_query_threshold: Option<Duration>,
}

impl MonitorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the query timeout duration.
    ///
    /// Queries exceeding this duration are cancelled on the server (best effort)
    /// and return [`crate::JoblyError::Timeout`].
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    pub(crate) fn is_slow(&self, elapsed: Duration) -> bool {
        self.slow_query_threshold
            .is_some_and(|threshold| elapsed > threshold)
    }
}
