use std::time::Duration;
use tracing::Level;

/// Configuration for executor timeouts and SQL logging.
///
/// By default there is no timeout, no slow-query threshold, and statements are
/// logged at `DEBUG` truncated to 200 bytes.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Query timeout duration. `None` means no timeout (default).
    pub query_timeout: Option<Duration>,
    /// Statements slower than this are reported with a `WARN` event.
    pub slow_query_threshold: Option<Duration>,
    /// Level of the per-statement event. `None` disables it.
    pub log_level: Option<Level>,
    /// Truncate logged SQL (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            query_timeout: None,
            slow_query_threshold: None,
            log_level: Some(Level::DEBUG),
            max_sql_length: Some(200),
        }
    }
}

impl ExecutorConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the query timeout duration.
    ///
    /// Statements exceeding this duration are cancelled on a best-effort basis
    /// and return [`SelectError::Timeout`](crate::SelectError::Timeout).
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Set the slow query threshold.
    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    /// Override the level of the per-statement event.
    pub fn with_log_level(mut self, level: Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Do not emit the per-statement event.
    pub fn without_logging(mut self) -> Self {
        self.log_level = None;
        self
    }

    /// Set maximum SQL length to log.
    pub fn with_max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }
}
