use super::config::ExecutorConfig;
use super::truncate_sql_bytes;
use crate::error::{SelectError, SelectResult};
use crate::executor::Executor;
use crate::param::Params;
use crate::row::Record;
use std::time::Instant;
use tracing::Level;

/// An executor wrapper that adds a timeout, slow-query reporting and SQL logging.
///
/// ```ignore
/// let exec = InstrumentedExecutor::new(client).with_config(
///     ExecutorConfig::new().with_query_timeout(Duration::from_secs(5)),
/// );
/// let total = pgselect::select_from("users").count_rows(&exec).await?;
/// ```
pub struct InstrumentedExecutor<E> {
    inner: E,
    config: ExecutorConfig,
}

impl<E: Executor> InstrumentedExecutor<E> {
    /// Wrap an executor with the default configuration.
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            config: ExecutorConfig::default(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Get a reference to the inner executor.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Get the inner executor, consuming this wrapper.
    pub fn into_inner(self) -> E {
        self.inner
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.config.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    fn emit(&self, sql: &str, param_count: usize) {
        let Some(level) = self.config.log_level else {
            return;
        };
        let sql = self.truncate_sql(sql);
        match level {
            Level::ERROR => tracing::error!(target: "pgselect.sql", param_count, sql = %sql),
            Level::WARN => tracing::warn!(target: "pgselect.sql", param_count, sql = %sql),
            Level::INFO => tracing::info!(target: "pgselect.sql", param_count, sql = %sql),
            Level::DEBUG => tracing::debug!(target: "pgselect.sql", param_count, sql = %sql),
            Level::TRACE => tracing::trace!(target: "pgselect.sql", param_count, sql = %sql),
        }
    }

    async fn with_timeout<T, F>(&self, sql: &str, future: F) -> SelectResult<T>
    where
        F: std::future::Future<Output = SelectResult<T>> + Send,
    {
        let start = Instant::now();
        let result = match self.config.query_timeout {
            Some(timeout) => {
                tokio::pin!(future);
                tokio::select! {
                    result = &mut future => result,
                    _ = tokio::time::sleep(timeout) => {
                        if let Some(cancel_token) = self.inner.cancel_token() {
                            tokio::spawn(async move {
                                if let Err(e) = cancel_token.cancel_query(tokio_postgres::NoTls).await {
                                    tracing::debug!(target: "pgselect.sql", error = %e, "cancel request failed");
                                }
                            });
                        }
                        tracing::warn!(target: "pgselect.sql", ?timeout, sql = %self.truncate_sql(sql), "query timed out");
                        Err(SelectError::Timeout(timeout))
                    }
                }
            }
            None => future.await,
        };

        let elapsed = start.elapsed();
        if let Some(threshold) = self.config.slow_query_threshold {
            if elapsed > threshold {
                tracing::warn!(target: "pgselect.sql", ?elapsed, sql = %self.truncate_sql(sql), "slow query");
            }
        }
        result
    }
}

impl<E: Executor> Executor for InstrumentedExecutor<E> {
    async fn fetch_all(&self, sql: &str, params: &Params) -> SelectResult<Vec<Record>> {
        self.emit(sql, params.len());
        self.with_timeout(sql, self.inner.fetch_all(sql, params)).await
    }

    async fn fetch_opt(&self, sql: &str, params: &Params) -> SelectResult<Option<Record>> {
        self.emit(sql, params.len());
        self.with_timeout(sql, self.inner.fetch_opt(sql, params)).await
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        self.inner.cancel_token()
    }
}
