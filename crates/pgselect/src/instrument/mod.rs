//! Executor instrumentation: timeouts, slow-query reporting and SQL logging.
//!
//! # Example
//!
//! ```rust,ignore
//! use pgselect::{ExecutorConfig, InstrumentedExecutor};
//! use std::time::Duration;
//!
//! let config = ExecutorConfig::new()
//!     .with_query_timeout(Duration::from_secs(30))
//!     .with_slow_query_threshold(Duration::from_secs(1));
//!
//! let exec = InstrumentedExecutor::new(client).with_config(config);
//! ```

mod config;
mod instrumented;


pub use config::ExecutorConfig;
pub use instrumented::InstrumentedExecutor;

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
