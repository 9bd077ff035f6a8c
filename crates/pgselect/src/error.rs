//! Error types for pgselect

use thiserror::Error;

/// Result type alias for pgselect operations
pub type SelectResult<T> = Result<T, SelectError>;

/// Errors raised while rendering or executing a statement
#[derive(Debug, Error)]
pub enum SelectError {
    /// `render()` was called before `from()`
    #[error("Cannot render SELECT: no FROM clause was set")]
    MissingSource,

    /// A `:name` placeholder has no bound value
    #[error("Unbound parameter: :{0}")]
    UnboundParam(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl SelectError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a free-form error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Check if this error comes from rendering without a FROM clause
    pub fn is_missing_source(&self) -> bool {
        matches!(self, Self::MissingSource)
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
