//! # pgselect
//!
//! A small fluent builder for single-table SELECT statements, with one-shot
//! helpers that run the statement through an [`Executor`].
//!
//! ## Features
//!
//! - **Predictable text**: the rendered statement is a pure function of the builder state
//! - **Named parameters**: write `:name` in the condition and bind with `set_param`
//! - **Pluggable execution**: anything implementing [`Executor`]; `tokio_postgres::Client`
//!   and `Transaction` are supported out of the box
//! - **Instrumentation**: timeouts, slow-query reporting and `tracing` output via
//!   [`InstrumentedExecutor`]
//!
//! ## Example
//!
//! ```ignore
//! use pgselect::StatementBuilder;
//!
//! let qb = StatementBuilder::new()
//!     .select(["id", "name"])
//!     .from_as("users", "u")
//!     .where_("u.age > :age")
//!     .set_param("age", 18)
//!     .order_by("name", "ASC")
//!     .limit(10)
//!     .page(2);
//!
//! let first_name = qb.fetch_scalar(&client, "name").await?;
//! let total = qb.count_rows(&client).await?;
//! ```

pub mod error;
pub mod executor;
pub mod instrument;
pub mod named;
pub mod param;
pub mod row;
pub mod statement;
pub mod value;

pub use error::{SelectError, SelectResult};
pub use executor::Executor;
pub use instrument::{ExecutorConfig, InstrumentedExecutor};
pub use named::{Positional, to_positional};
pub use param::Params;
pub use row::Record;
pub use statement::{Direction, Fields, StatementBuilder};
pub use value::Value;

/// Start a builder with the given columns.
///
/// # Example
/// ```ignore
/// let qb = pgselect::select(["id", "email"]).from("users");
/// ```
pub fn select(fields: impl Into<Fields>) -> StatementBuilder {
    StatementBuilder::new().select(fields)
}

/// Start a builder selecting `*` from `table`.
///
/// # Example
/// ```ignore
/// let total = pgselect::select_from("users").count_rows(&client).await?;
/// ```
pub fn select_from(table: &str) -> StatementBuilder {
    StatementBuilder::new().from(table)
}
