//! The executor capability consumed by the one-shot helpers.

use crate::error::{SelectError, SelectResult};
use crate::named::to_positional;
use crate::param::Params;
use crate::row::Record;

/// Something that can run a statement with named parameters and hand back rows.
///
/// The builder only needs this narrow contract: prepare the statement, execute
/// it with a `name -> value` mapping and return the rows keyed by field name.
/// Errors are surfaced as-is to the caller of the helper that triggered them.
pub trait Executor: Send + Sync {
    /// Execute a statement and return all rows.
    fn fetch_all(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl std::future::Future<Output = SelectResult<Vec<Record>>> + Send;

    /// Execute a statement and return the first row, if any.
    ///
    /// Semantics:
    /// - 0 rows: returns `Ok(None)`
    /// - 1 row: returns `Ok(Some(row))`
    /// - multiple rows: returns `Ok(Some(first_row))` (does **not** error)
    fn fetch_opt(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl std::future::Future<Output = SelectResult<Option<Record>>> + Send {
        async move {
            let rows = self.fetch_all(sql, params).await?;
            Ok(rows.into_iter().next())
        }
    }

    /// Return a cancellation token for the underlying connection, if supported.
    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        None
    }
}

impl<E: Executor> Executor for &E {
    fn fetch_all(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl std::future::Future<Output = SelectResult<Vec<Record>>> + Send {
        (**self).fetch_all(sql, params)
    }

    fn fetch_opt(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl std::future::Future<Output = SelectResult<Option<Record>>> + Send {
        (**self).fetch_opt(sql, params)
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        (**self).cancel_token()
    }
}

/// Prepare `sql` on `client` after rewriting `:name` placeholders, then run it.
async fn run_named<C>(client: &C, sql: &str, params: &Params) -> SelectResult<Vec<Record>>
where
    C: tokio_postgres::GenericClient + Sync,
{
    let positional = to_positional(sql, params)?;
    let stmt = client
        .prepare(&positional.sql)
        .await
        .map_err(SelectError::from)?;
    let rows = client
        .query(&stmt, &positional.params_ref())
        .await
        .map_err(SelectError::from)?;
    rows.iter().map(Record::from_row).collect()
}

impl Executor for tokio_postgres::Client {
    async fn fetch_all(&self, sql: &str, params: &Params) -> SelectResult<Vec<Record>> {
        run_named(self, sql, params).await
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        Some(tokio_postgres::Client::cancel_token(self))
    }
}

impl Executor for tokio_postgres::Transaction<'_> {
    async fn fetch_all(&self, sql: &str, params: &Params) -> SelectResult<Vec<Record>> {
        run_named(self, sql, params).await
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        Some(tokio_postgres::Transaction::cancel_token(self))
    }
}
