//! Statement building and execution.
//!
//! Two ways to write a statement:
//! - [`query()`] takes finished SQL with `$1, $2, ...` already in place and
//!   binds values in order.
//! - [`sql()`] composes SQL piece by piece; [`Sql::push_bind`] writes the next
//!   placeholder itself.
//!
//! Both implement [`Statement`], which runs them on any [`GenericClient`] and
//! maps rows through [`FromRow`].
//!
//! ```ignore
//! use jobly::{Statement, sql};
//!
//! let mut q = sql("SELECT id, title, salary, equity, company_handle FROM jobs")
//!     .tagged("jobs.by_company");
//! q.push(" WHERE company_handle = ").push_bind(handle);
//! q.push(" ORDER BY title");
//!
//! let jobs: Vec<Job> = q.fetch_all_as(&conn).await?;
//! ```

mod builder;
mod query;


pub use builder::Sql;
pub use query::Query;

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::row::FromRow;
use std::borrow::Cow;
use std::future::Future;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Build a statement from pre-numbered SQL.
pub fn query(initial_sql: impl Into<String>) -> Query {
    Query::new(initial_sql)
}

/// Start composing a statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}

/// Quote a column name as a SQL identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// A statement ready to send: its text, its parameters and the name of the
/// operation that issues it.
pub trait Statement: Sync {
    fn sql_text(&self) -> Cow<'_, str>;

    fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)>;

    /// Operation tag such as `companies.get`, passed through to the client.
    fn operation(&self) -> Option<&str>;

    fn fetch_all(&self, conn: &impl GenericClient) -> impl Future<Output = JoblyResult<Vec<Row>>> + Send {
        async move {
            let text = self.sql_text();
            let params = self.params_ref();
            conn.query_rows(self.operation(), &text, &params).await
        }
    }

    fn fetch_all_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> impl Future<Output = JoblyResult<Vec<T>>> + Send {
        async move {
            let rows = self.fetch_all(conn).await?;
            rows.iter().map(T::from_row).collect()
        }
    }

    /// First row, if any.
    fn fetch_opt(&self, conn: &impl GenericClient) -> impl Future<Output = JoblyResult<Option<Row>>> + Send {
        async move { Ok(self.fetch_all(conn).await?.into_iter().next()) }
    }

    fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> impl Future<Output = JoblyResult<Option<T>>> + Send {
        async move {
            let row = self.fetch_opt(conn).await?;
            row.as_ref().map(T::from_row).transpose()
        }
    }

    /// First row mapped to `T`; no rows is [`JoblyError::NotFound`].
    fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> impl Future<Output = JoblyResult<T>> + Send {
        async move {
            self.fetch_opt_as(conn).await?.ok_or_else(|| {
                JoblyError::not_found(format!(
                    "{} returned no rows",
                    self.operation().unwrap_or("statement")
                ))
            })
        }
    }
}
