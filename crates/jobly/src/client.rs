//! The connection seam every data-access operation runs through.

use crate::error::{JoblyError, JoblyResult};
use std::future::Future;
use tokio_postgres::types::ToSql;
use tokio_postgres::{CancelToken, Row};

/// Anything that can run a parameterized statement and hand back its rows.
///
/// [`crate::Job`] and [`crate::Company`] take `&impl GenericClient`, so the
/// same call works on a plain connection, a pooled one, an open transaction
/// or an [`crate::InstrumentedClient`] wrapping any of those.
///
/// Every statement the models issue returns rows (writes use `RETURNING`),
/// so one method covers reads and writes alike.
pub trait GenericClient: Send + Sync {
    /// Run `sql` and collect all rows.
    ///
    /// `tag` names the data-access operation issuing the statement, such as
    /// `jobs.update`. Plain connections ignore it.
    fn query_rows(
        &self,
        tag: Option<&str>,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = JoblyResult<Vec<Row>>> + Send;

    /// Token for cancelling the running statement server-side, if the
    /// connection supports it.
    fn cancel_token(&self) -> Option<CancelToken> {
        None
    }
}

macro_rules! impl_for_tokio_postgres {
    ($($ty:ty),+) => {$(
        impl GenericClient for $ty {
            async fn query_rows(
                &self,
                _tag: Option<&str>,
                sql: &str,
                params: &[&(dyn ToSql + Sync)],
            ) -> JoblyResult<Vec<Row>> {
                <$ty>::query(self, sql, params)
                    .await
                    .map_err(JoblyError::from_db_error)
            }

            fn cancel_token(&self) -> Option<CancelToken> {
                Some(<$ty>::cancel_token(self))
            }
        }
    )+};
}

impl_for_tokio_postgres!(tokio_postgres::Client, tokio_postgres::Transaction<'_>);

/// Pooled handles deref to the tokio-postgres types above.
#[cfg(feature = "pool")]
macro_rules! impl_via_deref {
    ($($ty:ty => $target:ty),+) => {$(
        impl GenericClient for $ty {
            async fn query_rows(
                &self,
                tag: Option<&str>,
                sql: &str,
                params: &[&(dyn ToSql + Sync)],
            ) -> JoblyResult<Vec<Row>> {
                let target: &$target = self;
                target.query_rows(tag, sql, params).await
            }

            fn cancel_token(&self) -> Option<CancelToken> {
                let target: &$target = self;
                GenericClient::cancel_token(target)
            }
        }
    )+};
}

#[cfg(feature = "pool")]
impl_via_deref!(
    deadpool_postgres::Client => tokio_postgres::Client,
    deadpool_postgres::Transaction<'_> => tokio_postgres::Transaction<'_>
);

impl<C: GenericClient> GenericClient for &C {
    async fn query_rows(
        &self,
        tag: Option<&str>,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<Vec<Row>> {
        (**self).query_rows(tag, sql, params).await
    }

    fn cancel_token(&self) -> Option<CancelToken> {
        (**self).cancel_token()
    }
}
