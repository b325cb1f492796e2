use super::Statement;
use crate::update::SqlValue;
use std::borrow::Cow;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// Finished SQL with `$1, $2, ...` in place; values are bound in order.
#[must_use]
pub struct Query {
    sql: String,
    params: Vec<SqlValue>,
    tag: Option<String>,
}

impl Query {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            tag: None,
        }
    }

    /// Name the operation this statement belongs to, e.g. `jobs.get`.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Bind the value for the next `$n`.
    pub fn bind<T>(mut self, value: T) -> Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.params.push(Arc::new(value));
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl Statement for Query {
    fn sql_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.sql)
    }

    fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }

    fn operation(&self) -> Option<&str> {
        self.tag.as_deref()
    }
}
