use super::Statement;
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::update::SqlValue;
use std::borrow::Cow;
use std::fmt::Write;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

#[derive(Debug)]
enum Piece {
    Text(String),
    Placeholder,
}

/// SQL composed from text and bound values.
///
/// Placeholders are numbered `$1, $2, ...` in push order when the statement
/// is rendered, so clause builders such as [`crate::SetClause`] and
/// [`crate::WhereClause`] can append to it without knowing how many values
/// came before them.
#[must_use]
pub struct Sql {
    pieces: Vec<Piece>,
    params: Vec<SqlValue>,
    tag: Option<String>,
}

impl Sql {
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            pieces: vec![Piece::Text(initial_sql.into())],
            params: Vec::new(),
            tag: None,
        }
    }

    /// Name the operation this statement belongs to, e.g. `jobs.find_all`.
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Append raw SQL.
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }
        match self.pieces.last_mut() {
            Some(Piece::Text(last)) => last.push_str(sql),
            _ => self.pieces.push(Piece::Text(sql.to_string())),
        }
        self
    }

    /// Append the next placeholder and bind `value` to it.
    pub fn push_bind<T>(&mut self, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.push_bind_value(Arc::new(value))
    }

    pub fn push_bind_value(&mut self, value: SqlValue) -> &mut Self {
        self.pieces.push(Piece::Placeholder);
        self.params.push(value);
        self
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Render the SQL text with numbered placeholders.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        let mut n = 0;
        for piece in &self.pieces {
            match piece {
                Piece::Text(s) => out.push_str(s),
                Piece::Placeholder => {
                    n += 1;
                    let _ = write!(out, "${n}");
                }
            }
        }
        out
    }

    /// Whether this `SELECT` matches at least one row.
    pub async fn exists(&self, conn: &impl GenericClient) -> JoblyResult<bool> {
        let wrapped = format!("SELECT EXISTS({})", self.to_sql());
        let params = self.params_ref();
        let rows = conn.query_rows(self.operation(), &wrapped, &params).await?;
        let row = rows
            .first()
            .ok_or_else(|| JoblyError::decode("exists", "EXISTS returned no row"))?;
        row.try_get(0)
            .map_err(|e| JoblyError::decode("exists", e.to_string()))
    }
}

impl Statement for Sql {
    fn sql_text(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_sql())
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
