//! Filter (`WHERE` clause) builder.
//!
//! Each listable entity declares its own typed filter struct. Deserializing
//! into that struct is the allow-list: unrecognized keys are rejected by
//! serde (`deny_unknown_fields`) and surface as a bad request. The struct
//! then writes one predicate per supplied key into a [`WhereClause`].
//!
//! # Example
//!
//! ```ignore
//! use jobly::{CompanyFilter, Filter, parse_filter};
//!
//! let filter: CompanyFilter = parse_filter(serde_json::json!({
//!     "nameLike": "burton",
//!     "minEmployees": 400,
//! }))?;
//! let clause = filter.where_clause()?;
//! assert_eq!(clause.build_clause(), "name ILIKE $1 AND num_employees >= $2");
//! ```

#[cfg(test)]
mod tests;

use crate::error::{JoblyError, JoblyResult};
use crate::sql::Sql;
use crate::update::SqlValue;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio_postgres::types::ToSql;

#[derive(Debug)]
enum Predicate {
    /// `lhs` followed by one bound parameter, e.g. `salary >= $n`.
    Bind { lhs: String, value: SqlValue },
    /// A fixed predicate with no parameter.
    Raw(String),
}

/// Conjunction of predicates with their parameters.
///
/// Placeholders are numbered when the clause is rendered, so predicates can
/// be appended without tracking `$n` by hand.
#[must_use]
#[derive(Debug, Default)]
pub struct WhereClause {
    predicates: Vec<Predicate>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    fn bind<T>(&mut self, lhs: String, value: T)
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.predicates.push(Predicate::Bind {
            lhs,
            value: Arc::new(value),
        });
    }

    /// Case-insensitive substring match: `col ILIKE '%value%'`.
    pub fn and_contains(&mut self, col: &str, value: &str) -> &mut Self {
        self.bind(format!("{col} ILIKE "), format!("%{value}%"));
        self
    }

    /// `col >= value`
    pub fn and_gte<T>(&mut self, col: &str, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.bind(format!("{col} >= "), value);
        self
    }

    /// `col <= value`
    pub fn and_lte<T>(&mut self, col: &str, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.bind(format!("{col} <= "), value);
        self
    }

    /// Add a predicate that binds no parameter.
    pub fn and_raw(&mut self, predicate: impl Into<String>) -> &mut Self {
        self.predicates.push(Predicate::Raw(predicate.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Build the clause without the `WHERE` keyword, numbering from `$1`.
    pub fn build_clause(&self) -> String {
        let mut idx = 0;
        self.predicates
            .iter()
            .map(|p| match p {
                Predicate::Bind { lhs, .. } => {
                    idx += 1;
                    format!("{lhs}${idx}")
                }
                Predicate::Raw(s) => s.clone(),
            })
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// Get parameter references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.predicates
            .iter()
            .filter_map(|p| match p {
                Predicate::Bind { value, .. } => Some(value.as_ref() as &(dyn ToSql + Sync)),
                Predicate::Raw(_) => None,
            })
            .collect()
    }

    /// Append ` WHERE ...` to `sql`, or nothing when there are no predicates.
    pub fn append_to(self, sql: &mut Sql) {
        for (i, predicate) in self.predicates.into_iter().enumerate() {
            sql.push(if i == 0 { " WHERE " } else { " AND " });
            match predicate {
                Predicate::Bind { lhs, value } => {
                    sql.push(&lhs).push_bind_value(value);
                }
                Predicate::Raw(s) => {
                    sql.push(&s);
                }
            }
        }
    }
}

/// A typed, per-entity listing filter.
pub trait Filter {
    /// Check cross-field consistency (e.g. minimum not above maximum).
    fn validate(&self) -> JoblyResult<()> {
        Ok(())
    }

    /// Write one predicate per supplied key, in struct field order.
    ///
    /// Input key order is not kept: a `serde_json::Value` object sorts its
    /// keys, so field order is the only stable one.
    fn write_predicates(&self, clause: &mut WhereClause);

    /// Validate and build the clause.
    fn where_clause(&self) -> JoblyResult<WhereClause> {
        self.validate()?;
        let mut clause = WhereClause::new();
        self.write_predicates(&mut clause);
        Ok(clause)
    }
}

/// Deserialize a filter from a JSON object.
///
/// Unknown keys and ill-typed values become [`JoblyError::BadRequest`].
pub fn parse_filter<F: DeserializeOwned>(input: Value) -> JoblyResult<F> {
    serde_json::from_value(input).map_err(|e| JoblyError::bad_request(e.to_string()))
}

/// Turn query-string pairs into a JSON object suitable for [`parse_filter`].
///
/// Every value stays a string. Filter fields that hold numbers or flags
/// parse their own text, so `nameLike=007` keeps its leading zeros.
pub fn parse_query_pairs<I, K, V>(pairs: I) -> Value
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<str>,
{
    let map: Map<String, Value> = pairs
        .into_iter()
        .map(|(key, raw)| (key.into(), Value::String(raw.as_ref().to_string())))
        .collect();
    Value::Object(map)
}

/// `deserialize_with` helpers for filter fields that arrive either typed
/// (a JSON body) or as query-string text.
pub(crate) mod query_text {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Typed(T),
        Text(String),
    }

    pub(crate) fn opt_int<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Raw<i32>>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Typed(n)) => Ok(Some(n)),
            Some(Raw::Text(text)) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected an integer, got {text:?}"))),
        }
    }

    pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::<bool>::deserialize(deserializer)? {
            Raw::Typed(b) => Ok(b),
            Raw::Text(text) => match text.trim() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(D::Error::custom(format!("expected true or false, got {text:?}"))),
            },
        }
    }
}
