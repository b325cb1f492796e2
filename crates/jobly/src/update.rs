//! Partial-update (`SET` clause) builder.
//!
//! A partial update only touches the fields the caller supplied. [`SetClause`]
//! collects `"column"=$n` assignments in supply order and numbers the
//! placeholders itself, so callers never compute `$n` by hand.
//!
//! # Example
//!
//! ```ignore
//! use jobly::{ColumnOverrides, sql_for_partial_update, value};
//!
//! let overrides = ColumnOverrides::from_pairs(&[("firstName", "first_name")]);
//! let set = sql_for_partial_update([("firstName", value("Aliya")), ("age", value(32))], &overrides)?;
//!
//! assert_eq!(set.set_clause(), r#""first_name"=$1, "age"=$2"#);
//! ```

use crate::error::{JoblyError, JoblyResult};
use crate::sql::{Sql, quote_ident};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// A type-erased, shareable SQL parameter value.
pub type SqlValue = Arc<dyn ToSql + Sync + Send>;

/// Erase a value into a [`SqlValue`].
pub fn value<T>(v: T) -> SqlValue
where
    T: ToSql + Sync + Send + 'static,
{
    Arc::new(v)
}

/// Translation table from payload key to database column name.
///
/// Keys without an entry are used verbatim as the column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnOverrides {
    map: HashMap<String, String>,
}

impl ColumnOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        pairs.iter().copied().collect()
    }

    /// Add a `key -> column` translation.
    pub fn with(mut self, key: impl Into<String>, column: impl Into<String>) -> Self {
        self.map.insert(key.into(), column.into());
        self
    }

    /// Column name to use for `key`.
    pub fn column_for<'a>(&'a self, key: &'a str) -> &'a str {
        self.map.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ColumnOverrides {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Builder for the assignment list of an `UPDATE ... SET` statement.
#[must_use]
#[derive(Debug, Default)]
pub struct SetClause {
    overrides: ColumnOverrides,
    columns: Vec<String>,
    params: Vec<SqlValue>,
}

impl SetClause {
    /// Create an empty clause with no column overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty clause that translates keys through `overrides`.
    pub fn with_overrides(overrides: ColumnOverrides) -> Self {
        Self {
            overrides,
            columns: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Assign `value` to the column named by `key`.
    ///
    /// The key is not checked against the table; an unknown column surfaces
    /// as a database error when the statement runs.
    pub fn set<T>(&mut self, key: &str, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.set_value(key, Arc::new(value))
    }

    /// Assign an already type-erased value.
    pub fn set_value(&mut self, key: &str, value: SqlValue) -> &mut Self {
        let column = self.overrides.column_for(key).to_string();
        self.columns.push(column);
        self.params.push(value);
        self
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Resolved column names, in supply order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Reject an empty clause: an `UPDATE` needs at least one assignment.
    pub fn finish(self) -> JoblyResult<Self> {
        if self.is_empty() {
            return Err(JoblyError::bad_request("No data"));
        }
        Ok(self)
    }

    /// Render the clause on its own, numbering placeholders from `$1`.
    pub fn set_clause(&self) -> String {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{}=${}", quote_ident(column), i + 1))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parameter refs in assignment order.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }

    /// Append the assignments to `sql`, continuing its placeholder numbering.
    pub fn append_to(self, sql: &mut Sql) {
        for (i, (column, param)) in self.columns.into_iter().zip(self.params).enumerate() {
            if i > 0 {
                sql.push(", ");
            }
            sql.push(&quote_ident(&column)).push("=").push_bind_value(param);
        }
    }
}

/// Build a `SET` clause from `(key, value)` pairs in the order supplied.
///
/// Fails with a bad request when `fields` is empty.
pub fn sql_for_partial_update<K, I>(fields: I, overrides: &ColumnOverrides) -> JoblyResult<SetClause>
where
    K: AsRef<str>,
    I: IntoIterator<Item = (K, SqlValue)>,
{
    let mut set = SetClause::with_overrides(overrides.clone());
    for (key, value) in fields {
        set.set_value(key.as_ref(), value);
    }
    set.finish()
}

/// A typed patch: the explicit set of fields an entity allows to change.
pub trait Patch {
    /// Key-to-column translations applied to this patch's keys.
    fn column_overrides() -> ColumnOverrides {
        ColumnOverrides::default()
    }

    /// Write one assignment per supplied field.
    fn write_set(&self, set: &mut SetClause);

    /// Build the `SET` clause; fails with a bad request when nothing was supplied.
    fn set_clause(&self) -> JoblyResult<SetClause> {
        let mut set = SetClause::with_overrides(Self::column_overrides());
        self.write_set(&mut set);
        set.finish()
    }
}

/// Deserialize a present field (including `null`) as `Some(..)`.
///
/// Used with `#[serde(default)]` on `Option<Option<T>>` fields so that an
/// absent key stays `None` while `null` becomes `Some(None)`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::sql;

    fn debug_values(set: &SetClause) -> Vec<String> {
        set.params_ref().iter().map(|p| format!("{p:?}")).collect()
    }

    #[test]
    fn renders_overrides_in_supply_order() {
        let overrides = ColumnOverrides::from_pairs(&[("firstName", "first_name")]);
        let set = sql_for_partial_update(
            [("firstName", value("Aliya")), ("age", value(32_i32))],
            &overrides,
        )
        .unwrap();

        assert_eq!(set.set_clause(), r#""first_name"=$1, "age"=$2"#);
        assert_eq!(debug_values(&set), ["\"Aliya\"", "32"]);
    }

    #[test]
    fn one_fragment_per_key() {
        let set = sql_for_partial_update(
            [
                ("title", value("j4")),
                ("salary", value(400_i32)),
                ("equity", value(Option::<i32>::None)),
            ],
            &ColumnOverrides::new(),
        )
        .unwrap();

        assert_eq!(set.set_clause().split(", ").count(), 3);
        assert_eq!(set.len(), 3);
        assert_eq!(set.columns(), ["title", "salary", "equity"]);
    }

    #[test]
    fn empty_fields_are_rejected() {
        let err = sql_for_partial_update(Vec::<(&str, SqlValue)>::new(), &ColumnOverrides::new())
            .err()
            .unwrap();
        assert!(err.is_bad_request());

        let overrides = ColumnOverrides::from_pairs(&[("firstName", "first_name")]);
        let err = sql_for_partial_update(Vec::<(&str, SqlValue)>::new(), &overrides)
            .err()
            .unwrap();
        assert!(err.is_bad_request());
    }

    #[test]
    fn empty_clause_fails_to_finish() {
        let err = SetClause::new().finish().unwrap_err();
        assert!(err.is_bad_request());
        assert_eq!(err.to_string(), "Bad request: No data");

        let mut set = SetClause::new();
        set.set("salary", 10_i32);
        let debug = format!("{:?}", set.finish().unwrap());
        assert!(debug.contains("salary"));
    }

    #[test]
    fn unknown_keys_pass_through_quoted() {
        let set = sql_for_partial_update([("nope", value(1_i32))], &ColumnOverrides::new()).unwrap();
        assert_eq!(set.set_clause(), r#""nope"=$1"#);
    }

    #[test]
    fn append_continues_outer_numbering() {
        let mut set = SetClause::new();
        set.set("title", "j4").set("salary", 400_i32);

        let mut q = sql("UPDATE jobs SET ");
        set.append_to(&mut q);
        q.push(" WHERE id = ").push_bind(7_i32);

        assert_eq!(
            q.to_sql(),
            r#"UPDATE jobs SET "title"=$1, "salary"=$2 WHERE id = $3"#
        );
        assert_eq!(q.param_count(), 3);
    }

    #[test]
    fn overrides_collect_from_iterator() {
        let overrides: ColumnOverrides = vec![("logoUrl", "logo_url")].into_iter().collect();
        assert_eq!(overrides.column_for("logoUrl"), "logo_url");
        assert_eq!(overrides.column_for("name"), "name");
        assert!(!overrides.is_empty());
        assert!(ColumnOverrides::new().with("a", "b").column_for("a") == "b");
    }

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(default, deserialize_with = "double_option")]
        salary: Option<Option<i32>>,
    }

    #[test]
    fn double_option_distinguishes_null_from_absent() {
        let absent: Wrapper = serde_json::from_str("{}").unwrap();
        let null: Wrapper = serde_json::from_str(r#"{"salary": null}"#).unwrap();
        let set: Wrapper = serde_json::from_str(r#"{"salary": 5}"#).unwrap();

        assert_eq!(absent.salary, None);
        assert_eq!(null.salary, Some(None));
        assert_eq!(set.salary, Some(Some(5)));
    }
}
