//! Job openings posted by companies.

use crate::changeset::ValidationErrors;
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::{Filter, WhereClause, query_text};
use crate::sql::{Statement, query, sql};
use crate::update::{Patch, SetClause, double_option};
use crate::validate;
use jobly_derive::{FromRow, Model};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A row of the `jobs` table.
///
/// `equity` serializes as a decimal string (e.g. `"0.05"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Model)]
#[orm(table = "jobs")]
pub struct Job {
    #[orm(id)]
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Input for [`Job::create`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl NewJob {
    pub fn validate(&self) -> JoblyResult<()> {
        let mut errors = ValidationErrors::default();
        validate::require_text(&mut errors, "title", &self.title);
        validate::non_negative(&mut errors, "salary", self.salary);
        validate::fraction(&mut errors, "equity", self.equity);
        validate::require_text(&mut errors, "company_handle", &self.company_handle);
        Ok(errors.into_result()?)
    }
}

/// Partial update for a job. `id` and `company_handle` cannot change.
///
/// `salary` and `equity` distinguish an absent key (`None`) from an explicit
/// `null` (`Some(None)`), which clears the column.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub equity: Option<Option<Decimal>>,
}

impl JobPatch {
    pub fn validate(&self) -> JoblyResult<()> {
        let mut errors = ValidationErrors::default();
        if let Some(title) = &self.title {
            validate::require_text(&mut errors, "title", title);
        }
        validate::non_negative(&mut errors, "salary", self.salary.flatten());
        validate::fraction(&mut errors, "equity", self.equity.flatten());
        Ok(errors.into_result()?)
    }
}

impl Patch for JobPatch {
    fn write_set(&self, set: &mut SetClause) {
        if let Some(title) = &self.title {
            set.set("title", title.clone());
        }
        if let Some(salary) = self.salary {
            set.set("salary", salary);
        }
        if let Some(equity) = self.equity {
            set.set("equity", equity);
        }
    }
}

/// Listing filter for jobs: `title`, `minSalary`, `hasEquity`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "query_text::opt_int")]
    pub min_salary: Option<i32>,
    /// `true` keeps only jobs with positive equity; `false` does not filter.
    #[serde(default, deserialize_with = "query_text::flag")]
    pub has_equity: bool,
}

impl Filter for JobFilter {
    fn write_predicates(&self, clause: &mut WhereClause) {
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            clause.and_contains("title", title);
        }
        // A zero minimum matches every salary, including unset ones.
        if let Some(min) = self.min_salary.filter(|m| *m != 0) {
            clause.and_gte("salary", min);
        }
        if self.has_equity {
            clause.and_raw("(equity IS NOT NULL AND equity > 0)");
        }
    }
}

/// Unique constraint on `(company_handle, title)`.
const TITLE_PER_COMPANY: &str = "jobs_company_handle_title_key";

fn duplicate(title: &str, company_handle: &str) -> JoblyError {
    JoblyError::bad_request(format!(
        "Duplicate job opening: {title} at company {company_handle}"
    ))
}

fn no_job(id: i32) -> JoblyError {
    JoblyError::not_found(format!("No job: {id}"))
}

impl Job {
    /// Insert a job opening and return it with its generated id.
    ///
    /// A company posts at most one opening per title; a second one fails
    /// with a bad request.
    pub async fn create(conn: &impl GenericClient, data: &NewJob) -> JoblyResult<Job> {
        data.validate()?;

        let mut check = sql("SELECT 1 FROM jobs WHERE company_handle = ").tagged("jobs.duplicate_check");
        check
            .push_bind(data.company_handle.clone())
            .push(" AND title = ")
            .push_bind(data.title.clone());
        if check.exists(conn).await? {
            return Err(duplicate(&data.title, &data.company_handle));
        }

        let inserted = query(format!(
            "INSERT INTO {} (title, salary, equity, company_handle) VALUES ($1, $2, $3, $4) RETURNING {}",
            Self::TABLE,
            Self::SELECT_LIST
        ))
        .tag("jobs.create")
        .bind(data.title.clone())
        .bind(data.salary)
        .bind(data.equity)
        .bind(data.company_handle.clone())
        .fetch_one_as::<Job>(conn)
        .await;

        // The check above races with concurrent inserts; the unique
        // constraint on (company_handle, title) settles it.
        let job = match inserted {
            Err(e) if e.constraint() == Some(TITLE_PER_COMPANY) => {
                return Err(duplicate(&data.title, &data.company_handle));
            }
            other => other?,
        };

        tracing::info!(job_id = job.id, company = %job.company_handle, "created job");
        Ok(job)
    }

    /// All jobs matching `filter`, ordered by title.
    pub async fn find_all(conn: &impl GenericClient, filter: &JobFilter) -> JoblyResult<Vec<Job>> {
        let clause = filter.where_clause()?;
        tracing::debug!(predicates = clause.len(), "listing jobs");

        let mut q = sql(format!("SELECT {} FROM {}", Self::SELECT_LIST, Self::TABLE)).tagged("jobs.find_all");
        clause.append_to(&mut q);
        q.push(" ORDER BY title");
        q.fetch_all_as(conn).await
    }

    pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<Job> {
        query(format!(
            "SELECT {} FROM {} WHERE {} = $1",
            Self::SELECT_LIST,
            Self::TABLE,
            Self::ID
        ))
        .tag("jobs.get")
        .bind(id)
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| no_job(id))
    }

    /// Apply `patch` to job `id`, returning the updated row.
    ///
    /// Fails with a bad request for an empty or invalid patch, and with not
    /// found when no job has this id.
    pub async fn update(conn: &impl GenericClient, id: i32, patch: &JobPatch) -> JoblyResult<Job> {
        let set = patch.set_clause()?;
        patch.validate()?;

        let mut q = sql(format!("UPDATE {} SET ", Self::TABLE)).tagged("jobs.update");
        set.append_to(&mut q);
        q.push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(Self::SELECT_LIST);

        let job: Job = q.fetch_opt_as(conn).await?.ok_or_else(|| no_job(id))?;
        tracing::info!(job_id = id, "updated job");
        Ok(job)
    }

    pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
        query("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .tag("jobs.remove")
            .bind(id)
            .fetch_opt(conn)
            .await?
            .ok_or_else(|| no_job(id))?;

        tracing::info!(job_id = id, "removed job");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parse_filter;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn model_metadata() {
        assert_eq!(Job::TABLE, "jobs");
        assert_eq!(Job::ID, "id");
        assert_eq!(Job::SELECT_LIST, "id, title, salary, equity, company_handle");
        assert_eq!(Job::COL_COMPANY_HANDLE, "company_handle");
    }

    #[test]
    fn new_job_validation_collects_every_field() {
        let bad = NewJob {
            title: "  ".into(),
            salary: Some(-1),
            equity: Some(Decimal::from_str("1.5").unwrap()),
            company_handle: String::new(),
        };
        let err = bad.validate().unwrap_err();
        assert!(err.is_bad_request());
        match err {
            JoblyError::Invalid(errors) => {
                assert_eq!(errors.len(), 4);
                assert!(errors.has_field("equity"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn new_job_accepts_equity_as_string_or_number() {
        let a: NewJob = serde_json::from_value(json!({
            "title": "j1", "salary": 100, "equity": "0.1", "company_handle": "c1"
        }))
        .unwrap();
        let b: NewJob = serde_json::from_value(json!({
            "title": "j1", "equity": 0.1, "company_handle": "c1"
        }))
        .unwrap();
        assert_eq!(a.equity, b.equity);
        assert_eq!(b.salary, None);
        assert!(a.validate().is_ok());
    }

    #[test]
    fn patch_renders_supplied_fields_only() {
        let patch: JobPatch = serde_json::from_value(json!({ "salary": 500, "equity": null })).unwrap();
        let set = patch.set_clause().unwrap();
        assert_eq!(set.set_clause(), r#""salary"=$1, "equity"=$2"#);
        assert_eq!(
            set.params_ref().iter().map(|p| format!("{p:?}")).collect::<Vec<_>>(),
            ["Some(500)", "None"]
        );
    }

    #[test]
    fn empty_patch_is_rejected() {
        assert!(JobPatch::default().set_clause().unwrap_err().is_bad_request());
    }

    #[test]
    fn patch_cannot_touch_immutable_columns() {
        assert!(serde_json::from_value::<JobPatch>(json!({ "company_handle": "c2" })).is_err());
        assert!(serde_json::from_value::<JobPatch>(json!({ "id": 9 })).is_err());
    }

    #[test]
    fn filter_builds_predicates_in_field_order() {
        let filter: JobFilter = parse_filter(json!({
            "hasEquity": true,
            "minSalary": 150,
            "title": "j",
        }))
        .unwrap();
        let clause = filter.where_clause().unwrap();

        assert_eq!(
            clause.build_clause(),
            "title ILIKE $1 AND salary >= $2 AND (equity IS NOT NULL AND equity > 0)"
        );
        assert_eq!(clause.params_ref().len(), 2);
    }

    #[test]
    fn has_equity_false_does_not_filter() {
        let filter: JobFilter = parse_filter(json!({ "hasEquity": false })).unwrap();
        assert!(filter.where_clause().unwrap().is_empty());
    }

    #[test]
    fn filter_rejects_company_keys() {
        let err = parse_filter::<JobFilter>(json!({ "minEmployees": 2 })).unwrap_err();
        assert!(err.is_bad_request());
    }
}
