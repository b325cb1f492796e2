//! Companies and their job listings.

use crate::changeset::ValidationErrors;
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::{Filter, WhereClause, query_text};
use crate::sql::{Statement, query, sql};
use crate::update::{ColumnOverrides, Patch, SetClause, double_option};
use crate::validate;
use jobly_derive::{FromRow, Model};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Model)]
#[orm(table = "companies")]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[orm(id)]
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// A job as listed under its company (no `company_handle`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Model)]
#[orm(table = "jobs")]
pub struct CompanyJob {
    #[orm(id)]
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

/// A company together with its open jobs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<CompanyJob>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl NewCompany {
    pub fn validate(&self) -> JoblyResult<()> {
        let mut errors = ValidationErrors::default();
        validate::handle(&mut errors, "handle", &self.handle);
        validate::require_text(&mut errors, "name", &self.name);
        validate::non_negative(&mut errors, "numEmployees", self.num_employees);
        validate::url(&mut errors, "logoUrl", self.logo_url.as_deref());
        Ok(errors.into_result()?)
    }
}

/// Partial update for a company. The handle cannot change.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub num_employees: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub logo_url: Option<Option<String>>,
}

impl CompanyPatch {
    pub fn validate(&self) -> JoblyResult<()> {
        let mut errors = ValidationErrors::default();
        if let Some(name) = &self.name {
            validate::require_text(&mut errors, "name", name);
        }
        validate::non_negative(&mut errors, "numEmployees", self.num_employees.flatten());
        validate::url(
            &mut errors,
            "logoUrl",
            self.logo_url.as_ref().and_then(|u| u.as_deref()),
        );
        Ok(errors.into_result()?)
    }
}

impl Patch for CompanyPatch {
    fn column_overrides() -> ColumnOverrides {
        ColumnOverrides::from_pairs(&[("numEmployees", "num_employees"), ("logoUrl", "logo_url")])
    }

    fn write_set(&self, set: &mut SetClause) {
        if let Some(name) = &self.name {
            set.set("name", name.clone());
        }
        if let Some(description) = &self.description {
            set.set("description", description.clone());
        }
        if let Some(num_employees) = self.num_employees {
            set.set("numEmployees", num_employees);
        }
        if let Some(logo_url) = &self.logo_url {
            set.set("logoUrl", logo_url.clone());
        }
    }
}

/// Listing filter for companies: `nameLike`, `minEmployees`, `maxEmployees`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    #[serde(default)]
    pub name_like: Option<String>,
    #[serde(default, deserialize_with = "query_text::opt_int")]
    pub min_employees: Option<i32>,
    #[serde(default, deserialize_with = "query_text::opt_int")]
    pub max_employees: Option<i32>,
}

impl Filter for CompanyFilter {
    fn validate(&self) -> JoblyResult<()> {
        match (self.min_employees, self.max_employees) {
            (Some(min), Some(max)) if min > max => Err(JoblyError::bad_request(
                "minEmployees cannot be greater than maxEmployees",
            )),
            _ => Ok(()),
        }
    }

    fn write_predicates(&self, clause: &mut WhereClause) {
        if let Some(name) = self.name_like.as_deref().filter(|n| !n.is_empty()) {
            clause.and_contains("name", name);
        }
        if let Some(min) = self.min_employees {
            clause.and_gte("num_employees", min);
        }
        if let Some(max) = self.max_employees {
            clause.and_lte("num_employees", max);
        }
    }
}

const HANDLE_KEY: &str = "companies_pkey";
const NAME_KEY: &str = "companies_name_key";

fn no_company(handle: &str) -> JoblyError {
    JoblyError::not_found(format!("No company: {handle}"))
}

impl Company {
    pub async fn create(conn: &impl GenericClient, data: &NewCompany) -> JoblyResult<Company> {
        data.validate()?;

        let mut check = sql("SELECT 1 FROM companies WHERE handle = ").tagged("companies.duplicate_check");
        check.push_bind(data.handle.clone());
        if check.exists(conn).await? {
            return Err(JoblyError::bad_request(format!("Duplicate company: {}", data.handle)));
        }

        let inserted = query(format!(
            "INSERT INTO {} (handle, name, description, num_employees, logo_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            Self::TABLE,
            Self::SELECT_LIST
        ))
        .tag("companies.create")
        .bind(data.handle.clone())
        .bind(data.name.clone())
        .bind(data.description.clone())
        .bind(data.num_employees)
        .bind(data.logo_url.clone())
        .fetch_one_as::<Company>(conn)
        .await;

        let company = match inserted {
            Err(e) if e.constraint() == Some(HANDLE_KEY) => {
                return Err(JoblyError::bad_request(format!("Duplicate company: {}", data.handle)));
            }
            Err(e) if e.constraint() == Some(NAME_KEY) => {
                return Err(JoblyError::bad_request(format!("Duplicate company name: {}", data.name)));
            }
            other => other?,
        };

        tracing::info!(handle = %company.handle, "created company");
        Ok(company)
    }

    /// All companies matching `filter`, ordered by name.
    pub async fn find_all(
        conn: &impl GenericClient,
        filter: &CompanyFilter,
    ) -> JoblyResult<Vec<Company>> {
        let clause = filter.where_clause()?;
        tracing::debug!(predicates = clause.len(), "listing companies");

        let mut q = sql(format!("SELECT {} FROM {}", Self::SELECT_LIST, Self::TABLE))
            .tagged("companies.find_all");
        clause.append_to(&mut q);
        q.push(" ORDER BY name");
        q.fetch_all_as(conn).await
    }

    /// A company and its jobs, ordered by job id.
    pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<CompanyDetail> {
        let company: Company = query(format!(
            "SELECT {} FROM {} WHERE {} = $1",
            Self::SELECT_LIST,
            Self::TABLE,
            Self::ID
        ))
        .tag("companies.get")
        .bind(handle.to_string())
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| no_company(handle))?;

        let jobs = query(format!(
            "SELECT {} FROM {} WHERE company_handle = $1 ORDER BY id",
            CompanyJob::SELECT_LIST,
            CompanyJob::TABLE
        ))
        .tag("companies.get_jobs")
        .bind(handle.to_string())
        .fetch_all_as(conn)
        .await?;

        Ok(CompanyDetail { company, jobs })
    }

    pub async fn update(
        conn: &impl GenericClient,
        handle: &str,
        patch: &CompanyPatch,
    ) -> JoblyResult<Company> {
        let set = patch.set_clause()?;
        patch.validate()?;

        let mut q = sql(format!("UPDATE {} SET ", Self::TABLE)).tagged("companies.update");
        set.append_to(&mut q);
        q.push(" WHERE handle = ")
            .push_bind(handle.to_string())
            .push(" RETURNING ")
            .push(Self::SELECT_LIST);

        let company: Company = q
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| no_company(handle))?;
        tracing::info!(handle, "updated company");
        Ok(company)
    }

    /// Delete a company; its jobs go with it.
    pub async fn remove(conn: &impl GenericClient, handle: &str) -> JoblyResult<()> {
        query("DELETE FROM companies WHERE handle = $1 RETURNING handle")
            .tag("companies.remove")
            .bind(handle.to_string())
            .fetch_opt(conn)
            .await?
            .ok_or_else(|| no_company(handle))?;

        tracing::info!(handle, "removed company");
        Ok(())
    }
}
