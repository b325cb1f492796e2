//! # jobly
//!
//! Data access for a job board: companies and the job openings they post,
//! stored in PostgreSQL.
//!
//! ## Features
//!
//! - **SQL explicit**: every statement is a parameterized SQL string built with
//!   [`sql()`] or [`query()`]
//! - **Partial updates**: typed patches render a `SET` clause via [`SetClause`]
//! - **Filtering**: typed per-entity filters render a `WHERE` clause via [`WhereClause`]
//! - **Transaction-friendly**: pass a transaction anywhere a [`GenericClient`] is expected
//! - **Query monitoring**: [`InstrumentedClient`] logs SQL through `tracing`,
//!   warns on slow queries and enforces timeouts
//!
//! ## Example
//!
//! ```ignore
//! use jobly::{DbConfig, Job, JobFilter, create_pool};
//!
//! let config = DbConfig::from_env()?;
//! let pool = create_pool(&config)?;
//! let client = pool.get().await?;
//!
//! let filter: JobFilter = jobly::parse_filter(serde_json::json!({ "hasEquity": true }))?;
//! let jobs = Job::find_all(&client, &filter).await?;
//! ```

extern crate self as jobly;

pub mod changeset;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod migrate;
pub mod models;
pub mod monitor;
pub mod row;
pub mod sql;
pub mod update;
pub mod validate;

pub use changeset::{ValidationCode, ValidationError, ValidationErrors};
pub use client::GenericClient;
pub use config::DbConfig;
pub use error::{JoblyError, JoblyResult};
pub use filter::{Filter, WhereClause, parse_filter, parse_query_pairs};
pub use models::company::{Company, CompanyDetail, CompanyFilter, CompanyJob, CompanyPatch, NewCompany};
pub use models::job::{Job, JobFilter, JobPatch, NewJob};
pub use monitor::{
    Entity, HookAction, InstrumentedClient, MonitorConfig, QueryContext, QueryHook, QueryOutcome,
    ReadOnlyHook, TracingSqlHook,
};
pub use row::{FromRow, RowExt};
pub use sql::{Query, Sql, Statement, query, sql};
pub use update::{ColumnOverrides, Patch, SetClause, SqlValue, sql_for_partial_update, value};

pub use jobly_derive::{FromRow, Model};

// Re-exported so derive-generated code can name row types without a direct dependency.
pub use tokio_postgres;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_max_size};
