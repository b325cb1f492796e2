//! Connection pool utilities

use crate::config::DbConfig;
use crate::error::{JoblyError, JoblyResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Create a connection pool from [`DbConfig`].
///
/// # Example
///
/// ```ignore
/// let pool = jobly::create_pool(&jobly::DbConfig::from_env()?)?;
/// let client = pool.get().await?;
/// ```
pub fn create_pool(config: &DbConfig) -> JoblyResult<Pool> {
    create_pool_with_max_size(&config.database_url, config.pool_max_size)
}

/// Create a connection pool from a database URL with an explicit size.
pub fn create_pool_with_max_size(database_url: &str, max_size: usize) -> JoblyResult<Pool> {
    let pg_config: tokio_postgres::Config = database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| JoblyError::Connection(e.to_string()))?;

    let manager_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let mgr = Manager::from_config(pg_config, NoTls, manager_config);

    tracing::debug!(max_size, "creating connection pool");
    Pool::builder(mgr)
        .max_size(max_size)
        .build()
        .map_err(|e| JoblyError::Pool(e.to_string()))
}
