#![allow(dead_code)]

use jobly::{Company, GenericClient, Job, JoblyError, JoblyResult, NewCompany, NewJob};
use rust_decimal::Decimal;
use std::str::FromStr;
use tokio_postgres::{Client, NoTls};

/// Serializes schema migration across concurrently running tests.
const MIGRATION_LOCK: i64 = 0x6a6f_626c;

/// Connect to `DATABASE_URL` and bring the schema up to date.
///
/// Returns `None` (and the calling test passes vacuously) when the variable is unset.
pub async fn connect(test: &str) -> JoblyResult<Option<Client>> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test}");
            return Ok(None);
        }
    };

    let (mut client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .map_err(JoblyError::from_db_error)?;
    tokio::spawn(async move {
        let _ = connection.await;
    });

    client
        .execute("SELECT pg_advisory_lock($1)", &[&MIGRATION_LOCK])
        .await?;
    let migrated = jobly::migrate::run(&mut client).await;
    client
        .execute("SELECT pg_advisory_unlock($1)", &[&MIGRATION_LOCK])
        .await?;
    migrated?;

    Ok(Some(client))
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub struct Seeded {
    pub j1: Job,
    pub j2: Job,
    pub j3: Job,
}

/// Companies c1..c3 and jobs j1 (c1), j2 (c1), j3 (c2).
///
/// Callers run this inside a transaction they never commit.
pub async fn seed(conn: &impl GenericClient) -> JoblyResult<Seeded> {
    for n in 1..=3 {
        Company::create(
            conn,
            &NewCompany {
                handle: format!("c{n}"),
                name: format!("C{n}"),
                description: format!("Desc{n}"),
                num_employees: Some(n),
                logo_url: Some(format!("http://c{n}.img")),
            },
        )
        .await?;
    }

    let job = |title: &str, salary: i32, equity: Option<&str>, handle: &str| NewJob {
        title: title.to_string(),
        salary: Some(salary),
        equity: equity.map(dec),
        company_handle: handle.to_string(),
    };

    Ok(Seeded {
        j1: Job::create(conn, &job("j1", 100, Some("0.01"), "c1")).await?,
        j2: Job::create(conn, &job("j2", 200, Some("0"), "c1")).await?,
        j3: Job::create(conn, &job("j3", 300, None, "c2")).await?,
    })
}
