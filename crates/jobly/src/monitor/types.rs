use super::clip;
use crate::error::JoblyResult;
use std::fmt;
use std::time::Duration;
use tokio_postgres::Row;

/// Table family named by the first segment of an operation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Jobs,
    Companies,
}

impl Entity {
    pub fn as_str(self) -> &'static str {
        match self {
            Entity::Jobs => "jobs",
            Entity::Companies => "companies",
        }
    }
}

/// Actions that change stored data.
const WRITE_ACTIONS: [&str; 3] = ["create", "update", "remove"];

/// A statement about to run, as hooks see it.
///
/// Data-access operations tag their statements `<entity>.<action>`
/// (`jobs.create`, `companies.get_jobs`, ...). Untagged statements have no
/// entity or action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryContext {
    pub sql: String,
    pub param_count: usize,
    pub tag: Option<String>,
}

impl QueryContext {
    pub fn new(tag: Option<&str>, sql: &str, param_count: usize) -> Self {
        Self {
            sql: sql.to_string(),
            param_count,
            tag: tag.map(str::to_string),
        }
    }

    pub fn entity(&self) -> Option<Entity> {
        match self.tag.as_deref()?.split_once('.')?.0 {
            "jobs" => Some(Entity::Jobs),
            "companies" => Some(Entity::Companies),
            _ => None,
        }
    }

    pub fn action(&self) -> Option<&str> {
        self.tag.as_deref()?.split_once('.').map(|(_, action)| action)
    }

    /// Tagged as a create, update or remove.
    pub fn is_write(&self) -> bool {
        self.action().is_some_and(|a| WRITE_ACTIONS.contains(&a))
    }

    /// The tag, or `-` for untagged statements.
    pub fn label(&self) -> &str {
        self.tag.as_deref().unwrap_or("-")
    }
}

const MAX_FAILURE_LEN: usize = 512;

/// How a statement ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Rows(usize),
    /// Error text, capped at 512 bytes.
    Failed(String),
}

impl QueryOutcome {
    pub fn of(result: &JoblyResult<Vec<Row>>) -> Self {
        match result {
            Ok(rows) => Self::Rows(rows.len()),
            Err(e) => Self::failed(e.to_string()),
        }
    }

    pub fn failed(message: String) -> Self {
        if message.len() > MAX_FAILURE_LEN {
            Self::Failed(format!("{}...", clip(&message, MAX_FAILURE_LEN)))
        } else {
            Self::Failed(message)
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rows(1) => f.write_str("1 row"),
            Self::Rows(n) => write!(f, "{n} rows"),
            Self::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

/// A hook's verdict on a statement before it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookAction {
    Continue,
    /// Refuse the statement; the caller gets a bad request carrying the reason.
    Reject(String),
}

/// Observes, and may refuse, statements passing through an
/// [`super::InstrumentedClient`].
pub trait QueryHook: Send + Sync {
    fn before_query(&self, _ctx: &QueryContext) -> HookAction {
        HookAction::Continue
    }

    fn after_query(&self, _ctx: &QueryContext, _elapsed: Duration, _outcome: &QueryOutcome) {}
}

/// Refuses every create, update and remove; reads pass.
///
/// Useful when a connection points at a replica or the board is in
/// maintenance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOnlyHook;

impl QueryHook for ReadOnlyHook {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        if ctx.is_write() {
            HookAction::Reject(format!("{} is not allowed on a read-only connection", ctx.label()))
        } else {
            HookAction::Continue
        }
    }
}
