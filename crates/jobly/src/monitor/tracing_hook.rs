use super::clip;
use super::types::{HookAction, QueryContext, QueryHook, QueryOutcome};
use std::time::Duration;
use tracing::Level;

/// Logs each statement on target `jobly.sql`, with the entity and action
/// read from its operation tag.
///
/// Statements are logged at `level` before they run. Completion is logged at
/// the same level, except failures, which are logged at `WARN`.
#[derive(Debug, Clone)]
pub struct TracingSqlHook {
    pub level: Level,
    /// SQL longer than this many bytes is cut; `None` logs it whole.
    pub max_sql_length: Option<usize>,
}

impl Default for TracingSqlHook {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

// `tracing` macros need the level at compile time.
macro_rules! event_at {
    ($level:expr, $($rest:tt)*) => {
        if $level == Level::ERROR {
            tracing::error!($($rest)*)
        } else if $level == Level::WARN {
            tracing::warn!($($rest)*)
        } else if $level == Level::INFO {
            tracing::info!($($rest)*)
        } else if $level == Level::DEBUG {
            tracing::debug!($($rest)*)
        } else {
            tracing::trace!($($rest)*)
        }
    };
}

impl TracingSqlHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    pub fn full_sql(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub(crate) fn shown_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", clip(sql, max)).into(),
            _ => sql.into(),
        }
    }
}

impl QueryHook for TracingSqlHook {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        let entity = ctx.entity().map_or("-", |e| e.as_str());
        let action = ctx.action().unwrap_or("-");
        let sql = self.shown_sql(&ctx.sql);
        event_at!(
            self.level,
            target: "jobly.sql",
            entity,
            action,
            write = ctx.is_write(),
            params = ctx.param_count,
            sql = %sql,
        );
        HookAction::Continue
    }

    fn after_query(&self, ctx: &QueryContext, elapsed: Duration, outcome: &QueryOutcome) {
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        if outcome.is_failure() {
            tracing::warn!(target: "jobly.sql", operation = ctx.label(), elapsed_ms, %outcome, "statement failed");
        } else {
            event_at!(self.level, target: "jobly.sql", operation = ctx.label(), elapsed_ms, %outcome, "statement done");
        }
    }
}
