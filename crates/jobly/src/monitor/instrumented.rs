use super::clip;
use super::config::MonitorConfig;
use super::tracing_hook::TracingSqlHook;
use super::types::{HookAction, QueryContext, QueryHook, QueryOutcome};
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_postgres::types::ToSql;
use tokio_postgres::{CancelToken, NoTls, Row};

/// Wraps a client so every statement passes through hooks, a timeout and a
/// slow-query check.
///
/// Hooks run in the order they were added. The first one that rejects a
/// statement stops it before it reaches the database.
pub struct InstrumentedClient<C> {
    client: C,
    hooks: Vec<Arc<dyn QueryHook>>,
    config: MonitorConfig,
}

impl<C: GenericClient> InstrumentedClient<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            hooks: Vec::new(),
            config: MonitorConfig::default(),
        }
    }

    /// [`TracingSqlHook`] plus the given limits.
    pub fn traced(client: C, config: MonitorConfig) -> Self {
        Self::new(client)
            .with_config(config)
            .with_hook(TracingSqlHook::default())
    }

    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_hook<H: QueryHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.config.query_timeout = Some(timeout);
        self
    }

    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.config.slow_query_threshold = Some(threshold);
        self
    }

    pub fn inner(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    fn admit(&self, ctx: &QueryContext) -> JoblyResult<()> {
        for hook in &self.hooks {
            if let HookAction::Reject(reason) = hook.before_query(ctx) {
                tracing::warn!(target: "jobly.sql", operation = ctx.label(), %reason, "statement rejected");
                return Err(JoblyError::bad_request(reason));
            }
        }
        Ok(())
    }

    async fn within_limit<F>(&self, run: F) -> JoblyResult<Vec<Row>>
    where
        F: Future<Output = JoblyResult<Vec<Row>>> + Send,
    {
        let Some(limit) = self.config.query_timeout else {
            return run.await;
        };
        match tokio::time::timeout(limit, run).await {
            Ok(result) => result,
            Err(_) => {
                if let Some(token) = self.client.cancel_token() {
                    tokio::spawn(cancel(token));
                }
                Err(JoblyError::Timeout(limit))
            }
        }
    }

    fn report(&self, ctx: &QueryContext, elapsed: Duration, outcome: &QueryOutcome) {
        for hook in &self.hooks {
            hook.after_query(ctx, elapsed, outcome);
        }
        if self.config.is_slow(elapsed) {
            tracing::warn!(
                target: "jobly.sql",
                operation = ctx.label(),
                elapsed_ms = elapsed.as_millis() as u64,
                sql = %clip(&ctx.sql, 200),
                "slow query"
            );
        }
    }
}

async fn cancel(token: CancelToken) {
    if let Err(e) = token.cancel_query(NoTls).await {
        tracing::debug!(target: "jobly.sql", error = %e, "cancel request failed");
    }
}

impl<C: GenericClient> GenericClient for InstrumentedClient<C> {
    async fn query_rows(
        &self,
        tag: Option<&str>,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<Vec<Row>> {
        let ctx = QueryContext::new(tag, sql, params.len());
        self.admit(&ctx)?;

        let started = Instant::now();
        let result = self
            .within_limit(self.client.query_rows(tag, sql, params))
            .await;
        self.report(&ctx, started.elapsed(), &QueryOutcome::of(&result));
        result
    }

    fn cancel_token(&self) -> Option<CancelToken> {
        self.client.cancel_token()
    }
}
