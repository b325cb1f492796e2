//! Hooks, SQL logging, slow-query warnings and timeouts around the
//! statements the models issue.
//!
//! Every statement from [`crate::Job`] and [`crate::Company`] carries an
//! operation tag (`jobs.update`, `companies.get_jobs`, ...). Hooks see it as
//! an [`Entity`] and an action, so they can log or refuse by operation
//! rather than by parsing SQL.
//!
//! ```rust,ignore
//! use jobly::{InstrumentedClient, MonitorConfig, ReadOnlyHook};
//! use std::time::Duration;
//!
//! let config = MonitorConfig::new()
//!     .with_query_timeout(Duration::from_secs(30))
//!     .with_slow_query_threshold(Duration::from_millis(250));
//!
//! let replica = InstrumentedClient::traced(pool.get().await?, config).with_hook(ReadOnlyHook);
//! let jobs = jobly::Job::find_all(&replica, &Default::default()).await?;
//! ```

mod config;
mod instrumented;
mod tracing_hook;
mod types;


pub use config::MonitorConfig;
pub use instrumented::InstrumentedClient;
pub use tracing_hook::TracingSqlHook;
pub use types::{Entity, HookAction, QueryContext, QueryHook, QueryOutcome, ReadOnlyHook};

/// At most `max_bytes` of `text`, cut back to a char boundary.
pub(crate) fn clip(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let end = (0..=max_bytes)
        .rev()
        .find(|&i| text.is_char_boundary(i))
        .unwrap_or(0);
    &text[..end]
}
