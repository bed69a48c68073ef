//! kubectl-trail - Query Loki logs through the Kubernetes API
//!
//! Filters given on the command line become a LogQL query, which is run as a
//! single range query against Loki and rendered as one console line per entry.

pub mod cli;
pub mod config;
pub mod duration;
pub mod render;

use anyhow::{Context, Result};
use tracing::debug;

use trail_loki::{LokiClient, QueryRangeOptions};

pub use cli::{Args, Settings};
pub use config::Config;
pub use render::{render, ConsoleSink, Record, RecordSink};

/// Run `query` against `client` and emit every returned entry to `sink`.
/// Returns the number of records emitted.
pub async fn query_and_render<S: RecordSink + ?Sized>(
    client: &LokiClient,
    query: &str,
    options: &QueryRangeOptions,
    sink: &mut S,
) -> Result<usize> {
    let response = client
        .query_range(query, options)
        .await
        .with_context(|| format!("Query failed: {query}"))?;

    let count = render(&response, sink).context("Failed to write output")?;
    debug!(count, "rendered records");
    Ok(count)
}
