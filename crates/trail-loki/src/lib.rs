//! Loki access for kubectl-trail
//!
//! This crate builds LogQL queries from command-line filters and runs
//! range queries against a Loki endpoint, either directly or through the
//! Kubernetes API server proxy.

mod client;
mod error;
mod query;
mod query_range;

pub use client::{LokiClient, Transport};
pub use error::{Error, Result};
pub use query::{build_query, included_levels, QueryInput, CATCH_ALL_SELECTOR};
pub use query_range::{QueryRangeOptions, DEFAULT_LIMIT};

// Re-export types used in our public API
pub use trail_types::{Labels, LogEntry, LogLevel, QueryResponse, Stream};
