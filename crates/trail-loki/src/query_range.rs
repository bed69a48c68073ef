use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use trail_types::{QueryResponse, Status};

use crate::client::LokiClient;
use crate::error::{Error, Result};

const QUERY_RANGE_PATH: &str = "/loki/api/v1/query_range";

/// Default number of lines requested
pub const DEFAULT_LIMIT: u32 = 100;

/// Value sent for `limit` whenever a limit is set.
// TODO: send `QueryRangeOptions::limit` itself; until then `--limit` only
// toggles whether the parameter is present.
const WIRE_LIMIT: &str = "100";

/// Options for a range query
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryRangeOptions {
    pub limit: Option<u32>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl QueryRangeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query the window `[now - since, now]`; a zero or negative `since`
    /// leaves the window to the backend default
    pub fn with_since(mut self, since: Duration, now: DateTime<Utc>) -> Self {
        if since > Duration::zero() {
            self.start = Some(now - since);
            self.end = Some(now);
        }
        self
    }

    /// Request parameters for `query`, in a stable order
    pub fn params(&self, query: &str) -> Result<Vec<(&'static str, String)>> {
        let mut params = Vec::new();

        if !query.is_empty() {
            params.push(("query", query.to_string()));
        }

        if self.limit.is_some() {
            params.push(("limit", WIRE_LIMIT.to_string()));
        }

        if let Some(start) = self.start {
            params.push(("start", epoch_nanos(start)?.to_string()));
        }

        if let Some(end) = self.end {
            params.push(("end", epoch_nanos(end)?.to_string()));
        }

        Ok(params)
    }
}

fn epoch_nanos(t: DateTime<Utc>) -> Result<i64> {
    t.timestamp_nanos_opt()
        .ok_or_else(|| Error::InvalidInput(format!("time {t} is out of range")))
}

impl LokiClient {
    /// Run a range query and decode the returned streams
    pub async fn query_range(
        &self,
        query: &str,
        options: &QueryRangeOptions,
    ) -> Result<QueryResponse> {
        let params = options.params(query)?;
        let body = self.get(QUERY_RANGE_PATH, &params).await?;

        let response: QueryResponse = serde_json::from_slice(&body)?;
        if response.status != Status::Success {
            return Err(Error::Backend {
                status: 200,
                body: format!("query returned status {:?}", response.status),
            });
        }

        debug!(
            streams = response.data.result.len(),
            entries = response.entry_count(),
            "decoded query_range response"
        );

        Ok(response)
    }
}
