//! Shared types for kubectl-trail
//!
//! This crate contains the data model returned by a Loki range query and
//! consumed by the renderer.

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, IgnoredAny, SeqAccess, Visitor};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Stream labels assigned by the backend
pub type Labels = BTreeMap<String, String>;

/// Label Loki attaches with the detected severity of a line
pub const DETECTED_LEVEL_LABEL: &str = "detected_level";

// ============================================================================
// Log Types
// ============================================================================

/// Log severity level of a rendered record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    /// No `detected_level` label, or one we do not classify
    #[default]
    Unknown,
}

impl LogLevel {
    /// Classify a `detected_level` label value
    pub fn from_detected(s: &str) -> Self {
        match s {
            "debug" => Self::Debug,
            "info" => Self::Info,
            "warn" => Self::Warn,
            "error" | "fatal" | "critical" => Self::Error,
            _ => Self::Unknown,
        }
    }

    /// Classify a stream by its labels
    pub fn from_labels(labels: &Labels) -> Self {
        labels
            .get(DETECTED_LEVEL_LABEL)
            .map(|s| Self::from_detected(s))
            .unwrap_or_default()
    }

    /// Short display string (3 chars)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DBG",
            Self::Info => "INF",
            Self::Warn => "WRN",
            Self::Error => "ERR",
            Self::Unknown => "???",
        }
    }
}

/// A single log line: `[ "<ns-epoch>", "<text>" ]` on the wire
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

impl LogEntry {
    pub fn new(timestamp: DateTime<Utc>, text: String) -> Self {
        Self { timestamp, text }
    }
}

impl<'de> Deserialize<'de> for LogEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(LogEntryVisitor)
    }
}

struct LogEntryVisitor;

impl<'de> Visitor<'de> for LogEntryVisitor {
    type Value = LogEntry;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an array of two elements [timestamp, line]")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let ts: String = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let nanos: i64 = ts
            .parse()
            .map_err(|e| de::Error::custom(format!("invalid timestamp {ts:?}: {e}")))?;

        let text: String = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;

        if seq.next_element::<IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(3, &self));
        }

        Ok(LogEntry {
            timestamp: DateTime::from_timestamp_nanos(nanos),
            text,
        })
    }
}

/// A labelled stream of log lines, in backend order
#[derive(Clone, Debug, Deserialize)]
pub struct Stream {
    #[serde(rename = "stream")]
    pub labels: Labels,
    pub values: Vec<LogEntry>,
}

impl Stream {
    /// Severity of every entry in this stream
    pub fn level(&self) -> LogLevel {
        LogLevel::from_labels(&self.labels)
    }
}

// ============================================================================
// Response Envelope
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Streams,
    Vector,
    Matrix,
}

#[derive(Clone, Debug, Deserialize)]
pub struct QueryData {
    #[serde(rename = "resultType")]
    pub result_type: ResultType,
    pub result: Vec<Stream>,
}

/// Body of `GET /loki/api/v1/query_range`
#[derive(Clone, Debug, Deserialize)]
pub struct QueryResponse {
    pub status: Status,
    pub data: QueryData,
}

impl QueryResponse {
    /// Total number of log lines across all streams
    pub fn entry_count(&self) -> usize {
        self.data.result.iter().map(|s| s.values.len()).sum()
    }
}
