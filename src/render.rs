//! Rendering of query results as leveled console records

use std::io::{self, Write};

use chrono::{DateTime, Local, Utc};
use crossterm::style::{Color, Stylize};

use trail_types::{Labels, LogLevel, QueryResponse};

/// One rendered log line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub text: String,
    /// Labels of the owning stream, attached as attributes
    pub labels: Labels,
}

/// Destination for rendered records
pub trait RecordSink {
    fn emit(&mut self, record: Record) -> io::Result<()>;
}

impl RecordSink for Vec<Record> {
    fn emit(&mut self, record: Record) -> io::Result<()> {
        self.push(record);
        Ok(())
    }
}

/// Emit one record per entry, streams and entries in response order.
/// Returns the number of records emitted.
pub fn render<S: RecordSink + ?Sized>(response: &QueryResponse, sink: &mut S) -> io::Result<usize> {
    let mut count = 0;

    for stream in &response.data.result {
        let level = stream.level();

        for entry in &stream.values {
            sink.emit(Record {
                timestamp: entry.timestamp,
                level,
                text: entry.text.clone(),
                labels: stream.labels.clone(),
            })?;
            count += 1;
        }
    }

    Ok(count)
}

/// Get display color for a level
fn level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Debug => Color::Cyan,
        LogLevel::Info => Color::Green,
        LogLevel::Warn => Color::Yellow,
        LogLevel::Error => Color::Red,
        LogLevel::Unknown => Color::White,
    }
}

/// Writes `3:04PM ERR text key=value ...` lines
pub struct ConsoleSink<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for ConsoleSink<W> {
    fn emit(&mut self, record: Record) -> io::Result<()> {
        let time = record
            .timestamp
            .with_timezone(&Local)
            .format("%-I:%M%p")
            .to_string();
        let level = record.level.as_str();

        if self.color {
            write!(
                self.out,
                "{} {} {}",
                time.dark_grey(),
                level.with(level_color(record.level)).bold(),
                record.text
            )?;
            for (key, value) in &record.labels {
                write!(self.out, " {}{}", format!("{key}=").dark_grey(), value)?;
            }
        } else {
            write!(self.out, "{time} {level} {}", record.text)?;
            for (key, value) in &record.labels {
                write!(self.out, " {key}={value}")?;
            }
        }

        writeln!(self.out)
    }
}
