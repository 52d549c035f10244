//! Tails an application log and prints every appended line as one JSON
//! object per line.

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod parser;
pub mod record;
pub mod tail;

use oncall_telemetry::ReformatterMetrics;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::trace;

pub use error::{ReformatError, ReformatResult};
pub use parser::LineParser;
pub use record::{ServiceTags, StructuredLogRecord, format_timestamp};
pub use tail::LogTail;

/// Couples a [`LogTail`] with a [`LineParser`] and counts every line.
#[derive(Debug)]
pub struct Reformatter {
    tail: LogTail,
    parser: LineParser,
    metrics: ReformatterMetrics,
}

impl Reformatter {
    /// Creates a reformatter.
    #[must_use]
    pub fn new(tail: LogTail, parser: LineParser, metrics: ReformatterMetrics) -> Self {
        Self {
            tail,
            parser,
            metrics,
        }
    }

    /// Reformats the next appended line into `out`.
    ///
    /// # Errors
    ///
    /// Returns [`ReformatError`] when reading the log or writing the record fails.
    pub async fn step<W>(&mut self, out: &mut W) -> ReformatResult<StructuredLogRecord>
    where
        W: AsyncWrite + Unpin,
    {
        let line = self.tail.next_line().await?;
        let (record, outcome) = self.parser.reformat(&line);
        trace!(outcome = outcome.as_str(), "line reformatted");
        self.metrics.line(outcome);
        write_record(out, &record).await?;
        Ok(record)
    }

    /// Reformats lines into `out` until an I/O error occurs.
    ///
    /// # Errors
    ///
    /// Returns the first [`ReformatError`] encountered.
    pub async fn run<W>(&mut self, out: &mut W) -> ReformatResult<()>
    where
        W: AsyncWrite + Unpin,
    {
        loop {
            self.step(out).await?;
        }
    }
}

/// Writes `record` as a single JSON line and flushes.
///
/// # Errors
///
/// Returns [`ReformatError`] on serialization or write failure.
pub async fn write_record<W>(out: &mut W, record: &StructuredLogRecord) -> ReformatResult<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');
    out.write_all(&line).await?;
    out.flush().await?;
    Ok(())
}
