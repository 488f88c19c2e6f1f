//! Reporting of per-corpus and run-wide statistics.
//!
//! The engine hands every corpus outcome and the final aggregate to a
//! [`ReportSink`]. Sinks decide how, and whether, to present them.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::bloom::HashScheme;
use crate::error::Result;
use crate::parallel_build::metrics::AggregateResult;

/// Statistics for one successfully built corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusReport {
    /// Corpus name.
    pub name: String,

    /// Unique tokens inserted (`n`).
    pub unique_count: usize,

    /// Tokens read, duplicates included.
    pub total_token_count: usize,

    /// Bit array length (`m`).
    pub bit_array_size: usize,

    /// Probes per insert or lookup (`k`).
    pub hash_function_count: usize,

    /// Probe index derivation.
    pub hash_scheme: HashScheme,

    /// Estimated false-positive rate for `n` items.
    pub false_positive_rate_estimate: f64,

    /// Token looked up after the build.
    pub query: String,

    /// Whether the filter reported the query possibly present.
    pub query_result: bool,

    /// Read and dedup time, in seconds.
    pub read_duration_secs: f64,

    /// Sizing and insertion time, in seconds.
    pub build_duration_secs: f64,
}

/// A corpus whose pipeline failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    /// Corpus name.
    pub name: String,

    /// Error category, as given by `LexbloomError::kind`.
    pub kind: String,

    /// Error message.
    pub message: String,
}

/// Receiver of run statistics.
pub trait ReportSink {
    /// Called once per successfully built corpus.
    fn report_corpus(&mut self, report: &CorpusReport) -> Result<()>;

    /// Called once per failed corpus.
    fn report_failure(&mut self, failure: &FailureReport) -> Result<()>;

    /// Called once after every corpus has been reported.
    fn report_aggregate(&mut self, aggregate: &AggregateResult) -> Result<()>;
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn report_corpus(&mut self, _report: &CorpusReport) -> Result<()> {
        Ok(())
    }

    fn report_failure(&mut self, _failure: &FailureReport) -> Result<()> {
        Ok(())
    }

    fn report_aggregate(&mut self, _aggregate: &AggregateResult) -> Result<()> {
        Ok(())
    }
}

/// Sink that keeps every report in memory.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    /// Built corpora, in report order.
    pub corpora: Vec<CorpusReport>,

    /// Failed corpora, in report order.
    pub failures: Vec<FailureReport>,

    /// Run totals, once reported.
    pub aggregate: Option<AggregateResult>,
}

impl CollectingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportSink for CollectingSink {
    fn report_corpus(&mut self, report: &CorpusReport) -> Result<()> {
        self.corpora.push(report.clone());
        Ok(())
    }

    fn report_failure(&mut self, failure: &FailureReport) -> Result<()> {
        self.failures.push(failure.clone());
        Ok(())
    }

    fn report_aggregate(&mut self, aggregate: &AggregateResult) -> Result<()> {
        self.aggregate = Some(aggregate.clone());
        Ok(())
    }
}

/// Plain-text report for terminals.
#[derive(Debug)]
pub struct HumanReport<W: Write> {
    out: W,
}

impl<W: Write> HumanReport<W> {
    /// Create a report writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the report, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for HumanReport<W> {
    fn report_corpus(&mut self, report: &CorpusReport) -> Result<()> {
        writeln!(self.out, "{}", report.name)?;
        writeln!(
            self.out,
            "  Unique words: {} ({} total)",
            report.unique_count, report.total_token_count
        )?;
        writeln!(
            self.out,
            "  Bit array size: {} (k={}, {})",
            report.bit_array_size,
            report.hash_function_count,
            report.hash_scheme.name()
        )?;
        writeln!(
            self.out,
            "  False positive rate: {:.6}",
            report.false_positive_rate_estimate
        )?;
        if report.query_result {
            writeln!(
                self.out,
                "  The string '{}' is potentially in the bloom filter.",
                report.query
            )?;
        } else {
            writeln!(
                self.out,
                "  The string '{}' does not exist in the bloom filter.",
                report.query
            )?;
        }
        writeln!(
            self.out,
            "  Read time: {:.6}s, build time: {:.6}s",
            report.read_duration_secs, report.build_duration_secs
        )?;
        writeln!(self.out)?;
        Ok(())
    }

    fn report_failure(&mut self, failure: &FailureReport) -> Result<()> {
        writeln!(
            self.out,
            "Error reading strings from {}: {}",
            failure.name, failure.message
        )?;
        writeln!(self.out)?;
        Ok(())
    }

    fn report_aggregate(&mut self, aggregate: &AggregateResult) -> Result<()> {
        match aggregate.last_computed_m {
            Some(m) => writeln!(self.out, "Optimal bit array size based on calculations: {m}")?,
            None => writeln!(self.out, "Optimal bit array size based on calculations: n/a")?,
        }
        writeln!(
            self.out,
            "Total unique strings from all files: {}",
            aggregate.total_unique_words
        )?;
        writeln!(
            self.out,
            "Total time for reading and counting unique words (seconds): {:.6}",
            aggregate.total_read_time.as_secs_f64()
        )?;
        writeln!(
            self.out,
            "Total time for optimization and insertion (seconds): {:.6}",
            aggregate.total_build_time.as_secs_f64()
        )?;
        writeln!(
            self.out,
            "Total process time (seconds): {:.6}",
            aggregate.total_process_time.as_secs_f64()
        )?;
        if aggregate.corpora_failed > 0 {
            writeln!(
                self.out,
                "Corpora failed: {} of {}",
                aggregate.corpora_failed,
                aggregate.corpus_count()
            )?;
        }
        self.out.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ReportEvent<'a> {
    Corpus(&'a CorpusReport),
    Failure(&'a FailureReport),
    Aggregate(&'a AggregateResult),
}

/// JSON report, one object per event.
#[derive(Debug)]
pub struct JsonReport<W: Write> {
    out: W,
    pretty: bool,
}

impl<W: Write> JsonReport<W> {
    /// Create a report writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out, pretty: false }
    }

    /// Pretty-print each object.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Consume the report, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: ReportEvent<'_>) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.out, &event)?;
        } else {
            serde_json::to_writer(&mut self.out, &event)?;
        }
        writeln!(self.out)?;
        Ok(())
    }
}

impl<W: Write> ReportSink for JsonReport<W> {
    fn report_corpus(&mut self, report: &CorpusReport) -> Result<()> {
        self.emit(ReportEvent::Corpus(report))
    }

    fn report_failure(&mut self, failure: &FailureReport) -> Result<()> {
        self.emit(ReportEvent::Failure(failure))
    }

    fn report_aggregate(&mut self, aggregate: &AggregateResult) -> Result<()> {
        self.emit(ReportEvent::Aggregate(aggregate))?;
        self.out.flush()?;
        Ok(())
    }
}
