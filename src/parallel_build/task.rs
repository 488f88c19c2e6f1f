//! Per-corpus pipeline: load, size, build, query.

use std::time::Duration;

use log::{Level, debug, log_enabled, trace};

use crate::bloom::sizing::{MAX_REFINE_ITEMS, refine_bit_array_size};
use crate::bloom::{BloomFilter, FilterConfig, FilterOptions};
use crate::corpus::{CorpusLoader, CorpusProvider, LoadedCorpus};
use crate::error::{LexbloomError, Result};
use crate::parallel_build::metrics::Timer;
use crate::report::{CorpusReport, FailureReport};

/// One corpus scheduled for a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusTask {
    /// Unique identifier for this task.
    pub task_id: String,

    /// Corpus name passed to the provider.
    pub corpus_name: String,
}

impl CorpusTask {
    /// Create a new task for `corpus_name`.
    pub fn new<S: Into<String>>(corpus_name: S) -> Self {
        let corpus_name = corpus_name.into();
        let task_id = format!("{}_{}", corpus_name, uuid::Uuid::new_v4());
        Self {
            task_id,
            corpus_name,
        }
    }
}

/// Result of the demo lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    /// Token looked up.
    pub query: String,

    /// Whether the filter reported it possibly present.
    pub present: bool,
}

/// A successfully built corpus filter and its statistics.
#[derive(Debug, Clone)]
pub struct CorpusResult {
    /// Task that produced this result.
    pub task_id: String,

    /// Corpus name.
    pub corpus_name: String,

    /// Unique tokens inserted (`n`).
    pub unique_count: usize,

    /// Tokens read, duplicates included.
    pub total_token_count: usize,

    /// Time spent reading and deduplicating.
    pub read_duration: Duration,

    /// Time spent sizing the filter and inserting tokens.
    pub build_duration: Duration,

    /// The built filter.
    pub filter: BloomFilter,

    /// Parameters the filter was built with.
    pub config: FilterConfig,

    /// Demo lookup result.
    pub query: QueryOutcome,

    /// Estimated false-positive rate for `n` items in `m` bits with `k` probes.
    pub estimated_false_positive_rate: f64,
}

impl CorpusResult {
    /// Summary handed to a report sink.
    pub fn report(&self) -> CorpusReport {
        CorpusReport {
            name: self.corpus_name.clone(),
            unique_count: self.unique_count,
            total_token_count: self.total_token_count,
            bit_array_size: self.config.bit_array_size,
            hash_function_count: self.config.hash_function_count,
            hash_scheme: self.config.hash_scheme,
            false_positive_rate_estimate: self.estimated_false_positive_rate,
            query: self.query.query.clone(),
            query_result: self.query.present,
            read_duration_secs: self.read_duration.as_secs_f64(),
            build_duration_secs: self.build_duration.as_secs_f64(),
        }
    }
}

/// A corpus whose pipeline aborted.
#[derive(Debug)]
pub struct CorpusFailure {
    /// Task that failed.
    pub task_id: String,

    /// Corpus name.
    pub corpus_name: String,

    /// Why it failed.
    pub error: LexbloomError,
}

impl CorpusFailure {
    /// Summary handed to a report sink.
    pub fn report(&self) -> FailureReport {
        FailureReport {
            name: self.corpus_name.clone(),
            kind: self.error.kind().to_string(),
            message: self.error.to_string(),
        }
    }
}

/// Outcome of one corpus pipeline.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Filter built and queried.
    Built(Box<CorpusResult>),

    /// Pipeline aborted; contributes nothing to the aggregate.
    Failed(CorpusFailure),
}

impl PipelineOutcome {
    /// Corpus name.
    pub fn corpus_name(&self) -> &str {
        match self {
            PipelineOutcome::Built(result) => &result.corpus_name,
            PipelineOutcome::Failed(failure) => &failure.corpus_name,
        }
    }

    /// Check if the pipeline succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Built(_))
    }

    /// The built result, if any.
    pub fn result(&self) -> Option<&CorpusResult> {
        match self {
            PipelineOutcome::Built(result) => Some(result.as_ref()),
            PipelineOutcome::Failed(_) => None,
        }
    }

    /// The error, if the pipeline failed.
    pub fn error(&self) -> Option<&LexbloomError> {
        match self {
            PipelineOutcome::Built(_) => None,
            PipelineOutcome::Failed(failure) => Some(&failure.error),
        }
    }

    /// Unique tokens contributed to the aggregate.
    pub fn unique_count(&self) -> usize {
        self.result().map(|r| r.unique_count).unwrap_or(0)
    }

    /// Read time contributed to the aggregate.
    pub fn read_duration(&self) -> Duration {
        self.result().map(|r| r.read_duration).unwrap_or(Duration::ZERO)
    }

    /// Build time contributed to the aggregate.
    pub fn build_duration(&self) -> Duration {
        self.result().map(|r| r.build_duration).unwrap_or(Duration::ZERO)
    }

    /// Bit array size computed for this corpus.
    pub fn bit_array_size(&self) -> Option<usize> {
        self.result().map(|r| r.config.bit_array_size)
    }
}

/// The load → size → build → query chain for one corpus.
///
/// A pipeline owns nothing shared; any number of them can run at once.
#[derive(Debug, Clone)]
pub struct CorpusPipeline {
    loader: CorpusLoader,
    filter: FilterOptions,
    demo_query: String,
}

impl CorpusPipeline {
    /// Create a new pipeline.
    pub fn new<S: Into<String>>(loader: CorpusLoader, filter: FilterOptions, demo_query: S) -> Self {
        Self {
            loader,
            filter,
            demo_query: demo_query.into(),
        }
    }

    /// Run the pipeline for `task`, capturing any failure in the outcome.
    pub fn run(&self, task: CorpusTask, provider: &dyn CorpusProvider) -> PipelineOutcome {
        debug!("[{}] loading corpus {}", task.task_id, task.corpus_name);

        let built = self
            .loader
            .load_from(provider, &task.corpus_name)
            .and_then(|loaded| self.build(&task, loaded));

        match built {
            Ok(result) => PipelineOutcome::Built(Box::new(result)),
            Err(error) => PipelineOutcome::Failed(CorpusFailure {
                task_id: task.task_id,
                corpus_name: task.corpus_name,
                error,
            }),
        }
    }

    /// Size and fill a filter from a loaded corpus, then run the demo query.
    pub fn build(&self, task: &CorpusTask, loaded: LoadedCorpus) -> Result<CorpusResult> {
        let LoadedCorpus {
            unique,
            total_tokens,
            read_duration,
        } = loaded;
        let n = unique.len();

        let timer = Timer::start();
        let config = self.filter.size_for(n);
        if n <= MAX_REFINE_ITEMS && log_enabled!(Level::Trace) {
            trace!(
                "[{}] iterative sizing would give m={} (closed form m={})",
                task.task_id,
                refine_bit_array_size(
                    n,
                    config.target_false_positive_rate,
                    config.hash_function_count
                ),
                config.bit_array_size
            );
        }

        let filter = BloomFilter::build(
            unique.iter(),
            config.bit_array_size,
            config.hash_function_count,
            config.hash_scheme,
        )?;
        let build_duration = timer.stop();
        drop(unique);

        let present = filter.contains(&self.demo_query);
        debug!(
            "[{}] built m={} k={} for n={} in {:?}; '{}' present={}",
            task.task_id,
            config.bit_array_size,
            config.hash_function_count,
            n,
            build_duration,
            self.demo_query,
            present
        );

        Ok(CorpusResult {
            task_id: task.task_id.clone(),
            corpus_name: task.corpus_name.clone(),
            unique_count: n,
            total_token_count: total_tokens,
            read_duration,
            build_duration,
            estimated_false_positive_rate: config.estimated_false_positive_rate(n),
            filter,
            config,
            query: QueryOutcome {
                query: self.demo_query.clone(),
                present,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bloom::hash_index;
    use crate::corpus::MemoryCorpusProvider;
    use std::collections::HashSet;
    use std::num::NonZeroUsize;

    fn pipeline() -> CorpusPipeline {
        CorpusPipeline::new(CorpusLoader::default(), FilterOptions::default(), "geohash")
    }

    #[test]
    fn test_task_ids_are_unique() {
        let a = CorpusTask::new("MOBY_DICK.txt");
        let b = CorpusTask::new("MOBY_DICK.txt");
        assert_ne!(a.task_id, b.task_id);
        assert!(a.task_id.starts_with("MOBY_DICK.txt_"));
    }

    #[test]
    fn test_small_corpus_end_to_end() {
        let provider = MemoryCorpusProvider::new().with_corpus("tiny", "a b a c");
        let outcome = pipeline().run(CorpusTask::new("tiny"), &provider);
        let result = outcome.result().unwrap();

        assert_eq!(result.unique_count, 3);
        assert_eq!(result.total_token_count, 4);
        assert_eq!(result.config.bit_array_size, 19);

        let m = NonZeroUsize::new(19).unwrap();
        let distinct: HashSet<usize> = ["a", "b", "c"].iter().map(|t| hash_index(t, m)).collect();
        assert_eq!(result.filter.count_ones(), distinct.len());
        assert!(result.filter.contains("a"));

        let zzz_set = result.filter.bits().get(hash_index("zzz", m)).unwrap();
        assert_eq!(result.filter.contains("zzz"), zzz_set);

        // 735 % 19 = 13; a, b, c land on 2, 3, 4.
        assert!(!result.query.present);
    }

    #[test]
    fn test_empty_corpus_builds_empty_filter() {
        let provider = MemoryCorpusProvider::new().with_corpus("blank", "   \n");
        let outcome = pipeline().run(CorpusTask::new("blank"), &provider);
        let result = outcome.result().unwrap();

        assert_eq!(result.unique_count, 0);
        assert_eq!(result.config.bit_array_size, 0);
        assert!(result.filter.is_clear());
        assert!(!result.query.present);
        assert_eq!(result.estimated_false_positive_rate, 0.0);
    }

    #[test]
    fn test_missing_corpus_fails_locally() {
        let provider = MemoryCorpusProvider::new();
        let outcome = pipeline().run(CorpusTask::new("missing"), &provider);

        assert!(!outcome.is_success());
        assert!(matches!(outcome.error(), Some(LexbloomError::Io(_))));
        assert_eq!(outcome.unique_count(), 0);
        assert_eq!(outcome.read_duration(), Duration::ZERO);
        assert_eq!(outcome.bit_array_size(), None);
        assert_eq!(outcome.corpus_name(), "missing");
    }

    #[test]
    fn test_report_fields() {
        let provider = MemoryCorpusProvider::new().with_corpus("tiny", "geohash x");
        let outcome = pipeline().run(CorpusTask::new("tiny"), &provider);
        let report = outcome.result().unwrap().report();

        assert_eq!(report.name, "tiny");
        assert_eq!(report.unique_count, 2);
        assert_eq!(report.query, "geohash");
        assert!(report.query_result);
        assert!(report.false_positive_rate_estimate > 0.0);
    }
}
