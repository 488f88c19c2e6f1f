//! Main parallel build engine implementation.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crossbeam_channel::unbounded;
use log::{info, warn};
use rayon::ThreadPoolBuilder;

use crate::corpus::{CorpusLoader, CorpusProvider};
use crate::error::{LexbloomError, Result};
use crate::parallel_build::config::{ExecutionMode, ParallelBuildConfig};
use crate::parallel_build::metrics::{AggregateResult, Timer};
use crate::parallel_build::task::{CorpusPipeline, CorpusResult, CorpusTask, PipelineOutcome};
use crate::report::ReportSink;

/// Result of a full run over a set of corpora.
#[derive(Debug)]
pub struct RunSummary {
    /// Run-wide totals.
    pub aggregate: AggregateResult,

    /// Outcome of every pipeline, in completion order.
    pub outcomes: Vec<PipelineOutcome>,
}

impl RunSummary {
    /// Successfully built corpora.
    pub fn built(&self) -> impl Iterator<Item = &CorpusResult> {
        self.outcomes.iter().filter_map(PipelineOutcome::result)
    }

    /// Failed pipelines.
    pub fn failures(&self) -> impl Iterator<Item = &PipelineOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Outcome for the named corpus.
    pub fn outcome(&self, corpus_name: &str) -> Option<&PipelineOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.corpus_name() == corpus_name)
    }
}

/// Engine running one filter-build pipeline per corpus.
pub struct ParallelBuildEngine {
    /// Configuration for the engine.
    config: ParallelBuildConfig,

    /// Shared corpus source.
    provider: Arc<dyn CorpusProvider>,

    /// Pipeline shared by reference with every worker.
    pipeline: CorpusPipeline,
}

impl ParallelBuildEngine {
    /// Create a new engine. Fails if the configuration is invalid.
    pub fn new(config: ParallelBuildConfig, provider: Arc<dyn CorpusProvider>) -> Result<Self> {
        config.validate()?;
        let pipeline = CorpusPipeline::new(
            CorpusLoader::new(config.loader),
            config.filter,
            config.demo_query.clone(),
        );
        Ok(Self {
            config,
            provider,
            pipeline,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ParallelBuildConfig {
        &self.config
    }

    /// Build a filter for every named corpus and report to `sink`.
    ///
    /// Per-corpus failures are reported and counted, never returned. The
    /// returned error is reserved for run-level problems: a worker pool that
    /// cannot start, a worker that died, or a sink that cannot write.
    pub fn run_all<S: AsRef<str>>(
        &self,
        corpus_names: &[S],
        sink: &mut dyn ReportSink,
    ) -> Result<RunSummary> {
        let timer = Timer::start();
        let tasks: Vec<CorpusTask> = corpus_names
            .iter()
            .map(|name| CorpusTask::new(name.as_ref()))
            .collect();

        let outcomes = match self.config.execution_mode {
            ExecutionMode::Parallel => self.execute_parallel(tasks)?,
            ExecutionMode::Sequential => self.execute_sequential(tasks),
        };

        let mut aggregate = AggregateResult::new();
        for outcome in &outcomes {
            match outcome {
                PipelineOutcome::Built(result) => sink.report_corpus(&result.report())?,
                PipelineOutcome::Failed(failure) => {
                    warn!(
                        "corpus {} failed: {}",
                        failure.corpus_name, failure.error
                    );
                    sink.report_failure(&failure.report())?;
                }
            }
            aggregate.record(outcome);
        }

        let aggregate = aggregate.with_process_time(timer.stop());
        info!(
            "built {} of {} corpora, {} unique words in {:?}",
            aggregate.corpora_built,
            aggregate.corpus_count(),
            aggregate.total_unique_words,
            aggregate.total_process_time
        );
        sink.report_aggregate(&aggregate)?;

        Ok(RunSummary {
            aggregate,
            outcomes,
        })
    }

    /// Run pipelines in list order on the calling thread.
    fn execute_sequential(&self, tasks: Vec<CorpusTask>) -> Vec<PipelineOutcome> {
        tasks
            .into_iter()
            .map(|task| self.pipeline.run(task, self.provider.as_ref()))
            .collect()
    }

    /// Run pipelines on a worker pool, collecting outcomes as they finish.
    fn execute_parallel(&self, tasks: Vec<CorpusTask>) -> Result<Vec<PipelineOutcome>> {
        let expected = tasks.len();
        if expected == 0 {
            return Ok(Vec::new());
        }

        let workers = self.config.worker_count(expected);
        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("corpus-build-{i}"))
            .build()
            .map_err(|e| LexbloomError::internal(format!("Failed to create thread pool: {e}")))?;
        info!("building {expected} corpora on {workers} workers");

        let (tx, rx) = unbounded();
        let pipeline = &self.pipeline;
        let provider = self.provider.as_ref();

        let joined = panic::catch_unwind(AssertUnwindSafe(|| {
            thread_pool.scope(|scope| {
                for task in tasks {
                    let tx = tx.clone();
                    scope.spawn(move |_| {
                        let outcome = pipeline.run(task, provider);
                        let _ = tx.send(outcome);
                    });
                }
            });
        }));
        drop(tx);

        // Every worker has finished here; the channel holds outcomes in
        // completion order.
        let outcomes: Vec<PipelineOutcome> = rx.try_iter().collect();

        if joined.is_err() || outcomes.len() != expected {
            return Err(LexbloomError::thread_join(format!(
                "{} of {} corpus workers did not finish",
                expected - outcomes.len(),
                expected
            )));
        }
        Ok(outcomes)
    }
}
