//! Parallel per-corpus filter builds.
//!
//! Every corpus runs its own load, size, build and query pipeline. Pipelines
//! share no mutable state; their outcomes travel back to the coordinator,
//! which folds them into an [`AggregateResult`] once all workers are done.

pub mod config;
pub mod engine;
pub mod metrics;
pub mod task;

pub use config::{DEFAULT_DEMO_QUERY, ExecutionMode, ParallelBuildConfig};
pub use engine::{ParallelBuildEngine, RunSummary};
pub use metrics::{AggregateResult, Timer};
pub use task::{
    CorpusFailure, CorpusPipeline, CorpusResult, CorpusTask, PipelineOutcome, QueryOutcome,
};
