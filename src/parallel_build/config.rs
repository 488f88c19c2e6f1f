//! Configuration for parallel filter builds.

use serde::{Deserialize, Serialize};

use crate::bloom::FilterOptions;
use crate::corpus::LoaderConfig;
use crate::error::{LexbloomError, Result};

/// Default token looked up in every built filter.
pub const DEFAULT_DEMO_QUERY: &str = "geohash";

/// How corpus pipelines are scheduled.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One task per corpus on a worker pool.
    #[default]
    Parallel,

    /// Corpora one after another on the calling thread, in list order.
    Sequential,
}

/// Configuration for the parallel build engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelBuildConfig {
    /// Worker pool size.
    /// If None, uses the number of CPU cores. Always capped at the corpus count.
    pub thread_pool_size: Option<usize>,

    /// Scheduling of corpus pipelines.
    pub execution_mode: ExecutionMode,

    /// Filter sizing and hashing.
    pub filter: FilterOptions,

    /// Corpus ingestion.
    pub loader: LoaderConfig,

    /// Token looked up in each filter after it is built.
    pub demo_query: String,
}

impl Default for ParallelBuildConfig {
    fn default() -> Self {
        Self {
            thread_pool_size: None,
            execution_mode: ExecutionMode::default(),
            filter: FilterOptions::default(),
            loader: LoaderConfig::default(),
            demo_query: DEFAULT_DEMO_QUERY.to_string(),
        }
    }
}

impl ParallelBuildConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.thread_pool_size == Some(0) {
            return Err(LexbloomError::invalid_config(
                "thread pool size must be at least 1",
            ));
        }
        self.filter.validate()?;
        self.loader.validate()?;
        Ok(())
    }

    /// Number of workers to use for `corpus_count` corpora.
    pub fn worker_count(&self, corpus_count: usize) -> usize {
        let requested = self.thread_pool_size.unwrap_or_else(num_cpus::get);
        requested.min(corpus_count).max(1)
    }

    /// Set the worker pool size.
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }

    /// Set the execution mode.
    pub fn with_execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = mode;
        self
    }

    /// Set the filter options.
    pub fn with_filter(mut self, filter: FilterOptions) -> Self {
        self.filter = filter;
        self
    }

    /// Set the loader configuration.
    pub fn with_loader(mut self, loader: LoaderConfig) -> Self {
        self.loader = loader;
        self
    }

    /// Set the demo query token.
    pub fn with_demo_query<S: Into<String>>(mut self, query: S) -> Self {
        self.demo_query = query.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bloom::HashScheme;

    #[test]
    fn test_default_config() {
        let config = ParallelBuildConfig::default();
        assert_eq!(config.thread_pool_size, None);
        assert_eq!(config.execution_mode, ExecutionMode::Parallel);
        assert_eq!(config.filter.target_false_positive_rate, 0.05);
        assert_eq!(config.filter.hash_function_count, 4);
        assert_eq!(config.loader.max_token_length, 100);
        assert_eq!(config.demo_query, "geohash");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_worker_count() {
        let config = ParallelBuildConfig::default().with_thread_pool_size(8);
        assert_eq!(config.worker_count(3), 3);
        assert_eq!(config.worker_count(20), 8);
        assert_eq!(config.worker_count(0), 1);
    }

    #[test]
    fn test_invalid_config() {
        let config = ParallelBuildConfig::default().with_thread_pool_size(0);
        assert!(config.validate().is_err());

        let config = ParallelBuildConfig::default().with_loader(LoaderConfig {
            max_token_length: 0,
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"filter": {"hash_scheme": "double_hashing"}, "demo_query": "whale"}"#;
        let config: ParallelBuildConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.filter.hash_scheme, HashScheme::DoubleHashing);
        assert_eq!(config.filter.hash_function_count, 4);
        assert_eq!(config.demo_query, "whale");
        assert_eq!(config.loader, LoaderConfig::default());
    }
}
