//! Command implementations for the lexbloom CLI.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use crate::bloom::FilterOptions;
use crate::bloom::sizing::{
    MAX_REFINE_ITEMS, estimate_bit_array_size, false_positive_rate, refine_bit_array_size,
};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::corpus::{CorpusLoader, CorpusProvider, DEFAULT_CORPORA, FileCorpusProvider};
use crate::error::{LexbloomError, Result};
use crate::parallel_build::task::{CorpusPipeline, CorpusTask, PipelineOutcome};
use crate::parallel_build::{ParallelBuildConfig, ParallelBuildEngine};

/// Execute a CLI command.
pub fn execute_command(args: LexbloomArgs) -> Result<()> {
    match &args.command {
        Command::Build(build_args) => build_filters(build_args.clone(), &args),
        Command::Size(size_args) => size_filter(size_args.clone(), &args),
        Command::Query(query_args) => query_corpus(query_args.clone(), &args),
    }
}

/// Load a configuration file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<ParallelBuildConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            let config: ParallelBuildConfig = serde_json::from_str(&text)?;
            debug!("loaded configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(ParallelBuildConfig::default()),
    }
}

/// Apply command line overrides on top of a configuration.
pub fn apply_filter_args(config: &mut ParallelBuildConfig, filter: &FilterArgs) {
    if let Some(rate) = filter.false_positive_rate {
        config.filter.target_false_positive_rate = rate;
    }
    if let Some(k) = filter.hash_functions {
        config.filter.hash_function_count = k;
    }
    if let Some(scheme) = filter.hash_scheme {
        config.filter.hash_scheme = scheme;
    }
    if let Some(max_token_length) = filter.max_token_length {
        config.loader.max_token_length = max_token_length;
    }
    if let Some(dedup) = filter.dedup {
        config.loader.dedup = dedup;
    }
    if let Some(limit) = filter.memory_limit {
        config.loader.memory_limit = Some(limit);
    }
}

fn provider_for(root: Option<PathBuf>) -> FileCorpusProvider {
    match root {
        Some(root) => FileCorpusProvider::with_root(root),
        None => FileCorpusProvider::new(),
    }
}

/// Build one filter per corpus.
fn build_filters(args: BuildArgs, cli_args: &LexbloomArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    apply_filter_args(&mut config, &args.filter);
    if let Some(threads) = args.threads {
        config.thread_pool_size = Some(threads);
    }
    if let Some(mode) = args.mode {
        config.execution_mode = mode;
    }
    if let Some(query) = args.query {
        config.demo_query = query;
    }

    let corpora: Vec<String> = if args.corpora.is_empty() {
        DEFAULT_CORPORA.iter().map(|name| name.to_string()).collect()
    } else {
        args.corpora
    };

    let provider: Arc<dyn CorpusProvider> = Arc::new(provider_for(args.root));
    let engine = ParallelBuildEngine::new(config, provider)?;
    let mut sink = report_sink(cli_args);
    let summary = engine.run_all(&corpora, sink.as_mut())?;

    if summary.aggregate.corpora_built == 0 && !corpora.is_empty() {
        return Err(LexbloomError::other("no corpus could be processed"));
    }
    Ok(())
}

/// Compute the bit array size for a unique item count.
fn size_filter(args: SizeArgs, cli_args: &LexbloomArgs) -> Result<()> {
    output_result("Bit array size", &size_result(&args)?, cli_args)
}

/// Sizing figures for `args`. Refinement is refused past [`MAX_REFINE_ITEMS`].
pub fn size_result(args: &SizeArgs) -> Result<SizeResult> {
    let options = FilterOptions {
        target_false_positive_rate: args.false_positive_rate,
        hash_function_count: args.hash_functions,
        ..Default::default()
    };
    options.validate()?;

    if args.refine && args.unique_count > MAX_REFINE_ITEMS {
        return Err(LexbloomError::invalid_argument(format!(
            "--refine steps one bit at a time and is limited to {MAX_REFINE_ITEMS} items, got {}",
            args.unique_count
        )));
    }

    let m = estimate_bit_array_size(args.unique_count, args.false_positive_rate);
    let refined = args.refine.then(|| {
        refine_bit_array_size(
            args.unique_count,
            args.false_positive_rate,
            args.hash_functions,
        )
    });

    Ok(SizeResult {
        unique_count: args.unique_count,
        target_false_positive_rate: args.false_positive_rate,
        hash_function_count: args.hash_functions,
        bit_array_size: m,
        false_positive_rate_estimate: false_positive_rate(
            m,
            args.unique_count,
            args.hash_functions,
        ),
        refined_bit_array_size: refined,
    })
}

/// Build a filter for one corpus and look up the given words.
fn query_corpus(args: QueryArgs, cli_args: &LexbloomArgs) -> Result<()> {
    let mut config = ParallelBuildConfig::default();
    apply_filter_args(&mut config, &args.filter);
    config.validate()?;

    let provider = provider_for(args.root);
    let pipeline = CorpusPipeline::new(
        CorpusLoader::new(config.loader),
        config.filter,
        config.demo_query,
    );
    let result = match pipeline.run(CorpusTask::new(args.corpus), &provider) {
        PipelineOutcome::Built(result) => result,
        PipelineOutcome::Failed(failure) => return Err(failure.error),
    };

    let matches = args
        .words
        .into_iter()
        .map(|word| WordMatch {
            possibly_present: result.filter.contains(&word),
            word,
        })
        .collect();

    output_result(
        "Lookup results",
        &QueryResult {
            corpus: result.corpus_name.clone(),
            unique_count: result.unique_count,
            bit_array_size: result.config.bit_array_size,
            bits_set: result.filter.count_ones(),
            matches,
        },
        cli_args,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bloom::HashScheme;

    #[test]
    fn test_apply_filter_args() {
        let mut config = ParallelBuildConfig::default();
        apply_filter_args(
            &mut config,
            &FilterArgs {
                false_positive_rate: Some(0.01),
                hash_scheme: Some(HashScheme::DoubleHashing),
                memory_limit: Some(1024),
                ..Default::default()
            },
        );
        assert_eq!(config.filter.target_false_positive_rate, 0.01);
        assert_eq!(config.filter.hash_function_count, 4);
        assert_eq!(config.filter.hash_scheme, HashScheme::DoubleHashing);
        assert_eq!(config.loader.memory_limit, Some(1024));
    }

    fn size_args(unique_count: usize, refine: bool) -> SizeArgs {
        SizeArgs {
            unique_count,
            false_positive_rate: 0.05,
            hash_functions: 4,
            refine,
        }
    }

    #[test]
    fn test_size_result() {
        let result = size_result(&size_args(3, true)).unwrap();
        assert_eq!(result.bit_array_size, 19);
        let refined = result.refined_bit_array_size.unwrap();
        assert!(false_positive_rate(refined, 3, 4) <= 0.05);

        let result = size_result(&size_args(3, false)).unwrap();
        assert_eq!(result.refined_bit_array_size, None);
    }

    #[test]
    fn test_refine_refused_for_large_counts() {
        assert!(matches!(
            size_result(&size_args(MAX_REFINE_ITEMS + 1, true)),
            Err(LexbloomError::InvalidArgument(_))
        ));
        let result = size_result(&size_args(1_000_000_000, false)).unwrap();
        assert_eq!(
            result.bit_array_size,
            estimate_bit_array_size(1_000_000_000, 0.05)
        );
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexbloom.json");
        fs::write(&path, r#"{"thread_pool_size": 2, "execution_mode": "sequential"}"#).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.thread_pool_size, Some(2));
        assert_eq!(
            config.execution_mode,
            crate::parallel_build::ExecutionMode::Sequential
        );
        assert_eq!(config.demo_query, "geohash");

        assert_eq!(load_config(None).unwrap(), ParallelBuildConfig::default());
    }

    #[test]
    fn test_load_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_config(Some(&dir.path().join("missing.json"))),
            Err(LexbloomError::Io(_))
        ));

        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_config(Some(&path)), Err(LexbloomError::Json(_))));
    }
}
