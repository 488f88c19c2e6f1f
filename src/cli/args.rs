//! Command line argument parsing for the lexbloom CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::bloom::HashScheme;
use crate::corpus::DedupStrategy;
use crate::parallel_build::ExecutionMode;

/// lexbloom - per-corpus Bloom filters sized from unique word counts
#[derive(Parser, Debug, Clone)]
#[command(name = "lexbloom")]
#[command(about = "Build a Bloom filter per text corpus and report sizing statistics")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct LexbloomArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug, 4=trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl LexbloomArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build one filter per corpus and report statistics
    Build(BuildArgs),

    /// Compute the bit array size for a unique item count
    Size(SizeArgs),

    /// Build a filter for one corpus and look up words in it
    Query(QueryArgs),
}

/// Filter and loader overrides shared by commands that build filters.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Target false positive rate
    #[arg(long = "fp-rate", value_name = "RATE")]
    pub false_positive_rate: Option<f64>,

    /// Number of hash functions (k)
    #[arg(short = 'k', long = "hash-functions")]
    pub hash_functions: Option<usize>,

    /// Probe index derivation
    #[arg(long)]
    pub hash_scheme: Option<HashScheme>,

    /// Maximum token length in characters
    #[arg(long)]
    pub max_token_length: Option<usize>,

    /// Duplicate detection strategy
    #[arg(long)]
    pub dedup: Option<DedupStrategy>,

    /// Maximum bytes of unique token text retained per corpus
    #[arg(long, value_name = "BYTES")]
    pub memory_limit: Option<usize>,
}

/// Arguments for building filters
#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    /// Corpus names (defaults to MOBY_DICK.txt, LITTLE_WOMEN.txt, SHAKESPEARE.txt)
    #[arg(value_name = "CORPUS")]
    pub corpora: Vec<String>,

    /// Directory corpus names are resolved against
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Execution mode
    #[arg(short = 'm', long)]
    pub mode: Option<ExecutionMode>,

    /// Token looked up in every filter
    #[arg(long, value_name = "TOKEN")]
    pub query: Option<String>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Arguments for bit array sizing
#[derive(Parser, Debug, Clone)]
pub struct SizeArgs {
    /// Number of unique items
    #[arg(value_name = "N")]
    pub unique_count: usize,

    /// Target false positive rate
    #[arg(long = "fp-rate", value_name = "RATE", default_value = "0.05")]
    pub false_positive_rate: f64,

    /// Number of hash functions (k)
    #[arg(short = 'k', long = "hash-functions", default_value = "4")]
    pub hash_functions: usize,

    /// Also run the iterative search for the smallest sufficient size.
    /// Steps one bit at a time; refused above 1,000,000 items
    #[arg(long)]
    pub refine: bool,
}

/// Arguments for querying a single corpus
#[derive(Parser, Debug, Clone)]
pub struct QueryArgs {
    /// Corpus name
    #[arg(value_name = "CORPUS")]
    pub corpus: String,

    /// Words to look up
    #[arg(value_name = "WORD", required = true)]
    pub words: Vec<String>,

    /// Directory the corpus name is resolved against
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    Human,
    /// JSON lines
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args() {
        let args = LexbloomArgs::parse_from([
            "lexbloom",
            "-vv",
            "build",
            "a.txt",
            "b.txt",
            "--fp-rate",
            "0.01",
            "--hash-scheme",
            "double-hashing",
            "--threads",
            "2",
        ]);
        assert_eq!(args.verbosity(), 2);
        match args.command {
            Command::Build(build) => {
                assert_eq!(build.corpora, vec!["a.txt", "b.txt"]);
                assert_eq!(build.filter.false_positive_rate, Some(0.01));
                assert_eq!(build.filter.hash_scheme, Some(HashScheme::DoubleHashing));
                assert_eq!(build.threads, Some(2));
                assert_eq!(build.mode, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_quiet_overrides_verbose() {
        let args = LexbloomArgs::parse_from(["lexbloom", "-q", "-v", "size", "10"]);
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_size_defaults() {
        let args = LexbloomArgs::parse_from(["lexbloom", "--format", "json", "size", "3"]);
        assert_eq!(args.output_format, OutputFormat::Json);
        match args.command {
            Command::Size(size) => {
                assert_eq!(size.unique_count, 3);
                assert_eq!(size.false_positive_rate, 0.05);
                assert_eq!(size.hash_functions, 4);
                assert!(!size.refine);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_query_requires_words() {
        assert!(LexbloomArgs::try_parse_from(["lexbloom", "query", "a.txt"]).is_err());
    }
}
