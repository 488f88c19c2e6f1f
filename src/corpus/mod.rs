//! Corpus access and ingestion.
//!
//! - [`provider`] - resolving corpus names to byte streams
//! - [`loader`] - tokenizing, deduplicating and timing a read

pub mod loader;
pub mod provider;

pub use loader::{CorpusLoader, DedupStrategy, LoadedCorpus, LoaderConfig, UniqueTokenSet};
pub use provider::{CorpusProvider, FileCorpusProvider, MemoryCorpusProvider};

/// Corpora processed when none are named.
pub const DEFAULT_CORPORA: [&str; 3] = ["MOBY_DICK.txt", "LITTLE_WOMEN.txt", "SHAKESPEARE.txt"];
