//! Streaming corpus ingestion with order-preserving deduplication.

use std::io::BufRead;
use std::time::{Duration, Instant};

use ahash::AHashSet;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::token::{DEFAULT_MAX_TOKEN_LENGTH, Token};
use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;
use crate::corpus::provider::CorpusProvider;
use crate::error::{LexbloomError, Result};

/// How duplicate tokens are detected during ingestion.
///
/// Both strategies yield the same unique set in the same order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum DedupStrategy {
    /// Hash set lookup beside the ordered list.
    #[default]
    Hashed,

    /// Compare against every token seen so far. Quadratic in corpus size.
    LinearScan,
}

/// Configuration for corpus loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Maximum token length in characters; longer runs are clipped.
    pub max_token_length: usize,

    /// Duplicate detection strategy.
    pub dedup: DedupStrategy,

    /// Upper bound on the bytes of unique token text retained per corpus.
    /// Exceeding it fails the load with an allocation error.
    pub memory_limit: Option<usize>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_token_length: DEFAULT_MAX_TOKEN_LENGTH,
            dedup: DedupStrategy::default(),
            memory_limit: None,
        }
    }
}

impl LoaderConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_token_length == 0 {
            return Err(LexbloomError::invalid_config(
                "max token length must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Unique tokens of a corpus in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct UniqueTokenSet {
    tokens: Vec<Token>,
    seen: AHashSet<Token>,
    strategy: DedupStrategy,
    retained_bytes: usize,
    memory_limit: Option<usize>,
}

impl UniqueTokenSet {
    /// Create an empty set using `strategy`.
    pub fn new(strategy: DedupStrategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    /// Limit the bytes of token text the set may retain.
    pub fn with_memory_limit(mut self, limit: Option<usize>) -> Self {
        self.memory_limit = limit;
        self
    }

    /// Add `token` if it has not been seen. Returns whether it was new.
    ///
    /// Fails with an allocation error if storage cannot grow or the memory
    /// limit would be exceeded.
    pub fn insert(&mut self, token: Token) -> Result<bool> {
        if self.contains(&token) {
            return Ok(false);
        }

        let retained = self.retained_bytes + token.len();
        if let Some(limit) = self.memory_limit {
            if retained > limit {
                return Err(LexbloomError::allocation(format!(
                    "unique tokens need {retained} bytes, limit is {limit}"
                )));
            }
        }

        self.tokens.try_reserve(1)?;
        if self.strategy == DedupStrategy::Hashed {
            self.seen.try_reserve(1)?;
            self.seen.insert(token.clone());
        }
        self.tokens.push(token);
        self.retained_bytes = retained;
        Ok(true)
    }

    /// Check whether `token` is in the set, comparing raw bytes.
    pub fn contains<T: AsRef<[u8]> + ?Sized>(&self, token: &T) -> bool {
        let bytes = token.as_ref();
        match self.strategy {
            DedupStrategy::Hashed => self.seen.contains(bytes),
            DedupStrategy::LinearScan => self.tokens.iter().any(|t| t.as_bytes() == bytes),
        }
    }

    /// Number of unique tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens in first-seen order.
    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    /// Iterate over token bytes in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.tokens.iter().map(Token::as_bytes)
    }

    /// Bytes of token data held.
    pub fn retained_bytes(&self) -> usize {
        self.retained_bytes
    }

    /// Consume the set, returning tokens in first-seen order.
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}

/// Output of loading one corpus.
#[derive(Debug, Clone)]
pub struct LoadedCorpus {
    /// Unique tokens, first-seen order.
    pub unique: UniqueTokenSet,

    /// Count of every token read, duplicates included.
    pub total_tokens: usize,

    /// Wall time spent reading and deduplicating.
    pub read_duration: Duration,
}

impl LoadedCorpus {
    /// Number of unique tokens.
    pub fn unique_count(&self) -> usize {
        self.unique.len()
    }
}

/// Reads a corpus into a [`UniqueTokenSet`].
#[derive(Debug, Clone)]
pub struct CorpusLoader {
    tokenizer: WhitespaceTokenizer,
    config: LoaderConfig,
}

impl Default for CorpusLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl CorpusLoader {
    /// Create a loader with the given configuration.
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            tokenizer: WhitespaceTokenizer::new().with_max_token_length(config.max_token_length),
            config,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Read every token from `reader`, keeping the first occurrence of each.
    ///
    /// On failure all partial state is dropped.
    pub fn load<'a>(&self, reader: Box<dyn BufRead + 'a>) -> Result<LoadedCorpus> {
        let start = Instant::now();
        let mut unique =
            UniqueTokenSet::new(self.config.dedup).with_memory_limit(self.config.memory_limit);
        let mut total_tokens = 0usize;

        for token in self.tokenizer.tokenize(reader) {
            total_tokens += 1;
            unique.insert(token?)?;
        }

        let read_duration = start.elapsed();
        debug!(
            "loaded {} tokens ({} unique) in {:?} using {} tokenizer",
            total_tokens,
            unique.len(),
            read_duration,
            self.tokenizer.name()
        );

        Ok(LoadedCorpus {
            unique,
            total_tokens,
            read_duration,
        })
    }

    /// Open `name` through `provider` and load it.
    ///
    /// Opening is not part of the timed read.
    pub fn load_from(&self, provider: &dyn CorpusProvider, name: &str) -> Result<LoadedCorpus> {
        let reader = provider.open(name)?;
        self.load(reader)
    }
}
