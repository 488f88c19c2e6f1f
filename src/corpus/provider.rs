//! Corpus sources.
//!
//! A [`CorpusProvider`] resolves a corpus name to a readable byte stream. The
//! loader does not care where the bytes come from.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ahash::AHashMap;

use crate::error::Result;

/// Trait for resolving corpus names to token sources.
///
/// Implementations are shared between worker threads.
pub trait CorpusProvider: Send + Sync {
    /// Open the named corpus for reading.
    ///
    /// Fails with [`crate::error::LexbloomError::Io`] when the name cannot be
    /// resolved or opened.
    fn open(&self, name: &str) -> Result<Box<dyn BufRead + Send>>;
}

/// Provider reading corpora from the file system.
///
/// Relative names are resolved against `root` when one is set.
#[derive(Debug, Clone, Default)]
pub struct FileCorpusProvider {
    root: Option<PathBuf>,
}

impl FileCorpusProvider {
    /// Create a provider resolving names against the working directory.
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Create a provider resolving names against `root`.
    pub fn with_root<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Path a corpus name resolves to.
    pub fn resolve(&self, name: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(name),
            None => Path::new(name).to_path_buf(),
        }
    }
}

impl CorpusProvider for FileCorpusProvider {
    fn open(&self, name: &str) -> Result<Box<dyn BufRead + Send>> {
        let path = self.resolve(name);
        let file = File::open(&path).map_err(|e| {
            io::Error::new(e.kind(), format!("cannot open {}: {e}", path.display()))
        })?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Provider serving corpora held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpusProvider {
    corpora: AHashMap<String, Arc<[u8]>>,
}

impl MemoryCorpusProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a corpus under `name`, replacing any previous one.
    pub fn insert<S: Into<String>, B: AsRef<[u8]>>(&mut self, name: S, contents: B) {
        self.corpora
            .insert(name.into(), Arc::from(contents.as_ref()));
    }

    /// Builder-style variant of [`MemoryCorpusProvider::insert`].
    pub fn with_corpus<S: Into<String>, B: AsRef<[u8]>>(mut self, name: S, contents: B) -> Self {
        self.insert(name, contents);
        self
    }

    /// Number of registered corpora.
    pub fn len(&self) -> usize {
        self.corpora.len()
    }

    /// Check if no corpus is registered.
    pub fn is_empty(&self) -> bool {
        self.corpora.is_empty()
    }
}

impl CorpusProvider for MemoryCorpusProvider {
    fn open(&self, name: &str) -> Result<Box<dyn BufRead + Send>> {
        let contents = self.corpora.get(name).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no corpus named {name}"))
        })?;
        Ok(Box::new(Cursor::new(contents)))
    }
}
