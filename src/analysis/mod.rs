//! Text analysis for corpus ingestion.
//!
//! Corpora are split into bounded whitespace-delimited tokens before they are
//! deduplicated and inserted into a filter.

pub mod token;
pub mod tokenizer;

pub use token::*;
pub use tokenizer::*;
