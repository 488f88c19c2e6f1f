//! Tokenizers that turn a corpus byte stream into tokens.
//!
//! # Examples
//!
//! ```
//! use lexbloom::analysis::tokenizer::Tokenizer;
//! use lexbloom::analysis::tokenizer::whitespace::WhitespaceTokenizer;
//!
//! let tokenizer = WhitespaceTokenizer::new();
//! let tokens: Vec<_> = tokenizer
//!     .tokenize(Box::new("Hello  world".as_bytes()))
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(tokens.len(), 2);
//! ```

pub mod whitespace;

use std::io::BufRead;

use crate::analysis::token::TokenStream;

/// Trait for tokenizers that read tokens from a buffered source.
///
/// The returned stream is lazy: tokens are produced as the source is read, and
/// a read failure surfaces as an `Err` item.
pub trait Tokenizer: Send + Sync {
    /// Tokenize everything readable from `reader`.
    fn tokenize<'a>(&self, reader: Box<dyn BufRead + 'a>) -> TokenStream<'a>;

    /// Get the name of this tokenizer.
    fn name(&self) -> &'static str;
}
