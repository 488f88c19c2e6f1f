//! Token types for corpus analysis.
//!
//! A [`Token`] is one whitespace-delimited run read from a corpus, clipped to a
//! configurable maximum length. Token bytes are kept exactly as read, so two
//! runs that differ only in invalid UTF-8 stay distinct. Tokens are immutable
//! once created.
//!
//! # Examples
//!
//! ```
//! use lexbloom::analysis::token::Token;
//!
//! let token = Token::new("hello");
//! assert_eq!(token.text(), "hello");
//!
//! let clipped = Token::bounded(b"abcdef", 3);
//! assert_eq!(clipped.as_bytes(), b"abc");
//! ```

use std::borrow::{Borrow, Cow};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default maximum token length, in characters.
pub const DEFAULT_MAX_TOKEN_LENGTH: usize = 100;

/// A single token read from a corpus.
///
/// Equality and hashing consider the raw bytes. Cloning shares them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    bytes: Arc<[u8]>,
}

impl Token {
    /// Create a new token from raw bytes.
    pub fn new<B: AsRef<[u8]>>(bytes: B) -> Self {
        Token {
            bytes: Arc::from(bytes.as_ref()),
        }
    }

    /// Create a token clipped to at most `max_chars` characters.
    ///
    /// Valid UTF-8 is clipped on a character boundary; each invalid byte
    /// counts as one character.
    pub fn bounded(bytes: &[u8], max_chars: usize) -> Self {
        Token::new(&bytes[..clip_point(bytes, max_chars)])
    }

    /// The raw token bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The token text, with invalid UTF-8 replaced for display.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Length of the token in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the token is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consume the token, returning its shared bytes.
    pub fn into_bytes(self) -> Arc<[u8]> {
        self.bytes
    }
}

/// Byte offset just past the first `max_chars` characters of `bytes`.
fn clip_point(bytes: &[u8], max_chars: usize) -> usize {
    let mut chars = 0;
    let mut offset = 0;
    for chunk in bytes.utf8_chunks() {
        for (idx, _) in chunk.valid().char_indices() {
            if chars == max_chars {
                return offset + idx;
            }
            chars += 1;
        }
        offset += chunk.valid().len();
        for _ in chunk.invalid() {
            if chars == max_chars {
                return offset;
            }
            chars += 1;
            offset += 1;
        }
    }
    bytes.len()
}

impl AsRef<[u8]> for Token {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl Borrow<[u8]> for Token {
    fn borrow(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Type alias for a fallible stream of tokens.
pub type TokenStream<'a> = Box<dyn Iterator<Item = Result<Token>> + 'a>;
