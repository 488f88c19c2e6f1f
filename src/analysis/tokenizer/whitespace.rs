//! Whitespace tokenizer implementation.

use std::io::{BufRead, ErrorKind};

use super::Tokenizer;

use crate::analysis::token::{DEFAULT_MAX_TOKEN_LENGTH, Token, TokenStream};
use crate::error::Result;

/// Upper bound on the UTF-8 encoding of one character.
const MAX_CHAR_BYTES: usize = 4;

/// A tokenizer that splits a byte stream on ASCII whitespace.
///
/// Any run of non-whitespace bytes is a token, however malformed. Token bytes
/// are kept as read, and runs longer than `max_token_length` characters are
/// clipped. The source is scanned in buffer-sized chunks, so memory use is
/// bounded by the token length rather than the line length.
#[derive(Clone, Debug)]
pub struct WhitespaceTokenizer {
    max_token_length: usize,
}

impl Default for WhitespaceTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl WhitespaceTokenizer {
    /// Create a new whitespace tokenizer with the default length bound.
    pub fn new() -> Self {
        WhitespaceTokenizer {
            max_token_length: DEFAULT_MAX_TOKEN_LENGTH,
        }
    }

    /// Set the maximum token length in characters.
    pub fn with_max_token_length(mut self, max_token_length: usize) -> Self {
        self.max_token_length = max_token_length;
        self
    }

    /// Maximum token length in characters.
    pub fn max_token_length(&self) -> usize {
        self.max_token_length
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize<'a>(&self, reader: Box<dyn BufRead + 'a>) -> TokenStream<'a> {
        Box::new(WhitespaceTokens {
            reader,
            max_token_length: self.max_token_length,
            byte_limit: self.max_token_length.saturating_mul(MAX_CHAR_BYTES),
            current: Vec::new(),
            done: false,
        })
    }

    fn name(&self) -> &'static str {
        "whitespace"
    }
}

/// Matches the C locale's `isspace`, which includes vertical tab.
fn is_separator(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}

struct WhitespaceTokens<'a> {
    reader: Box<dyn BufRead + 'a>,
    max_token_length: usize,
    /// Bytes kept per token; always enough for `max_token_length` characters.
    byte_limit: usize,
    current: Vec<u8>,
    done: bool,
}

impl WhitespaceTokens<'_> {
    /// Scan chunks until a token ends. Returns `None` at end of input.
    fn next_token(&mut self) -> Result<Option<Token>> {
        let mut in_token = false;
        self.current.clear();

        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if buf.is_empty() {
                break;
            }

            let mut consumed = 0;
            let mut finished = false;
            for &b in buf {
                consumed += 1;
                if is_separator(b) {
                    if in_token {
                        finished = true;
                        break;
                    }
                } else {
                    in_token = true;
                    if self.current.len() < self.byte_limit {
                        self.current.try_reserve(1)?;
                        self.current.push(b);
                    }
                }
            }
            self.reader.consume(consumed);

            if finished {
                break;
            }
        }

        if in_token {
            Ok(Some(Token::bounded(&self.current, self.max_token_length)))
        } else {
            Ok(None)
        }
    }
}

impl Iterator for WhitespaceTokens<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
