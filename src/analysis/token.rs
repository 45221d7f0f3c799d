//! Tokens and token streams.
//!
//! # Examples
//!
//! ```
//! use djmir::analysis::token::Token;
//!
//! let token = Token::with_offsets("fever", 1, 4, 9);
//! assert_eq!(token.text, "fever");
//! assert_eq!(token.start_offset, 4);
//! assert!(!token.is_stopped());
//! ```

use serde::{Deserialize, Serialize};

/// A term candidate produced by a tokenizer and rewritten by filters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// Ordinal of the token in its source text.
    pub position: usize,
    /// Byte range in the source text.
    pub start_offset: usize,
    pub end_offset: usize,
    /// Set by stop filters; stopped tokens never become index or query terms.
    pub stopped: bool,
}

impl Token {
    /// A token without source offsets, mostly useful in tests.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Self::with_offsets(text, position, 0, 0)
    }

    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
            stopped: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Mark the token as stopped.
    pub fn stop(self) -> Self {
        Token {
            stopped: true,
            ..self
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Same token with new text; position and offsets are kept.
    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        Token {
            text: text.into(),
            ..self
        }
    }
}

/// Boxed iterator handed from one analysis stage to the next.
pub type TokenStream = Box<dyn Iterator<Item = Token> + Send>;
