//! Splitting raw text into tokens.

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub mod regex;

pub use regex::RegexTokenizer;

/// First stage of an analyzer: text in, positioned tokens out.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Short identifier shown in analyzer debug output.
    fn name(&self) -> &'static str;
}
