//! Token filters applied after tokenization.
//!
//! Filters rewrite token text (lowercasing, stemming) or drop tokens (stop
//! words). Positions assigned by the tokenizer are never renumbered.

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub mod lowercase;
pub mod stem;
pub mod stop;

pub use lowercase::LowercaseFilter;
pub use stem::{PorterStemmer, StemFilter, Stemmer};
pub use stop::StopFilter;

/// One stage of an analysis pipeline.
pub trait Filter: Send + Sync {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    fn name(&self) -> &'static str;
}
