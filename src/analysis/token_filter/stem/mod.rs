//! Suffix stripping.
//!
//! Stemming maps inflected forms to one term ("headaches", "headache" ->
//! "headach") so that a query word matches every form used in documents and
//! in the controlled vocabulary.

use std::sync::Arc;

use super::Filter;
use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

pub mod porter;

pub use porter::PorterStemmer;

/// A word-level stemming algorithm.
pub trait Stemmer: Send + Sync {
    fn stem(&self, word: &str) -> String;

    fn name(&self) -> &'static str;
}

/// Replaces each live token's text with its stem.
#[derive(Clone)]
pub struct StemFilter {
    stemmer: Arc<dyn Stemmer>,
}

impl StemFilter {
    /// Porter stemming.
    pub fn new() -> Self {
        Self::with_stemmer(Arc::new(PorterStemmer::new()))
    }

    pub fn with_stemmer(stemmer: Arc<dyn Stemmer>) -> Self {
        StemFilter { stemmer }
    }
}

impl Default for StemFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StemFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StemFilter").field(&self.stemmer.name()).finish()
    }
}

impl Filter for StemFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let stemmer = Arc::clone(&self.stemmer);
        Ok(Box::new(tokens.map(move |token: Token| {
            if token.is_stopped() {
                return token;
            }
            let stem = stemmer.stem(&token.text);
            token.with_text(stem)
        })))
    }

    fn name(&self) -> &'static str {
        "stem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stems_live_tokens_only() {
        let tokens = vec![
            Token::new("headaches", 0),
            Token::new("flies", 1),
            Token::new("running", 2).stop(),
        ];

        let stemmed: Vec<Token> = StemFilter::new()
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .collect();

        assert_eq!(stemmed[0].text, "headach");
        assert_eq!(stemmed[1].text, "fli");
        assert_eq!(stemmed[2].text, "running");
        assert!(stemmed[2].is_stopped());
    }

    struct Truncate;

    impl Stemmer for Truncate {
        fn stem(&self, word: &str) -> String {
            word.chars().take(4).collect()
        }

        fn name(&self) -> &'static str {
            "truncate"
        }
    }

    #[test]
    fn test_custom_stemmer() {
        let filter = StemFilter::with_stemmer(Arc::new(Truncate));
        let stemmed: Vec<Token> = filter
            .filter(Box::new(vec![Token::new("pyrexia", 0)].into_iter()))
            .unwrap()
            .collect();
        assert_eq!(stemmed[0].text, "pyre");
        assert_eq!(format!("{filter:?}"), "StemFilter(\"truncate\")");
    }
}
