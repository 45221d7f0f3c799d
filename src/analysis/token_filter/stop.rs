//! Stop-word removal.
//!
//! Documents and queries share one English list, so a word dropped from one
//! is dropped from the other.
//!
//! # Examples
//!
//! ```
//! use djmir::analysis::token_filter::Filter;
//! use djmir::analysis::token_filter::stop::StopFilter;
//! use djmir::analysis::token::Token;
//!
//! let filter = StopFilter::new();
//! let tokens = vec![Token::new("the", 0), Token::new("fever", 1)];
//!
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(result.len(), 1);
//! assert_eq!(result[0].text, "fever");
//! ```

use std::sync::{Arc, LazyLock};

use ahash::AHashSet;

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "me",
    "more", "most", "my", "myself", "no", "nor", "not", "of", "off", "on", "once", "only", "or",
    "other", "ought", "our", "ours", "ourselves", "out", "over", "own", "same", "she", "should",
    "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why",
    "will", "with", "would", "you", "your", "yours", "yourself", "yourselves",
];

static ENGLISH_STOP_SET: LazyLock<Arc<AHashSet<String>>> = LazyLock::new(|| {
    Arc::new(DEFAULT_ENGLISH_STOP_WORDS.iter().map(|w| w.to_string()).collect())
});

/// Drops stop words from the stream.
///
/// Tokens already marked stopped by an earlier filter are passed on unchanged.
#[derive(Clone, Debug)]
pub struct StopFilter {
    words: Arc<AHashSet<String>>,
}

impl StopFilter {
    /// English function words.
    pub fn new() -> Self {
        StopFilter {
            words: Arc::clone(&ENGLISH_STOP_SET),
        }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StopFilter {
            words: Arc::new(words.into_iter().map(Into::into).collect()),
        }
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let words = Arc::clone(&self.words);
        Ok(Box::new(tokens.filter(move |token: &Token| {
            token.is_stopped() || !words.contains(token.text.as_str())
        })))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_list_keeps_positions() {
        let filter = StopFilter::from_words(["of", "with"]);
        let tokens = vec![
            Token::new("fever", 0),
            Token::new("with", 1),
            Token::new("loss", 2),
            Token::new("of", 3),
            Token::new("appetite", 4),
        ];

        let kept: Vec<Token> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();

        let kept: Vec<(&str, usize)> = kept.iter().map(|t| (t.text.as_str(), t.position)).collect();
        assert_eq!(kept, vec![("fever", 0), ("loss", 2), ("appetite", 4)]);
    }

    #[test]
    fn test_default_list() {
        let filter = StopFilter::new();
        assert!(filter.is_stop_word("with"));
        assert!(!filter.is_stop_word("fever"));
        assert!(!filter.is_empty());
    }
}
