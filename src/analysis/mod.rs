//! Text analysis for documents, queries and vocabulary entries.
//!
//! Raw text flows through a tokenizer and a chain of token filters. The same
//! English pipeline (word tokenizer, lowercase, stop words, Porter stemming) is
//! applied to corpus documents, query text and controlled-vocabulary surface
//! terms so that all three meet in the same term space.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

// Re-export commonly used types
pub use analyzer::*;
pub use token::*;
pub use token_filter::*;
pub use tokenizer::*;
