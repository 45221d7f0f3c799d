//! # djmir
//!
//! Batch document retrieval over an inverted index with a query-likelihood
//! scorer and controlled-vocabulary query expansion.
//!
//! ## Features
//!
//! - DJM scoring: Dirichlet and Jelinek-Mercer smoothing blended into one
//!   term probability, with a single tunable prior strength (mu)
//! - Automatic mu calibration on a seeded corpus sample
//! - Staged query expansion: per-term controlled-vocabulary lookup ranked by
//!   expected mutual information
//! - Parallel batch scoring with incremental TREC run output

pub mod analysis;
pub mod batch;
pub mod cancel;
pub mod cli;
pub mod config;
pub mod error;
pub mod expansion;
pub mod index;
pub mod query;
pub mod scoring;

pub mod prelude {
    pub use crate::analysis::analyzer::{Analyzer, StandardAnalyzer};
    pub use crate::batch::{BatchRunner, MemorySink, ResultSink, TrecResultWriter};
    pub use crate::cancel::CancellationToken;
    pub use crate::config::RetrievalConfig;
    pub use crate::error::{DjmirError, Result};
    pub use crate::expansion::{ControlledVocabulary, QueryExpander, StagedQueryExpansion};
    pub use crate::index::{IndexReader, MemoryIndex, MemoryIndexBuilder};
    pub use crate::query::{Query, QuerySet};
    pub use crate::scoring::{DjmScorer, MuTuner};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
