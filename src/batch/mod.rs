//! Batch retrieval: queries in, ranked result lines out.

pub mod output;
pub mod runner;

pub use output::{
    MemorySink, RankedResult, ResultSink, TrecResultWriter, write_expanded_queries,
};
pub use runner::{BatchRunner, BatchSummary, QueryResult};
