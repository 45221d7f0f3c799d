//! Controlled-vocabulary query expansion.
//!
//! Expansion runs one stage per original query term: the term's related
//! entries in the controlled vocabulary are scored against it with the EMIM
//! association measure, and the strongest few survive. The vocabulary is
//! never scanned as a whole.

use crate::error::Result;
use crate::query::Query;

pub mod association;
pub mod staged;
pub mod types;
pub mod vocabulary;

pub use association::EmimScorer;
pub use staged::StagedQueryExpansion;
pub use types::{ExpandedQuery, ExpansionTerm};
pub use vocabulary::ControlledVocabulary;

/// Query expansion strategy.
pub trait QueryExpander: Send + Sync {
    /// Expand a query. The result always contains the original terms.
    fn expand(&self, query: &Query) -> Result<ExpandedQuery>;

    /// Get the name of this expander for debugging and logging.
    fn name(&self) -> &str;
}
