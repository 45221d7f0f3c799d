//! Language-model document scoring and mu calibration.

use serde::{Deserialize, Serialize};

use crate::index::DocId;

pub mod djm;
pub mod smoothing;
pub mod tuner;

pub use djm::DjmScorer;
pub use smoothing::{Smoothing, TermEvidence, blend, term_probability};
pub use tuner::{MuTuner, TuningReport};

/// A query term with the multiplier applied to its log-probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryTerm {
    pub term: String,
    pub weight: f64,
}

impl QueryTerm {
    pub fn new(term: impl Into<String>, weight: f64) -> Self {
        QueryTerm {
            term: term.into(),
            weight,
        }
    }

    /// A term with weight 1.0.
    pub fn unweighted(term: impl Into<String>) -> Self {
        Self::new(term, 1.0)
    }
}

/// Turn plain terms into unweighted query terms.
pub fn unweighted_terms<I, S>(terms: I) -> Vec<QueryTerm>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    terms.into_iter().map(QueryTerm::unweighted).collect()
}

/// A document and its score for one query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub doc_id: DocId,
    pub score: f64,
}

impl ScoredDocument {
    pub fn new(doc_id: DocId, score: f64) -> Self {
        ScoredDocument { doc_id, score }
    }
}

/// Sort by descending score, ties by ascending document id.
pub fn sort_ranked(results: &mut [ScoredDocument]) {
    results.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });
}
