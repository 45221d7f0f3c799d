//! Expanded query types.

use serde::{Deserialize, Serialize};

use crate::query::Query;
use crate::scoring::QueryTerm;

/// A term added by expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionTerm {
    pub term: String,
    /// EMIM association with `source_term`, in `[0, 1]`.
    pub association: f64,
    /// Multiplier applied to the term's log-probability when scoring.
    pub weight: f64,
    /// Original query term whose stage produced this term.
    pub source_term: String,
}

/// A query with its expansion terms.
///
/// Original terms are never removed and expansion terms never repeat an
/// original term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedQuery {
    pub query_id: String,
    pub original_terms: Vec<String>,
    pub expansion_terms: Vec<ExpansionTerm>,
}

impl ExpandedQuery {
    /// An expansion that adds nothing.
    pub fn identity(query: &Query) -> Self {
        ExpandedQuery {
            query_id: query.id.clone(),
            original_terms: query.terms.clone(),
            expansion_terms: Vec::new(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.expansion_terms.is_empty()
    }

    /// All terms, originals first.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.original_terms
            .iter()
            .map(String::as_str)
            .chain(self.expansion_terms.iter().map(|t| t.term.as_str()))
    }

    /// Terms as the scorer consumes them.
    pub fn query_terms(&self) -> Vec<QueryTerm> {
        self.original_terms
            .iter()
            .map(QueryTerm::unweighted)
            .chain(
                self.expansion_terms
                    .iter()
                    .map(|t| QueryTerm::new(t.term.clone(), t.weight)),
            )
            .collect()
    }
}
