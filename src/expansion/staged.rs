//! Staged query expansion.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use djmir::config::ExpansionConfig;
//! use djmir::expansion::{ControlledVocabulary, QueryExpander, StagedQueryExpansion};
//! use djmir::index::MemoryIndexBuilder;
//! use djmir::query::Query;
//!
//! let mut builder = MemoryIndexBuilder::new();
//! builder.add_document("d1", ["fever", "pyrexia"]);
//! builder.add_document("d2", ["fever", "pyrexia"]);
//! builder.add_document("d3", ["cough"]);
//! builder.add_document("d4", ["rash"]);
//! let index = builder.build();
//!
//! let vocabulary = Arc::new(ControlledVocabulary::from_analyzed_groups(vec![vec![
//!     "fever".to_string(),
//!     "pyrexia".to_string(),
//! ]]));
//! let expansion = StagedQueryExpansion::new(&index, vocabulary, ExpansionConfig::default());
//!
//! let expanded = expansion.expand(&Query::from_terms("Q1", ["fever"])).unwrap();
//! assert_eq!(expanded.terms().collect::<Vec<_>>(), vec!["fever", "pyrexia"]);
//! ```

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use log::debug;

use crate::config::ExpansionConfig;
use crate::error::Result;
use crate::expansion::QueryExpander;
use crate::expansion::association::EmimScorer;
use crate::expansion::types::{ExpandedQuery, ExpansionTerm};
use crate::expansion::vocabulary::ControlledVocabulary;
use crate::index::IndexReader;
use crate::query::Query;

/// Expands each query term with its strongest vocabulary neighbours.
#[derive(Debug)]
pub struct StagedQueryExpansion<'a> {
    vocabulary: Arc<ControlledVocabulary>,
    association: EmimScorer<'a>,
    config: ExpansionConfig,
}

impl<'a> StagedQueryExpansion<'a> {
    pub fn new(
        index: &'a dyn IndexReader,
        vocabulary: Arc<ControlledVocabulary>,
        config: ExpansionConfig,
    ) -> Self {
        StagedQueryExpansion {
            vocabulary,
            association: EmimScorer::new(index).with_cache(),
            config,
        }
    }

    pub fn vocabulary(&self) -> &ControlledVocabulary {
        &self.vocabulary
    }

    /// One stage: the top-K candidates for `term`, strongest first.
    fn stage(&self, term: &str, originals: &AHashSet<&str>) -> Result<Vec<ExpansionTerm>> {
        let mut scored = Vec::new();
        for candidate in self.vocabulary.lookup(term) {
            if originals.contains(candidate.as_str()) {
                continue;
            }
            let association = self.association.associate(term, candidate)?;
            if association > self.config.min_association {
                scored.push((candidate, association));
            }
        }

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        scored.truncate(self.config.expansions_per_term);

        Ok(scored
            .into_iter()
            .map(|(candidate, association)| ExpansionTerm {
                term: candidate.clone(),
                association,
                weight: if self.config.weighted { association } else { 1.0 },
                source_term: term.to_string(),
            })
            .collect())
    }
}

impl QueryExpander for StagedQueryExpansion<'_> {
    fn expand(&self, query: &Query) -> Result<ExpandedQuery> {
        let mut expanded = ExpandedQuery::identity(query);
        if self.vocabulary.is_empty() || self.config.expansions_per_term == 0 {
            return Ok(expanded);
        }

        let originals: AHashSet<&str> = query.terms.iter().map(String::as_str).collect();
        let mut positions: AHashMap<String, usize> = AHashMap::new();

        for term in &query.terms {
            let stage = self.stage(term, &originals)?;
            debug!(
                "Query {}: stage '{}' kept {:?}",
                query.id,
                term,
                stage.iter().map(|t| t.term.as_str()).collect::<Vec<_>>()
            );

            for candidate in stage {
                match positions.get(&candidate.term) {
                    Some(&pos) => {
                        let existing = &mut expanded.expansion_terms[pos];
                        if candidate.association > existing.association {
                            *existing = candidate;
                        }
                    }
                    None => {
                        positions.insert(candidate.term.clone(), expanded.expansion_terms.len());
                        expanded.expansion_terms.push(candidate);
                    }
                }
            }
        }

        Ok(expanded)
    }

    fn name(&self) -> &str {
        "staged_emim"
    }
}
