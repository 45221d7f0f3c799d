//! DJM scorer: query likelihood with blended Dirichlet/Jelinek-Mercer smoothing.
//!
//! The scorer owns the single tunable parameter mu behind a read/write lock.
//! Scoring calls take the read side once per query, so a ranking never sees
//! two different values; [`DjmScorer::set_mu`] takes the write side and waits
//! for in-flight rankings to finish.
//!
//! # Examples
//!
//! ```
//! use djmir::cancel::CancellationToken;
//! use djmir::index::MemoryIndexBuilder;
//! use djmir::scoring::{DjmScorer, unweighted_terms};
//!
//! let mut builder = MemoryIndexBuilder::new();
//! builder.add_document("d1", ["fever", "headach"]);
//! builder.add_document("d2", ["fever", "cough"]);
//! builder.add_document("d3", ["cough"]);
//! let index = builder.build();
//!
//! let scorer = DjmScorer::with_params(100.0, 0.15).unwrap();
//! let ranked = scorer
//!     .rank(&index, &unweighted_terms(["fever", "headach"]), &CancellationToken::new())
//!     .unwrap();
//!
//! assert_eq!(ranked.len(), 2);
//! assert_eq!(ranked[0].doc_id, 0);
//! ```

use ahash::AHashMap;
use log::debug;
use parking_lot::RwLock;
use rayon::prelude::*;

use crate::cancel::CancellationToken;
use crate::config::ScoringConfig;
use crate::error::{DjmirError, Result};
use crate::index::{DocId, IndexReader};
use crate::scoring::smoothing::{TermEvidence, term_probability};
use crate::scoring::{QueryTerm, ScoredDocument, sort_ranked};

/// A query term resolved against the collection.
#[derive(Debug, Clone)]
struct ResolvedTerm {
    weight: f64,
    collection_probability: f64,
    frequencies: AHashMap<DocId, u64>,
}

/// Document scorer with a shared, tunable mu.
#[derive(Debug)]
pub struct DjmScorer {
    mu: RwLock<f64>,
    lambda: f64,
}

impl DjmScorer {
    /// Create a scorer from configuration.
    pub fn new(config: &ScoringConfig) -> Result<Self> {
        Self::with_params(config.mu, config.lambda)
    }

    /// Create a scorer with explicit parameters.
    pub fn with_params(mu: f64, lambda: f64) -> Result<Self> {
        validate_mu(mu)?;
        if !(lambda > 0.0 && lambda <= 1.0) {
            return Err(DjmirError::invalid_argument(format!(
                "lambda must be in (0, 1], got {lambda}"
            )));
        }
        Ok(DjmScorer {
            mu: RwLock::new(mu),
            lambda,
        })
    }

    /// Current mu.
    pub fn mu(&self) -> f64 {
        *self.mu.read()
    }

    /// Install a new mu. Blocks until in-flight rankings release the lock.
    pub fn set_mu(&self, mu: f64) -> Result<()> {
        validate_mu(mu)?;
        let mut guard = self.mu.write();
        debug!("Setting mu: {} -> {}", *guard, mu);
        *guard = mu;
        Ok(())
    }

    /// Fixed Jelinek-Mercer weight.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// DJM probability of a term under the current mu.
    pub fn term_probability(&self, evidence: &TermEvidence) -> f64 {
        term_probability(evidence, self.mu(), self.lambda)
    }

    /// Score one document. Terms absent from the collection are skipped.
    pub fn score(&self, index: &dyn IndexReader, terms: &[QueryTerm], doc_id: DocId) -> Result<f64> {
        let mu_guard = self.mu.read();
        let mu = *mu_guard;
        let doc_length = index.document_length(doc_id)?;
        let vector: AHashMap<String, u64> = index.document_vector(doc_id)?.into_iter().collect();
        let collection_length = index.collection_length();

        let mut score = 0.0;
        for query_term in terms {
            let cf = index.collection_frequency(&query_term.term);
            if cf == 0 {
                continue;
            }
            let evidence = TermEvidence::new(
                vector.get(&query_term.term).copied().unwrap_or(0),
                doc_length,
                cf as f64 / collection_length as f64,
            );
            score += query_term.weight * term_probability(&evidence, mu, self.lambda).ln();
        }
        drop(mu_guard);
        Ok(score)
    }

    /// Score every document sharing at least one term with the query.
    ///
    /// Documents are scored in parallel on the current rayon pool. Results are
    /// sorted by descending score with ties broken by ascending document id.
    pub fn rank(
        &self,
        index: &dyn IndexReader,
        terms: &[QueryTerm],
        cancel: &CancellationToken,
    ) -> Result<Vec<ScoredDocument>> {
        // Held for the whole ranking so every document sees the same mu.
        let mu_guard = self.mu.read();
        let mu = *mu_guard;
        let resolved = resolve_terms(index, terms)?;

        let mut candidates: Vec<DocId> = resolved
            .iter()
            .flat_map(|term| term.frequencies.keys().copied())
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        let mut results = candidates
            .par_iter()
            .map(|&doc_id| {
                cancel.check("scoring documents")?;
                let doc_length = index.document_length(doc_id)?;
                let score = resolved
                    .iter()
                    .map(|term| {
                        let evidence = TermEvidence::new(
                            term.frequencies.get(&doc_id).copied().unwrap_or(0),
                            doc_length,
                            term.collection_probability,
                        );
                        term.weight * term_probability(&evidence, mu, self.lambda).ln()
                    })
                    .sum::<f64>();
                Ok(ScoredDocument::new(doc_id, score))
            })
            .collect::<Result<Vec<_>>>()?;

        drop(mu_guard);

        sort_ranked(&mut results);
        Ok(results)
    }
}

fn validate_mu(mu: f64) -> Result<()> {
    if mu.is_finite() && mu >= 0.0 {
        Ok(())
    } else {
        Err(DjmirError::invalid_argument(format!(
            "mu must be a non-negative number, got {mu}"
        )))
    }
}

fn resolve_terms(index: &dyn IndexReader, terms: &[QueryTerm]) -> Result<Vec<ResolvedTerm>> {
    let collection_length = index.collection_length();
    let mut resolved = Vec::with_capacity(terms.len());

    for query_term in terms {
        let cf = index.collection_frequency(&query_term.term);
        if cf == 0 {
            debug!("Term '{}' not in collection, skipped", query_term.term);
            continue;
        }
        let frequencies = index
            .postings(&query_term.term)?
            .into_iter()
            .map(|posting| (posting.doc_id, posting.term_freq))
            .collect();
        resolved.push(ResolvedTerm {
            weight: query_term.weight,
            collection_probability: cf as f64 / collection_length as f64,
            frequencies,
        });
    }

    Ok(resolved)
}
