//! The two smoothing estimators and the rule that combines them.
//!
//! Each estimator is a pure function of the term's evidence in one document.
//! The DJM probability of a term is the geometric mean of the Dirichlet and
//! Jelinek-Mercer estimates, so the document log-likelihood is the arithmetic
//! mean of the two log-likelihoods.
//!
//! # Examples
//!
//! ```
//! use djmir::scoring::smoothing::{Smoothing, TermEvidence, term_probability};
//!
//! let evidence = TermEvidence::new(2, 10, 0.01);
//! let dirichlet = Smoothing::Dirichlet { mu: 100.0 }.estimate(&evidence);
//! assert!((dirichlet - 3.0 / 110.0).abs() < 1e-12);
//!
//! let p = term_probability(&evidence, 100.0, 0.5);
//! assert!(p > 0.0 && p < 1.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::MIN_TERM_PROBABILITY;

/// Statistics of one term in one document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermEvidence {
    /// Occurrences of the term in the document.
    pub term_freq: u64,
    /// Document length in tokens.
    pub doc_length: u64,
    /// Relative frequency of the term in the collection.
    pub collection_probability: f64,
}

impl TermEvidence {
    pub fn new(term_freq: u64, doc_length: u64, collection_probability: f64) -> Self {
        TermEvidence {
            term_freq,
            doc_length,
            collection_probability,
        }
    }
}

/// A smoothing estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Smoothing {
    /// `(tf + mu * pc) / (|d| + mu)`
    Dirichlet { mu: f64 },
    /// `(1 - lambda) * tf / |d| + lambda * pc`
    JelinekMercer { lambda: f64 },
}

impl Smoothing {
    /// Estimate `P(t|d)`. An empty document falls back to the collection
    /// probability for both estimators.
    pub fn estimate(&self, evidence: &TermEvidence) -> f64 {
        let tf = evidence.term_freq as f64;
        let dl = evidence.doc_length as f64;
        let pc = evidence.collection_probability;

        match *self {
            Smoothing::Dirichlet { mu } => {
                let denominator = dl + mu;
                if denominator <= 0.0 {
                    pc
                } else {
                    (tf + mu * pc) / denominator
                }
            }
            Smoothing::JelinekMercer { lambda } => {
                if evidence.doc_length == 0 {
                    pc
                } else {
                    (1.0 - lambda) * tf / dl + lambda * pc
                }
            }
        }
    }
}

/// Combine the Dirichlet and Jelinek-Mercer estimates (geometric mean).
///
/// Each factor is rooted before multiplying so two small estimates do not
/// underflow to zero.
pub fn blend(dirichlet: f64, jelinek_mercer: f64) -> f64 {
    dirichlet.sqrt() * jelinek_mercer.sqrt()
}

/// DJM term probability.
///
/// The Dirichlet estimate of an absent term is zero when `mu = 0`, and can
/// underflow to zero for a subnormal mu. Any non-positive or non-finite
/// result is replaced by [`MIN_TERM_PROBABILITY`] so the log stays finite.
pub fn term_probability(evidence: &TermEvidence, mu: f64, lambda: f64) -> f64 {
    let p = blend(
        Smoothing::Dirichlet { mu }.estimate(evidence),
        Smoothing::JelinekMercer { lambda }.estimate(evidence),
    );
    if p > 0.0 && p.is_finite() {
        p
    } else {
        MIN_TERM_PROBABILITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_dirichlet_estimate() {
        let evidence = TermEvidence::new(3, 20, 0.001);
        let p = Smoothing::Dirichlet { mu: 1000.0 }.estimate(&evidence);
        assert!((p - (3.0 + 1.0) / 1020.0).abs() < EPS);
    }

    #[test]
    fn test_jelinek_mercer_estimate() {
        let evidence = TermEvidence::new(3, 20, 0.001);
        let p = Smoothing::JelinekMercer { lambda: 0.2 }.estimate(&evidence);
        assert!((p - (0.8 * 0.15 + 0.2 * 0.001)).abs() < EPS);
    }

    #[test]
    fn test_empty_document_yields_collection_probability() {
        let evidence = TermEvidence::new(0, 0, 0.004);
        assert_eq!(Smoothing::Dirichlet { mu: 0.0 }.estimate(&evidence), 0.004);
        assert_eq!(Smoothing::Dirichlet { mu: 50.0 }.estimate(&evidence), 0.004);
        assert_eq!(Smoothing::JelinekMercer { lambda: 0.3 }.estimate(&evidence), 0.004);
        assert!((term_probability(&evidence, 0.0, 0.3) - 0.004).abs() < EPS);
    }

    #[test]
    fn test_absent_term_keeps_positive_floor() {
        let evidence = TermEvidence::new(0, 500, 1e-6);
        let p = term_probability(&evidence, 2500.0, 0.15);
        assert!(p > 0.0);
        assert!(p.ln().is_finite());

        let p = term_probability(&evidence, 0.0, 0.15);
        assert_eq!(p, MIN_TERM_PROBABILITY);
    }

    #[test]
    fn test_subnormal_mu_keeps_log_finite() {
        let evidence = TermEvidence::new(0, 1000, 1.0 / 1002.0);
        for mu in [1e-320, f64::MIN_POSITIVE, 5e-324] {
            let p = term_probability(&evidence, mu, 0.15);
            assert!(p > 0.0, "mu = {mu}");
            assert!(p.ln().is_finite(), "mu = {mu}");
        }
    }

    #[test]
    fn test_blend_survives_tiny_factors() {
        assert!(blend(1e-200, 1e-200) > 0.0);
        assert!((blend(1e-200, 1e-200) - 1e-200).abs() < 1e-210);
    }

    #[test]
    fn test_blend_is_geometric_mean() {
        assert!((blend(0.04, 0.01) - 0.02).abs() < EPS);
        let a: f64 = 0.3;
        let b: f64 = 0.05;
        assert!((blend(a, b).ln() - (a.ln() + b.ln()) / 2.0).abs() < EPS);
    }

    #[test]
    fn test_monotone_in_term_frequency() {
        let mut previous = 0.0;
        for tf in 0..=40 {
            let p = term_probability(&TermEvidence::new(tf, 40, 0.002), 300.0, 0.15);
            assert!(p >= previous);
            previous = p;
        }
    }
}
