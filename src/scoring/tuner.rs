//! Calibration of mu by corpus sampling.
//!
//! The objective is the mean leave-one-out log-likelihood per token of the
//! sampled documents: each occurrence of a term is predicted by the DJM model
//! of its own document with that occurrence removed (`tf - 1`, `|d| - 1`).
//! A larger mu pulls every document toward the collection model, a smaller
//! one trusts the document counts, and the objective peaks in between.
//!
//! The search works on `ln(mu)`. It first brackets the optimum by stepping
//! geometrically from the initial guess, then narrows the bracket with
//! golden-section search. Both the document sample (seeded) and the schedule
//! are fixed, so repeated runs return the same value.

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cancel::CancellationToken;
use crate::config::{MAX_MU, MIN_MU, TuningConfig};
use crate::error::{DjmirError, Result};
use crate::index::{DocId, IndexReader};
use crate::scoring::djm::DjmScorer;
use crate::scoring::smoothing::{TermEvidence, term_probability};

/// `(sqrt(5) - 1) / 2`
const INV_PHI: f64 = 0.618_033_988_749_895;

/// Outcome of a tuning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningReport {
    /// Selected mu, already installed in the scorer.
    pub mu: f64,
    /// Objective value at `mu`.
    pub objective: f64,
    /// Number of objective evaluations.
    pub evaluations: usize,
    /// Documents in the sample.
    pub sampled_documents: usize,
    /// Tokens in the sample.
    pub sampled_tokens: u64,
}

/// A sampled document reduced to what the objective needs.
#[derive(Debug, Clone)]
struct SampleDocument {
    length: u64,
    /// `(term_freq, collection_probability)` per distinct term.
    terms: Vec<(u64, f64)>,
}

/// Tunes the scorer's mu against an index.
pub struct MuTuner<'a> {
    index: &'a dyn IndexReader,
    scorer: &'a DjmScorer,
    config: TuningConfig,
    cancel: CancellationToken,
}

impl<'a> MuTuner<'a> {
    pub fn new(index: &'a dyn IndexReader, scorer: &'a DjmScorer, config: TuningConfig) -> Self {
        MuTuner {
            index,
            scorer,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use a caller-provided cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Pick the mu that maximizes the objective, install it and return it.
    pub fn tune(&self, initial_guess: f64, sampling_fraction: f64) -> Result<f64> {
        Ok(self.tune_with_report(initial_guess, sampling_fraction)?.mu)
    }

    /// Like [`tune`](Self::tune), also reporting the search.
    pub fn tune_with_report(&self, initial_guess: f64, sampling_fraction: f64) -> Result<TuningReport> {
        if !(initial_guess.is_finite() && initial_guess > 0.0) {
            return Err(DjmirError::invalid_argument(format!(
                "initial mu must be a positive number, got {initial_guess}"
            )));
        }

        let sample = self.draw_sample(sampling_fraction)?;
        let sampled_tokens: u64 = sample.iter().map(|doc| doc.length).sum();
        if sampled_tokens == 0 {
            return Err(DjmirError::index("sampled documents contain no tokens"));
        }
        info!(
            "Tuning mu on {} documents ({} tokens), initial guess {}",
            sample.len(),
            sampled_tokens,
            initial_guess
        );

        let mut search = Search {
            sample: &sample,
            lambda: self.scorer.lambda(),
            tokens: sampled_tokens as f64,
            cancel: &self.cancel,
            evaluations: 0,
            best: None,
        };
        search.run(initial_guess.clamp(MIN_MU, MAX_MU), &self.config)?;

        let (x, objective) = search
            .best
            .ok_or_else(|| DjmirError::internal("tuning evaluated no candidates"))?;
        let mu = x.exp().clamp(MIN_MU, MAX_MU);
        self.scorer.set_mu(mu)?;
        info!(
            "Tuned mu = {:.4} (objective {:.6}, {} evaluations)",
            mu, objective, search.evaluations
        );

        Ok(TuningReport {
            mu,
            objective,
            evaluations: search.evaluations,
            sampled_documents: sample.len(),
            sampled_tokens,
        })
    }

    /// Objective value at `mu` over the sample for `sampling_fraction`.
    pub fn objective(&self, mu: f64, sampling_fraction: f64) -> Result<f64> {
        let sample = self.draw_sample(sampling_fraction)?;
        let tokens: u64 = sample.iter().map(|doc| doc.length).sum();
        if tokens == 0 {
            return Err(DjmirError::index("sampled documents contain no tokens"));
        }
        Ok(log_likelihood(&sample, mu, self.scorer.lambda()) / tokens as f64)
    }

    /// Document ids sampled for `sampling_fraction`, ascending.
    pub fn sample_ids(&self, sampling_fraction: f64) -> Result<Vec<DocId>> {
        if !(sampling_fraction > 0.0 && sampling_fraction <= 1.0) {
            return Err(DjmirError::invalid_argument(format!(
                "sampling fraction must be in (0, 1], got {sampling_fraction}"
            )));
        }
        let size = usize::try_from(self.index.collection_size())
            .map_err(|_| DjmirError::index("collection too large to sample"))?;
        if size == 0 {
            return Err(DjmirError::index("cannot tune on an empty collection"));
        }

        if sampling_fraction >= 1.0 {
            return Ok((0..size as DocId).collect());
        }

        // Slack absorbs products like 10 * 0.7 landing just above an integer.
        let amount = ((size as f64 * sampling_fraction - 1e-9).ceil() as usize).clamp(1, size);
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut ids: Vec<DocId> = rand::seq::index::sample(&mut rng, size, amount)
            .into_iter()
            .map(|i| i as DocId)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn draw_sample(&self, sampling_fraction: f64) -> Result<Vec<SampleDocument>> {
        let collection_length = self.index.collection_length() as f64;
        self.sample_ids(sampling_fraction)?
            .into_iter()
            .map(|doc_id| {
                let terms = self
                    .index
                    .document_vector(doc_id)?
                    .into_iter()
                    .map(|(term, tf)| {
                        let cf = self.index.collection_frequency(&term) as f64;
                        (tf, cf / collection_length)
                    })
                    .collect();
                Ok(SampleDocument {
                    length: self.index.document_length(doc_id)?,
                    terms,
                })
            })
            .collect()
    }
}

/// Sum of leave-one-out log-probabilities over the sample.
fn log_likelihood(sample: &[SampleDocument], mu: f64, lambda: f64) -> f64 {
    // Collected in order and summed sequentially so the total is bit-for-bit reproducible.
    let per_document: Vec<f64> = sample
        .par_iter()
        .map(|doc| {
            if doc.length == 0 {
                return 0.0;
            }
            doc.terms
                .iter()
                .map(|&(tf, collection_probability)| {
                    let evidence =
                        TermEvidence::new(tf - 1, doc.length - 1, collection_probability);
                    tf as f64 * term_probability(&evidence, mu, lambda).ln()
                })
                .sum::<f64>()
        })
        .collect();
    per_document.iter().sum()
}

/// State of one bracketing plus golden-section search.
struct Search<'s> {
    sample: &'s [SampleDocument],
    lambda: f64,
    tokens: f64,
    cancel: &'s CancellationToken,
    evaluations: usize,
    /// Best `(ln mu, objective)` seen so far.
    best: Option<(f64, f64)>,
}

impl Search<'_> {
    fn evaluate(&mut self, x: f64) -> Result<f64> {
        self.cancel.check("tuning mu")?;
        let value = log_likelihood(self.sample, x.exp(), self.lambda) / self.tokens;
        self.evaluations += 1;
        debug!("mu = {:.6}: objective {:.8}", x.exp(), value);
        match self.best {
            Some((_, best)) if best >= value => {}
            _ => self.best = Some((x, value)),
        }
        Ok(value)
    }

    fn run(&mut self, initial_mu: f64, config: &TuningConfig) -> Result<()> {
        let (lower, upper) = (MIN_MU.ln(), MAX_MU.ln());
        let step = config.bracket_growth.ln();
        let (lo, hi) = self.bracket(initial_mu.ln(), step, lower, upper, config)?;
        self.golden_section(lo, hi, config)
    }

    /// Step from `x0` in the uphill direction until the objective drops.
    fn bracket(
        &mut self,
        x0: f64,
        step: f64,
        lower: f64,
        upper: f64,
        config: &TuningConfig,
    ) -> Result<(f64, f64)> {
        let f0 = self.evaluate(x0)?;
        let up = (x0 + step).min(upper);
        let f_up = if up > x0 { self.evaluate(up)? } else { f64::NEG_INFINITY };

        let (mut a, mut b, mut fb, step) = if f_up >= f0 {
            (x0, up, f_up, step)
        } else {
            let down = (x0 - step).max(lower);
            if down >= x0 {
                return Ok((x0, up));
            }
            let f_down = self.evaluate(down)?;
            if f_down <= f0 {
                return Ok((down, up));
            }
            (x0, down, f_down, -step)
        };

        for _ in 0..config.max_bracket_steps {
            let c = (b + step).clamp(lower, upper);
            if c == b {
                return Ok(ordered(a, b));
            }
            let fc = self.evaluate(c)?;
            if fc <= fb {
                return Ok(ordered(a, c));
            }
            a = b;
            b = c;
            fb = fc;
        }

        Ok(ordered(a, b))
    }

    fn golden_section(&mut self, lo: f64, hi: f64, config: &TuningConfig) -> Result<()> {
        let (mut a, mut b) = (lo, hi);
        let mut c = b - INV_PHI * (b - a);
        let mut d = a + INV_PHI * (b - a);
        let mut fc = self.evaluate(c)?;
        let mut fd = self.evaluate(d)?;

        for _ in 0..config.max_iterations {
            if b - a < config.tolerance {
                break;
            }
            if fc >= fd {
                b = d;
                d = c;
                fd = fc;
                c = b - INV_PHI * (b - a);
                fc = self.evaluate(c)?;
            } else {
                a = c;
                c = d;
                fc = fd;
                d = a + INV_PHI * (b - a);
                fd = self.evaluate(d)?;
            }
        }
        Ok(())
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{MemoryIndex, MemoryIndexBuilder};

    fn topical_index() -> MemoryIndex {
        let topics = [
            ["fever", "headach", "fever", "chill", "fever", "ach"],
            ["cough", "sneez", "cough", "throat", "cough", "cold"],
            ["rash", "itch", "rash", "skin", "rash", "red"],
        ];
        let mut builder = MemoryIndexBuilder::new();
        for i in 0..30 {
            let topic = &topics[i % 3];
            let mut terms: Vec<&str> = topic.to_vec();
            terms.push(topics[(i + 1) % 3][i % 6]);
            builder.add_document(format!("doc-{i}"), terms);
        }
        builder.build()
    }

    #[test]
    fn test_tune_is_reproducible() {
        let index = topical_index();
        let config = TuningConfig::default();

        let first = DjmScorer::with_params(2500.0, 0.15).unwrap();
        let second = DjmScorer::with_params(2500.0, 0.15).unwrap();
        let mu_a = MuTuner::new(&index, &first, config.clone()).tune(1.0, 1.0).unwrap();
        let mu_b = MuTuner::new(&index, &second, config).tune(1.0, 1.0).unwrap();

        assert_eq!(mu_a, mu_b);
        assert_eq!(first.mu(), mu_a);
        assert!((MIN_MU..=MAX_MU).contains(&mu_a));
    }

    #[test]
    fn test_tuned_mu_beats_neighbours() {
        let index = topical_index();
        let scorer = DjmScorer::with_params(2500.0, 0.15).unwrap();
        let tuner = MuTuner::new(&index, &scorer, TuningConfig::default());

        let report = tuner.tune_with_report(1.0, 1.0).unwrap();
        assert!(report.objective.is_finite());
        assert_eq!(report.sampled_documents, 30);
        assert_eq!(report.sampled_tokens, 210);

        for candidate in [1.0, report.mu * 4.0, report.mu / 4.0, 2500.0] {
            let value = tuner.objective(candidate.clamp(MIN_MU, MAX_MU), 1.0).unwrap();
            assert!(value <= report.objective + 1e-12);
        }
    }

    #[test]
    fn test_sample_is_deterministic_and_sized() {
        let index = topical_index();
        let scorer = DjmScorer::with_params(2500.0, 0.15).unwrap();
        let tuner = MuTuner::new(&index, &scorer, TuningConfig::default());

        let a = tuner.sample_ids(0.2).unwrap();
        let b = tuner.sample_ids(0.2).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
        assert!(a.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(tuner.sample_ids(1.0).unwrap().len(), 30);
    }

    #[test]
    fn test_invalid_arguments() {
        let index = topical_index();
        let scorer = DjmScorer::with_params(2500.0, 0.15).unwrap();
        let tuner = MuTuner::new(&index, &scorer, TuningConfig::default());

        assert!(matches!(tuner.tune(1.0, 0.0), Err(DjmirError::InvalidArgument(_))));
        assert!(matches!(tuner.tune(1.0, 1.5), Err(DjmirError::InvalidArgument(_))));
        assert!(matches!(tuner.tune(0.0, 0.5), Err(DjmirError::InvalidArgument(_))));
        assert_eq!(scorer.mu(), 2500.0);
    }

    #[test]
    fn test_empty_collection_fails() {
        let index = MemoryIndexBuilder::new().build();
        let scorer = DjmScorer::with_params(2500.0, 0.15).unwrap();
        let tuner = MuTuner::new(&index, &scorer, TuningConfig::default());
        assert!(matches!(tuner.tune(1.0, 1.0), Err(DjmirError::Index(_))));
    }

    #[test]
    fn test_cancelled_tuning_leaves_mu() {
        let index = topical_index();
        let scorer = DjmScorer::with_params(2500.0, 0.15).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = MuTuner::new(&index, &scorer, TuningConfig::default())
            .with_cancellation(cancel)
            .tune(1.0, 1.0);
        assert!(matches!(result, Err(DjmirError::OperationCancelled(_))));
        assert_eq!(scorer.mu(), 2500.0);
    }
}
