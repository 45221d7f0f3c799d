//! Configuration for retrieval, expansion, tuning and batch runs.
//!
//! Compile-time defaults live in the constants below. Runtime configuration is a
//! [`RetrievalConfig`] that can be read from a JSON file and is then overridden by
//! command line flags.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DjmirError, Result};

/// Default Dirichlet prior strength.
///
/// Used until a tuning run or an explicit `set_mu` installs another value.
pub const DEFAULT_MU: f64 = 2500.0;

/// Jelinek-Mercer interpolation weight given to the collection model.
///
/// Must lie in `(0, 1]` so that terms missing from a document keep a positive
/// probability.
pub const DEFAULT_LAMBDA: f64 = 0.15;

/// Per-term probability floor, used when the blended estimate is zero (`mu = 0` or
/// underflow of a subnormal mu) and the term is absent.
pub const MIN_TERM_PROBABILITY: f64 = 1e-12;

/// Number of expansion candidates kept per original query term.
pub const DEFAULT_EXPANSIONS_PER_TERM: usize = 5;

/// Initial mu guess used by the driver when tuning.
pub const DEFAULT_INITIAL_MU: f64 = 1.0;

/// Fraction of the collection sampled by the tuner.
pub const DEFAULT_SAMPLING_FRACTION: f64 = 0.1;

/// Seed for the tuner's document sample.
pub const DEFAULT_SEED: u64 = 0x5eed_d1a1;

/// Lower bound of the mu search interval.
pub const MIN_MU: f64 = 1e-3;

/// Upper bound of the mu search interval.
pub const MAX_MU: f64 = 1e6;

/// Run tag written in the last column of result lines.
pub const DEFAULT_RUN_TAG: &str = "djmir";

/// Smoothing parameters of the DJM scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Dirichlet prior strength at process start.
    pub mu: f64,
    /// Fixed Jelinek-Mercer interpolation weight.
    pub lambda: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            mu: DEFAULT_MU,
            lambda: DEFAULT_LAMBDA,
        }
    }
}

/// Staged query expansion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Candidates kept per original term (top-K).
    pub expansions_per_term: usize,
    /// Candidates must associate strictly above this value to be kept.
    pub min_association: f64,
    /// Scale expansion terms by their association strength when scoring.
    pub weighted: bool,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        ExpansionConfig {
            expansions_per_term: DEFAULT_EXPANSIONS_PER_TERM,
            min_association: 0.0,
            weighted: false,
        }
    }
}

/// Parameter tuner settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// Starting point of the bracketing search.
    pub initial_mu: f64,
    /// Fraction of documents sampled, in `(0, 1]`.
    pub sampling_fraction: f64,
    /// Seed for the document sample.
    pub seed: u64,
    /// Multiplicative step used while bracketing the optimum.
    pub bracket_growth: f64,
    /// Maximum number of bracketing steps.
    pub max_bracket_steps: usize,
    /// Maximum golden-section iterations.
    pub max_iterations: usize,
    /// Stop when the bracket is narrower than this in log(mu).
    pub tolerance: f64,
}

impl Default for TuningConfig {
    fn default() -> Self {
        TuningConfig {
            initial_mu: DEFAULT_INITIAL_MU,
            sampling_fraction: DEFAULT_SAMPLING_FRACTION,
            seed: DEFAULT_SEED,
            bracket_growth: 2.0,
            max_bracket_steps: 40,
            max_iterations: 60,
            tolerance: 1e-4,
        }
    }
}

/// Batch runner settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Keep at most this many documents per query; `None` keeps all matches.
    pub max_results: Option<usize>,
    /// Run tag written with every result line.
    pub run_tag: String,
    /// Worker threads. If None, uses the number of CPU cores.
    pub threads: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            max_results: None,
            run_tag: DEFAULT_RUN_TAG.to_string(),
            threads: None,
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub scoring: ScoringConfig,
    pub expansion: ExpansionConfig,
    pub tuning: TuningConfig,
    pub batch: BatchConfig,
}

impl RetrievalConfig {
    /// Load a configuration from a JSON file; absent keys keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DjmirError::configuration(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: RetrievalConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that would otherwise surface as numeric degeneracies.
    pub fn validate(&self) -> Result<()> {
        if !self.scoring.mu.is_finite() || self.scoring.mu < 0.0 {
            return Err(DjmirError::configuration(format!(
                "mu must be a non-negative number, got {}",
                self.scoring.mu
            )));
        }
        if !(self.scoring.lambda > 0.0 && self.scoring.lambda <= 1.0) {
            return Err(DjmirError::configuration(format!(
                "lambda must be in (0, 1], got {}",
                self.scoring.lambda
            )));
        }
        if !(self.tuning.sampling_fraction > 0.0 && self.tuning.sampling_fraction <= 1.0) {
            return Err(DjmirError::configuration(format!(
                "sampling fraction must be in (0, 1], got {}",
                self.tuning.sampling_fraction
            )));
        }
        if self.tuning.bracket_growth <= 1.0 {
            return Err(DjmirError::configuration(
                "bracket growth must be greater than 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RetrievalConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scoring.mu, DEFAULT_MU);
        assert_eq!(config.batch.run_tag, DEFAULT_RUN_TAG);
        assert!(config.batch.max_results.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"scoring": {{"mu": 800.0}}, "batch": {{"max_results": 1000}}}}"#)
            .unwrap();

        let config = RetrievalConfig::from_file(file.path()).unwrap();
        assert_eq!(config.scoring.mu, 800.0);
        assert_eq!(config.scoring.lambda, DEFAULT_LAMBDA);
        assert_eq!(config.batch.max_results, Some(1000));
        assert_eq!(config.expansion, ExpansionConfig::default());
    }

    #[test]
    fn test_invalid_lambda_rejected() {
        let mut config = RetrievalConfig::default();
        config.scoring.lambda = 0.0;
        assert!(matches!(
            config.validate(),
            Err(DjmirError::Configuration(_))
        ));
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let result = RetrievalConfig::from_file("/nonexistent/djmir.json");
        assert!(matches!(result, Err(DjmirError::Configuration(_))));
    }
}
