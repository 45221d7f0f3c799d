//! Command line argument parsing for the djmir CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// djmir - language-model retrieval with staged query expansion
#[derive(Parser, Debug, Clone)]
#[command(name = "djmir")]
#[command(about = "Batch retrieval with Dirichlet/Jelinek-Mercer smoothing and controlled-vocabulary expansion")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct DjmirArgs {
    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only report errors (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// JSON configuration file; command line flags override its values
    #[arg(short, long, value_name = "FILE", env = "DJMIR_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format for command summaries
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl DjmirArgs {
    /// Effective verbosity level (0=error, 1=warn, 2=info, 3+=debug).
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Score a query file against a corpus and write a TREC run
    Search(SearchArgs),

    /// Write the expanded form of every query
    Expand(ExpandArgs),

    /// Calibrate mu on a sample of the corpus and print it
    Tune(TuneArgs),

    /// Show collection statistics
    Stats(StatsArgs),
}

/// Arguments for batch search
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Corpus file (JSON lines with "docno" and "text")
    #[arg(short, long, value_name = "CORPUS")]
    pub index: PathBuf,

    /// Query file, one `<id> <text>` per line
    #[arg(long, value_name = "FILE")]
    pub queries: PathBuf,

    /// Result file to write
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Controlled vocabulary file (tab-separated or .json)
    #[arg(long, value_name = "FILE")]
    pub vocabulary: Option<PathBuf>,

    /// Expand queries with the controlled vocabulary before scoring
    #[arg(long, requires = "vocabulary")]
    pub expand: bool,

    /// Tune mu on a corpus sample before scoring
    #[arg(long, conflicts_with = "mu")]
    pub tune: bool,

    /// Fraction of documents sampled when tuning
    #[arg(long, value_name = "FRACTION")]
    pub sampling: Option<f64>,

    /// Fixed mu
    #[arg(long)]
    pub mu: Option<f64>,

    /// Run tag written in the last result column
    #[arg(long)]
    pub run_tag: Option<String>,

    /// Keep at most this many documents per query
    #[arg(long)]
    pub max_results: Option<usize>,

    /// Worker threads (default: number of CPU cores)
    #[arg(short, long)]
    pub threads: Option<usize>,
}

/// Arguments for query expansion export
#[derive(Parser, Debug, Clone)]
pub struct ExpandArgs {
    /// Corpus file (JSON lines with "docno" and "text")
    #[arg(short, long, value_name = "CORPUS")]
    pub index: PathBuf,

    /// Query file, one `<id> <text>` per line
    #[arg(long, value_name = "FILE")]
    pub queries: PathBuf,

    /// Controlled vocabulary file (tab-separated or .json)
    #[arg(long, value_name = "FILE")]
    pub vocabulary: PathBuf,

    /// File receiving `<id> <term> <term> ...` lines
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

/// Arguments for tuning
#[derive(Parser, Debug, Clone)]
pub struct TuneArgs {
    /// Corpus file (JSON lines with "docno" and "text")
    #[arg(short, long, value_name = "CORPUS")]
    pub index: PathBuf,

    /// Fraction of documents sampled
    #[arg(long, value_name = "FRACTION")]
    pub sampling: Option<f64>,

    /// Starting point of the search
    #[arg(long)]
    pub initial_mu: Option<f64>,
}

/// Arguments for statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Corpus file (JSON lines with "docno" and "text")
    #[arg(short, long, value_name = "CORPUS")]
    pub index: PathBuf,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_command() {
        let args = DjmirArgs::try_parse_from([
            "djmir",
            "search",
            "--index",
            "corpus.jsonl",
            "--queries",
            "queries.txt",
            "--output",
            "run.txt",
            "--vocabulary",
            "chv.txt",
            "--expand",
            "--max-results",
            "1000",
        ])
        .unwrap();

        if let Command::Search(search_args) = args.command {
            assert_eq!(search_args.index, PathBuf::from("corpus.jsonl"));
            assert_eq!(search_args.vocabulary, Some(PathBuf::from("chv.txt")));
            assert!(search_args.expand);
            assert!(!search_args.tune);
            assert_eq!(search_args.max_results, Some(1000));
        } else {
            panic!("Expected Search command");
        }
    }

    #[test]
    fn test_expand_requires_vocabulary() {
        let result = DjmirArgs::try_parse_from([
            "djmir", "search", "--index", "c", "--queries", "q", "--output", "o", "--expand",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_tune_conflicts_with_fixed_mu() {
        let result = DjmirArgs::try_parse_from([
            "djmir", "search", "--index", "c", "--queries", "q", "--output", "o", "--tune",
            "--mu", "100",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_tune_command() {
        let args = DjmirArgs::try_parse_from([
            "djmir",
            "tune",
            "--index",
            "corpus.jsonl",
            "--sampling",
            "0.5",
        ])
        .unwrap();

        if let Command::Tune(tune_args) = args.command {
            assert_eq!(tune_args.sampling, Some(0.5));
            assert_eq!(tune_args.initial_mu, None);
        } else {
            panic!("Expected Tune command");
        }
    }

    #[test]
    fn test_verbosity_levels() {
        let args = DjmirArgs::try_parse_from(["djmir", "stats", "--index", "c"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = DjmirArgs::try_parse_from(["djmir", "-vv", "stats", "--index", "c"]).unwrap();
        assert_eq!(args.verbosity(), 3);

        let args = DjmirArgs::try_parse_from(["djmir", "--quiet", "stats", "--index", "c"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_output_format() {
        let args =
            DjmirArgs::try_parse_from(["djmir", "stats", "--index", "c", "--format", "json"]).unwrap();
        assert!(matches!(args.output_format, OutputFormat::Json));
    }
}
