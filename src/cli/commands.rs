//! Command implementations for the djmir CLI.
//!
//! Every fallible step is wrapped with the name of the stage it belongs to,
//! so a failed run reports e.g. `loading index: ...` followed by the cause.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::analysis::analyzer::standard::StandardAnalyzer;
use crate::batch::{BatchRunner, TrecResultWriter, write_expanded_queries};
use crate::cancel::CancellationToken;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::RetrievalConfig;
use crate::expansion::{ControlledVocabulary, StagedQueryExpansion};
use crate::index::{IndexReader, MemoryIndex, load_jsonl_corpus};
use crate::query::read_queries;
use crate::scoring::{DjmScorer, MuTuner};

/// Execute a CLI command.
pub fn execute_command(args: DjmirArgs) -> Result<()> {
    let config = load_config(&args)?;
    match &args.command {
        Command::Search(search_args) => run_search(search_args, config, &args),
        Command::Expand(expand_args) => run_expand(expand_args, config, &args),
        Command::Tune(tune_args) => run_tune(tune_args, config, &args),
        Command::Stats(stats_args) => show_stats(stats_args, &args),
    }
}

fn load_config(args: &DjmirArgs) -> Result<RetrievalConfig> {
    match &args.config {
        Some(path) => RetrievalConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(RetrievalConfig::default()),
    }
}

fn load_index(path: &Path, analyzer: &StandardAnalyzer) -> Result<MemoryIndex> {
    load_jsonl_corpus(path, analyzer)
        .with_context(|| format!("loading index from {}", path.display()))
}

/// Score a query file and write a TREC run.
fn run_search(args: &SearchArgs, mut config: RetrievalConfig, cli_args: &DjmirArgs) -> Result<()> {
    if let Some(mu) = args.mu {
        config.scoring.mu = mu;
    }
    if let Some(sampling) = args.sampling {
        config.tuning.sampling_fraction = sampling;
    }
    if let Some(run_tag) = &args.run_tag {
        config.batch.run_tag = run_tag.clone();
    }
    if args.max_results.is_some() {
        config.batch.max_results = args.max_results;
    }
    if args.threads.is_some() {
        config.batch.threads = args.threads;
    }
    config.validate().context("validating configuration")?;

    let analyzer = StandardAnalyzer::english().context("building analyzer")?;
    let index = load_index(&args.index, &analyzer)?;
    let queries = read_queries(&args.queries, &analyzer)
        .with_context(|| format!("reading queries from {}", args.queries.display()))?;
    if !queries.rejected.is_empty() {
        warn!("{} malformed query lines skipped", queries.rejected.len());
    }

    let cancel = CancellationToken::new();
    let scorer = DjmScorer::new(&config.scoring).context("creating scorer")?;

    let tuning = if args.tune {
        let report = MuTuner::new(&index, &scorer, config.tuning.clone())
            .with_cancellation(cancel.clone())
            .tune_with_report(config.tuning.initial_mu, config.tuning.sampling_fraction)
            .context("tuning mu")?;
        Some(report)
    } else {
        None
    };

    let expansion = match (&args.vocabulary, args.expand) {
        (Some(path), true) => {
            let vocabulary = Arc::new(ControlledVocabulary::load_or_empty(path, &analyzer));
            Some(StagedQueryExpansion::new(
                &index,
                vocabulary,
                config.expansion.clone(),
            ))
        }
        (Some(_), false) => {
            info!("Vocabulary given without --expand; queries will not be expanded");
            None
        }
        _ => None,
    };

    let mut writer = TrecResultWriter::create(&args.output, config.batch.run_tag.clone())
        .with_context(|| format!("creating result file {}", args.output.display()))?;

    let mut runner = BatchRunner::new(&index, &scorer, config.batch.clone())
        .context("starting batch runner")?
        .with_cancellation(cancel);
    if let Some(expansion) = &expansion {
        runner = runner.with_expander(expansion);
    }

    let batch = runner
        .run(&queries, &mut writer)
        .context("writing results")?;

    output_result(
        "Search completed",
        &SearchReport {
            output: args.output.display().to_string(),
            tuning,
            batch,
        },
        cli_args,
    )?;
    Ok(())
}

/// Write expanded queries for use by another engine.
fn run_expand(args: &ExpandArgs, config: RetrievalConfig, cli_args: &DjmirArgs) -> Result<()> {
    let analyzer = StandardAnalyzer::english().context("building analyzer")?;
    let index = load_index(&args.index, &analyzer)?;
    let queries = read_queries(&args.queries, &analyzer)
        .with_context(|| format!("reading queries from {}", args.queries.display()))?;

    let vocabulary = Arc::new(ControlledVocabulary::load_or_empty(&args.vocabulary, &analyzer));
    let expansion = StagedQueryExpansion::new(&index, vocabulary, config.expansion);

    let file = File::create(&args.output)
        .with_context(|| format!("creating output file {}", args.output.display()))?;
    let lines = write_expanded_queries(BufWriter::new(file), &queries, &expansion)
        .context("writing expanded queries")?;

    output_result(
        "Expansion completed",
        &ExpansionReport {
            output: args.output.display().to_string(),
            queries: lines,
            rejected_lines: queries.rejected.len(),
            vocabulary_terms: expansion.vocabulary().len(),
            vocabulary_concepts: expansion.vocabulary().concept_count(),
        },
        cli_args,
    )?;
    Ok(())
}

/// Tune mu and print the selected value.
fn run_tune(args: &TuneArgs, mut config: RetrievalConfig, cli_args: &DjmirArgs) -> Result<()> {
    if let Some(sampling) = args.sampling {
        config.tuning.sampling_fraction = sampling;
    }
    if let Some(initial_mu) = args.initial_mu {
        config.tuning.initial_mu = initial_mu;
    }
    config.validate().context("validating configuration")?;

    let analyzer = StandardAnalyzer::english().context("building analyzer")?;
    let index = load_index(&args.index, &analyzer)?;
    let scorer = DjmScorer::new(&config.scoring).context("creating scorer")?;

    let report = MuTuner::new(&index, &scorer, config.tuning.clone())
        .tune_with_report(config.tuning.initial_mu, config.tuning.sampling_fraction)
        .context("tuning mu")?;

    output_result(&format!("Tuned mu = {}", scorer.mu()), &report, cli_args)?;
    Ok(())
}

/// Show collection statistics.
fn show_stats(args: &StatsArgs, cli_args: &DjmirArgs) -> Result<()> {
    let analyzer = StandardAnalyzer::english().context("building analyzer")?;
    let index = load_index(&args.index, &analyzer)?;

    output_result(
        "Collection statistics",
        &StatsReport {
            index: args.index.display().to_string(),
            statistics: index.statistics(),
        },
        cli_args,
    )?;
    Ok(())
}
