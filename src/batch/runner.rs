//! Query batch runner.
//!
//! Queries run one after another in input order; the documents of one query
//! are scored in parallel on the runner's thread pool. Each query's results
//! are handed to the sink before the next query starts, and the cancellation
//! token is checked between queries and between documents.

use std::time::Instant;

use log::{debug, info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

use crate::batch::output::{MemorySink, RankedResult, ResultSink};
use crate::cancel::CancellationToken;
use crate::config::BatchConfig;
use crate::error::{DjmirError, Result};
use crate::expansion::{ExpandedQuery, QueryExpander};
use crate::index::IndexReader;
use crate::query::{Query, QuerySet};
use crate::scoring::DjmScorer;

/// Results of one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub query_id: String,
    /// Terms that were actually scored.
    pub expanded: ExpandedQuery,
    pub results: Vec<RankedResult>,
}

/// Totals of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub queries_run: usize,
    pub queries_expanded: usize,
    pub expansion_failures: usize,
    pub results_written: usize,
    pub rejected_lines: usize,
    pub mu: f64,
    pub elapsed_ms: u64,
}

/// Runs a query set against an index.
pub struct BatchRunner<'a> {
    index: &'a dyn IndexReader,
    scorer: &'a DjmScorer,
    expander: Option<&'a dyn QueryExpander>,
    config: BatchConfig,
    cancel: CancellationToken,
    thread_pool: ThreadPool,
}

impl<'a> BatchRunner<'a> {
    pub fn new(index: &'a dyn IndexReader, scorer: &'a DjmScorer, config: BatchConfig) -> Result<Self> {
        let threads = config.threads.unwrap_or_else(num_cpus::get).max(1);
        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("djmir-score-{i}"))
            .build()
            .map_err(|e| DjmirError::internal(format!("Failed to create thread pool: {e}")))?;

        Ok(BatchRunner {
            index,
            scorer,
            expander: None,
            config,
            cancel: CancellationToken::new(),
            thread_pool,
        })
    }

    /// Expand every query before scoring.
    pub fn with_expander(mut self, expander: &'a dyn QueryExpander) -> Self {
        self.expander = Some(expander);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle that cancels this runner.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run all queries, writing each query's results to `sink` as it completes.
    pub fn run(&self, queries: &QuerySet, sink: &mut dyn ResultSink) -> Result<BatchSummary> {
        let start = Instant::now();
        let mut summary = BatchSummary {
            rejected_lines: queries.rejected.len(),
            mu: self.scorer.mu(),
            ..BatchSummary::default()
        };

        info!(
            "Running {} queries (mu = {}, expansion {})",
            queries.len(),
            summary.mu,
            self.expander.map_or("off", |e| e.name())
        );

        for query in queries {
            self.cancel.check("running queries")?;

            let (expanded, expansion_failed) = self.expand(query);
            let result = self.rank(query, expanded)?;

            sink.write_query(&result)?;

            summary.queries_run += 1;
            summary.results_written += result.results.len();
            if expansion_failed {
                summary.expansion_failures += 1;
            } else if !result.expanded.is_identity() {
                summary.queries_expanded += 1;
            }
        }
        sink.finish()?;

        summary.elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            "Finished {} queries, {} result lines in {} ms",
            summary.queries_run, summary.results_written, summary.elapsed_ms
        );
        Ok(summary)
    }

    /// Run all queries and keep the results in memory.
    pub fn run_collect(&self, queries: &QuerySet) -> Result<Vec<QueryResult>> {
        let mut sink = MemorySink::new();
        self.run(queries, &mut sink)?;
        Ok(sink.results)
    }

    /// Run a single query.
    pub fn run_query(&self, query: &Query) -> Result<QueryResult> {
        let (expanded, _) = self.expand(query);
        self.rank(query, expanded)
    }

    fn expand(&self, query: &Query) -> (ExpandedQuery, bool) {
        let Some(expander) = self.expander else {
            return (ExpandedQuery::identity(query), false);
        };
        match expander.expand(query) {
            Ok(expanded) => (expanded, false),
            Err(e) => {
                warn!(
                    "Expansion of query {} failed, scoring original terms: {e}",
                    query.id
                );
                (ExpandedQuery::identity(query), true)
            }
        }
    }

    fn rank(&self, query: &Query, expanded: ExpandedQuery) -> Result<QueryResult> {
        let terms = expanded.query_terms();
        let mut scored = self
            .thread_pool
            .install(|| self.scorer.rank(self.index, &terms, &self.cancel))?;
        if let Some(max_results) = self.config.max_results {
            scored.truncate(max_results);
        }

        let results = scored
            .into_iter()
            .enumerate()
            .map(|(rank, doc)| {
                Ok(RankedResult {
                    doc_id: doc.doc_id,
                    docno: self.index.document_name(doc.doc_id)?,
                    rank,
                    score: doc.score,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Query {}: {} terms, {} documents",
            query.id,
            terms.len(),
            results.len()
        );

        Ok(QueryResult {
            query_id: query.id.clone(),
            expanded,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ExpansionConfig;
    use crate::expansion::{ControlledVocabulary, StagedQueryExpansion};
    use crate::index::{MemoryIndex, MemoryIndexBuilder};

    fn index() -> MemoryIndex {
        let mut builder = MemoryIndexBuilder::new();
        builder.add_document("D1", ["fever", "headach", "pyrexia"]);
        builder.add_document("D2", ["fever", "cough", "pyrexia"]);
        builder.add_document("D3", ["cough", "rash"]);
        builder.add_document("D4", ["rash", "itch"]);
        builder.build()
    }

    fn queries() -> QuerySet {
        QuerySet {
            queries: vec![
                Query::from_terms("Q2", ["rash"]),
                Query::from_terms("Q1", ["fever", "headach"]),
                Query::from_terms("Q3", ["unknown"]),
            ],
            rejected: Vec::new(),
        }
    }

    fn config(threads: usize) -> BatchConfig {
        BatchConfig {
            threads: Some(threads),
            ..BatchConfig::default()
        }
    }

    #[test]
    fn test_queries_in_input_order() {
        let index = index();
        let scorer = DjmScorer::with_params(100.0, 0.15).unwrap();
        let runner = BatchRunner::new(&index, &scorer, config(2)).unwrap();

        let results = runner.run_collect(&queries()).unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.query_id.as_str()).collect();
        assert_eq!(ids, vec!["Q2", "Q1", "Q3"]);

        let q1: Vec<_> = results[1].results.iter().map(|r| r.docno.as_str()).collect();
        assert_eq!(q1, vec!["D1", "D2"]);
        assert_eq!(results[1].results[0].rank, 0);
        assert!(results[2].results.is_empty());
    }

    #[test]
    fn test_max_results() {
        let index = index();
        let scorer = DjmScorer::with_params(100.0, 0.15).unwrap();
        let config = BatchConfig {
            max_results: Some(1),
            ..config(1)
        };
        let runner = BatchRunner::new(&index, &scorer, config).unwrap();

        let result = runner.run_query(&Query::from_terms("Q1", ["fever"])).unwrap();
        assert_eq!(result.results.len(), 1);
    }

    #[test]
    fn test_thread_count_does_not_change_results() {
        let index = index();
        let scorer = DjmScorer::with_params(100.0, 0.15).unwrap();
        let single = BatchRunner::new(&index, &scorer, config(1))
            .unwrap()
            .run_collect(&queries())
            .unwrap();
        let multi = BatchRunner::new(&index, &scorer, config(4))
            .unwrap()
            .run_collect(&queries())
            .unwrap();
        assert_eq!(single, multi);
    }

    #[test]
    fn test_expansion_reaches_new_documents() {
        let index = index();
        let scorer = DjmScorer::with_params(100.0, 0.15).unwrap();
        let vocabulary = Arc::new(ControlledVocabulary::from_analyzed_groups(vec![vec![
            "headach".to_string(),
            "pyrexia".to_string(),
        ]]));
        let expansion = StagedQueryExpansion::new(&index, vocabulary, ExpansionConfig::default());
        let runner = BatchRunner::new(&index, &scorer, config(2))
            .unwrap()
            .with_expander(&expansion);

        let query = Query::from_terms("Q1", ["headach"]);
        let result = runner.run_query(&query).unwrap();
        assert!(!result.expanded.is_identity());
        let docs: Vec<_> = result.results.iter().map(|r| r.docno.as_str()).collect();
        assert_eq!(docs, vec!["D1", "D2"]);
    }

    #[test]
    fn test_cancelled_before_first_query() {
        let index = index();
        let scorer = DjmScorer::with_params(100.0, 0.15).unwrap();
        let runner = BatchRunner::new(&index, &scorer, config(1)).unwrap();
        runner.cancellation_token().cancel();

        let mut sink = MemorySink::new();
        let result = runner.run(&queries(), &mut sink);
        assert!(matches!(result, Err(DjmirError::OperationCancelled(_))));
        assert!(sink.results.is_empty());
    }
}
