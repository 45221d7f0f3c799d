//! Result serialization.
//!
//! Results go out one query at a time so a run that stops early leaves a
//! valid prefix behind. [`TrecResultWriter`] writes the six-column TREC run
//! format:
//!
//! ```text
//! <query_id> Q0 <docno> <rank> <score> <run_tag>
//! ```
//!
//! with ranks starting at 0.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::batch::runner::QueryResult;
use crate::error::Result;
use crate::expansion::{ExpandedQuery, QueryExpander};
use crate::index::DocId;
use crate::query::QuerySet;

/// One line of a ranked result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub doc_id: DocId,
    pub docno: String,
    pub rank: usize,
    pub score: f64,
}

/// Destination for per-query results.
pub trait ResultSink {
    /// Consume the results of one query.
    fn write_query(&mut self, result: &QueryResult) -> Result<()>;

    /// Called once after the last query.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes TREC run lines.
#[derive(Debug)]
pub struct TrecResultWriter<W: Write> {
    writer: W,
    run_tag: String,
    lines_written: usize,
}

impl TrecResultWriter<BufWriter<File>> {
    /// Create (or truncate) a result file.
    pub fn create<P: AsRef<Path>>(path: P, run_tag: impl Into<String>) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file), run_tag))
    }
}

impl<W: Write> TrecResultWriter<W> {
    pub fn new(writer: W, run_tag: impl Into<String>) -> Self {
        TrecResultWriter {
            writer,
            run_tag: run_tag.into(),
            lines_written: 0,
        }
    }

    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for TrecResultWriter<W> {
    fn write_query(&mut self, result: &QueryResult) -> Result<()> {
        for ranked in &result.results {
            writeln!(
                self.writer,
                "{} Q0 {} {} {} {}",
                result.query_id, ranked.docno, ranked.rank, ranked.score, self.run_tag
            )?;
        }
        self.lines_written += result.results.len();
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps results in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub results: Vec<QueryResult>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultSink for MemorySink {
    fn write_query(&mut self, result: &QueryResult) -> Result<()> {
        self.results.push(result.clone());
        Ok(())
    }
}

/// Write `<query_id> <term> <term> ...` per query, original terms first.
///
/// A query whose expansion fails is written unexpanded. Returns the number
/// of lines written.
pub fn write_expanded_queries<W: Write>(
    mut writer: W,
    queries: &QuerySet,
    expander: &dyn QueryExpander,
) -> Result<usize> {
    let mut lines = 0;
    for query in queries {
        let expanded = expander.expand(query).unwrap_or_else(|e| {
            warn!("Expansion of query {} failed: {e}", query.id);
            ExpandedQuery::identity(query)
        });

        let terms: Vec<&str> = expanded.terms().collect();
        if terms.is_empty() {
            writeln!(writer, "{}", query.id)?;
        } else {
            writeln!(writer, "{} {}", query.id, terms.join(" "))?;
        }
        lines += 1;
    }
    writer.flush()?;
    Ok(lines)
}
