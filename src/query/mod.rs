//! Query file parsing and normalization.
//!
//! A query file holds one query per line, `<query_id> <query_text>`, split on
//! the first single space. Query text is analyzed with the same analyzer as
//! the documents, and duplicate terms are collapsed keeping the first
//! occurrence.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::{AHashMap, AHashSet};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::error::{DjmirError, Result};

/// A parsed, normalized query. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Identifier, unique per batch.
    pub id: String,
    /// Raw query text as read from the file.
    pub text: String,
    /// Normalized, deduplicated terms in first-occurrence order.
    pub terms: Vec<String>,
}

impl Query {
    /// Analyze `text` into a query.
    pub fn parse(id: impl Into<String>, text: impl Into<String>, analyzer: &dyn Analyzer) -> Result<Self> {
        let text = text.into();
        let terms = normalize_terms(analyzer.analyze_terms(&text)?);
        Ok(Query {
            id: id.into(),
            text,
            terms,
        })
    }

    /// Build a query from terms that are already normalized.
    pub fn from_terms<I, S>(id: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms = normalize_terms(terms.into_iter().map(Into::into));
        Query {
            id: id.into(),
            text: terms.join(" "),
            terms,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

fn normalize_terms<I: IntoIterator<Item = String>>(terms: I) -> Vec<String> {
    let mut seen = AHashSet::new();
    terms
        .into_iter()
        .filter(|term| seen.insert(term.clone()))
        .collect()
}

/// A line that could not be parsed as a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedLine {
    pub line_number: usize,
    pub line: String,
}

/// Queries of one batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySet {
    pub queries: Vec<Query>,
    /// Malformed lines that were skipped.
    pub rejected: Vec<RejectedLine>,
}

impl QuerySet {
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Query> {
        self.queries.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Query> {
        self.queries.iter().find(|q| q.id == id)
    }
}

impl<'a> IntoIterator for &'a QuerySet {
    type Item = &'a Query;
    type IntoIter = std::slice::Iter<'a, Query>;

    fn into_iter(self) -> Self::IntoIter {
        self.queries.iter()
    }
}

/// Split a query line into `(id, text)`.
///
/// Blank lines yield `None`. A line without a space, or with an empty id, is
/// a `MalformedInput` error for that line only.
pub fn parse_query_line(line_number: usize, line: &str) -> Result<Option<(String, String)>> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    match line.split_once(' ') {
        Some((id, text)) if !id.is_empty() => Ok(Some((id.to_string(), text.to_string()))),
        _ => Err(DjmirError::malformed_input(line_number, line)),
    }
}

/// Parse queries from a reader.
pub fn parse_queries<R: BufRead>(reader: R, analyzer: &dyn Analyzer) -> Result<QuerySet> {
    let mut set = QuerySet::default();
    let mut positions: AHashMap<String, usize> = AHashMap::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = i + 1;

        let (id, text) = match parse_query_line(line_number, &line) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => continue,
            Err(e) => {
                warn!("Skipping query line: {e}");
                set.rejected.push(RejectedLine { line_number, line });
                continue;
            }
        };

        let query = Query::parse(id, text, analyzer)?;
        if query.is_empty() {
            debug!("Query {} has no terms after analysis", query.id);
        }

        match positions.get(&query.id) {
            Some(&pos) => {
                warn!(
                    "Query id {} repeated on line {}; later text replaces earlier",
                    query.id, line_number
                );
                set.queries[pos] = query;
            }
            None => {
                positions.insert(query.id.clone(), set.queries.len());
                set.queries.push(query);
            }
        }
    }

    Ok(set)
}

/// Read a query file. An unreadable file is fatal.
pub fn read_queries<P: AsRef<Path>>(path: P, analyzer: &dyn Analyzer) -> Result<QuerySet> {
    let file = File::open(path.as_ref())?;
    parse_queries(BufReader::new(file), analyzer)
}
