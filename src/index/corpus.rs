//! JSON-lines corpus loading.
//!
//! Each non-blank line is an object `{"docno": "...", "text": "..."}`. The
//! text goes through the analyzer before indexing.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::error::{DjmirError, Result};
use crate::index::IndexReader;
use crate::index::memory::{MemoryIndex, MemoryIndexBuilder};

/// One corpus document as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusRecord {
    pub docno: String,
    pub text: String,
}

/// Read a JSON-lines corpus from `reader` into a new index.
pub fn read_jsonl_corpus<R: BufRead>(reader: R, analyzer: &dyn Analyzer) -> Result<MemoryIndex> {
    let mut builder = MemoryIndexBuilder::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: CorpusRecord = serde_json::from_str(&line)
            .map_err(|e| DjmirError::index(format!("corpus line {}: {}", i + 1, e)))?;
        let terms = analyzer.analyze_terms(&record.text)?;
        builder.add_document(record.docno, terms);
    }

    Ok(builder.build())
}

/// Load the corpus at `path`. A missing path is a configuration error.
pub fn load_jsonl_corpus<P: AsRef<Path>>(path: P, analyzer: &dyn Analyzer) -> Result<MemoryIndex> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DjmirError::configuration(format!(
            "index path '{}' does not exist",
            path.display()
        )));
    }

    let file = File::open(path)?;
    let index = read_jsonl_corpus(BufReader::new(file), analyzer)?;
    info!(
        "Loaded {} documents from {}",
        index.collection_size(),
        path.display()
    );
    Ok(index)
}
