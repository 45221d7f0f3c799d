//! Index access facade.
//!
//! The retrieval core never touches index storage directly. It asks an
//! [`IndexReader`] for postings, document lengths and collection statistics,
//! so any engine that can answer those questions can back the scorer, the
//! association measure and the tuner. [`MemoryIndex`] is the implementation
//! shipped with the crate.

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod corpus;
pub mod memory;

pub use corpus::{CorpusRecord, load_jsonl_corpus};
pub use memory::{MemoryIndex, MemoryIndexBuilder};

/// Dense internal document identifier, `0..collection_size()` in load order.
pub type DocId = u64;

/// A (document, term frequency) pair in a term's posting list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub term_freq: u64,
}

impl Posting {
    pub fn new(doc_id: DocId, term_freq: u64) -> Self {
        Posting { doc_id, term_freq }
    }
}

/// Collection-wide statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollectionStatistics {
    /// Number of documents.
    pub collection_size: u64,
    /// Total number of tokens over all documents.
    pub collection_length: u64,
    /// Mean document length in tokens.
    pub average_document_length: f64,
    /// Number of distinct terms.
    pub vocabulary_size: u64,
}

/// Read access to an inverted index.
///
/// Implementations must be shareable across worker threads. Statistics are
/// expected to be immutable for the lifetime of the reader.
pub trait IndexReader: Send + Sync + std::fmt::Debug {
    /// Posting list for `term`, sorted by ascending document id. Unknown terms
    /// yield an empty list.
    fn postings(&self, term: &str) -> Result<Vec<Posting>>;

    /// Length of a document in tokens.
    fn document_length(&self, doc_id: DocId) -> Result<u64>;

    /// The document's own term distribution (forward index), sorted by term.
    fn document_vector(&self, doc_id: DocId) -> Result<Vec<(String, u64)>>;

    /// External document name (docno) written in result files.
    fn document_name(&self, doc_id: DocId) -> Result<String>;

    /// Total number of tokens in the collection.
    fn collection_length(&self) -> u64;

    /// Number of occurrences of `term` over the whole collection.
    fn collection_frequency(&self, term: &str) -> u64;

    /// Number of documents containing `term`.
    fn document_frequency(&self, term: &str) -> u64;

    /// Number of documents.
    fn collection_size(&self) -> u64;

    /// Number of distinct terms.
    fn vocabulary_size(&self) -> u64;

    /// Mean document length; zero for an empty collection.
    fn average_document_length(&self) -> f64 {
        match self.collection_size() {
            0 => 0.0,
            n => self.collection_length() as f64 / n as f64,
        }
    }

    /// Relative frequency of `term` over the whole collection.
    fn collection_probability(&self, term: &str) -> f64 {
        match self.collection_length() {
            0 => 0.0,
            len => self.collection_frequency(term) as f64 / len as f64,
        }
    }

    /// Snapshot of the collection statistics.
    fn statistics(&self) -> CollectionStatistics {
        CollectionStatistics {
            collection_size: self.collection_size(),
            collection_length: self.collection_length(),
            average_document_length: self.average_document_length(),
            vocabulary_size: self.vocabulary_size(),
        }
    }
}
