//! In-memory inverted index with a forward index for document vectors.
//!
//! # Examples
//!
//! ```
//! use djmir::index::{IndexReader, MemoryIndexBuilder};
//!
//! let mut builder = MemoryIndexBuilder::new();
//! builder.add_document("d1", ["fever", "headach", "fever"]);
//! builder.add_document("d2", ["fever"]);
//! let index = builder.build();
//!
//! assert_eq!(index.collection_size(), 2);
//! assert_eq!(index.collection_frequency("fever"), 3);
//! assert_eq!(index.document_frequency("fever"), 2);
//! assert_eq!(index.document_length(0).unwrap(), 3);
//! ```

use ahash::AHashMap;
use log::debug;

use crate::error::{DjmirError, Result};
use crate::index::{DocId, IndexReader, Posting};

/// Lexicon entry of a term.
#[derive(Debug, Clone, Default)]
struct TermEntry {
    collection_frequency: u64,
    postings: Vec<Posting>,
}

/// A stored document: external name, length and term vector.
#[derive(Debug, Clone)]
struct StoredDocument {
    name: String,
    length: u64,
    vector: Vec<(String, u64)>,
}

/// Immutable in-memory index.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    lexicon: AHashMap<String, TermEntry>,
    documents: Vec<StoredDocument>,
    collection_length: u64,
}

impl MemoryIndex {
    fn stored(&self, doc_id: DocId) -> Result<&StoredDocument> {
        usize::try_from(doc_id)
            .ok()
            .and_then(|i| self.documents.get(i))
            .ok_or_else(|| {
                DjmirError::index(format!(
                    "unknown document id {doc_id} (collection has {} documents)",
                    self.documents.len()
                ))
            })
    }
}

impl IndexReader for MemoryIndex {
    fn postings(&self, term: &str) -> Result<Vec<Posting>> {
        Ok(self
            .lexicon
            .get(term)
            .map(|entry| entry.postings.clone())
            .unwrap_or_default())
    }

    fn document_length(&self, doc_id: DocId) -> Result<u64> {
        Ok(self.stored(doc_id)?.length)
    }

    fn document_vector(&self, doc_id: DocId) -> Result<Vec<(String, u64)>> {
        Ok(self.stored(doc_id)?.vector.clone())
    }

    fn document_name(&self, doc_id: DocId) -> Result<String> {
        Ok(self.stored(doc_id)?.name.clone())
    }

    fn collection_length(&self) -> u64 {
        self.collection_length
    }

    fn collection_frequency(&self, term: &str) -> u64 {
        self.lexicon
            .get(term)
            .map_or(0, |entry| entry.collection_frequency)
    }

    fn document_frequency(&self, term: &str) -> u64 {
        self.lexicon
            .get(term)
            .map_or(0, |entry| entry.postings.len() as u64)
    }

    fn collection_size(&self) -> u64 {
        self.documents.len() as u64
    }

    fn vocabulary_size(&self) -> u64 {
        self.lexicon.len() as u64
    }
}

/// Builder that assigns dense document ids in insertion order.
#[derive(Debug, Default)]
pub struct MemoryIndexBuilder {
    index: MemoryIndex,
}

impl MemoryIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an already analyzed document and return its id.
    pub fn add_document<I, S>(&mut self, name: impl Into<String>, terms: I) -> DocId
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let doc_id = self.index.documents.len() as DocId;

        let mut counts: AHashMap<String, u64> = AHashMap::new();
        let mut length = 0u64;
        for term in terms {
            *counts.entry(term.as_ref().to_string()).or_insert(0) += 1;
            length += 1;
        }

        let mut vector: Vec<(String, u64)> = counts.into_iter().collect();
        vector.sort_by(|a, b| a.0.cmp(&b.0));

        for (term, tf) in &vector {
            let entry = self.index.lexicon.entry(term.clone()).or_default();
            entry.collection_frequency += tf;
            // Ids grow monotonically, so postings stay sorted.
            entry.postings.push(Posting::new(doc_id, *tf));
        }

        self.index.collection_length += length;
        self.index.documents.push(StoredDocument {
            name: name.into(),
            length,
            vector,
        });

        doc_id
    }

    /// Number of documents added so far.
    pub fn len(&self) -> usize {
        self.index.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.documents.is_empty()
    }

    /// Finish building.
    pub fn build(self) -> MemoryIndex {
        debug!(
            "Built in-memory index: {} documents, {} terms, {} tokens",
            self.index.documents.len(),
            self.index.lexicon.len(),
            self.index.collection_length
        );
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> MemoryIndex {
        let mut builder = MemoryIndexBuilder::new();
        builder.add_document("doc-a", ["fever", "headach", "fever"]);
        builder.add_document("doc-b", ["fever", "cough"]);
        builder.add_document("doc-c", Vec::<String>::new());
        builder.build()
    }

    #[test]
    fn test_statistics() {
        let index = sample_index();
        let stats = index.statistics();
        assert_eq!(stats.collection_size, 3);
        assert_eq!(stats.collection_length, 5);
        assert_eq!(stats.vocabulary_size, 3);
        assert!((stats.average_document_length - 5.0 / 3.0).abs() < 1e-12);
        assert!((index.collection_probability("fever") - 0.6).abs() < 1e-12);
        assert_eq!(index.collection_probability("missing"), 0.0);
    }

    #[test]
    fn test_postings_sorted_with_frequencies() {
        let index = sample_index();
        assert_eq!(
            index.postings("fever").unwrap(),
            vec![Posting::new(0, 2), Posting::new(1, 1)]
        );
        assert!(index.postings("missing").unwrap().is_empty());
        assert_eq!(index.document_frequency("cough"), 1);
        assert_eq!(index.collection_frequency("missing"), 0);
    }

    #[test]
    fn test_document_access() {
        let index = sample_index();
        assert_eq!(index.document_name(1).unwrap(), "doc-b");
        assert_eq!(index.document_length(2).unwrap(), 0);
        assert_eq!(
            index.document_vector(0).unwrap(),
            vec![("fever".to_string(), 2), ("headach".to_string(), 1)]
        );
        assert!(matches!(index.document_length(3), Err(DjmirError::Index(_))));
    }

    #[test]
    fn test_empty_index() {
        let index = MemoryIndexBuilder::new().build();
        assert_eq!(index.average_document_length(), 0.0);
        assert_eq!(index.collection_size(), 0);
    }
}
