//! Expected mutual information between term occurrences.
//!
//! Each term is treated as a binary variable "document contains the term".
//! The association of two terms is the mutual information of the two
//! variables in bits, computed from the 2x2 contingency table of document
//! counts:
//!
//! ```text
//!              b present     b absent
//! a present    n_ab          n_a - n_ab
//! a absent     n_b - n_ab    N - n_a - n_b + n_ab
//! ```
//!
//! The value is clamped to `[0, 1]` and is zero whenever either term is
//! unseen, the terms never co-occur, or they co-occur no more often than
//! chance. It is symmetric in its arguments.

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::error::Result;
use crate::index::{IndexReader, Posting};

/// EMIM association measure over an index.
#[derive(Debug)]
pub struct EmimScorer<'a> {
    index: &'a dyn IndexReader,
    cache: Option<RwLock<AHashMap<(String, String), f64>>>,
}

impl<'a> EmimScorer<'a> {
    pub fn new(index: &'a dyn IndexReader) -> Self {
        EmimScorer { index, cache: None }
    }

    /// Remember computed pairs. Worth it when the same vocabulary pairs come
    /// back across many queries.
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(RwLock::new(AHashMap::new()));
        self
    }

    /// Association of `term_a` and `term_b`, in `[0, 1]`.
    pub fn associate(&self, term_a: &str, term_b: &str) -> Result<f64> {
        // Fixed argument order keeps the floating-point result symmetric.
        let (a, b) = if term_a <= term_b {
            (term_a, term_b)
        } else {
            (term_b, term_a)
        };

        let Some(cache) = &self.cache else {
            return self.compute(a, b);
        };

        let key = (a.to_string(), b.to_string());
        if let Some(&value) = cache.read().get(&key) {
            return Ok(value);
        }
        let value = self.compute(a, b)?;
        cache.write().insert(key, value);
        Ok(value)
    }

    /// Number of documents containing both terms.
    pub fn joint_document_frequency(&self, term_a: &str, term_b: &str) -> Result<u64> {
        if term_a == term_b {
            return Ok(self.index.document_frequency(term_a));
        }
        let postings_a = self.index.postings(term_a)?;
        let postings_b = self.index.postings(term_b)?;
        Ok(intersection_size(&postings_a, &postings_b))
    }

    fn compute(&self, a: &str, b: &str) -> Result<f64> {
        let n = self.index.collection_size();
        let n_a = self.index.document_frequency(a);
        let n_b = self.index.document_frequency(b);
        if n == 0 || n_a == 0 || n_b == 0 {
            return Ok(0.0);
        }
        let n_ab = self.joint_document_frequency(a, b)?;
        Ok(emim(n, n_a, n_b, n_ab))
    }
}

/// Mutual information in bits from document counts, clamped to `[0, 1]`.
pub fn emim(n: u64, n_a: u64, n_b: u64, n_ab: u64) -> f64 {
    if n == 0 || n_a == 0 || n_b == 0 || n_ab == 0 {
        return 0.0;
    }

    let total = n as f64;
    let p_a = n_a as f64 / total;
    let p_b = n_b as f64 / total;
    let p_ab = n_ab as f64 / total;
    if p_ab <= p_a * p_b {
        return 0.0;
    }

    let cells = [
        (n_ab as f64, p_a, p_b),
        ((n_a - n_ab) as f64, p_a, 1.0 - p_b),
        ((n_b - n_ab) as f64, 1.0 - p_a, p_b),
        ((n + n_ab - n_a - n_b) as f64, 1.0 - p_a, 1.0 - p_b),
    ];

    let mi: f64 = cells
        .iter()
        .filter(|(count, _, _)| *count > 0.0)
        .map(|&(count, p_x, p_y)| {
            let p_xy = count / total;
            p_xy * (p_xy / (p_x * p_y)).log2()
        })
        .sum();

    mi.clamp(0.0, 1.0)
}

fn intersection_size(a: &[Posting], b: &[Posting]) -> u64 {
    let (mut i, mut j, mut count) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].doc_id.cmp(&b[j].doc_id) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}
