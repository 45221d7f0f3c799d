//! Controlled vocabulary store.
//!
//! The vocabulary groups surface terms under concepts; every term of a concept
//! is related to every other term of that concept. Two file layouts are read:
//!
//! - tab-separated text, one row per concept or per (concept, term) pair:
//!   `<concept_id>\t<surface term>[\t<surface term>...]`. Rows sharing a
//!   concept id are merged. Blank lines and lines starting with `#` are ignored.
//! - `.json`: an array of groups, each an array of surface terms.
//!
//! Surface terms go through the analyzer, so lookups use the same stems as the
//! index. A multi-word surface term contributes each of its analyzed words.
//! The store is immutable after loading and can be shared between threads.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::{AHashMap, AHashSet};
use log::{debug, info, warn};

use crate::analysis::analyzer::Analyzer;
use crate::error::{DjmirError, Result};

/// Term to related-terms mapping.
#[derive(Debug, Clone, Default)]
pub struct ControlledVocabulary {
    related: AHashMap<String, Vec<String>>,
    concept_count: usize,
}

impl ControlledVocabulary {
    /// A vocabulary with no entries; expansion with it is the identity.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from groups of surface terms.
    pub fn from_groups<I, G, S>(groups: I, analyzer: &dyn Analyzer) -> Result<Self>
    where
        I: IntoIterator<Item = G>,
        G: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut analyzed = Vec::new();
        for group in groups {
            let mut terms = Vec::new();
            for surface in group {
                terms.extend(analyzer.analyze_terms(surface.as_ref())?);
            }
            analyzed.push(terms);
        }
        Ok(Self::from_analyzed_groups(analyzed))
    }

    /// Build from groups whose terms are already analyzed.
    pub fn from_analyzed_groups(groups: Vec<Vec<String>>) -> Self {
        let mut related: AHashMap<String, AHashSet<String>> = AHashMap::new();
        let mut concept_count = 0;

        for group in groups {
            let members: AHashSet<String> = group.into_iter().collect();
            if members.len() < 2 {
                continue;
            }
            concept_count += 1;
            for term in &members {
                let entry = related.entry(term.clone()).or_default();
                entry.extend(members.iter().filter(|other| *other != term).cloned());
            }
        }

        let related = related
            .into_iter()
            .map(|(term, set)| {
                let mut terms: Vec<String> = set.into_iter().collect();
                terms.sort();
                (term, terms)
            })
            .collect();

        ControlledVocabulary {
            related,
            concept_count,
        }
    }

    /// Parse the tab-separated layout.
    pub fn parse_tsv<R: BufRead>(reader: R, analyzer: &dyn Analyzer) -> Result<Self> {
        let mut order: Vec<String> = Vec::new();
        let mut concepts: AHashMap<String, Vec<String>> = AHashMap::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut columns = line.split('\t');
            let concept_id = columns.next().unwrap_or_default().trim();
            let terms: Vec<&str> = columns
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .collect();
            if concept_id.is_empty() || terms.is_empty() {
                warn!("Skipping vocabulary line {}: {:?}", i + 1, line);
                continue;
            }

            let group = concepts.entry(concept_id.to_string()).or_insert_with(|| {
                order.push(concept_id.to_string());
                Vec::new()
            });
            for term in terms {
                group.extend(analyzer.analyze_terms(term)?);
            }
        }

        let groups = order
            .into_iter()
            .filter_map(|id| concepts.remove(&id))
            .collect();
        Ok(Self::from_analyzed_groups(groups))
    }

    /// Load a vocabulary file. A missing file is a configuration error.
    pub fn load<P: AsRef<Path>>(path: P, analyzer: &dyn Analyzer) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DjmirError::configuration(format!(
                "vocabulary file '{}' does not exist",
                path.display()
            )));
        }

        let vocabulary = if path.extension().is_some_and(|ext| ext == "json") {
            let content = std::fs::read_to_string(path)?;
            let groups: Vec<Vec<String>> = serde_json::from_str(&content)?;
            Self::from_groups(groups, analyzer)?
        } else {
            Self::parse_tsv(BufReader::new(File::open(path)?), analyzer)?
        };

        info!(
            "Loaded controlled vocabulary from {}: {} concepts, {} terms",
            path.display(),
            vocabulary.concept_count,
            vocabulary.len()
        );
        Ok(vocabulary)
    }

    /// Load a vocabulary, falling back to an empty one on any failure.
    pub fn load_or_empty<P: AsRef<Path>>(path: P, analyzer: &dyn Analyzer) -> Self {
        match Self::load(path.as_ref(), analyzer) {
            Ok(vocabulary) => {
                if vocabulary.is_empty() {
                    warn!(
                        "Vocabulary {} is empty; queries will not be expanded",
                        path.as_ref().display()
                    );
                }
                vocabulary
            }
            Err(e) => {
                warn!("{e}; queries will not be expanded");
                Self::empty()
            }
        }
    }

    /// Related terms of `term`, sorted; empty when unknown.
    pub fn lookup(&self, term: &str) -> &[String] {
        match self.related.get(term) {
            Some(terms) => terms,
            None => {
                debug!("No vocabulary entry for '{term}'");
                &[]
            }
        }
    }

    /// Number of distinct terms with at least one related term.
    pub fn len(&self) -> usize {
        self.related.len()
    }

    pub fn is_empty(&self) -> bool {
        self.related.is_empty()
    }

    pub fn concept_count(&self) -> usize {
        self.concept_count
    }
}
