use crate::text::normalize::TextNormalizer;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A document ready for indexing, with content already read from disk
#[derive(Debug, Clone)]
pub struct Document {
    pub path: String,
    pub title: String,
    pub text: String,
}

/// Immutable TF-IDF index over a document corpus.
///
/// Row i of `weights` is the weight vector of `paths[i]`; columns are fixed
/// by `vocabulary`. Document frequencies are corpus-wide, so a changed corpus
/// gets a whole new index rather than a patched one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusIndex {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    weights: Vec<Vec<f32>>,
    paths: Vec<String>,
    titles: Vec<String>,
}

impl CorpusIndex {
    /// An index with no documents; searches against it return nothing
    pub fn empty() -> Self {
        Self {
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            weights: Vec::new(),
            paths: Vec::new(),
            titles: Vec::new(),
        }
    }

    /// Build an index over the given documents.
    ///
    /// Document order is preserved: row i corresponds to `documents[i]`. The
    /// vocabulary is fixed from exactly this corpus, and each term is
    /// weighted with `tf * ln(total_docs / doc_freq)`.
    pub fn build(documents: &[Document], normalizer: &dyn TextNormalizer) -> Self {
        let total_docs = documents.len();

        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| {
                normalizer
                    .normalize(&doc.text)
                    .split_whitespace()
                    .map(|t| t.to_string())
                    .collect()
            })
            .collect();

        // First pass fixes the vocabulary and counts document frequencies
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: Vec<usize> = Vec::new();
        for tokens in &tokenized {
            let mut seen: HashSet<&str> = HashSet::new();
            for token in tokens {
                if !seen.insert(token.as_str()) {
                    continue;
                }
                if let Some(&column) = vocabulary.get(token.as_str()) {
                    doc_freq[column] += 1;
                } else {
                    vocabulary.insert(token.clone(), doc_freq.len());
                    doc_freq.push(1);
                }
            }
        }

        let idf: Vec<f32> = doc_freq
            .iter()
            .map(|&df| (total_docs as f32 / df as f32).ln())
            .collect();

        // Second pass turns term counts into weight rows
        let mut weights = Vec::with_capacity(total_docs);
        for tokens in &tokenized {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for token in tokens {
                *counts.entry(token.as_str()).or_default() += 1;
            }

            let mut row = vec![0.0f32; vocabulary.len()];
            for (token, count) in counts {
                if let Some(&column) = vocabulary.get(token) {
                    row[column] = count as f32 * idf[column];
                }
            }
            weights.push(row);
        }

        Self {
            vocabulary,
            idf,
            weights,
            paths: documents.iter().map(|d| d.path.clone()).collect(),
            titles: documents.iter().map(|d| d.title.clone()).collect(),
        }
    }

    /// Rank documents against a query.
    ///
    /// Returns `(row, score)` pairs sorted by descending score; equal scores
    /// keep row order. Scores at or below `threshold` are dropped and at
    /// most `top_n` results are returned. Query terms outside the vocabulary
    /// are ignored.
    pub fn search(
        &self,
        query: &str,
        normalizer: &dyn TextNormalizer,
        threshold: f32,
        top_n: usize,
    ) -> Vec<(usize, f32)> {
        if self.weights.is_empty() {
            return Vec::new();
        }

        let query_vector = self.vectorize_query(query, normalizer);
        if query_vector.iter().all(|w| *w == 0.0) {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .weights
            .iter()
            .enumerate()
            // f32 rounding can push identical vectors a hair past 1.0
            .map(|(row, doc)| (row, cosine_similarity(&query_vector, doc).min(1.0)))
            .filter(|(_, score)| *score > threshold)
            .collect();

        // Stable sort keeps row order (lexicographic path order) for ties
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_n);
        scored
    }

    fn vectorize_query(&self, query: &str, normalizer: &dyn TextNormalizer) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.vocabulary.len()];
        for token in normalizer.normalize(query).split_whitespace() {
            if let Some(&column) = self.vocabulary.get(token) {
                vector[column] += self.idf[column];
            }
        }
        vector
    }

    /// Number of indexed documents
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// True when the index holds no documents
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of distinct vocabulary terms
    pub fn term_count(&self) -> usize {
        self.vocabulary.len()
    }

    /// Path of the document at `row`
    pub fn path(&self, row: usize) -> Option<&str> {
        self.paths.get(row).map(|s| s.as_str())
    }

    /// Title of the document at `row`
    pub fn title(&self, row: usize) -> Option<&str> {
        self.titles.get(row).map(|s| s.as_str())
    }

    /// Paths of all indexed documents in row order
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Validate internal shape. Used to reject corrupt cache artifacts.
    pub fn is_consistent(&self) -> bool {
        let docs = self.paths.len();
        let terms = self.vocabulary.len();

        if self.titles.len() != docs || self.weights.len() != docs {
            return false;
        }
        if self.idf.len() != terms {
            return false;
        }
        if self.weights.iter().any(|row| row.len() != terms) {
            return false;
        }

        // Every column id must be in range and assigned exactly once
        let mut seen = vec![false; terms];
        for &column in self.vocabulary.values() {
            if column >= terms || seen[column] {
                return false;
            }
            seen[column] = true;
        }
        true
    }
}

/// Calculate cosine similarity between two vectors
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
