//! Term statistics: raw per-document counts, document frequency and tf-idf weights.
//!
//! Counts are plain maps so partial results computed on different threads can be
//! combined with [`merge_counts`] in any order.

use crate::DocId;
use std::collections::HashMap;
use std::hash::Hash;

/// Count the occurrences of each distinct token.
pub fn count_tokens<S: AsRef<str>>(tokens: &[S]) -> HashMap<String, u32> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for t in tokens {
        *counts.entry(t.as_ref().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Combine two count maps by summing the values of shared keys.
///
/// Commutative and associative, so the merge order of partial maps is irrelevant.
pub fn merge_counts<K: Eq + Hash>(mut a: HashMap<K, u32>, b: HashMap<K, u32>) -> HashMap<K, u32> {
    if a.len() < b.len() {
        return merge_counts(b, a);
    }
    for (k, v) in b {
        *a.entry(k).or_insert(0) += v;
    }
    a
}

/// tf-idf weight: `log10(tf + 1) * log10(n / df)`.
///
/// `tf == 0` short-circuits to exactly 0. A term with `df == 0` never occurs and has
/// no weight; it also yields 0 here rather than dividing by zero.
pub fn tf_idf(tf: u32, df: u32, n: u32) -> f64 {
    if tf == 0 || df == 0 {
        return 0.0;
    }
    let tf_part = (tf as f64 + 1.0).log10();
    let idf = (n as f64 / df as f64).log10();
    tf_part * idf
}

/// Euclidean norm of a weight vector.
pub fn norm<I: IntoIterator<Item = f64>>(weights: I) -> f64 {
    weights.into_iter().map(|w| w * w).sum::<f64>().sqrt()
}

/// term -> doc -> raw count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermCounts {
    counts: HashMap<String, HashMap<DocId, u32>>,
}

impl TermCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts for a single document. A document with no tokens adds no entries.
    pub fn for_document<S: AsRef<str>>(doc_id: DocId, tokens: &[S]) -> Self {
        let counts = count_tokens(tokens)
            .into_iter()
            .map(|(term, tf)| (term, HashMap::from([(doc_id, tf)])))
            .collect();
        Self { counts }
    }

    /// Term-wise merge; per-document counts are summed with [`merge_counts`].
    pub fn merge(mut self, other: TermCounts) -> TermCounts {
        if self.counts.len() < other.counts.len() {
            return other.merge(self);
        }
        for (term, docs) in other.counts {
            let entry = self.counts.remove(&term).unwrap_or_default();
            self.counts.insert(term, merge_counts(entry, docs));
        }
        self
    }

    pub fn get(&self, term: &str, doc_id: DocId) -> u32 {
        self.counts.get(term).and_then(|d| d.get(&doc_id)).copied().unwrap_or(0)
    }

    pub fn num_terms(&self) -> usize {
        self.counts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &HashMap<DocId, u32>)> {
        self.counts.iter()
    }

    /// Number of documents with a non-zero count, per term.
    pub fn document_frequency(&self) -> HashMap<String, u32> {
        self.counts
            .iter()
            .map(|(term, docs)| (term.clone(), docs.values().filter(|&&c| c > 0).count() as u32))
            .collect()
    }

    /// tf-idf weight of every (term, doc) pair with a non-zero count, for a corpus of
    /// `num_docs` documents.
    pub fn tf_idf_weights(&self, num_docs: u32) -> HashMap<String, HashMap<DocId, f64>> {
        let df = self.document_frequency();
        self.counts
            .iter()
            .filter(|(term, _)| df[*term] > 0)
            .map(|(term, docs)| {
                let df_t = df[term];
                let weights = docs
                    .iter()
                    .filter(|(_, &tf)| tf > 0)
                    .map(|(&doc, &tf)| (doc, tf_idf(tf, df_t, num_docs)))
                    .collect();
                (term.clone(), weights)
            })
            .collect()
    }

    pub fn into_inner(self) -> HashMap<String, HashMap<DocId, u32>> {
        self.counts
    }
}
