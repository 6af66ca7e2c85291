use crate::config::AnalyzerConfig;
use crate::flatten::Nested;
use crate::stats::{tf_idf, TermCounts};
use crate::tokenizer::{Analyzer, StopWordSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

pub type TermId = u32;
pub type DocId = u32;

/// Set of matching documents, ordered by id.
pub type ResultSet = BTreeSet<DocId>;

/// A source document: an external identifier (usually its path) and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocMeta {
    pub external_id: String,
    /// Tokens left after stop-word filtering.
    pub num_tokens: u32,
    /// Euclidean norm of the document's tf-idf vector.
    pub norm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u32,
    pub weight: f64, // tf-idf, not normalized
}

/// Leaf of the statistics tree returned by [`InvertedIndex::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Stat {
    Count(u64),
    Flag(bool),
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stat::Count(n) => write!(f, "{n}"),
            Stat::Flag(b) => write!(f, "{b}"),
        }
    }
}

/// Term -> weighted posting list, built once and read-only afterwards.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub dictionary: HashMap<String, TermId>,
    pub df: Vec<u32>,
    pub postings: HashMap<TermId, Vec<Posting>>, // postings sorted by doc_id
    pub docs: Vec<DocMeta>,                      // indexed by DocId
    pub num_docs: u32,
    pub analyzer: AnalyzerConfig,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index over `documents`; ids are assigned in input order.
    ///
    /// Documents are analyzed in parallel and their counts merged afterwards. Every
    /// document counts toward the corpus size, including ones left without tokens.
    pub fn build(documents: &[Document], stop_words: &StopWordSet, analyzer: AnalyzerConfig) -> Self {
        let az = Analyzer::new(analyzer);
        let analyzed: Vec<(u32, TermCounts)> = documents
            .par_iter()
            .enumerate()
            .map(|(i, doc)| {
                let tokens = az.analyze_filtered(&doc.text, stop_words);
                (tokens.len() as u32, TermCounts::for_document(i as DocId, &tokens))
            })
            .collect();
        let lengths: Vec<u32> = analyzed.iter().map(|(n, _)| *n).collect();
        let counts = analyzed
            .into_par_iter()
            .map(|(_, c)| c)
            .reduce(TermCounts::new, TermCounts::merge);

        let num_docs = documents.len() as u32;
        tracing::debug!(num_docs, num_terms = counts.num_terms(), "merged term counts");

        // Sorted so term ids do not depend on merge order.
        let mut terms: Vec<(String, HashMap<DocId, u32>)> = counts.into_inner().into_iter().collect();
        terms.sort_by(|a, b| a.0.cmp(&b.0));

        let mut dictionary = HashMap::with_capacity(terms.len());
        let mut df = Vec::with_capacity(terms.len());
        let mut postings = HashMap::with_capacity(terms.len());
        let mut sq_norms = vec![0.0f64; documents.len()];
        for (term_id, (term, per_doc)) in terms.into_iter().enumerate() {
            let term_id = term_id as TermId;
            let df_t = per_doc.values().filter(|&&tf| tf > 0).count() as u32;
            let mut plist: Vec<Posting> = per_doc
                .into_iter()
                .filter(|&(_, tf)| tf > 0)
                .map(|(doc_id, tf)| Posting { doc_id, tf, weight: tf_idf(tf, df_t, num_docs) })
                .collect();
            plist.sort_by_key(|p| p.doc_id);
            for p in &plist {
                sq_norms[p.doc_id as usize] += p.weight * p.weight;
            }
            dictionary.insert(term, term_id);
            df.push(df_t);
            postings.insert(term_id, plist);
        }

        let docs = documents
            .iter()
            .zip(lengths)
            .zip(sq_norms)
            .map(|((doc, num_tokens), sq)| DocMeta { external_id: doc.id.clone(), num_tokens, norm: sq.sqrt() })
            .collect();

        let index = InvertedIndex { dictionary, df, postings, docs, num_docs, analyzer };
        tracing::info!(num_docs, num_terms = index.num_terms(), "index built");
        index
    }

    pub fn analyzer(&self) -> Analyzer {
        Analyzer::new(self.analyzer)
    }

    pub fn num_terms(&self) -> usize {
        self.dictionary.len()
    }

    /// Normalize a query word with the analyzer the index was built with.
    pub fn normalize(&self, word: &str) -> Vec<String> {
        self.analyzer().analyze(word)
    }

    /// Raw posting list of an already-normalized term.
    pub fn posting_list(&self, term: &str) -> &[Posting] {
        self.dictionary
            .get(term)
            .and_then(|tid| self.postings.get(tid))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Documents containing `word`, or an empty set if it is not indexed.
    ///
    /// A word that normalizes to several terms (`foo-bar`) matches documents holding all
    /// of them; one that normalizes to nothing matches no document.
    pub fn postings(&self, word: &str) -> ResultSet {
        let terms = self.normalize(word);
        let mut sets = terms
            .iter()
            .map(|t| self.posting_list(t).iter().map(|p| p.doc_id).collect::<ResultSet>());
        let first = match sets.next() {
            Some(s) => s,
            None => return ResultSet::new(),
        };
        sets.fold(first, |acc, s| acc.intersection(&s).copied().collect())
    }

    /// Every document id in the corpus.
    pub fn all_document_ids(&self) -> ResultSet {
        (0..self.num_docs).collect()
    }

    /// tf-idf weight of `word` in `doc_id`, 0 when it does not occur there. Multi-term
    /// words sum the weights of their terms.
    pub fn weight(&self, word: &str, doc_id: DocId) -> f64 {
        self.normalize(word)
            .iter()
            .filter_map(|t| {
                let plist = self.posting_list(t);
                plist
                    .binary_search_by_key(&doc_id, |p| p.doc_id)
                    .ok()
                    .map(|i| plist[i].weight)
            })
            .sum()
    }

    pub fn document_frequency(&self, word: &str) -> u32 {
        match self.normalize(word).as_slice() {
            [term] => self.dictionary.get(term).map(|&tid| self.term_df(tid)).unwrap_or(0),
            _ => self.postings(word).len() as u32,
        }
    }

    fn term_df(&self, tid: TermId) -> u32 {
        self.df.get(tid as usize).copied().unwrap_or(0)
    }

    /// Check the cross-references a deserialized index relies on: one `df` entry per
    /// term, one `DocMeta` per document, and postings that only name known terms and
    /// documents.
    pub fn check_consistency(&self) -> Result<(), String> {
        if self.df.len() != self.dictionary.len() {
            return Err(format!("{} df entries for {} terms", self.df.len(), self.dictionary.len()));
        }
        if self.docs.len() != self.num_docs as usize {
            return Err(format!("{} document records for {} documents", self.docs.len(), self.num_docs));
        }
        if let Some((term, tid)) = self.dictionary.iter().find(|&(_, &tid)| tid as usize >= self.df.len()) {
            return Err(format!("term {term:?} has out-of-range id {tid}"));
        }
        for (&tid, plist) in &self.postings {
            if tid as usize >= self.df.len() {
                return Err(format!("postings for unknown term id {tid}"));
            }
            if let Some(p) = plist.iter().find(|p| p.doc_id >= self.num_docs) {
                return Err(format!("posting names unknown document {}", p.doc_id));
            }
        }
        Ok(())
    }

    /// Norm of the document's tf-idf vector; 0 for unknown or weightless documents.
    pub fn doc_norm(&self, doc_id: DocId) -> f64 {
        self.document(doc_id).map(|d| d.norm).unwrap_or(0.0)
    }

    pub fn document(&self, doc_id: DocId) -> Option<&DocMeta> {
        self.docs.get(doc_id as usize)
    }

    pub fn external_id(&self, doc_id: DocId) -> Option<&str> {
        self.document(doc_id).map(|d| d.external_id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.num_docs == 0
    }

    /// Corpus, analyzer and per-term statistics as a nested tree.
    pub fn stats(&self) -> Nested<Stat> {
        let num_postings: usize = self.postings.values().map(Vec::len).sum();
        let num_tokens: u64 = self.docs.iter().map(|d| d.num_tokens as u64).sum();
        let terms: BTreeMap<String, Nested<Stat>> = self
            .dictionary
            .iter()
            .map(|(term, &tid)| {
                let df = Nested::Leaf(Stat::Count(self.term_df(tid) as u64));
                (term.clone(), Nested::map([("df", df)]))
            })
            .collect();
        Nested::map([
            (
                "corpus",
                Nested::map([
                    ("documents", Nested::Leaf(Stat::Count(self.num_docs as u64))),
                    ("terms", Nested::Leaf(Stat::Count(self.num_terms() as u64))),
                    ("postings", Nested::Leaf(Stat::Count(num_postings as u64))),
                    ("tokens", Nested::Leaf(Stat::Count(num_tokens))),
                ]),
            ),
            (
                "analyzer",
                Nested::map([
                    ("nfkc", Nested::Leaf(Stat::Flag(self.analyzer.unicode_nfkc))),
                    ("stem", Nested::Leaf(Stat::Flag(self.analyzer.stem))),
                ]),
            ),
            ("terms", Nested::Map(terms)),
        ])
    }
}
