//! In-memory boolean retrieval over a small document corpus.
//!
//! Documents go through tokenization, stop-word filtering and tf-idf weighting into an
//! [`InvertedIndex`]; queries such as `(cat + dog) * !bird` are parsed into an
//! [`Expr`] and evaluated to a set of document ids.

pub mod config;
pub mod error;
pub mod eval;
pub mod flatten;
pub mod handle;
pub mod index;
pub mod persist;
pub mod query;
pub mod source;
pub mod stats;
pub mod tokenizer;

pub use config::{AnalyzerConfig, IndexConfig};
pub use error::{Error, QueryError, Result};
pub use eval::{evaluate, query, rank};
pub use handle::IndexHandle;
pub use index::{DocId, DocMeta, Document, InvertedIndex, Posting, ResultSet, Stat, TermId};
pub use query::{parse, Expr};

use std::path::Path;
use tokenizer::Analyzer;

/// Load `sources` and the configured stop-word list, then build an index.
///
/// Any unreadable source fails the whole build.
pub fn build_index<P: AsRef<Path>>(sources: &[P], config: &IndexConfig) -> Result<InvertedIndex> {
    let analyzer = Analyzer::new(config.analyzer);
    let stop_words = source::load_stop_words(config.stop_words.as_deref(), &analyzer)?;
    let documents = source::load_documents(sources)?;
    tracing::debug!(documents = documents.len(), stop_words = stop_words.len(), "sources loaded");
    Ok(InvertedIndex::build(&documents, &stop_words, config.analyzer))
}
