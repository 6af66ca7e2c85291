use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// On-disk format version written to `meta.json`; bumped on incompatible changes.
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Separator between document sources in a `createIndex` argument.
pub const PATH_SEPARATOR: char = ';';

/// Separator joining nested keys when flattening statistics.
pub const FLATTEN_SEPARATOR: &str = ".";

/// Deepest `(` / `!` nesting a query may use.
pub const MAX_QUERY_DEPTH: usize = 256;

/// Most tokens (words, operators, parentheses) a query may contain. Bounds the height
/// of left-leaning `a + b + c ...` chains, which the parser builds without nesting.
pub const MAX_QUERY_TOKENS: usize = 4096;

/// Text analysis options shared by indexing and query normalization.
///
/// Both options are off by default, so tokens are plain lower-cased word runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Apply Unicode NFKC normalization before splitting (e.g. `ﬁ` -> `fi`).
    #[serde(default)]
    pub unicode_nfkc: bool,
    /// Reduce tokens to their English Snowball stem.
    #[serde(default)]
    pub stem: bool,
}

/// Build-time configuration of an index.
#[derive(Debug, Clone, Default)]
pub struct IndexConfig {
    /// Optional stop-word list, one word per line.
    pub stop_words: Option<PathBuf>,
    pub analyzer: AnalyzerConfig,
}

impl IndexConfig {
    pub fn new(stop_words: Option<PathBuf>) -> Self {
        Self { stop_words, analyzer: AnalyzerConfig::default() }
    }

    pub fn with_analyzer(mut self, analyzer: AnalyzerConfig) -> Self {
        self.analyzer = analyzer;
        self
    }
}
