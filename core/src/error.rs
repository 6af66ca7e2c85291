use std::path::PathBuf;

/// A malformed boolean query. Every variant carries the query text it was raised for.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("empty query")]
    EmptyQuery,
    #[error("missing operand for '{operator}' at position {position} in {query:?}")]
    MissingOperand { operator: char, position: usize, query: String },
    #[error("unbalanced parenthesis at position {position} in {query:?}")]
    UnbalancedParen { position: usize, query: String },
    #[error("unexpected {token} at position {position} in {query:?}")]
    UnexpectedToken { token: String, position: usize, query: String },
    #[error("query nested deeper than {max} levels at position {position} in {query:?}")]
    TooDeep { max: usize, position: usize, query: String },
    #[error("query has {tokens} tokens, more than the limit of {max}")]
    TooLong { tokens: usize, max: usize },
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("syntax error: {0}")]
    Syntax(#[from] QueryError),
    #[error("create or load an index first")]
    EmptyIndex,
    #[error("cannot read {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Usage(String),
    #[error("index file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("index encoding error: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("index metadata error: {0}")]
    Meta(#[from] serde_json::Error),
    #[error("unsupported index format version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
    #[error("corrupt index: {0}")]
    Corrupt(String),
}

impl Error {
    pub(crate) fn config(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Config { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
