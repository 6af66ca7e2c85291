//! Loading of documents and stop-word lists from the filesystem.
//!
//! Any unreadable source fails the whole load; there is no partial corpus.

use crate::error::{Error, Result};
use crate::index::Document;
use crate::tokenizer::{Analyzer, StopWordSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expand sources into files: a directory contributes every file below it, sorted by
/// path; anything else is taken as a file.
pub fn expand_sources<P: AsRef<Path>>(sources: &[P]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for source in sources {
        let path = source.as_ref();
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(path) {
                let entry = entry.map_err(|e| {
                    let p = e.path().unwrap_or(path).to_path_buf();
                    Error::config(p, e.into())
                })?;
                if entry.file_type().is_file() {
                    found.push(entry.into_path());
                } else if !entry.file_type().is_dir() {
                    tracing::warn!(path = %entry.path().display(), "skipping non-file source");
                }
            }
            found.sort();
            files.extend(found);
        } else {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// Read every source into a [`Document`] whose id is its path.
pub fn load_documents<P: AsRef<Path>>(sources: &[P]) -> Result<Vec<Document>> {
    expand_sources(sources)?
        .into_iter()
        .map(|path| {
            let text = fs::read_to_string(&path).map_err(|e| Error::config(&path, e))?;
            Ok(Document::new(path.display().to_string(), text))
        })
        .collect()
}

/// Parse a stop-word list: one entry per line, `#` comments and blank lines skipped.
/// Entries are normalized with `analyzer` so they compare equal to indexed tokens.
pub fn parse_stop_words(text: &str, analyzer: &Analyzer) -> StopWordSet {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .flat_map(|l| analyzer.analyze(l))
        .collect()
}

/// Load the stop-word list at `path`; no path means no stop words.
pub fn load_stop_words(path: Option<&Path>, analyzer: &Analyzer) -> Result<StopWordSet> {
    match path {
        None => Ok(StopWordSet::new()),
        Some(p) => {
            let text = fs::read_to_string(p).map_err(|e| Error::config(p, e))?;
            let words = parse_stop_words(&text, analyzer);
            tracing::debug!(path = %p.display(), count = words.len(), "loaded stop words");
            Ok(words)
        }
    }
}
