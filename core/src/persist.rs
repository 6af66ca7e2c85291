use crate::config::INDEX_FORMAT_VERSION;
use crate::error::{Error, Result};
use crate::InvertedIndex;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

const INDEX_FILE: &str = "index.bin";
const META_FILE: &str = "meta.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
}

/// Write `index` to the directory `root` as `index.bin` plus `meta.json`.
pub fn save_index<P: AsRef<Path>>(root: P, index: &InvertedIndex) -> Result<MetaFile> {
    let root = root.as_ref();
    create_dir_all(root)?;
    let mut w = BufWriter::new(File::create(root.join(INDEX_FILE))?);
    bincode::serialize_into(&mut w, index)?;
    w.flush()?;

    let meta = MetaFile {
        num_docs: index.num_docs,
        num_terms: index.num_terms() as u32,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default(),
        version: INDEX_FORMAT_VERSION,
    };
    let mut w = BufWriter::new(File::create(root.join(META_FILE))?);
    serde_json::to_writer_pretty(&mut w, &meta)?;
    w.flush()?;
    tracing::info!(root = %root.display(), num_docs = meta.num_docs, "index saved");
    Ok(meta)
}

/// Read an index written by [`save_index`], rejecting other format versions and
/// indexes whose internal references do not line up.
pub fn load_index<P: AsRef<Path>>(root: P) -> Result<InvertedIndex> {
    let root = root.as_ref();
    let meta: MetaFile = serde_json::from_reader(BufReader::new(File::open(root.join(META_FILE))?))?;
    if meta.version != INDEX_FORMAT_VERSION {
        return Err(Error::Version { found: meta.version, expected: INDEX_FORMAT_VERSION });
    }
    let index: InvertedIndex = bincode::deserialize_from(BufReader::new(File::open(root.join(INDEX_FILE))?))?;
    index.check_consistency().map_err(Error::Corrupt)?;
    tracing::info!(root = %root.display(), num_docs = index.num_docs, "index loaded");
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use crate::tokenizer::StopWordSet;
    use crate::{query, Document};
    use tempfile::tempdir;

    fn sample() -> InvertedIndex {
        let docs = vec![Document::new("a", "cat dog"), Document::new("b", "dog")];
        InvertedIndex::build(&docs, &StopWordSet::new(), AnalyzerConfig::default())
    }

    fn overwrite_index(root: &Path, index: &InvertedIndex) {
        let bytes = bincode::serialize(index).unwrap();
        std::fs::write(root.join(INDEX_FILE), bytes).unwrap();
    }

    #[test]
    fn rejects_other_versions() {
        let dir = tempdir().unwrap();
        let mut meta = save_index(dir.path(), &sample()).unwrap();
        meta.version = INDEX_FORMAT_VERSION + 1;
        std::fs::write(dir.path().join(META_FILE), serde_json::to_string_pretty(&meta).unwrap()).unwrap();
        assert!(matches!(load_index(dir.path()), Err(Error::Version { .. })));
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(load_index(dir.path().join("absent")), Err(Error::Io(_))));
    }

    #[test]
    fn meta_is_pretty_json() {
        let dir = tempdir().unwrap();
        save_index(dir.path(), &sample()).unwrap();
        let text = std::fs::read_to_string(dir.path().join(META_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["num_docs"], 2);
        assert_eq!(value["version"], INDEX_FORMAT_VERSION);
        assert!(text.contains('\n'));
    }

    #[test]
    fn reload_answers_queries_identically() {
        let dir = tempdir().unwrap();
        let index = sample();
        save_index(dir.path(), &index).unwrap();
        let loaded = load_index(dir.path()).unwrap();
        assert_eq!(query(&loaded, "dog * !cat").unwrap(), query(&index, "dog * !cat").unwrap());
        assert_eq!(loaded.weight("cat", 0), index.weight("cat", 0));
    }

    #[test]
    fn tampered_index_is_rejected() {
        let dir = tempdir().unwrap();
        let index = sample();
        save_index(dir.path(), &index).unwrap();

        let mut short_df = index.clone();
        short_df.df.pop();
        overwrite_index(dir.path(), &short_df);
        assert!(matches!(load_index(dir.path()), Err(Error::Corrupt(_))));

        let mut fewer_docs = index.clone();
        fewer_docs.num_docs = 1;
        fewer_docs.docs.truncate(1);
        overwrite_index(dir.path(), &fewer_docs);
        assert!(matches!(load_index(dir.path()), Err(Error::Corrupt(_))));

        let mut extra_docs = index;
        extra_docs.num_docs = 7;
        overwrite_index(dir.path(), &extra_docs);
        assert!(matches!(load_index(dir.path()), Err(Error::Corrupt(_))));
    }
}
