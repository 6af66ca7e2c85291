use boolindex_core::{build_index, persist, query, IndexConfig, IndexHandle, InvertedIndex};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_corpus(dir: &Path) -> Vec<PathBuf> {
    let files = [("d1.txt", "Cat, dog."), ("d2.txt", "dog & bird"), ("d3.txt", "cat bird fish")];
    files
        .iter()
        .map(|(name, text)| {
            let p = dir.join(name);
            fs::write(&p, text).unwrap();
            p
        })
        .collect()
}

fn names(index: &InvertedIndex, q: &str) -> BTreeSet<String> {
    query(index, q)
        .unwrap()
        .into_iter()
        .filter_map(|d| index.external_id(d))
        .filter_map(|id| Path::new(id).file_stem().map(|s| s.to_string_lossy().to_string()))
        .collect()
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn builds_from_files_and_answers_boolean_queries() {
    let dir = tempdir().unwrap();
    let sources = write_corpus(dir.path());
    let index = build_index(&sources, &IndexConfig::default()).unwrap();

    assert_eq!(names(&index, "cat * dog"), set(&["d1"]));
    assert_eq!(names(&index, "cat + bird"), set(&["d1", "d2", "d3"]));
    assert_eq!(names(&index, "!cat"), set(&["d2"]));
    assert_eq!(names(&index, "(cat + dog) * !bird"), set(&["d1"]));
}

#[test]
fn stop_words_are_not_searchable() {
    let dir = tempdir().unwrap();
    let sources = write_corpus(dir.path());
    let stop = dir.path().join("stop.txt");
    fs::write(&stop, "# noise\nbird\n").unwrap();

    let index = build_index(&sources, &IndexConfig::new(Some(stop))).unwrap();
    assert!(names(&index, "bird").is_empty());
    assert_eq!(index.num_docs, 3);
    assert_eq!(names(&index, "!bird"), set(&["d1", "d2", "d3"]));
}

#[test]
fn missing_source_fails_whole_build() {
    let dir = tempdir().unwrap();
    let mut sources = write_corpus(dir.path());
    sources.push(dir.path().join("missing.txt"));
    assert!(matches!(build_index(&sources, &IndexConfig::default()), Err(boolindex_core::Error::Config { .. })));
}

#[test]
fn empty_corpus_queries_return_nothing() {
    let sources: Vec<PathBuf> = Vec::new();
    let index = build_index(&sources, &IndexConfig::default()).unwrap();
    assert!(query(&index, "anything").unwrap().is_empty());
    assert!(index.postings("anything").is_empty());
}

#[test]
fn saved_index_behaves_like_the_original() {
    let dir = tempdir().unwrap();
    let sources = write_corpus(dir.path());
    let index = build_index(&sources, &IndexConfig::default()).unwrap();
    let out = dir.path().join("saved");
    let meta = persist::save_index(&out, &index).unwrap();
    assert_eq!(meta.num_docs, 3);

    let loaded = persist::load_index(&out).unwrap();
    assert_eq!(loaded, index);
    assert_eq!(loaded.all_document_ids(), index.all_document_ids());
    for q in ["cat * dog", "!cat", "(cat + dog) * !bird"] {
        assert_eq!(names(&loaded, q), names(&index, q));
    }

    let handle = IndexHandle::with_index(loaded);
    assert_eq!(handle.query("fish").unwrap().len(), 1);
}
