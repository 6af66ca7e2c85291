//! Interactive command table: parsing of REPL lines and their execution against a
//! session-owned index handle.

use anyhow::Result;
use boolindex_core::config::PATH_SEPARATOR;
use boolindex_core::flatten::{flatten, Nested};
use boolindex_core::{build_index, parse, persist, rank, AnalyzerConfig, Error, IndexConfig, IndexHandle};
use std::fmt::Display;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

const CREATE_INDEX_HELP: &str = "Wrong use.\n    Example: createIndex data_file1;data_file2 stop_word_file";
const BOOLEAN_HELP: &str = "Wrong use.\n    Example: boolean (word1 * !word2) + word3";
const HELP: &str = "Commands:
    createIndex <file1;file2;...> [stop_word_file]   build a new index
    boolean <query>                                  run a query, e.g. (word1 * !word2) + word3
    save <dir>                                       write the current index to <dir>
    load <dir>                                       replace the current index with the one in <dir>
    stats                                            print index statistics
    docs                                             list indexed documents
    help                                             show this message
    exit                                             leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateIndex { sources: Vec<PathBuf>, stop_words: Option<PathBuf> },
    Boolean { query: String },
    Save { path: PathBuf },
    Load { path: PathBuf },
    Stats,
    Docs,
    Help,
    Exit,
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, Error> {
        let mut parts = line.split_whitespace();
        let name = match parts.next() {
            Some(n) => n,
            None => return Ok(None),
        };
        let args: Vec<&str> = parts.collect();
        let cmd = match name {
            "createIndex" => match args.as_slice() {
                [sources] | [sources, _] => Command::CreateIndex {
                    sources: sources.split(PATH_SEPARATOR).filter(|s| !s.is_empty()).map(PathBuf::from).collect(),
                    stop_words: args.get(1).map(PathBuf::from),
                },
                _ => return Err(Error::Usage(CREATE_INDEX_HELP.into())),
            },
            "boolean" => {
                if args.is_empty() {
                    return Err(Error::Usage(BOOLEAN_HELP.into()));
                }
                Command::Boolean { query: args.join(" ") }
            }
            "save" | "load" => match args.as_slice() {
                [path] if name == "save" => Command::Save { path: PathBuf::from(path) },
                [path] => Command::Load { path: PathBuf::from(path) },
                _ => return Err(Error::Usage(format!("Wrong use.\n    Example: {name} ./my-index"))),
            },
            "stats" | "docs" | "help" | "exit" | "quit" if !args.is_empty() => {
                return Err(Error::Usage(format!("{name} takes no arguments")));
            }
            "stats" => Command::Stats,
            "docs" => Command::Docs,
            "help" => Command::Help,
            "exit" | "quit" => Command::Exit,
            other => return Err(Error::Usage(format!("<{other}> unknown command."))),
        };
        Ok(Some(cmd))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// State of one interactive session.
pub struct Session {
    pub handle: IndexHandle,
    pub analyzer: AnalyzerConfig,
    /// Print query results ordered by tf-idf score instead of by document id.
    pub ranked: bool,
}

impl Session {
    pub fn new(analyzer: AnalyzerConfig, ranked: bool) -> Self {
        Self { handle: IndexHandle::new(), analyzer, ranked }
    }

    /// Parse and run one line, writing user-facing output to `out`.
    pub fn run_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        match Command::parse(line)? {
            Some(cmd) => self.execute(cmd, out),
            None => Ok(Flow::Continue),
        }
    }

    pub fn execute<W: Write>(&mut self, cmd: Command, out: &mut W) -> Result<Flow> {
        match cmd {
            Command::CreateIndex { sources, stop_words } => {
                writeln!(out, "Indexing files...")?;
                let start = Instant::now();
                let config = IndexConfig::new(stop_words).with_analyzer(self.analyzer);
                let index = build_index(&sources, &config)?;
                self.handle.replace(index);
                writeln!(out, "Index has been created in {} seconds.", start.elapsed().as_secs_f64())?;
            }
            Command::Boolean { query } => {
                let index = self.handle.get()?;
                let start = Instant::now();
                let expr = parse(&query)?;
                let docs = boolindex_core::evaluate(&expr, &index);
                let elapsed = start.elapsed().as_secs_f64();
                writeln!(out, "Query executed in {elapsed} seconds and returned {} results.", docs.len())?;
                if self.ranked {
                    for (doc, score) in rank(&index, &expr, &docs) {
                        writeln!(out, "{}\t{score:.4}", index.external_id(doc).unwrap_or("?"))?;
                    }
                } else {
                    for doc in docs {
                        writeln!(out, "{}", index.external_id(doc).unwrap_or("?"))?;
                    }
                }
            }
            Command::Save { path } => {
                let index = self.handle.get()?;
                let meta = persist::save_index(&path, &index)?;
                writeln!(out, "Saved {} documents to {}.", meta.num_docs, path.display())?;
            }
            Command::Load { path } => {
                let index = persist::load_index(&path)?;
                let n = index.num_docs;
                self.handle.replace(index);
                writeln!(out, "Loaded {n} documents from {}.", path.display())?;
            }
            Command::Stats => {
                let index = self.handle.get()?;
                write_stats(&index.stats(), out)?;
            }
            Command::Docs => {
                let index = self.handle.get()?;
                for (id, doc) in index.docs.iter().enumerate() {
                    writeln!(out, "{id}\t{}\t{} tokens", doc.external_id, doc.num_tokens)?;
                }
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }
}

/// Print a statistics tree as flat `key = value` lines.
pub fn write_stats<T: Display + Clone, W: Write>(stats: &Nested<T>, out: &mut W) -> std::io::Result<()> {
    match flatten(stats.clone()) {
        Nested::Map(entries) => {
            for (key, value) in entries {
                if let Nested::Leaf(v) = value {
                    writeln!(out, "{key} = {v}")?;
                }
            }
        }
        Nested::Leaf(v) => writeln!(out, "{v}")?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn run(session: &mut Session, line: &str) -> Result<String> {
        let mut out = Vec::new();
        session.run_line(line, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn parses_command_table() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(
            Command::parse("createIndex a.txt;b.txt stop.txt").unwrap(),
            Some(Command::CreateIndex {
                sources: vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")],
                stop_words: Some(PathBuf::from("stop.txt")),
            })
        );
        assert_eq!(
            Command::parse("boolean (cat * !dog) + bird").unwrap(),
            Some(Command::Boolean { query: "(cat * !dog) + bird".into() })
        );
        assert_eq!(Command::parse("quit").unwrap(), Some(Command::Exit));
    }

    #[test]
    fn rejects_bad_argument_shapes() {
        assert!(matches!(Command::parse("createIndex"), Err(Error::Usage(_))));
        assert!(matches!(Command::parse("createIndex a b c"), Err(Error::Usage(_))));
        assert!(matches!(Command::parse("boolean"), Err(Error::Usage(_))));
        assert!(matches!(Command::parse("save"), Err(Error::Usage(_))));
        assert!(matches!(Command::parse("stats now"), Err(Error::Usage(_))));
        let err = Command::parse("frobnicate x").unwrap_err();
        assert_eq!(err.to_string(), "<frobnicate> unknown command.");
    }

    #[test]
    fn query_before_index_fails() {
        let mut session = Session::new(AnalyzerConfig::default(), false);
        let err = run(&mut session, "boolean cat").unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::EmptyIndex)));
    }

    #[test]
    fn create_query_save_load() {
        let dir = tempdir().unwrap();
        let d1 = dir.path().join("d1.txt");
        let d2 = dir.path().join("d2.txt");
        fs::write(&d1, "cat dog").unwrap();
        fs::write(&d2, "dog bird").unwrap();

        let mut session = Session::new(AnalyzerConfig::default(), false);
        let out = run(&mut session, &format!("createIndex {};{}", d1.display(), d2.display())).unwrap();
        assert!(out.contains("Index has been created"));

        let out = run(&mut session, "boolean dog * !cat").unwrap();
        assert!(out.contains("returned 1 results"));
        assert!(out.contains("d2.txt"));
        assert!(!out.contains("d1.txt"));

        let saved = dir.path().join("idx");
        run(&mut session, &format!("save {}", saved.display())).unwrap();

        let mut fresh = Session::new(AnalyzerConfig::default(), true);
        run(&mut fresh, &format!("load {}", saved.display())).unwrap();
        let out = run(&mut fresh, "boolean cat").unwrap();
        assert!(out.contains("d1.txt\t"));

        let stats = run(&mut fresh, "stats").unwrap();
        assert!(stats.contains("corpus.documents = 2"));
        assert!(stats.contains("terms.dog.df = 2"));
    }

    #[test]
    fn syntax_error_does_not_end_session() {
        let dir = tempdir().unwrap();
        let d1 = dir.path().join("d1.txt");
        fs::write(&d1, "cat").unwrap();
        let mut session = Session::new(AnalyzerConfig::default(), false);
        run(&mut session, &format!("createIndex {}", d1.display())).unwrap();
        assert!(run(&mut session, "boolean (cat").is_err());
        assert_eq!(session.run_line("exit", &mut Vec::new()).unwrap(), Flow::Exit);
        assert!(run(&mut session, "boolean cat").unwrap().contains("returned 1 results"));
    }
}
