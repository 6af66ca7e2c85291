use anyhow::Result;
use boolindex_core::flatten::flatten;
use boolindex_core::{build_index, persist, AnalyzerConfig, IndexConfig};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

use commands::{write_stats, Command, Flow, Session};

#[derive(Parser)]
#[command(name = "boolindex")]
#[command(about = "Build a tf-idf inverted index and run boolean queries against it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone, Copy)]
struct AnalyzerArgs {
    /// Apply Unicode NFKC normalization to text and queries
    #[arg(long, default_value_t = false)]
    nfkc: bool,
    /// Stem tokens with the English Snowball stemmer
    #[arg(long, default_value_t = false)]
    stem: bool,
}

impl From<AnalyzerArgs> for AnalyzerConfig {
    fn from(a: AnalyzerArgs) -> Self {
        AnalyzerConfig { unicode_nfkc: a.nfkc, stem: a.stem }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index from files or directories and save it
    Build {
        /// Document files or directories
        #[arg(required = true)]
        sources: Vec<PathBuf>,
        /// Output index directory
        #[arg(long)]
        output: PathBuf,
        /// Stop-word list, one word per line
        #[arg(long, env = "BOOLINDEX_STOP_WORDS")]
        stop_words: Option<PathBuf>,
        #[command(flatten)]
        analyzer: AnalyzerArgs,
    },
    /// Run a boolean query against a saved index
    Query {
        /// Index directory
        #[arg(long, default_value = "./index")]
        index: PathBuf,
        /// Order results by tf-idf score
        #[arg(long, default_value_t = false)]
        ranked: bool,
        /// Query, e.g. "(word1 * !word2) + word3"
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Print statistics of a saved index
    Stats {
        #[arg(long, default_value = "./index")]
        index: PathBuf,
        /// Emit flattened statistics as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Interactive read-eval-print loop (default)
    Repl {
        /// Index directory to load at startup
        #[arg(long)]
        index: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        ranked: bool,
        #[command(flatten)]
        analyzer: AnalyzerArgs,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Build { sources, output, stop_words, analyzer }) => {
            let config = IndexConfig::new(stop_words).with_analyzer(analyzer.into());
            let index = build_index(&sources, &config)?;
            let meta = persist::save_index(&output, &index)?;
            tracing::info!(
                output = %output.display(),
                num_docs = meta.num_docs,
                num_terms = meta.num_terms,
                "index build complete"
            );
            Ok(())
        }
        Some(Commands::Query { index, ranked, query }) => run_query(index, ranked, &query.join(" ")),
        Some(Commands::Stats { index, json }) => {
            let index = persist::load_index(&index)?;
            let stats = index.stats();
            let mut out = io::stdout().lock();
            if json {
                serde_json::to_writer_pretty(&mut out, &flatten(stats))?;
                writeln!(out)?;
            } else {
                write_stats(&stats, &mut out)?;
            }
            Ok(())
        }
        Some(Commands::Repl { index, ranked, analyzer }) => repl(index, ranked, analyzer.into()),
        None => repl(None, false, AnalyzerConfig::default()),
    }
}

fn run_query(index: PathBuf, ranked: bool, query: &str) -> Result<()> {
    let mut session = Session::new(AnalyzerConfig::default(), ranked);
    session.handle.replace(persist::load_index(&index)?);
    session.execute(Command::Boolean { query: query.to_string() }, &mut io::stdout().lock())?;
    Ok(())
}

fn repl(index: Option<PathBuf>, ranked: bool, analyzer: AnalyzerConfig) -> Result<()> {
    let mut session = Session::new(analyzer, ranked);
    if let Some(path) = index {
        session.handle.replace(persist::load_index(&path)?);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        match session.run_line(&line, &mut stdout) {
            Ok(Flow::Exit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => writeln!(stdout, "Error: {e}")?,
        }
    }
    writeln!(stdout, "Exiting...")?;
    Ok(())
}
