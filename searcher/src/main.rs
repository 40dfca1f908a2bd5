use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use fihrist_core::persist::IndexReader;
use fihrist_core::query;
use tracing_subscriber::{fmt, EnvFilter};

/// Hits shown for a one-shot query.
const ONE_SHOT_HITS: usize = 50;
/// Hits shown per query in the interactive loop.
const INTERACTIVE_HITS: usize = 10;

#[derive(Parser)]
#[command(name = "search")]
#[command(about = "Evaluate boolean queries against a built index", long_about = None)]
#[command(after_help = "Query syntax:\n  \
    space or &&   logical AND\n  \
    ||            logical OR\n  \
    !             logical NOT\n  \
    ( )           grouping\n\n\
    Examples:\n  \
    osmanli imparatorlugu\n  \
    (istanbul || ankara) tarih\n  \
    turkiye !savas")]
struct Cli {
    /// Index base path (expects .meta/.forward/.inverted alongside)
    index_base: PathBuf,
    /// One-shot query; omit to read queries line-by-line from stdin
    query: Option<String>,
}

fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };
    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let load_start = Instant::now();
    let reader = IndexReader::load(&cli.index_base)?;
    tracing::info!(
        documents = reader.total_documents(),
        terms = reader.total_terms(),
        elapsed = format_args!("{:.3}s", load_start.elapsed().as_secs_f64()),
        "index loaded"
    );

    if let Some(q) = &cli.query {
        run_query(&reader, q.as_bytes(), ONE_SHOT_HITS);
        return Ok(());
    }

    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal();
    if interactive {
        println!("Interactive mode; one query per line, Ctrl-D to quit.");
    }
    let mut input = stdin.lock();
    let mut line = Vec::new();
    loop {
        if interactive {
            print!("> ");
            std::io::stdout().flush()?;
        }
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        while line.last().is_some_and(|&b| b == b'\n' || b == b'\r') {
            line.pop();
        }
        if line.is_empty() {
            continue;
        }
        run_query(&reader, &line, INTERACTIVE_HITS);
    }
    Ok(())
}

fn run_query(reader: &IndexReader, raw: &[u8], max_hits: usize) {
    let start = Instant::now();
    let results = query::evaluate(reader, raw);
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    println!("Query: {}", String::from_utf8_lossy(raw));
    println!("Found {} documents ({elapsed_ms:.3} ms)", results.len());
    for (i, doc_id) in results.iter().take(max_hits).enumerate() {
        // NOT over a sparse corpus can produce IDs no document carries;
        // those stay in the count but have nothing to display.
        if let Some(doc) = reader.get_document(*doc_id) {
            println!("{:3}. {}", i + 1, String::from_utf8_lossy(&doc.title));
            println!("     {}", String::from_utf8_lossy(&doc.url));
        }
    }
    if results.len() > max_hits {
        println!("... and {} more documents", results.len() - max_hits);
    }
    println!();
}
