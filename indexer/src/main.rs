use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use fihrist_core::index::{IndexOptions, Indexer};
use fihrist_core::persist::{self, FLAG_STEMMED, INDEX_VERSION};
use tracing_subscriber::{fmt, EnvFilter};

const MAX_URL_LEN: usize = 511;
const MAX_TITLE_LEN: usize = 511;
const MAX_CONTENT_LEN: usize = 99_999;

#[derive(Parser)]
#[command(name = "build_index")]
#[command(about = "Build a boolean inverted index from a TSV corpus", long_about = None)]
struct Cli {
    /// Input TSV file: doc_id, url, title, content per line
    input: PathBuf,
    /// Base path for the generated .meta/.forward/.inverted files
    output_base: PathBuf,
    /// Strip Turkish suffixes from terms before indexing
    #[arg(long)]
    stemming: bool,
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
    let file =
        File::open(&cli.input).with_context(|| format!("opening {}", cli.input.display()))?;
    let mut reader = BufReader::new(file);

    let mut indexer = Indexer::new(IndexOptions {
        use_stemming: cli.stemming,
    });
    tracing::info!(
        input = %cli.input.display(),
        output = %cli.output_base.display(),
        stemming = cli.stemming,
        "building index"
    );

    let start = Instant::now();
    let mut last_report = start;
    let mut processed = 0u64;
    let mut parse_errors = 0u64;
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .with_context(|| format!("reading {}", cli.input.display()))?;
        if read == 0 {
            break;
        }
        match parse_tsv_line(&line) {
            Some(record) => {
                indexer.add_document(record.doc_id, record.url, record.title, record.content);
                processed += 1;
                if last_report.elapsed().as_secs() >= 1 {
                    let rate = processed as f64 / start.elapsed().as_secs_f64();
                    tracing::info!(processed, rate = format_args!("{rate:.1} docs/s"), "indexing");
                    last_report = Instant::now();
                }
            }
            None => parse_errors += 1,
        }
    }

    let ingest_secs = start.elapsed().as_secs_f64();
    tracing::info!(
        processed,
        parse_errors,
        elapsed = format_args!("{ingest_secs:.2}s"),
        rate = format_args!("{:.1} docs/s", processed as f64 / ingest_secs.max(f64::EPSILON)),
        "ingest finished"
    );

    let sort_start = Instant::now();
    indexer.sort_postings();
    tracing::info!(elapsed = ?sort_start.elapsed(), "posting lists sorted");

    tracing::info!(
        documents = indexer.documents().len(),
        unique_terms = indexer.unique_terms(),
        version = format_args!("0x{INDEX_VERSION:04X}"),
        flags = format_args!("0x{:04X}", if cli.stemming { FLAG_STEMMED } else { 0 }),
        "index statistics"
    );

    let save_start = Instant::now();
    persist::save(&indexer, &cli.output_base)?;
    tracing::info!(
        base = %cli.output_base.display(),
        elapsed = ?save_start.elapsed(),
        "index saved"
    );

    Ok(())
}

struct TsvRecord<'a> {
    doc_id: u32,
    url: &'a [u8],
    title: &'a [u8],
    content: &'a [u8],
}

/// Splits one raw TSV line into its four fields. `None` marks a parse
/// error: a missing field, a doc_id of zero, or an empty url/content. An
/// empty title is allowed. Over-long fields are truncated, and content
/// stops at the first CR or LF.
fn parse_tsv_line(line: &[u8]) -> Option<TsvRecord<'_>> {
    let mut fields = line.splitn(4, |&b| b == b'\t');
    let id_field = fields.next()?;
    let url = fields.next()?;
    let title = fields.next()?;
    let content = fields.next()?;

    let doc_id = parse_doc_id(id_field);
    let url = &url[..url.len().min(MAX_URL_LEN)];
    let title = &title[..title.len().min(MAX_TITLE_LEN)];
    let content = trim_line_ending(content);
    let content = &content[..content.len().min(MAX_CONTENT_LEN)];

    if doc_id == 0 || url.is_empty() || content.is_empty() {
        return None;
    }
    Some(TsvRecord {
        doc_id,
        url,
        title,
        content,
    })
}

/// Leading ASCII digits of the field, atoi-style: stops at the first
/// non-digit, zero when there are none, saturating instead of wrapping.
fn parse_doc_id(field: &[u8]) -> u32 {
    let mut value: u32 = 0;
    for &b in field {
        if !b.is_ascii_digit() {
            break;
        }
        value = value.saturating_mul(10).saturating_add(u32::from(b - b'0'));
    }
    value
}

fn trim_line_ending(field: &[u8]) -> &[u8] {
    let end = field
        .iter()
        .position(|&b| b == b'\n' || b == b'\r')
        .unwrap_or(field.len());
    &field[..end]
}
