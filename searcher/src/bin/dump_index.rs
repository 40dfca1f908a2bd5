//! Inspection utility: prints the leading terms of an inverted file with
//! their document frequencies, without loading the whole index.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use clap::error::ErrorKind;
use clap::Parser;
use fihrist_core::persist;

/// How many terms to show.
const DUMP_TERMS: u32 = 100;

#[derive(Parser)]
#[command(name = "dump_index")]
#[command(about = "Dump the leading terms of an inverted index", long_about = None)]
struct Cli {
    /// Index base path
    index_base: PathBuf,
}

fn main() {
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
    let path = persist::companion_path(&cli.index_base, "inverted");
    let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let num_terms = reader
        .read_u32::<LittleEndian>()
        .context("reading num_terms")?;
    let _reserved = reader
        .read_u32::<LittleEndian>()
        .context("reading reserved")?;

    println!("Total terms: {num_terms}");
    println!();
    println!("{:<40} {:>10}", "Term", "DF");
    println!("{}", "-".repeat(51));

    for _ in 0..num_terms.min(DUMP_TERMS) {
        let term_len = reader.read_u16::<LittleEndian>()?;
        let mut term = vec![0u8; term_len as usize];
        reader.read_exact(&mut term)?;
        let df = reader.read_u32::<LittleEndian>()?;
        println!("{:<40} {:>10}", String::from_utf8_lossy(&term), df);
        // Skip the posting list itself.
        reader.seek_relative(i64::from(df) * 4)?;
    }

    Ok(())
}
