#![cfg(not(tarpaulin_include))]

use clap::Parser;
use exercise_browser::header::{DEFAULT_MIN_CELLS, DEFAULT_SCAN_ROWS, HeaderPolicy, non_empty_count};
use exercise_browser::ingest::{IngestOptions, ingest_grid};
use exercise_browser::loader::{self, SourceFormat, WorkbookGrid};
use exercise_browser::video::has_video;
use std::path::PathBuf;

/// Inspect a spreadsheet the way the server would ingest it
#[derive(Parser)]
#[command(name = "exercise-inspect", version)]
struct Args {
    /// Spreadsheet to inspect (xlsx, xls, ods or csv)
    file: PathBuf,

    /// Inspect every sheet instead of only the first
    #[arg(long)]
    sheet_all: bool,

    /// keyword, min-cells or min-cells:N
    #[arg(long, default_value = "keyword")]
    policy: HeaderPolicy,

    /// Rows scanned for the header
    #[arg(long, default_value_t = DEFAULT_SCAN_ROWS)]
    rows: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let options = IngestOptions {
        header_policy: args.policy,
        header_scan_rows: args.rows,
    };

    let name = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let format = SourceFormat::from_file_name(name);

    let sheets = if args.sheet_all && format == SourceFormat::Workbook {
        loader::load_all_sheets(&std::fs::read(&args.file)?)?
    } else {
        vec![loader::load_grid_from_path(&args.file)?]
    };

    println!("File: {}", args.file.display());
    if let Some(first) = sheets.first() {
        println!("Sheets: {:?}", first.sheet_names);
    }
    println!("Header policy: {}", options.header_policy);

    for sheet in &sheets {
        inspect_sheet(sheet, &options);
    }

    Ok(())
}

fn inspect_sheet(sheet: &WorkbookGrid, options: &IngestOptions) {
    println!();
    println!("== Sheet '{}' ({} rows) ==", sheet.sheet, sheet.grid.len());

    for (i, row) in sheet.grid.iter().take(options.header_scan_rows).enumerate() {
        if row.is_empty() {
            continue;
        }
        let preview: Vec<String> = row.iter().take(6).map(|c| c.to_text()).collect();
        let marker = if non_empty_count(row) >= DEFAULT_MIN_CELLS { "*" } else { " " };
        println!("{} row {:>3}: {:?}", marker, i + 1, preview);
    }

    let ingested = match ingest_grid(sheet, options) {
        Ok(ingested) => ingested,
        Err(e) => {
            println!("No usable header: {}", e);
            return;
        }
    };

    let set = &ingested.records;
    println!();
    println!("Header row: {}", ingested.header_row + 1);
    println!("Columns ({}): {:?}", set.columns.len(), set.columns);
    println!("Exercises: {}", set.len());

    if let Some(sample) = set.records.first() {
        println!("Sample exercise:");
        for (column, value) in sample.fields() {
            println!("   {}: {}", column, value);
        }
    }

    let with_video = set.records.iter().filter(|r| has_video(r)).count();
    println!("Exercises with video links: {}/{}", with_video, set.len());
}
