use std::fs;
use std::path::Path;

use clap::Parser;
use log::LevelFilter;
use text_diff::print_diff;

use wd_import::{available_date_ranges, import_xlsx, FeedbackStore, ImportConfig, JsonlStore};

mod args;
use crate::args::Args;

fn main() {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();

    std::process::exit(run(&args));
}

fn run(args: &Args) -> i32 {
    let config = match &args.config {
        Some(path) => match ImportConfig::load(Path::new(path)) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("Cannot read configuration {}: {}", path, e);
                return 1;
            }
        },
        None => None,
    };

    let mut store = match JsonlStore::open(Path::new(&args.store)) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Cannot open store {}: {}", args.store, e);
            return 1;
        }
    };

    println!("Importing from {}...", args.input);
    let result = import_xlsx(&args.input, &mut store, config.as_ref());

    println!();
    println!("Import complete:");
    println!("  Imported: {}", result.imported);
    println!("  - Structured (with tenets): {}", result.structured_count);
    println!("  - Generic (free-text): {}", result.generic_count);
    println!("  Skipped (duplicates): {}", result.skipped_duplicates);
    println!("  Skipped (empty rows): {}", result.skipped_empty);

    if !result.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }

    if !result.errors.is_empty() {
        println!();
        println!("Errors:");
        for error in &result.errors {
            println!("  - {}", error);
        }
    }

    let summary = match serde_json::to_string_pretty(&result.to_json()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Cannot serialize the import summary: {}", e);
            return 1;
        }
    };

    if let Some(out) = &args.out {
        if out == "stdout" {
            println!("{}", summary);
        } else if let Err(e) = fs::write(out, &summary) {
            eprintln!("Cannot write summary to {}: {}", out, e);
            return 1;
        }
    }

    // The reference summary, if provided for comparison.
    if let Some(reference) = &args.reference {
        let expected = match fs::read_to_string(reference) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Cannot read reference {}: {}", reference, e);
                return 1;
            }
        };
        if expected.trim_end() != summary {
            eprintln!("Found differences with the reference summary");
            print_diff(expected.trim_end(), summary.as_str(), "\n");
            return 1;
        }
    }

    if args.ranges {
        println!();
        println!("Available date ranges:");
        for bucket in available_date_ranges(store.records()) {
            println!(
                "  {}-{:02}: {} entries",
                bucket.year, bucket.month, bucket.count
            );
        }
    }

    if result.success() {
        0
    } else {
        1
    }
}
