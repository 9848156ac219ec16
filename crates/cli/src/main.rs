//! sagediff: compare and inspect SAGE binary galaxy catalogs.
//!
//! Two modes:
//! - **Compare**: `sagediff [flags] FILE1 FILE2`
//! - **Info**: `sagediff --info FILE...`: header summary per file
//!
//! Exit codes: 0 equal, 1 catalogs differ, 2 error.

mod commands;
mod format;

use std::process;

use clap::error::ErrorKind;
use sage_compare::{compare_paths, ComparisonResult};
use sage_storage::CatalogFile;

use commands::{build_cli, log_level, resolve_options};
use format::{format_error, format_result, format_summary, OutputMode};

const EXIT_EQUAL: i32 = 0;
const EXIT_DIFFERENT: i32 = 1;
const EXIT_ERROR: i32 = 2;

fn main() {
    let mut cli = build_cli();
    let matches = cli.get_matches_mut();

    tracing_subscriber::fmt()
        .with_max_level(log_level(&matches))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };
    let files: Vec<String> = matches
        .get_many::<String>("files")
        .map(|v| v.cloned().collect())
        .unwrap_or_default();

    if matches.get_flag("info") {
        process::exit(run_info(&files, mode));
    }

    if files.len() != 2 {
        cli.error(
            ErrorKind::WrongNumberOfValues,
            format!("expected exactly two catalogs to compare, got {}", files.len()),
        )
        .exit();
    }

    let options = match resolve_options(&matches) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", format_error(&e, None, mode));
            process::exit(EXIT_ERROR);
        }
    };

    let code = match compare_paths(&files[0], &files[1], &options) {
        Ok(result) => {
            let text = format_result(&result, mode);
            match (&result, mode) {
                (ComparisonResult::Equal { .. }, _) | (_, OutputMode::Json) => println!("{}", text),
                (ComparisonResult::Mismatch(_), OutputMode::Human) => eprintln!("{}", text),
            }
            if result.is_equal() {
                EXIT_EQUAL
            } else {
                EXIT_DIFFERENT
            }
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, None, mode));
            EXIT_ERROR
        }
    };
    process::exit(code);
}

fn run_info(files: &[String], mode: OutputMode) -> i32 {
    let mut code = EXIT_EQUAL;
    for path in files {
        match CatalogFile::open(path) {
            Ok(catalog) => println!("{}", format_summary(&catalog.summary(), mode)),
            Err(e) => {
                eprintln!("{}", format_error(&e, Some(path), mode));
                code = EXIT_ERROR;
            }
        }
    }
    code
}
