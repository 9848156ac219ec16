//! Clap command definition and option resolution.
//!
//! Comparison settings come from three layers: built-in defaults, then an
//! optional `--config` TOML file, then command line flags.

use std::path::Path;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use sage_compare::{parse_fields, CompareConfig, CompareOptions, Tolerance};
use sage_core::Result;

/// Build the command tree.
pub fn build_cli() -> Command {
    Command::new("sagediff")
        .about("Compare two SAGE binary galaxy catalogs field by field")
        .arg(
            Arg::new("files")
                .help("Two catalogs to compare, or any number with --info")
                .value_name("FILE")
                .num_args(1..)
                .required(true),
        )
        .arg(
            Arg::new("info")
                .long("info")
                .help("Print the header summary of each file instead of comparing")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("exclude")
                .long("exclude")
                .short('x')
                .help("Skip a field (repeatable)")
                .value_name("FIELD")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("rtol")
                .long("rtol")
                .help("Relative tolerance for float fields (default: 1e-6)")
                .value_name("X")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("atol")
                .long("atol")
                .help("Absolute tolerance for float fields (default: 0)")
                .value_name("X")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("sort-key")
                .long("sort-key")
                .help("Align records of each tree by this field (repeatable, default: SimulationHaloIndex)")
                .value_name("FIELD")
                .action(ArgAction::Append)
                .conflicts_with("no-sort"),
        )
        .arg(
            Arg::new("no-sort")
                .long("no-sort")
                .help("Compare records in file order")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("fail-fast")
                .long("fail-fast")
                .help("Stop after the first tree with a difference")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("first-only")
                .long("first-only")
                .help("Report only the first differing record per field and tree")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("max-entries")
                .long("max-entries")
                .help("List at most N differing records per field and tree (default: 1000)")
                .value_name("N")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .help("Compare trees on all cores")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML file with comparison settings")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("More log output on stderr (repeatable)")
                .action(ArgAction::Count)
                .conflicts_with("quiet"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Log errors only")
                .action(ArgAction::SetTrue),
        )
}

/// Resolve comparison options: defaults, then config file, then flags.
pub fn resolve_options(matches: &ArgMatches) -> Result<CompareOptions> {
    let mut options = CompareOptions::default();
    if let Some(path) = matches.get_one::<String>("config") {
        options = CompareConfig::from_file(Path::new(path))?.apply(options)?;
    }

    if let Some(names) = matches.get_many::<String>("exclude") {
        let names: Vec<&String> = names.collect();
        options.excluded.extend(parse_fields(&names)?);
    }

    let rtol = matches.get_one::<f64>("rtol").copied();
    let atol = matches.get_one::<f64>("atol").copied();
    if rtol.is_some() || atol.is_some() {
        options.tolerance = Tolerance::new(
            rtol.unwrap_or(options.tolerance.rtol),
            atol.unwrap_or(options.tolerance.atol),
        )?;
    }

    if matches.get_flag("no-sort") {
        options.sort_keys.clear();
    } else if let Some(names) = matches.get_many::<String>("sort-key") {
        let names: Vec<&String> = names.collect();
        options.sort_keys = parse_fields(&names)?;
    }

    if let Some(n) = matches.get_one::<usize>("max-entries") {
        options.max_report_entries = *n;
    }
    if matches.get_flag("first-only") {
        options.collect_all = false;
    }
    if matches.get_flag("fail-fast") {
        options.fail_fast = true;
    }
    if matches.get_flag("parallel") {
        options.parallel = true;
    }
    Ok(options)
}

/// Log level from `-v` repetitions and `--quiet`.
pub fn log_level(matches: &ArgMatches) -> tracing::Level {
    if matches.get_flag("quiet") {
        return tracing::Level::ERROR;
    }
    match matches.get_count("verbose") {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}
