//! SQLRoute CLI - join-path finder for SQL corpora

use sqlroute_cli::cli;
use sqlroute_cli::input;
use sqlroute_cli::output;

use anyhow::{bail, Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use sqlroute_core::{
    analyze_file, find_direct_routes, find_join_paths, AnalysisOptions, AnalysisStore,
};
use std::path::Path;
use std::process::ExitCode;

use cli::{Args, Command, OutputFormat, RouteArgs};
use output::{
    format_definitions, format_json, format_list, format_routes, format_scan, RouteReport,
};

/// Parse errors during a scan, or nothing found by `locate`.
const EXIT_FAILURE: u8 = 1;
/// Configuration error (e.g. missing state file or an empty route endpoint).
const EXIT_CONFIG_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("sqlroute: error: {e:#}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

/// Runs one command. `Ok(true)` means it completed but found problems.
fn run(args: Args) -> Result<bool> {
    let colored = args.format == OutputFormat::Text && std::io::stdout().is_terminal();

    match &args.command {
        Command::Scan {
            dir,
            extension,
            no_recursive,
        } => {
            let options = AnalysisOptions {
                dialect: args.dialect.into(),
                extension: extension.clone(),
                recursive: !no_recursive,
            };
            run_scan(&args, dir, &options, colored)
        }
        Command::Tables => {
            let store = load_store(&args.state)?;
            print_list(&args, &store.list_all_tables())?;
            Ok(false)
        }
        Command::Fields { table } => {
            let store = load_store(&args.state)?;
            let fields = match table {
                Some(table) => store.fields_of(table),
                None => store.list_all_fields(),
            };
            print_list(&args, &fields)?;
            Ok(false)
        }
        Command::Procedures => {
            let store = load_store(&args.state)?;
            print_list(&args, &store.procedure_names())?;
            Ok(false)
        }
        Command::Route(route) => {
            let store = load_store(&args.state)?;
            run_route(&args, &store, route, colored)?;
            Ok(false)
        }
        Command::Locate { name, table } => {
            let store = load_store(&args.state)?;
            let definitions = store.locate(name, table.as_deref());
            match args.format {
                OutputFormat::Text => print!("{}", format_definitions(&definitions)),
                OutputFormat::Json => println!("{}", format_json(&definitions)?),
            }
            if definitions.is_empty() && !args.quiet {
                eprintln!("sqlroute: no definition found for {name}");
            }
            Ok(definitions.is_empty())
        }
    }
}

fn run_scan(args: &Args, dir: &Path, options: &AnalysisOptions, colored: bool) -> Result<bool> {
    let sources = input::read_corpus(dir, options)?;
    if sources.is_empty() && !args.quiet {
        eprintln!(
            "sqlroute: warning: no .{} files found in {}",
            options.extension.trim_start_matches('.'),
            dir.display()
        );
    }

    let mut sink = |line: &str| {
        if !args.quiet {
            eprintln!("{line}");
        }
    };
    let mut has_errors = false;
    let mut results = Vec::new();
    for source in &sources {
        let analysis = analyze_file(source, options, &mut sink);
        has_errors |= analysis.has_errors();
        results.extend(analysis.results);
    }
    let store = AnalysisStore::from_results(results);

    store
        .save(&args.state)
        .with_context(|| format!("Failed to save analysis state to {}", args.state.display()))?;

    match args.format {
        OutputFormat::Text => print!("{}", format_scan(store.results(), colored)),
        OutputFormat::Json => println!("{}", format_json(store.results())?),
    }
    if !args.quiet {
        eprintln!(
            "Saved {} results to {}",
            store.results().len(),
            args.state.display()
        );
    }
    Ok(has_errors)
}

fn run_route(args: &Args, store: &AnalysisStore, route: &RouteArgs, colored: bool) -> Result<()> {
    let query = route.to_query();
    if query.source.is_empty() {
        bail!("route needs --from-table or --from-field");
    }
    if query.destination.is_empty() {
        bail!("route needs --to-table or --to-field");
    }

    let report = RouteReport {
        direct: query.direct.then(|| find_direct_routes(store, &query)),
        paths: query.paths.then(|| find_join_paths(store, &query)),
    };
    match args.format {
        OutputFormat::Text => print!("{}", format_routes(&report, colored)),
        OutputFormat::Json => println!("{}", format_json(&report)?),
    }
    Ok(())
}

fn load_store(path: &Path) -> Result<AnalysisStore> {
    AnalysisStore::load(path).with_context(|| {
        format!(
            "Failed to load analysis state from {} (run `sqlroute scan <DIR>` first)",
            path.display()
        )
    })
}

fn print_list(args: &Args, items: &[String]) -> Result<()> {
    match args.format {
        OutputFormat::Text => print!("{}", format_list(items)),
        OutputFormat::Json => println!("{}", format_json(items)?),
    }
    Ok(())
}
