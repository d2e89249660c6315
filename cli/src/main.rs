//! # logdel
//!
//! Removes calls to Go's `log` package, and the `log` import, from Go
//! sources. A line carrying `// nocheck:thislog` keeps its call, and a file
//! with any such marker keeps its import.
//!
//! ## Usage
//!
//! ```bash
//! # Rewrite one file
//! logdel main.go
//!
//! # Preview the changes to a whole module
//! logdel --dry-run --diff .
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use logdel::commands;
use logdel::exit_codes::EXIT_ERROR;
use logdel_analysis::MatchMode;

/// Initialize logger based on verbose flag
fn init_logger(verbose: bool) {
    let mut log_builder = env_logger::Builder::from_default_env();
    if verbose {
        log_builder.filter_level(log::LevelFilter::Debug);
    } else {
        log_builder.filter_level(log::LevelFilter::Info);
    }
    log_builder.init();
}

/// How calls are recognised as logging calls
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MatchBy {
    /// Resolve the callee; a local variable named `log` is left alone (default)
    Symbol,
    /// Compare the qualifier text with the package name
    Name,
}

impl From<MatchBy> for MatchMode {
    fn from(value: MatchBy) -> Self {
        match value {
            MatchBy::Symbol => MatchMode::Symbol,
            MatchBy::Name => MatchMode::Name,
        }
    }
}

/// Main CLI structure
#[derive(Parser)]
#[command(name = "logdel")]
#[command(about = "Strip Go log statements and the log import", long_about = None)]
#[command(version)]
struct Cli {
    /// Go files or directories to rewrite
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,
    /// Compute edits without writing them
    #[arg(long, short = 'n')]
    dry_run: bool,
    /// Print a unified diff of every change
    #[arg(long)]
    diff: bool,
    /// How logging calls are matched (overrides the settings file)
    #[arg(long, value_name = "MODE")]
    match_by: Option<MatchBy>,
    /// Settings file to use instead of a discovered .logdel.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    let exit_code = run_command(cli);
    std::process::exit(exit_code);
}

fn run_command(cli: Cli) -> i32 {
    let args = commands::strip::StripArgs {
        paths: cli.paths,
        dry_run: cli.dry_run,
        diff: cli.diff,
        match_by: cli.match_by.map(MatchMode::from),
        config: cli.config,
        json: cli.json,
        verbose: cli.verbose,
    };
    match commands::strip::execute(args) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("logdel error: {:#}", e);
            EXIT_ERROR
        }
    }
}
