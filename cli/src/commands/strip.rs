//! # Strip Command
//!
//! Rewrites the Go files named on the command line. A file is treated as
//! its own package; a directory is scanned and each of its packages is
//! rewritten with resolution shared across the package's files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use log::debug;
use logdel_analysis::{Analyzer, EngineConfig, FileFailure, FileReport, MatchMode, WriteMode};
use serde::Serialize;

use crate::errors::{display_config_error, display_error, display_info, display_success, display_validation_error};
use crate::exit_codes::*;
use crate::settings::resolve_settings;
use crate::workspace::GoWorkspace;

/// Arguments for the strip command
#[derive(Debug, Clone, Default)]
pub struct StripArgs {
    /// Files or directories to rewrite
    pub paths: Vec<PathBuf>,
    /// Compute the rewrite without writing
    pub dry_run: bool,
    /// Print a unified diff of every change
    pub diff: bool,
    /// Overrides the settings file's match mode
    pub match_by: Option<MatchMode>,
    /// Explicit settings file
    pub config: Option<PathBuf>,
    /// Print the run report as JSON
    pub json: bool,
    pub verbose: bool,
}

/// A failed file, as printed in the JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct FailureSummary {
    pub path: String,
    pub error: String,
}

impl From<&FileFailure> for FailureSummary {
    fn from(failure: &FileFailure) -> Self {
        Self {
            path: failure.path.clone(),
            error: failure.error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub statements_removed: usize,
    pub imports_removed: usize,
    pub suppressed_calls: usize,
    pub failures: usize,
}

/// Everything one invocation did.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub files: Vec<FileReport>,
    pub failures: Vec<FailureSummary>,
    pub summary: RunSummary,
}

impl RunReport {
    fn record(&mut self, result: Result<FileReport, FileFailure>) {
        self.summary.files_scanned += 1;
        match result {
            Ok(report) => {
                if report.changed {
                    self.summary.files_changed += 1;
                }
                self.summary.statements_removed += report.removed_statements;
                if report.removed_import {
                    self.summary.imports_removed += 1;
                }
                self.summary.suppressed_calls += report.suppressed.len();
                self.files.push(report);
            }
            Err(failure) => {
                self.summary.failures += 1;
                self.failures.push(FailureSummary::from(&failure));
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.failures.is_empty() {
            EXIT_SUCCESS
        } else {
            EXIT_ERROR
        }
    }
}

/// Execute the strip command
///
/// # Returns
///
/// * `Ok(EXIT_SUCCESS)` - Every file was processed
/// * `Ok(EXIT_ERROR)` - At least one file could not be rewritten
/// * `Ok(EXIT_CONFIG_ERROR)` - Settings file missing or invalid
/// * `Ok(EXIT_INVALID_INPUT)` - No paths, or a path that does not exist
pub fn execute(args: StripArgs) -> Result<i32> {
    if args.paths.is_empty() {
        display_validation_error("no paths given");
        return Ok(EXIT_INVALID_INPUT);
    }
    if let Some(missing) = args.paths.iter().find(|p| !p.exists()) {
        display_validation_error(&format!("{} does not exist", missing.display()));
        return Ok(EXIT_INVALID_INPUT);
    }

    let config = match effective_config(&args) {
        Ok(config) => config,
        Err(e) => {
            display_config_error(&format!("{:#}", e));
            return Ok(EXIT_CONFIG_ERROR);
        }
    };

    let mode = if args.dry_run {
        WriteMode::DryRun
    } else {
        WriteMode::InPlace
    };
    let analyzer = Analyzer::new(config);
    let report = run(&analyzer, &args.paths, mode);

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
    } else {
        print_report(&report, args.diff);
    }

    Ok(report.exit_code())
}

/// Settings file (explicit or discovered) with command-line overrides.
fn effective_config(args: &StripArgs) -> Result<EngineConfig> {
    let loaded = resolve_settings(args.config.as_deref(), &args.paths[0])
        .context("Failed to load settings")?;
    let mut config = match loaded {
        Some(loaded) => {
            debug!("settings from {} ({})", loaded.path, loaded.source);
            loaded.config
        }
        None => EngineConfig::default(),
    };
    if let Some(mode) = args.match_by {
        config.match_mode = mode;
    }
    Ok(config)
}

/// Rewrite every path, collecting per-file results.
pub fn run(analyzer: &Analyzer, paths: &[PathBuf], mode: WriteMode) -> RunReport {
    let mut report = RunReport {
        dry_run: mode == WriteMode::DryRun,
        ..RunReport::default()
    };

    for path in paths {
        if path.is_dir() {
            run_directory(analyzer, path, mode, &mut report);
        } else {
            let result = analyzer
                .run_file(path, mode)
                .map_err(|e| FileFailure::new(&path.to_string_lossy(), e));
            report.record(result);
        }
    }
    report
}

fn run_directory(analyzer: &Analyzer, root: &Path, mode: WriteMode, report: &mut RunReport) {
    let workspace = GoWorkspace::scan(root);
    for (dir, files) in &workspace.directories {
        debug!("{}: {} file(s)", dir.display(), files.len());
        for pass_report in analyzer.run_paths(files, mode) {
            for result in pass_report.results {
                report.record(result);
            }
        }
    }
}

fn print_report(report: &RunReport, show_diff: bool) {
    let verb = if report.dry_run { "would remove" } else { "removed" };

    for file in report.files.iter().filter(|f| f.changed) {
        let mut line = format!(
            "{}: {} {} statement(s)",
            file.path,
            verb,
            file.removed_statements
        );
        if file.removed_import {
            line.push_str(" and the import");
        } else if file.import_retained {
            line.push_str(&format!(", {}", "import kept".dimmed()));
        }
        display_success(&line);
        if show_diff {
            print!("{}", file.diff());
        }
    }

    for failure in &report.failures {
        display_error(&format!("{}: {}", failure.path, failure.error));
    }

    let summary = &report.summary;
    if summary.files_changed == 0 && summary.failures == 0 {
        display_info(&format!("{} file(s) checked, nothing to remove", summary.files_scanned));
        return;
    }

    println!();
    println!(
        "{} {} of {} file(s) {}, {} statement(s), {} import(s), {} suppressed call(s) kept{}",
        "Summary:".bold(),
        summary.files_changed,
        summary.files_scanned,
        if report.dry_run { "would change" } else { "changed" },
        summary.statements_removed,
        summary.imports_removed,
        summary.suppressed_calls,
        if summary.failures > 0 {
            format!(", {}", format!("{} failed", summary.failures).red())
        } else {
            String::new()
        }
    );
}
