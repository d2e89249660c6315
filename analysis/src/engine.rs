use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use log::{info, warn};
use logdel_core::parse::ast::FileId;
use logdel_core::parse::parse_source_file;
use logdel_core::semantics::go::{PackageCatalog, PackageFile};
use logdel_core::types::context::SourceFile;
use rayon::prelude::*;

use crate::config::{EngineConfig, MatchMode};
use crate::emit::emit;
use crate::error::RewriteError;
use crate::matcher::{CallMatcher, NameMatcher, SymbolMatcher};
use crate::pass::{FileFailure, FileReport, Pass, PassReport};
use crate::replace::commit;
use crate::resolve::{catalog_for, TargetSymbolSet};
use crate::suppression::parse_suppressions;
use crate::visitor::{DeletionVisitor, VisitOutcome};

/// Whether rewrites are committed to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    #[default]
    InPlace,
    /// Compute and report, write nothing.
    DryRun,
}

/// A rewritten file in memory.
#[derive(Debug, Clone)]
pub struct Rewrite {
    pub text: String,
    pub outcome: VisitOutcome,
}

/// Rewrite one source text as a single-file package. Touches no file.
pub fn rewrite_source(path: &str, content: &str, config: &EngineConfig) -> Result<Rewrite, RewriteError> {
    let sf = SourceFile {
        path: path.to_string(),
        content: content.to_string(),
    };
    let parsed = parse_source_file(FileId(1), &sf)?;
    let pass = Pass::new(vec![PackageFile::new(parsed)], &catalog_for(&config.facility));
    let targets = TargetSymbolSet::resolve(&pass.imports, &config.facility);
    let matcher = matcher_for(config, &pass, &targets);
    rewrite_file(config, &pass.files[0], matcher.as_ref())
}

fn matcher_for<'a>(config: &EngineConfig, pass: &'a Pass, targets: &'a TargetSymbolSet) -> Box<dyn CallMatcher + 'a> {
    match config.match_mode {
        MatchMode::Symbol => Box::new(SymbolMatcher::new(
            &pass.type_info,
            targets,
            &config.facility.package_path,
        )),
        MatchMode::Name => Box::new(NameMatcher::new(&config.facility.package_name())),
    }
}

fn rewrite_file(config: &EngineConfig, file: &PackageFile, matcher: &dyn CallMatcher) -> Result<Rewrite, RewriteError> {
    let parsed = &file.parsed;
    let suppressions = parse_suppressions(&parsed.path, &file.semantics.comments, &config.marker);
    let outcome = DeletionVisitor::new(
        parsed,
        matcher,
        &suppressions,
        &config.facility.package_path,
        config.import_policy,
    )
    .visit();
    let text = emit(parsed, &outcome.deletions, config.formatter)?;
    Ok(Rewrite { text, outcome })
}

/// Rewrite, then commit unless dry-running or unchanged.
fn process_file(
    config: &EngineConfig,
    file: &PackageFile,
    matcher: &dyn CallMatcher,
    mode: WriteMode,
) -> Result<FileReport, RewriteError> {
    let Rewrite { text, outcome } = rewrite_file(config, file, matcher)?;
    let path = &file.parsed.path;
    let changed = *file.parsed.source != text;

    let written = changed && mode == WriteMode::InPlace;
    if written {
        commit(&text, Path::new(path))?;
        info!(
            "{}: removed {} statement(s){}",
            path,
            outcome.removed_statements(),
            if outcome.import_retained { ", import kept" } else { "" }
        );
    }

    Ok(FileReport::new(
        path,
        Arc::clone(&file.parsed.source),
        text,
        outcome,
        written,
    ))
}

/// Drives rewrites over files and packages.
///
/// The configuration sits behind an `ArcSwap` so it can be replaced while
/// the analyzer is shared; each run works on the snapshot it started with.
pub struct Analyzer {
    pub config: ArcSwap<EngineConfig>,
}

impl Analyzer {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
        }
    }

    pub fn with_default_config() -> Self {
        Self::new(EngineConfig::default())
    }

    pub fn config(&self) -> Arc<EngineConfig> {
        self.config.load_full()
    }

    pub fn update_config(&self, config: EngineConfig) {
        self.config.store(Arc::new(config));
    }

    /// Package catalog for the configured facility.
    pub fn catalog(&self) -> PackageCatalog {
        catalog_for(&self.config().facility)
    }

    /// Standalone driver: rewrite the file at `path` as its own package.
    pub fn run_file(&self, path: &Path, mode: WriteMode) -> Result<FileReport, RewriteError> {
        let config = self.config();
        let content = std::fs::read_to_string(path).map_err(|e| RewriteError::io(path, e))?;
        let sf = SourceFile {
            path: path.to_string_lossy().to_string(),
            content,
        };
        let parsed = parse_source_file(FileId(1), &sf)?;
        let pass = Pass::new(vec![PackageFile::new(parsed)], &catalog_for(&config.facility));
        let targets = TargetSymbolSet::resolve(&pass.imports, &config.facility);
        let matcher = matcher_for(&config, &pass, &targets);
        process_file(&config, &pass.files[0], matcher.as_ref(), mode)
    }

    /// Read, parse and rewrite the files of one directory, one pass per
    /// package clause found. Unreadable and unparsable files are reported
    /// in the first report.
    pub fn run_paths<P: AsRef<Path>>(&self, paths: &[P], mode: WriteMode) -> Vec<PassReport> {
        let (passes, failures) = Pass::load(paths, &self.catalog());
        for failure in &failures {
            warn!("{}", failure);
        }
        let mut reports: Vec<PassReport> = passes.iter().map(|pass| self.run(pass, mode)).collect();
        if !failures.is_empty() {
            if reports.is_empty() {
                reports.push(PassReport::default());
            }
            reports[0].results.extend(failures.into_iter().map(Err));
        }
        reports
    }

    /// Package pass: rewrite every file of `pass`.
    ///
    /// Resolution is shared across files, which are rewritten in parallel.
    /// A failing file is reported and does not stop the others.
    pub fn run(&self, pass: &Pass, mode: WriteMode) -> PassReport {
        let config = self.config();
        let targets = TargetSymbolSet::resolve(&pass.imports, &config.facility);
        let matcher = matcher_for(&config, pass, &targets);
        let matcher: &dyn CallMatcher = matcher.as_ref();

        let process = |file: &PackageFile| {
            process_file(&config, file, matcher, mode).map_err(|error| {
                let failure = FileFailure::new(&file.parsed.path, error);
                warn!("{}", failure);
                failure
            })
        };

        let results: Vec<Result<FileReport, FileFailure>> = match rayon::ThreadPoolBuilder::new()
            .num_threads(config.max_parallel_files)
            .build()
        {
            Ok(pool) => pool.install(|| pass.files.par_iter().map(&process).collect()),
            Err(err) => {
                warn!("falling back to sequential rewrite: {}", err);
                pass.files.iter().map(&process).collect()
            }
        };

        PassReport {
            package: pass.package_name.clone(),
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Formatter, ImportPolicy};
    use std::fs;

    fn builtin() -> EngineConfig {
        EngineConfig {
            formatter: Formatter::Builtin,
            ..EngineConfig::default()
        }
    }

    fn rewrite(source: &str) -> String {
        rewrite_source("main.go", source, &builtin())
            .unwrap()
            .text
    }

    #[test]
    fn aliased_import_and_its_call_are_removed() {
        let src = r#"package main

import lg "log"

func main() {
	lg.Println("x")
}
"#;
        let out = rewrite(src);
        assert!(!out.contains("\"log\""));
        assert!(!out.contains("lg.Println"));
        assert_eq!(out, "package main\n\nfunc main() {\n}\n");
    }

    #[test]
    fn marked_call_keeps_statement_and_import() {
        let src = r#"package main

import lg "log"

func main() {
	lg.Println("x") // nocheck:thislog
}
"#;
        assert_eq!(rewrite(src), src);
    }

    #[test]
    fn only_unmarked_call_is_removed() {
        let src = r#"package main

import "log"

func main() {
	log.Println("keep") // nocheck:thislog
	log.Println("drop")
}
"#;
        let out = rewrite(src);
        assert_eq!(
            out,
            "package main\n\nimport \"log\"\n\nfunc main() {\n\tlog.Println(\"keep\") // nocheck:thislog\n}\n"
        );
    }

    #[test]
    fn return_of_log_call_is_removed_entirely() {
        let src = r#"package main

import "log"

func f() {
	if true {
		return log.Panicln("boom"), nil
	}
}
"#;
        let out = rewrite(src);
        assert_eq!(out, "package main\n\nfunc f() {\n\tif true {\n\t}\n}\n");
    }

    #[test]
    fn rewrite_is_idempotent() {
        let src = r#"package main

import (
	"fmt"
	"log"
)

func main() {
	fmt.Println("a")
	log.Printf("%s", "b")
	x := compute()
	log.Fatalln(x)
}
"#;
        let once = rewrite(src);
        let twice = rewrite(&once);
        assert_eq!(once, twice);
        assert!(!once.contains("log"));
    }

    #[test]
    fn output_parses_for_mixed_input() {
        let src = r#"package main

import "log"

func main() {
	a(); log.Println("x"); b()
	switch v := get(); v {
	case 1:
		log.Print(v)
	}
	select {
	case msg := <-ch:
		log.Println(msg)
	}
}
"#;
        let out = rewrite(src);
        let sf = SourceFile {
            path: "main.go".to_string(),
            content: out.clone(),
        };
        assert!(parse_source_file(FileId(2), &sf).is_ok());
        assert!(!out.contains("log."));
    }

    #[test]
    fn local_named_log_survives_symbol_mode() {
        let src = r#"package main

import "example.com/logger"

func main() {
	log := logger.New()
	log.Println("x")
}
"#;
        assert_eq!(rewrite(src), src);

        let by_name = EngineConfig {
            match_mode: MatchMode::Name,
            ..EngineConfig::default()
        };
        let out = rewrite_source("main.go", src, &by_name).unwrap().text;
        assert!(!out.contains("log.Println"));
    }

    #[test]
    fn symmetric_policy_via_config() {
        let src = r#"package main

import "log"

func main() {
	log.SetPrefix("app: ")
	log.Println("x")
}
"#;
        let config = EngineConfig {
            import_policy: ImportPolicy::Symmetric,
            ..EngineConfig::default()
        };
        let out = rewrite_source("main.go", src, &config).unwrap().text;
        assert!(out.contains("import \"log\""));
        assert!(out.contains("log.SetPrefix"));
        assert!(!out.contains("log.Println"));
    }

    #[test]
    fn syntax_error_is_fatal_for_the_file() {
        let err = rewrite_source("bad.go", "package main\n\nfunc main() {\n", &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, RewriteError::Parse(_)));
    }

    #[test]
    fn run_file_rewrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.go");
        fs::write(&path, "package main\n\nimport \"log\"\n\nfunc main() {\n\tlog.Println(1)\n}\n").unwrap();

        let analyzer = Analyzer::with_default_config();
        let report = analyzer.run_file(&path, WriteMode::InPlace).unwrap();

        assert!(report.changed);
        assert!(report.written);
        assert!(report.removed_import);
        assert_eq!(report.removed_statements, 1);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "package main\n\nfunc main() {\n}\n"
        );
    }

    #[test]
    fn dry_run_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.go");
        let src = "package main\n\nimport \"log\"\n\nfunc main() {\n\tlog.Println(1)\n}\n";
        fs::write(&path, src).unwrap();

        let report = Analyzer::with_default_config()
            .run_file(&path, WriteMode::DryRun)
            .unwrap();

        assert!(report.changed);
        assert!(!report.written);
        assert!(report.diff().contains("-\tlog.Println(1)"));
        assert_eq!(fs::read_to_string(&path).unwrap(), src);
    }

    #[test]
    fn package_pass_shares_resolution_and_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.go");
        let b = dir.path().join("b.go");
        let broken = dir.path().join("broken.go");
        fs::write(&a, "package svc\n\nimport lg \"log\"\n\nfunc a() {\n\tlg.Println(1)\n}\n").unwrap();
        // `log` here is the package-level variable declared in c.go
        fs::write(&b, "package svc\n\nfunc b() {\n\tlog.Println(2)\n}\n").unwrap();
        let c = dir.path().join("c.go");
        fs::write(&c, "package svc\n\nvar log = newLogger()\n").unwrap();
        fs::write(&broken, "package svc\n\nfunc (\n").unwrap();

        let analyzer = Analyzer::new(EngineConfig {
            max_parallel_files: 2,
            ..EngineConfig::default()
        });
        let reports = analyzer.run_paths(&[a.clone(), b.clone(), c, broken], WriteMode::InPlace);

        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.package, "svc");
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.reports().count(), 3);
        assert_eq!(
            fs::read_to_string(&a).unwrap(),
            "package svc\n\nfunc a() {\n}\n"
        );
        assert!(fs::read_to_string(&b).unwrap().contains("log.Println(2)"));
    }

    #[test]
    fn update_config_swaps_snapshot() {
        let analyzer = Analyzer::with_default_config();
        analyzer.update_config(EngineConfig {
            marker: "keep:log".to_string(),
            ..EngineConfig::default()
        });
        assert_eq!(analyzer.config().marker, "keep:log");
    }
}
