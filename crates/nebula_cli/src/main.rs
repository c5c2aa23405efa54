//! nebulac: The Nebula compiler CLI.
//!
//! Usage:
//!   nebulac [options] -f <file|dir>... -o <out-dir>
//!
//! Exit codes: 0 on success, 1 on usage, configuration or I/O failures,
//! 2 when the sources have errors.

use clap::Parser as ClapParser;
use miette::IntoDiagnostic;
use nebula_compiler::{CompileError, CompileOptions, CompileResult, Compiler};
use nebula_diagnostics::{Diagnostic, Report};
use nebula_options::{parse_project_file, CompilerOptions, PROJECT_FILE_NAME};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser, Debug)]
#[command(name = "nebulac", version, about = "nebulac - The Nebula script compiler")]
struct Cli {
    /// Source files, or directories searched for `*.nebula` files.
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,

    /// Compiled `*.neb` references, or directories containing them.
    #[arg(short = 'r', long = "reference", value_name = "PATH")]
    references: Vec<PathBuf>,

    /// Folder the `.neb` and `.ndbg` files are written to.
    #[arg(short = 'o', long = "out-dir")]
    out_dir: Option<PathBuf>,

    /// Path to a nebula.json project file.
    #[arg(short = 'p', long = "project")]
    project: Option<PathBuf>,

    /// Check the sources without writing any output.
    #[arg(long = "no-emit")]
    no_emit: bool,

    /// Colored diagnostics when stderr is a terminal.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pretty: bool,
}

// ANSI color codes
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const GRAY: &str = "\x1b[90m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// A timer that prints nothing.
struct NoTimestamp;

impl FormatTime for NoTimestamp {
    fn format_time(&self, _w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        Ok(())
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    run_compile(&cli)
}

/// Install a subscriber when `NEBULA_LOG` holds a filter directive.
/// `NEBULA_LOG_STYLE=full` adds timestamps and span timings.
fn init_tracing() {
    let Ok(filter) = EnvFilter::try_from_env("NEBULA_LOG") else {
        return;
    };
    let style = std::env::var("NEBULA_LOG_STYLE").unwrap_or_default();
    if style == "full" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_timer(NoTimestamp)
            .with_writer(std::io::stderr)
            .init();
    }
    tracing::debug!("tracing initialized");
}

fn run_compile(cli: &Cli) -> ExitCode {
    let start = Instant::now();
    let use_color = cli.pretty && stderr_is_terminal();

    let options = match resolve_options(cli) {
        Ok(options) => options,
        Err(error) => return fatal(error),
    };
    tracing::debug!(?options, "resolved options");

    let result = match Compiler::new(options).compile() {
        Ok(result) => result,
        Err(CompileError::Reference(error)) => {
            print_report(&error.report, use_color);
            print_summary(error.report.error_count().max(1), use_color);
            return ExitCode::from(2);
        }
        Err(error) => return fatal(error),
    };

    print_report(&result.report, use_color);
    if !result.succeeded() {
        print_summary(result.report.error_count(), use_color);
        return ExitCode::from(2);
    }

    print_outputs(&result, use_color);
    let elapsed = start.elapsed().as_secs_f64();
    if use_color {
        eprintln!("{GRAY}Compilation completed in {elapsed:.2}s.{RESET}");
    } else {
        eprintln!("Compilation completed in {elapsed:.2}s.");
    }
    ExitCode::SUCCESS
}

/// Project file values, overridden by command line flags.
fn resolve_options(cli: &Cli) -> Result<CompileOptions, CompileError> {
    let project = match &cli.project {
        Some(path) => parse_project_file(path)?,
        None if cli.files.is_empty() && Path::new(PROJECT_FILE_NAME).exists() => {
            parse_project_file(Path::new(PROJECT_FILE_NAME))?
        }
        None => CompilerOptions::default(),
    };
    let flags = CompilerOptions {
        sources: cli.files.clone(),
        references: cli.references.clone(),
        out_dir: cli.out_dir.clone(),
        emit: cli.no_emit.then_some(false),
        ..CompilerOptions::default()
    };
    Ok(CompileOptions::from(project.merge(flags)))
}

fn fatal(error: CompileError) -> ExitCode {
    let result: miette::Result<()> = Err(error).into_diagnostic();
    if let Err(report) = result {
        eprintln!("{report:?}");
    }
    ExitCode::from(1)
}

fn print_report(report: &Report, use_color: bool) {
    for diagnostic in report {
        print_diagnostic(diagnostic, use_color);
    }
}

fn print_diagnostic(diag: &Diagnostic, use_color: bool) {
    if use_color {
        let color = if diag.is_error() { RED } else { YELLOW };
        if let Some(file) = &diag.file {
            eprint!("{CYAN}{file}{RESET}");
            if let Some(position) = diag.position {
                eprint!("({position})");
            }
            eprint!(": ");
        }
        eprintln!(
            "{BOLD}{color}{}{RESET} {GRAY}NB{}{RESET}: {}",
            diag.category, diag.code, diag.message_text
        );
    } else {
        eprintln!("{diag}");
    }

    if let Some((line, caret)) = source_excerpt(diag) {
        eprintln!("    {line}");
        if use_color {
            let color = if diag.is_error() { RED } else { YELLOW };
            eprintln!("    {color}{caret}{RESET}");
        } else {
            eprintln!("    {caret}");
        }
    }
}

/// The offending line and a caret underline aligned below the span.
fn source_excerpt(diag: &Diagnostic) -> Option<(String, String)> {
    let line = diag.line_text.as_deref()?.trim_end();
    let position = diag.position?;
    let column = (position.character as usize).min(line.len());
    let prefix = line.get(..column)?;

    let mut caret: String = prefix
        .chars()
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();
    let length = diag.span.map_or(1, |span| span.length as usize);
    let width = line[column..].chars().take(length.max(1)).count().max(1);
    caret.extend(std::iter::repeat('^').take(width));
    Some((line.to_string(), caret))
}

fn print_summary(count: usize, use_color: bool) {
    let plural = if count == 1 { "" } else { "s" };
    if use_color {
        eprintln!("\n{RED}Found {count} error{plural}.{RESET}");
    } else {
        eprintln!("\nFound {count} error{plural}.");
    }
}

fn print_outputs(result: &CompileResult, use_color: bool) {
    for files in &result.outputs {
        if use_color {
            eprintln!("{GRAY}wrote {}{RESET}", files.assembly.display());
        } else {
            eprintln!("wrote {}", files.assembly.display());
        }
    }
}

fn stderr_is_terminal() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::isatty(2) != 0 }
    }
    #[cfg(not(unix))]
    {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_core::{SourceText, TextSpan};
    use nebula_diagnostics::messages;

    fn diagnostic(text: &str, start: u32, length: u32) -> Diagnostic {
        let source = SourceText::new("main.nebula", text);
        Diagnostic::with_location(
            &source,
            TextSpan::new(start, length),
            &messages::VARIABLE_DOES_NOT_EXIST,
            &["y"],
        )
    }

    #[test]
    fn test_caret_under_span() {
        let diag = diagnostic("func void f() {\n    x = y;\n}", 24, 1);
        let (line, caret) = source_excerpt(&diag).unwrap();
        assert_eq!(line, "    x = y;");
        assert_eq!(caret, "        ^");
    }

    #[test]
    fn test_caret_keeps_tabs() {
        let diag = diagnostic("\tfoo bar", 5, 3);
        let (_, caret) = source_excerpt(&diag).unwrap();
        assert_eq!(caret, "\t    ^^^");
    }

    #[test]
    fn test_zero_width_span_gets_one_caret() {
        let diag = diagnostic("int x", 5, 0);
        let (_, caret) = source_excerpt(&diag).unwrap();
        assert_eq!(caret, "     ^");
    }

    #[test]
    fn test_flags_override_project() {
        let cli = Cli::parse_from(["nebulac", "-f", "a.nebula", "-f", "lib", "--no-emit"]);
        let options = resolve_options(&cli).unwrap();
        assert_eq!(options.sources, vec![PathBuf::from("a.nebula"), PathBuf::from("lib")]);
        assert!(!options.emit);
        assert!(options.output_folder.is_none());
    }
}
