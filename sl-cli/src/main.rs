use anyhow::{bail, Context, Result};
use clap::Parser;
use sl_compiler::frontend::{Token, Tokenizer};
use sl_compiler::ir::ProgramIR;
use sl_compiler::{compile, CompileOptions, Session};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod report;

use report::Report;

#[derive(Parser)]
#[command(name = "slc")]
#[command(about = "Compile straight-line float assignments to three-address code")]
struct Args {
    /// Path to the source file to compile. A built-in sample is used when omitted.
    file: Option<PathBuf>,

    /// Print the token stream
    #[arg(long)]
    tokens: bool,

    /// Print the symbol table after compilation
    #[arg(long)]
    symbols: bool,

    /// Print the TAC as generated, before optimization
    #[arg(long)]
    ir: bool,

    /// Skip dead-code elimination
    #[arg(long)]
    no_dce: bool,

    /// Print a JSON report instead of text listings
    #[arg(long)]
    json: bool,

    /// Save the diagnostic report to this file
    #[arg(long, value_name = "PATH")]
    diagnostics: Option<PathBuf>,

    /// Keep compiling after a fatal diagnostic
    #[arg(long)]
    keep_going: bool,

    /// Escalate to a fatal diagnostic after this many errors
    #[arg(long, value_name = "N")]
    max_errors: Option<usize>,

    /// Load compile options from a JSON file; flags override it
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn options(&self) -> Result<CompileOptions> {
        let mut options = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Error reading config '{}'", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Invalid config '{}'", path.display()))?
            }
            None => CompileOptions::default(),
        };
        if self.no_dce {
            options.eliminate_dead_code = false;
        }
        if self.keep_going {
            options.stop_on_fatal = false;
        }
        if self.max_errors.is_some() {
            options.max_errors = self.max_errors;
        }
        Ok(options)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Compile one unit and print what was asked for. `Ok(false)` means the
/// unit had errors.
fn run(args: &Args) -> Result<bool> {
    let src = match &args.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Error reading file '{}'", path.display()))?,
        None => DEFAULT_SAMPLE.trim().to_string(),
    };
    let options = args.options()?;

    // Listed from a scratch session so lexical errors are not reported twice.
    let tokens = if args.tokens {
        let mut scratch = Session::new(CompileOptions {
            stop_on_fatal: false,
            ..options.clone()
        });
        Some(Tokenizer::new().tokenize(&src, &mut scratch)?)
    } else {
        None
    };

    let mut session = Session::new(options);
    let (compilation, fatal) = match compile(&src, &mut session) {
        Ok(c) => (Some(c), None),
        Err(stop) => {
            log::error!("{stop}");
            (None, Some(stop.message))
        }
    };

    if args.json {
        let report = Report::new(&session, compilation.as_ref(), fatal, tokens.as_deref());
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if let Some(tokens) = &tokens {
            print_tokens(tokens);
        }
        if args.symbols {
            print!("{}", session.symbols.dump());
            println!();
        }
        if let Some(c) = &compilation {
            let dce = session.options.eliminate_dead_code;
            if args.ir || !dce {
                print_listing("=== TAC ===", &c.ir);
            }
            if dce {
                print_listing("=== Optimized TAC ===", &c.optimized);
            }
        }
    }

    if let Some(path) = &args.diagnostics {
        save_report(&session, path)?;
    }

    let diagnostics = &session.diagnostics;
    log::info!(
        "{} error(s), {} warning(s)",
        diagnostics.error_count(),
        diagnostics.warning_count()
    );
    Ok(diagnostics.error_count() == 0 && !diagnostics.has_fatal())
}

fn print_tokens(tokens: &[Token]) {
    println!("=== Tokens ===");
    for t in tokens {
        println!("{}:{}\t{}\t{}", t.line, t.column, t.kind, t.lexeme);
    }
    println!();
}

fn print_listing(title: &str, ir: &ProgramIR) {
    println!("{title}");
    for line in ir.to_lines() {
        println!("{line}");
    }
    println!();
}

fn save_report(session: &Session, path: &Path) -> Result<()> {
    if !session.diagnostics.save_to_file(path) {
        bail!("Could not write diagnostics to '{}'", path.display());
    }
    log::debug!("diagnostics saved to {}", path.display());
    Ok(())
}

const DEFAULT_SAMPLE: &str = r#"
rate = 0.5;
gain = rate * 2 + offset;
scaled = gain / 4.0 - rate;
result = gain + scaled;
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from(["slc", "--no-dce", "--keep-going", "--max-errors", "3"]);
        let options = args.options().unwrap();
        assert!(!options.eliminate_dead_code);
        assert!(!options.stop_on_fatal);
        assert_eq!(options.max_errors, Some(3));
        assert!(options.warn_unused);
    }

    #[test]
    fn verbosity_counts() {
        let args = Args::parse_from(["slc", "-vv", "prog.sl"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.file.as_deref(), Some(Path::new("prog.sl")));
    }

    #[test]
    fn sample_compiles_without_errors() {
        let mut session = Session::default();
        compile(DEFAULT_SAMPLE, &mut session).unwrap();
        assert_eq!(session.diagnostics.error_count(), 0);
    }
}
