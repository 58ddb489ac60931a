pub mod diagnostics;
pub mod frontend;
pub mod ir;
pub mod session;

use diagnostics::{FatalStop, Phase, Position};
use frontend::Tokenizer;
use ir::symbol_table::SymbolKind;
use ir::ProgramIR;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use diagnostics::{Diagnostic, DiagnosticSink, Severity};
pub use session::{CompileOptions, Session};

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Could not read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Fatal(#[from] FatalStop),
}

/// Output of a successful (possibly diagnostic-carrying) compilation.
#[derive(Debug, Clone)]
pub struct Compilation {
    /// TAC as generated.
    pub ir: ProgramIR,
    /// TAC after optimization; equal to `ir` when dead-code elimination is off.
    pub optimized: ProgramIR,
}

/// Compile `source` within `session`.
///
/// Syntax and semantic problems are recorded in `session.diagnostics` and do
/// not fail the call; only a fatal stop does. The session keeps every
/// diagnostic recorded before the stop.
pub fn compile(source: &str, session: &mut Session) -> Result<Compilation, FatalStop> {
    let tokens = Tokenizer::with_source(source);
    let ir = ir::ir_generator::generate(tokens, session)?;

    if session.options.warn_unused {
        warn_unused(session);
    }

    let mut optimized = ir.clone();
    if session.options.eliminate_dead_code {
        ir::opt::optimize(&mut optimized, &session.symbols);
    }

    log::debug!(
        "compiled {} instructions ({} after optimization), {} errors, {} warnings",
        ir.len(),
        optimized.len(),
        session.diagnostics.error_count(),
        session.diagnostics.warning_count()
    );
    Ok(Compilation { ir, optimized })
}

/// Read `path` and compile it within `session`.
pub fn compile_file(path: impl AsRef<Path>, session: &mut Session) -> Result<Compilation, CompileError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(compile(&source, session)?)
}

fn warn_unused(session: &mut Session) {
    for entry in session.symbols.unused_entries() {
        if entry.kind == SymbolKind::Variable && !entry.is_dummy {
            session.diagnostics.report_warning(
                Phase::Semantic,
                format!("Variable '{}' declared but never used", entry.name),
                Position::from(entry.decl_line),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_keeps_diagnostics_after_fatal_stop() {
        let mut session = Session::new(CompileOptions {
            max_errors: Some(1),
            ..CompileOptions::default()
        });
        let stop = compile("x = ; y = 1;", &mut session).unwrap_err();
        assert_eq!(stop.message, "too many errors (limit 1)");
        assert_eq!(session.diagnostics.diagnostics().len(), 2);
    }

    #[test]
    fn dead_code_elimination_can_be_disabled() {
        let mut session = Session::new(CompileOptions {
            eliminate_dead_code: false,
            ..CompileOptions::default()
        });
        let out = compile("x = 1;", &mut session).unwrap();
        assert_eq!(out.ir, out.optimized);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut session = Session::default();
        let err = compile_file("/nonexistent/definitely/missing.sl", &mut session).unwrap_err();
        assert!(matches!(err, CompileError::Io { .. }));
    }
}
