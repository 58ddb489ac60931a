//! Per-unit compilation state.
//!
//! A [`Session`] owns the symbol table and diagnostic sink that the
//! tokenizer, IR generator and dead-code pass share. Neither is
//! synchronized; compile independent units with independent sessions.

use crate::diagnostics::DiagnosticSink;
use crate::ir::symbol_table::SymbolTable;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct CompileOptions {
    /// Abort the unit on a fatal, non-recoverable diagnostic.
    pub stop_on_fatal: bool,
    /// Escalate to a fatal diagnostic after this many errors.
    pub max_errors: Option<usize>,
    pub eliminate_dead_code: bool,
    /// Warn about declared variables that are never used.
    pub warn_unused: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            stop_on_fatal: true,
            max_errors: None,
            eliminate_dead_code: true,
            warn_unused: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub symbols: SymbolTable,
    pub diagnostics: DiagnosticSink,
    pub options: CompileOptions,
}

impl Session {
    pub fn new(options: CompileOptions) -> Self {
        let mut diagnostics = DiagnosticSink::new();
        diagnostics.set_stop_on_fatal(options.stop_on_fatal);
        diagnostics.set_max_errors(options.max_errors);
        Self {
            symbols: SymbolTable::new(),
            diagnostics,
            options,
        }
    }
}
