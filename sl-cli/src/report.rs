use serde::Serialize;
use sl_compiler::diagnostics::Diagnostic;
use sl_compiler::frontend::Token;
use sl_compiler::ir::symbol_table::SymbolEntry;
use sl_compiler::{Compilation, Session};

// ── JSON report ──────────────────────────────────────────────────────

/// Everything `slc --json` prints for one compilation unit.
#[derive(Serialize, Debug)]
pub struct Report<'a> {
    pub success: bool,
    /// Message of the fatal diagnostic that stopped the unit, if any.
    pub fatal: Option<String>,
    pub error_count: usize,
    pub warning_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<&'a [Token]>,
    pub ir: Vec<String>,
    pub optimized: Vec<String>,
    pub symbols: Vec<&'a SymbolEntry>,
    pub diagnostics: &'a [Diagnostic],
}

impl<'a> Report<'a> {
    pub fn new(
        session: &'a Session,
        compilation: Option<&Compilation>,
        fatal: Option<String>,
        tokens: Option<&'a [Token]>,
    ) -> Self {
        let (ir, optimized) = compilation
            .map(|c| (c.ir.to_lines(), c.optimized.to_lines()))
            .unwrap_or_default();
        let error_count = session.diagnostics.error_count();
        Self {
            success: fatal.is_none() && error_count == 0,
            fatal,
            error_count,
            warning_count: session.diagnostics.warning_count(),
            tokens,
            ir,
            optimized,
            symbols: session.symbols.entries(),
            diagnostics: session.diagnostics.diagnostics(),
        }
    }
}
