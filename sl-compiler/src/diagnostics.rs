//! Diagnostic sink shared by every compilation stage.
//!
//! Each report is appended to an ordered log and relayed immediately as a
//! single rendered line through the `log` facade (target `diagnostics`).
//! A fatal, non-recoverable report aborts the current unit by handing a
//! [`FatalStop`] back to the caller when stop-on-fatal is enabled.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

const EMPTY_REPORT: &str = "No errors or warning\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Lexical,
    Syntax,
    Semantic,
    Runtime,
    Generic,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Lexical => "Lexical Error",
            Phase::Syntax => "Syntax Error",
            Phase::Semantic => "Semantic Error",
            Phase::Runtime => "Runtime Error",
            Phase::Generic => "Generic Error",
        };
        write!(f, "{s}")
    }
}

/// Ordered `Info < Warning < Error < Fatal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        };
        write!(f, "{s}")
    }
}

/// 1-based source position; either half may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl Position {
    pub const UNKNOWN: Position = Position { line: None, column: None };

    pub fn new(line: usize, column: usize) -> Self {
        Self { line: Some(line), column: Some(column) }
    }

    pub fn line(line: usize) -> Self {
        Self { line: Some(line), column: None }
    }
}

impl From<Option<usize>> for Position {
    fn from(line: Option<usize>) -> Self {
        Self { line, column: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub phase: Phase,
    pub severity: Severity,
    pub message: String,
    pub position: Position,
    pub recoverable: bool,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.phase, self.severity)?;
        if let Some(line) = self.position.line {
            write!(f, "(line {line}")?;
            if let Some(col) = self.position.column {
                write!(f, ", col {col}")?;
            }
            write!(f, ")")?;
        }
        write!(f, ": {}", self.message)?;
        if !self.recoverable {
            write!(f, "[NON-RECOVERABLE]")?;
        }
        Ok(())
    }
}

/// Signal that a fatal, non-recoverable diagnostic stopped the current unit.
///
/// Already-recorded diagnostics stay in the sink.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("fatal compilation error encountered, stopping: {message}")]
pub struct FatalStop {
    pub phase: Phase,
    pub message: String,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    stop_on_fatal: bool,
    max_errors: Option<usize>,
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
            stop_on_fatal: true,
            max_errors: None,
        }
    }

    pub fn set_stop_on_fatal(&mut self, stop: bool) {
        self.stop_on_fatal = stop;
    }

    pub fn stop_on_fatal(&self) -> bool {
        self.stop_on_fatal
    }

    /// Escalate to a fatal diagnostic once this many errors have been recorded.
    pub fn set_max_errors(&mut self, limit: Option<usize>) {
        self.max_errors = limit;
    }

    pub fn max_errors(&self) -> Option<usize> {
        self.max_errors
    }

    /// Record a diagnostic and relay it immediately.
    pub fn report(
        &mut self,
        phase: Phase,
        severity: Severity,
        message: impl Into<String>,
        position: Position,
        recoverable: bool,
    ) -> Result<(), FatalStop> {
        let diagnostic = Diagnostic {
            phase,
            severity,
            message: message.into(),
            position,
            recoverable,
        };
        relay(&diagnostic);
        self.diagnostics.push(diagnostic);

        if severity == Severity::Fatal && !recoverable && self.stop_on_fatal {
            let last = &self.diagnostics[self.diagnostics.len() - 1];
            return Err(FatalStop {
                phase,
                message: last.message.clone(),
                position,
            });
        }

        if severity == Severity::Error {
            if let Some(limit) = self.max_errors {
                if self.error_count() == limit {
                    return self.report(
                        Phase::Generic,
                        Severity::Fatal,
                        format!("too many errors (limit {limit})"),
                        Position::UNKNOWN,
                        false,
                    );
                }
            }
        }
        Ok(())
    }

    pub fn report_error(
        &mut self,
        phase: Phase,
        message: impl Into<String>,
        position: Position,
    ) -> Result<(), FatalStop> {
        self.report(phase, Severity::Error, message, position, true)
    }

    pub fn report_warning(&mut self, phase: Phase, message: impl Into<String>, position: Position) {
        // Warnings never stop the unit.
        let _ = self.report(phase, Severity::Warning, message, position, true);
    }

    pub fn report_info(&mut self, phase: Phase, message: impl Into<String>, position: Position) {
        let _ = self.report(phase, Severity::Info, message, position, true);
    }

    /// Fatal reports are always non-recoverable.
    pub fn report_fatal(
        &mut self,
        phase: Phase,
        message: impl Into<String>,
        position: Position,
    ) -> Result<(), FatalStop> {
        self.report(phase, Severity::Fatal, message, position, false)
    }

    /// Number of `Error` and `Fatal` diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity >= Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Fatal)
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Borrow the ordered log.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Owned copy of the ordered log.
    pub fn get_all(&self) -> Vec<Diagnostic> {
        self.diagnostics.clone()
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }

    /// Full report text, identical to what [`save_to_file`](Self::save_to_file) writes.
    pub fn render(&self) -> String {
        if self.diagnostics.is_empty() {
            return EMPTY_REPORT.to_string();
        }
        let mut out = format!("=== Compiler Messages ({}) ===\n", self.diagnostics.len());
        for d in &self.diagnostics {
            out.push_str(&d.to_string());
            out.push('\n');
        }
        out.push_str("=== END OF MESSAGES ===\n");
        out
    }

    pub fn write_report<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(self.render().as_bytes())?;
        writer.flush()
    }

    /// Returns `false` if the destination cannot be opened or written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match File::create(path).and_then(|file| self.write_report(file)) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("could not save diagnostics to '{}': {e}", path.display());
                false
            }
        }
    }
}

fn relay(diagnostic: &Diagnostic) {
    match diagnostic.severity {
        Severity::Info => log::info!(target: "diagnostics", "{diagnostic}"),
        Severity::Warning => log::warn!(target: "diagnostics", "{diagnostic}"),
        Severity::Error | Severity::Fatal => log::error!(target: "diagnostics", "{diagnostic}"),
    }
}
