//! Fused parser and TAC lowering.
//!
//! Grammar (LL(1)):
//!
//! ```text
//! program    := statement* EOF
//! statement  := Identifier '=' expression ';'
//! expression := term (('+' | '-') term)*
//! term       := factor (('*' | '/') factor)*
//! factor     := Identifier | FloatLiteral
//! ```
//!
//! Tokens are pulled one at a time from a [`TokenSource`]; instructions are
//! emitted as each production is reduced. Syntax errors are reported to the
//! session's diagnostic sink and recovered from at the next `;`, so
//! generation only fails on a fatal stop.

pub mod context;
pub mod stmt;
pub mod expr;

use crate::diagnostics::FatalStop;
use crate::frontend::TokenSource;
use crate::ir::ProgramIR;
use crate::session::Session;

/// The main Gen struct that drives parsing and lowering.
pub use context::Gen;

/// Entry point: parse everything `tokens` yields and lower it to TAC.
pub fn generate<T: TokenSource>(tokens: T, session: &mut Session) -> Result<ProgramIR, FatalStop> {
    let mut g = Gen::new(tokens, session)?;
    g.lower_program()?;
    Ok(g.finish())
}
