use super::context::{Gen, Halt, LowerResult};
use crate::diagnostics::FatalStop;
use crate::frontend::{Token, TokenKind, TokenSource};
use crate::ir::symbol_table::{SymbolEntry, SymbolKind};
use crate::ir::*;

impl<'s, T: TokenSource> Gen<'s, T> {
    pub fn lower_program(&mut self) -> Result<(), FatalStop> {
        while !self.check(TokenKind::EndOfFile) {
            match self.lower_statement() {
                Ok(()) => {}
                Err(Halt::Recover) => self.synchronize()?,
                Err(Halt::Fatal(stop)) => return Err(stop),
            }
        }
        log::debug!(
            "generated {} instructions using {} temps",
            self.out.len(),
            self.minted.len()
        );
        Ok(())
    }

    /// `statement := Identifier '=' expression ';'`
    pub fn lower_statement(&mut self) -> LowerResult<()> {
        let target = self.expect(
            TokenKind::Identifier,
            "Expected identifier at start of statement",
        )?;
        self.expect(TokenKind::Assign, "Expected '=' after identifier")?;
        let value = self.lower_expression()?;
        self.expect(TokenKind::Semicolon, "Missing semicolon at end of statement")?;

        self.bind_target(&target)?;
        self.emit(TacInst::assign(target.lexeme.as_str(), value));

        // Assignment counts as a use.
        let session = &mut *self.session;
        session
            .symbols
            .mark_used(&target.lexeme, &mut session.diagnostics)?;
        Ok(())
    }

    /// Promote a placeholder for the assignment target to a float variable,
    /// or declare one if the name is unknown.
    fn bind_target(&mut self, target: &Token) -> Result<(), FatalStop> {
        let session = &mut *self.session;
        let name = target.lexeme.as_str();
        let line = target.line;

        match session.symbols.lookup(name).map(|e| e.is_dummy) {
            Some(true) => session.symbols.update_entry(name, |e| {
                e.kind = SymbolKind::Variable;
                e.ty = "float".to_string();
                e.is_dummy = false;
                e.decl_line = Some(line);
            }),
            Some(false) => {}
            None => {
                let entry = SymbolEntry::variable(name, "float").declared_at(line);
                session.symbols.insert(entry, &mut session.diagnostics)?;
            }
        }
        Ok(())
    }

    /// Panic-mode recovery: discard tokens through the next `;` (or stop at EOF).
    pub fn synchronize(&mut self) -> Result<(), FatalStop> {
        while !self.check(TokenKind::Semicolon) && !self.check(TokenKind::EndOfFile) {
            self.advance()?;
        }
        if self.check(TokenKind::Semicolon) {
            self.advance()?;
        }
        Ok(())
    }
}
