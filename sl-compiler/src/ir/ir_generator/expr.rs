use super::context::{Gen, LowerResult};
use crate::frontend::{TokenKind, TokenSource};
use crate::ir::*;

impl<'s, T: TokenSource> Gen<'s, T> {
    /// `expression := term (('+' | '-') term)*`
    ///
    /// Returns the name that carries the expression's value.
    pub fn lower_expression(&mut self) -> LowerResult<String> {
        let mut left = self.lower_term()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => ArithOp::Add,
                TokenKind::Minus => ArithOp::Sub,
                _ => break,
            };
            self.advance()?;
            let right = self.lower_term()?;
            left = self.reduce(op, left, right);
        }
        Ok(left)
    }

    /// `term := factor (('*' | '/') factor)*`
    pub fn lower_term(&mut self) -> LowerResult<String> {
        let mut left = self.lower_factor()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Star => ArithOp::Mul,
                TokenKind::Slash => ArithOp::Div,
                _ => break,
            };
            self.advance()?;
            let right = self.lower_factor()?;
            left = self.reduce(op, left, right);
        }
        Ok(left)
    }

    /// `factor := Identifier | FloatLiteral`
    ///
    /// Identifiers are read in place; literals are loaded into a fresh temp.
    pub fn lower_factor(&mut self) -> LowerResult<String> {
        match self.current.kind {
            TokenKind::Identifier => {
                let session = &mut *self.session;
                session.symbols.mark_used_at(
                    &self.current.lexeme,
                    self.current.position(),
                    &mut session.diagnostics,
                )?;
                Ok(self.advance()?.lexeme)
            }
            TokenKind::FloatLiteral => {
                let literal = self.advance()?.lexeme;
                let dst = self.new_temp();
                self.emit(TacInst::load_const(dst.as_str(), literal));
                Ok(dst)
            }
            _ => {
                let message = format!("Expected identifier or float literal, found {}", self.current);
                Err(self.syntax_error(message))
            }
        }
    }

    /// Emit `dst = left <op> right` and hand operand temps back to the pool.
    fn reduce(&mut self, op: ArithOp, left: String, right: String) -> String {
        let dst = self.new_temp();
        self.emit(TacInst::binary(op, dst.as_str(), left.as_str(), right.as_str()));
        self.release(&left);
        self.release(&right);
        dst
    }
}
