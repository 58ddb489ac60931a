use crate::diagnostics::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const EOF_LEXEME: &str = "<EOF>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Identifier,
    FloatLiteral,
    Semicolon,
    Plus,
    Minus,
    Star,
    Slash,
    Assign,
    EndOfFile,
    Unknown,
}

impl TokenKind {
    /// Upper-case name used by token listings.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Identifier => "IDENT",
            TokenKind::FloatLiteral => "FLOAT_LIT",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "STAR",
            TokenKind::Slash => "SLASH",
            TokenKind::Assign => "ASSIGN",
            TokenKind::EndOfFile => "EOF",
            TokenKind::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified lexeme with its 1-based start position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }

    pub fn eof(line: usize, column: usize) -> Self {
        Self::new(TokenKind::EndOfFile, EOF_LEXEME, line, column)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::EndOfFile => write!(f, "end of input"),
            TokenKind::Identifier => write!(f, "'{}'", self.lexeme),
            _ => write!(f, "{}", self.lexeme),
        }
    }
}
