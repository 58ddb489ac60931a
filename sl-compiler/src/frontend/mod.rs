//! Lexical front end: token model and the pull-based tokenizer.

pub mod lexer;
pub mod token;

pub use lexer::{TokenBuffer, TokenSource, Tokenizer};
pub use token::{Token, TokenKind};
