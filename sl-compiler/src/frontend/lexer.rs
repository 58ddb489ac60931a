use crate::diagnostics::{FatalStop, Phase};
use crate::frontend::token::{Token, TokenKind};
use crate::session::Session;
use logos::Logos;
use std::collections::HashSet;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\x0B\x0C]+")] // Whitespace, newlines included
enum RawToken {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    // 12  3.14  .5  12.
    #[regex(r"[0-9]+(\.[0-9]*)?|\.[0-9]+")]
    FloatLiteral,

    #[token(";")]
    Semicolon,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("=")]
    Assign,
}

impl From<RawToken> for TokenKind {
    fn from(raw: RawToken) -> Self {
        match raw {
            RawToken::Identifier => TokenKind::Identifier,
            RawToken::FloatLiteral => TokenKind::FloatLiteral,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Assign => TokenKind::Assign,
        }
    }
}

/// Anything the IR generator can pull tokens from.
///
/// Implementations keep returning `EndOfFile` once their input is exhausted.
pub trait TokenSource {
    fn next_token(&mut self, session: &mut Session) -> Result<Token, FatalStop>;

    /// Identifier lexemes this source may still yield. A superset is fine.
    fn identifiers(&self) -> HashSet<String>;
}

/// Logos lexer plus the line/column bookkeeping for one bound source.
struct Scanner<'src> {
    source: &'src str,
    lexer: logos::Lexer<'src, RawToken>,
    offset: usize,
    line: usize,
    column: usize,
}

impl<'src> Scanner<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            lexer: RawToken::lexer(source),
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Move the line/column counters forward to byte offset `end`.
    fn advance_to(&mut self, end: usize) {
        let end = end.min(self.source.len());
        if end <= self.offset {
            return;
        }
        for &b in &self.source.as_bytes()[self.offset..end] {
            if b == b'\n' {
                self.line += 1;
                self.column = 1;
            } else if b & 0xC0 != 0x80 {
                // count characters, not UTF-8 continuation bytes
                self.column += 1;
            }
        }
        self.offset = end;
    }
}

/// Pull-based tokenizer.
///
/// Identifiers are pre-registered in the session's symbol table as token
/// placeholders the first time they are seen in the current scope; lexical
/// errors go to the session's diagnostic sink.
pub struct Tokenizer<'src> {
    scanner: Option<Scanner<'src>>,
}

impl Default for Tokenizer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'src> Tokenizer<'src> {
    /// A tokenizer with no source bound; it yields `EndOfFile` at (0, 0).
    pub fn new() -> Self {
        Self { scanner: None }
    }

    pub fn with_source(source: &'src str) -> Self {
        Self {
            scanner: Some(Scanner::new(source)),
        }
    }

    /// Bind a new source and reset the cursor to line 1, column 1.
    pub fn set_source(&mut self, source: &'src str) {
        self.scanner = Some(Scanner::new(source));
    }

    pub fn next_token(&mut self, session: &mut Session) -> Result<Token, FatalStop> {
        let Some(scanner) = self.scanner.as_mut() else {
            return Ok(Token::eof(0, 0));
        };

        let Some(result) = scanner.lexer.next() else {
            let end = scanner.source.len();
            scanner.advance_to(end);
            return Ok(Token::eof(scanner.line, scanner.column));
        };

        let span = scanner.lexer.span();
        scanner.advance_to(span.start);
        let (line, column) = (scanner.line, scanner.column);
        let lexeme = String::from_utf8_lossy(&scanner.source.as_bytes()[span.clone()]).into_owned();
        scanner.advance_to(span.end);

        let token = match result {
            Ok(RawToken::Identifier) => {
                if !session.symbols.exists_in_current_scope(&lexeme) {
                    session.symbols.insert_token_placeholder(&lexeme, line);
                }
                Token::new(TokenKind::Identifier, lexeme, line, column)
            }
            Ok(raw) => Token::new(raw.into(), lexeme, line, column),
            Err(()) => {
                let message = if lexeme.starts_with('.') {
                    "Malformed number literal: '.' not followed by digits".to_string()
                } else {
                    let ch = lexeme.chars().next().unwrap_or('\0');
                    format!("Unrecognized symbol '{ch}'")
                };
                let token = Token::new(TokenKind::Unknown, lexeme, line, column);
                session
                    .diagnostics
                    .report_error(Phase::Lexical, message, token.position())?;
                token
            }
        };
        log::trace!("token {} {:?} at {}:{}", token.kind, token.lexeme, line, column);
        Ok(token)
    }

    /// Eagerly drain `source` into a token vector ending in `EndOfFile`.
    pub fn tokenize(
        &mut self,
        source: &'src str,
        session: &mut Session,
    ) -> Result<Vec<Token>, FatalStop> {
        self.set_source(source);
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token(session)?;
            let done = token.is(TokenKind::EndOfFile);
            tokens.push(token);
            if done {
                break;
            }
        }
        log::debug!("tokenized {} tokens", tokens.len());
        Ok(tokens)
    }
}

impl TokenSource for Tokenizer<'_> {
    fn next_token(&mut self, session: &mut Session) -> Result<Token, FatalStop> {
        Tokenizer::next_token(self, session)
    }

    /// Scans the whole bound source without reporting anything.
    fn identifiers(&self) -> HashSet<String> {
        let Some(scanner) = &self.scanner else {
            return HashSet::new();
        };
        let mut lexer = RawToken::lexer(scanner.source);
        let mut names = HashSet::new();
        while let Some(raw) = lexer.next() {
            if raw == Ok(RawToken::Identifier) {
                names.insert(lexer.slice().to_string());
            }
        }
        names
    }
}

/// Pre-tokenized input replayed through the [`TokenSource`] interface.
///
/// Once drained it repeats an `EndOfFile` at the last token's position.
pub struct TokenBuffer {
    tokens: std::vec::IntoIter<Token>,
    last: (usize, usize),
}

impl TokenBuffer {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter(),
            last: (0, 0),
        }
    }
}

impl TokenSource for TokenBuffer {
    fn next_token(&mut self, _session: &mut Session) -> Result<Token, FatalStop> {
        match self.tokens.next() {
            Some(token) => {
                self.last = (token.line, token.column);
                Ok(token)
            }
            None => Ok(Token::eof(self.last.0, self.last.1)),
        }
    }

    fn identifiers(&self) -> HashSet<String> {
        self.tokens
            .as_slice()
            .iter()
            .filter(|t| t.is(TokenKind::Identifier))
            .map(|t| t.lexeme.clone())
            .collect()
    }
}
