use crate::diagnostics::{FatalStop, Phase};
use crate::frontend::{Token, TokenKind, TokenSource};
use crate::ir::*;
use crate::session::Session;
use std::collections::HashSet;

/// Why a production stopped before completing.
#[derive(Debug)]
pub enum Halt {
    /// A syntax error was reported; resume at the next statement boundary.
    Recover,
    /// The diagnostic sink asked the whole unit to stop.
    Fatal(FatalStop),
}

impl From<FatalStop> for Halt {
    fn from(stop: FatalStop) -> Self {
        Halt::Fatal(stop)
    }
}

pub type LowerResult<T> = Result<T, Halt>;

pub struct Gen<'s, T> {
    pub tokens: T,
    pub session: &'s mut Session,
    /// One token of lookahead.
    pub current: Token,
    pub out: ProgramIR,
    pub temp_count: usize,
    /// Released temps, reused LIFO.
    pub free_temps: Vec<String>,
    /// Every temp name handed out so far.
    pub minted: HashSet<String>,
    /// Source identifiers; temps never take these names.
    pub reserved: HashSet<String>,
}

impl<'s, T: TokenSource> Gen<'s, T> {
    pub fn new(mut tokens: T, session: &'s mut Session) -> Result<Self, FatalStop> {
        let reserved = tokens.identifiers();
        let current = tokens.next_token(session)?;
        Ok(Self {
            tokens,
            session,
            current,
            out: ProgramIR::new(),
            temp_count: 0,
            free_temps: Vec::new(),
            minted: HashSet::new(),
            reserved,
        })
    }

    pub fn finish(self) -> ProgramIR {
        self.out
    }

    /// Consume the lookahead and return it.
    pub fn advance(&mut self) -> Result<Token, FatalStop> {
        let next = self.tokens.next_token(self.session)?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.current.is(kind)
    }

    pub fn expect(&mut self, kind: TokenKind, message: &str) -> LowerResult<Token> {
        if self.check(kind) {
            return Ok(self.advance()?);
        }
        let message = format!("{message}, found {}", self.current);
        Err(self.syntax_error(message))
    }

    /// Report a syntax error at the lookahead token.
    pub fn syntax_error(&mut self, message: impl Into<String>) -> Halt {
        let position = self.current.position();
        match self
            .session
            .diagnostics
            .report_error(Phase::Syntax, message, position)
        {
            Ok(()) => Halt::Recover,
            Err(stop) => Halt::Fatal(stop),
        }
    }

    /// A temp name no source identifier or symbol uses.
    pub fn new_temp(&mut self) -> String {
        if let Some(t) = self.free_temps.pop() {
            log::trace!("reuse temp {t}");
            return t;
        }
        loop {
            let t = format!("t{}", self.temp_count);
            self.temp_count += 1;
            if self.reserved.contains(&t) || self.session.symbols.lookup(&t).is_some() {
                log::trace!("skip {t}, taken by an identifier");
                continue;
            }
            self.minted.insert(t.clone());
            return t;
        }
    }

    /// Return `name` to the pool if this generator minted it.
    pub fn release(&mut self, name: &str) {
        if self.minted.contains(name) {
            log::trace!("release temp {name}");
            self.free_temps.push(name.to_string());
        }
    }

    pub fn emit(&mut self, i: TacInst) {
        log::trace!("emit {}:\t{i}", self.out.instrs.len());
        self.out.instrs.push(i);
    }
}
