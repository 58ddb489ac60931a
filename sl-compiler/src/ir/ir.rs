// A flat three-address code: no labels, no jumps, program order only.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramIR {
    pub instrs: Vec<TacInst>,
}

impl ProgramIR {
    pub fn new() -> Self {
        Self { instrs: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    /// Numbered listing, one `<index>:\t<instruction>` line each.
    pub fn to_lines(&self) -> Vec<String> {
        self.instrs
            .iter()
            .enumerate()
            .map(|(i, ins)| format!("{i}:\t{ins}"))
            .collect()
    }
}

impl From<Vec<TacInst>> for ProgramIR {
    fn from(instrs: Vec<TacInst>) -> Self {
        Self { instrs }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TacInst {
    /// `dst = literal`
    LoadConst { dst: String, literal: String },

    /// `dst = src`
    Assign { dst: String, src: String },

    /// `dst = left <op> right`
    Binary {
        op: ArithOp,
        dst: String,
        left: String,
        right: String,
    },

    Nop,
}

impl TacInst {
    pub fn load_const(dst: impl Into<String>, literal: impl Into<String>) -> Self {
        TacInst::LoadConst {
            dst: dst.into(),
            literal: literal.into(),
        }
    }

    pub fn assign(dst: impl Into<String>, src: impl Into<String>) -> Self {
        TacInst::Assign {
            dst: dst.into(),
            src: src.into(),
        }
    }

    pub fn binary(
        op: ArithOp,
        dst: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        TacInst::Binary {
            op,
            dst: dst.into(),
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn op(&self) -> TacOp {
        match self {
            TacInst::LoadConst { .. } => TacOp::LoadConst,
            TacInst::Assign { .. } => TacOp::Assign,
            TacInst::Binary { op, .. } => match op {
                ArithOp::Add => TacOp::Add,
                ArithOp::Sub => TacOp::Sub,
                ArithOp::Mul => TacOp::Mul,
                ArithOp::Div => TacOp::Div,
            },
            TacInst::Nop => TacOp::Nop,
        }
    }

    /// The name written by this instruction, if any.
    pub fn def(&self) -> Option<&str> {
        match self {
            TacInst::LoadConst { dst, .. }
            | TacInst::Assign { dst, .. }
            | TacInst::Binary { dst, .. } => Some(dst),
            TacInst::Nop => None,
        }
    }

    /// Names read by this instruction, per the opcode's read arity.
    pub fn uses(&self) -> Vec<&str> {
        match self {
            TacInst::Assign { src, .. } => vec![src.as_str()],
            TacInst::Binary { left, right, .. } => vec![left.as_str(), right.as_str()],
            TacInst::LoadConst { .. } | TacInst::Nop => Vec::new(),
        }
    }
}

impl fmt::Display for TacInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TacInst::LoadConst { dst, literal } => write!(f, "{dst} = {literal}"),
            TacInst::Assign { dst, src } => write!(f, "{dst} = {src}"),
            TacInst::Binary { op, dst, left, right } => write!(f, "{dst} = {left} {op} {right}"),
            TacInst::Nop => write!(f, "// NOP"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithOp { Add, Sub, Mul, Div }

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}",
            match self { ArithOp::Add => "+", ArithOp::Sub => "-", ArithOp::Mul => "*", ArithOp::Div => "/" })
    }
}

/// Opcode tag of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TacOp { LoadConst, Assign, Add, Sub, Mul, Div, Nop }

impl fmt::Display for TacOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TacOp::LoadConst => "LOAD_CONST",
            TacOp::Assign => "ASSIGN",
            TacOp::Add => "ADD",
            TacOp::Sub => "SUB",
            TacOp::Mul => "MUL",
            TacOp::Div => "DIV",
            TacOp::Nop => "NOP",
        };
        write!(f, "{s}")
    }
}
