//! Intermediate Representation (IR) module.
//!
//! This module contains the TAC definitions, the scoped symbol table, the
//! token-to-TAC generator, and IR optimization passes.

pub mod ir;
pub use ir::*;
pub mod ir_generator;
pub mod opt;
pub mod symbol_table;
