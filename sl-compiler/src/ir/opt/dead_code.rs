//! Dead-code elimination over flat TAC.
//!
//! One backward scan, no basic blocks: the IR has no jumps, so an
//! instruction is kept exactly when its destination is live at that point.
//! Every opcode is treated as pure.

use super::IrPass;
use crate::ir::symbol_table::SymbolTable;
use crate::ir::*;
use std::collections::HashSet;

/// Keep only the instructions whose results reach a live consumer.
///
/// Destinations the symbol table knows seed the live set unless it reports
/// them as unused. Temps have no entry and only become live through a kept
/// reader.
pub fn eliminate(instrs: &[TacInst], symbols: &SymbolTable) -> Vec<TacInst> {
    let unused: HashSet<String> = symbols
        .unused_entries()
        .into_iter()
        .map(|e| e.name)
        .collect();

    let mut live: HashSet<&str> = instrs
        .iter()
        .filter_map(TacInst::def)
        .filter(|d| symbols.lookup(d).is_some() && !unused.contains(*d))
        .collect();

    let mut keep = vec![false; instrs.len()];
    for (i, inst) in instrs.iter().enumerate().rev() {
        let Some(def) = inst.def() else { continue };
        if live.contains(def) {
            keep[i] = true;
            live.extend(inst.uses());
        } else {
            log::trace!("drop {i}:\t{inst}");
        }
    }

    instrs
        .iter()
        .zip(keep)
        .filter_map(|(inst, k)| k.then(|| inst.clone()))
        .collect()
}

/// [`eliminate`] as a pass, reading usage flags from a borrowed symbol table.
pub struct DeadCodeEliminator<'a> {
    symbols: &'a SymbolTable,
}

impl<'a> DeadCodeEliminator<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self { symbols }
    }
}

impl IrPass for DeadCodeEliminator<'_> {
    fn name(&self) -> &'static str {
        "dead-code"
    }

    fn run(&mut self, program: &mut ProgramIR) {
        program.instrs = eliminate(&program.instrs, self.symbols);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticSink;
    use crate::ir::symbol_table::SymbolEntry;

    fn table(used: &[&str], unused: &[&str]) -> SymbolTable {
        let mut st = SymbolTable::new();
        let mut diag = DiagnosticSink::new();
        for name in used.iter().chain(unused) {
            st.insert(SymbolEntry::variable(*name, "float"), &mut diag).unwrap();
        }
        for name in used {
            st.mark_used(name, &mut diag).unwrap();
        }
        st
    }

    #[test]
    fn drops_chain_feeding_unused_variable() {
        let st = table(&["x"], &["y"]);
        let ir = vec![
            TacInst::load_const("t0", "1"),
            TacInst::assign("x", "t0"),
            TacInst::load_const("t1", "2"),
            TacInst::assign("y", "t1"),
        ];
        assert_eq!(
            eliminate(&ir, &st),
            vec![TacInst::load_const("t0", "1"), TacInst::assign("x", "t0")]
        );
    }

    #[test]
    fn unread_temp_is_dropped() {
        let st = table(&["x"], &[]);
        let ir = vec![
            TacInst::load_const("t0", "1"),
            TacInst::load_const("t1", "2"),
            TacInst::assign("x", "t1"),
        ];
        assert_eq!(eliminate(&ir, &st), ir[1..].to_vec());
    }

    #[test]
    fn unused_variable_still_live_when_read_later() {
        // `y` is flagged unused but feeds `x`, so its definition survives.
        let st = table(&["x"], &["y"]);
        let ir = vec![
            TacInst::load_const("t0", "4"),
            TacInst::assign("y", "t0"),
            TacInst::assign("x", "y"),
        ];
        assert_eq!(eliminate(&ir, &st), ir);
    }

    #[test]
    fn declared_name_shaped_like_temp_is_seeded() {
        let st = table(&["t1"], &[]);
        let ir = vec![TacInst::load_const("t0", "5"), TacInst::assign("t1", "t0")];
        assert_eq!(eliminate(&ir, &st), ir);
    }

    #[test]
    fn nop_is_removed() {
        let st = table(&["x"], &[]);
        let ir = vec![TacInst::Nop, TacInst::assign("x", "a")];
        assert_eq!(eliminate(&ir, &st), vec![TacInst::assign("x", "a")]);
    }

    #[test]
    fn pass_manager_runs_elimination() {
        let st = table(&[], &["z"]);
        let mut program = ProgramIR::from(vec![
            TacInst::load_const("t0", "1"),
            TacInst::assign("z", "t0"),
        ]);
        super::super::optimize(&mut program, &st);
        assert!(program.is_empty());
    }
}
