//! TAC optimization passes.
//!
//! Passes run in registration order over a whole [`ProgramIR`]. The only
//! pass today is dead-code elimination, which reads usage flags from the
//! unit's symbol table.

use crate::ir::symbol_table::SymbolTable;
use crate::ir::ProgramIR;

pub mod dead_code;

pub use dead_code::{eliminate, DeadCodeEliminator};

pub trait IrPass {
    /// Short name for logging.
    fn name(&self) -> &'static str;
    fn run(&mut self, program: &mut ProgramIR);
}

#[derive(Default)]
pub struct PassManager<'a> {
    passes: Vec<Box<dyn IrPass + 'a>>,
}

impl<'a> PassManager<'a> {
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    pub fn add_pass(&mut self, pass: Box<dyn IrPass + 'a>) {
        self.passes.push(pass);
    }

    pub fn run_passes(&mut self, program: &mut ProgramIR) {
        for pass in &mut self.passes {
            let before = program.len();
            pass.run(program);
            log::debug!("{}: {} -> {} instructions", pass.name(), before, program.len());
        }
    }
}

/// Run the default pipeline (dead-code elimination) in place.
pub fn optimize(program: &mut ProgramIR, symbols: &SymbolTable) {
    let mut pm = PassManager::new();
    pm.add_pass(Box::new(DeadCodeEliminator::new(symbols)));
    pm.run_passes(program);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::TacInst;

    struct StripNops;

    impl IrPass for StripNops {
        fn name(&self) -> &'static str {
            "strip-nops"
        }

        fn run(&mut self, program: &mut ProgramIR) {
            program.instrs.retain(|i| *i != TacInst::Nop);
        }
    }

    #[test]
    fn passes_run_in_order() {
        let symbols = SymbolTable::new();
        let mut program = ProgramIR::from(vec![
            TacInst::Nop,
            TacInst::load_const("t0", "1"),
            TacInst::Nop,
        ]);
        let mut pm = PassManager::new();
        pm.add_pass(Box::new(StripNops));
        pm.add_pass(Box::new(DeadCodeEliminator::new(&symbols)));
        pm.run_passes(&mut program);
        assert!(program.is_empty());
    }
}
