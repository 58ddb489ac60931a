use sl_compiler::frontend::{TokenBuffer, Tokenizer};
use sl_compiler::ir::ir_generator::generate;
use sl_compiler::ir::{ArithOp, TacInst};
use sl_compiler::{compile, Session};

// ── Lowering ─────────────────────────────────────────────────────────────

#[test]
fn identifiers_are_read_in_place() {
    let mut session = Session::default();
    let ir = generate(Tokenizer::with_source("y = x;"), &mut session).unwrap();
    assert_eq!(ir.instrs, vec![TacInst::assign("y", "x")]);
    // `x` was pre-registered by the tokenizer, so no undeclared error.
    assert!(session.diagnostics.is_empty());
    assert!(session.symbols.lookup("x").unwrap().is_used);
}

#[test]
fn left_associative_operators() {
    let mut session = Session::default();
    let ir = generate(Tokenizer::with_source("r = a - b - c;"), &mut session).unwrap();
    assert_eq!(
        ir.instrs,
        vec![
            TacInst::binary(ArithOp::Sub, "t0", "a", "b"),
            TacInst::binary(ArithOp::Sub, "t1", "t0", "c"),
            TacInst::assign("r", "t1"),
        ]
    );
}

#[test]
fn temps_bounded_by_nesting_depth() {
    let mut session = Session::default();
    let ir = generate(
        Tokenizer::with_source("s = a * b + c * d + e * f + g * h;"),
        &mut session,
    )
    .unwrap();
    let mut temps: Vec<&str> = ir
        .instrs
        .iter()
        .filter_map(TacInst::def)
        .filter(|d| d.starts_with('t'))
        .collect();
    temps.sort();
    temps.dedup();
    assert!(temps.len() <= 3, "too many distinct temps: {temps:?}");
    assert_eq!(ir.instrs.len(), 8);
}

#[test]
fn division_and_multiplication_share_precedence() {
    let mut session = Session::default();
    let ir = generate(Tokenizer::with_source("q = a / b * c;"), &mut session).unwrap();
    assert_eq!(
        ir.instrs,
        vec![
            TacInst::binary(ArithOp::Div, "t0", "a", "b"),
            TacInst::binary(ArithOp::Mul, "t1", "t0", "c"),
            TacInst::assign("q", "t1"),
        ]
    );
}

#[test]
fn later_statements_reuse_released_temps() {
    let mut session = Session::default();
    let ir = generate(
        Tokenizer::with_source("a = 1 + 2;\nb = 3;"),
        &mut session,
    )
    .unwrap();
    assert_eq!(
        ir.instrs,
        vec![
            TacInst::load_const("t0", "1"),
            TacInst::load_const("t1", "2"),
            TacInst::binary(ArithOp::Add, "t2", "t0", "t1"),
            TacInst::assign("a", "t2"),
            TacInst::load_const("t1", "3"),
            TacInst::assign("b", "t1"),
        ]
    );
}

#[test]
fn generates_from_pretokenized_buffer() {
    let source = "m = n * 0.5;";
    let mut session = Session::default();
    let tokens = Tokenizer::new().tokenize(source, &mut session).unwrap();
    let ir = generate(TokenBuffer::new(tokens), &mut session).unwrap();
    assert_eq!(ir.to_lines(), vec!["0:\tt0 = 0.5", "1:\tt1 = n * t0", "2:\tm = t1"]);
}

#[test]
fn empty_source_produces_nothing() {
    let mut session = Session::default();
    let out = compile("  \n\t ", &mut session).unwrap();
    assert!(out.ir.is_empty());
    assert!(session.diagnostics.is_empty());
}

// ── Pipeline ─────────────────────────────────────────────────────────────

#[test]
fn overwritten_value_is_kept_conservatively() {
    let mut session = Session::default();
    let out = compile("x = 1;\nx = 2;\ny = x;", &mut session).unwrap();
    // Liveness is not killed on redefinition, so both writes of `x` stay.
    assert_eq!(out.optimized, out.ir);
}

#[test]
fn sample_program_compiles_cleanly() {
    let source = r#"
        result = signal1 * 3.14 + temp;
        temp = result / 2.0 - signal1;
        output = temp * temp;
    "#;
    let mut session = Session::default();
    let out = compile(source, &mut session).unwrap();
    assert_eq!(session.diagnostics.error_count(), 0);
    assert_eq!(out.ir.len(), 10);
    for name in ["result", "temp", "output"] {
        let e = session.symbols.lookup(name).unwrap();
        assert!(!e.is_dummy, "{name} should be declared");
    }
    // `signal1` is only ever read, so it stays a placeholder.
    assert!(session.symbols.lookup("signal1").unwrap().is_dummy);
}

// ── Temps versus source identifiers ─────────────────────────────────────

#[test]
fn variable_named_like_a_temp_survives_optimization() {
    let mut session = Session::default();
    let out = compile("t1 = 5;", &mut session).unwrap();
    assert_eq!(
        out.ir.instrs,
        vec![TacInst::load_const("t0", "5"), TacInst::assign("t1", "t0")]
    );
    assert_eq!(out.optimized, out.ir);
}

#[test]
fn temps_never_reuse_source_identifiers() {
    let mut session = Session::default();
    let ir = generate(
        Tokenizer::with_source("t0 = 1; x = 2 + t0; y = 3 * 4; z = t0;"),
        &mut session,
    )
    .unwrap();
    assert_eq!(
        ir.instrs,
        vec![
            TacInst::load_const("t1", "1"),
            TacInst::assign("t0", "t1"),
            TacInst::load_const("t2", "2"),
            TacInst::binary(ArithOp::Add, "t3", "t2", "t0"),
            TacInst::assign("x", "t3"),
            TacInst::load_const("t2", "3"),
            TacInst::load_const("t4", "4"),
            TacInst::binary(ArithOp::Mul, "t5", "t2", "t4"),
            TacInst::assign("y", "t5"),
            TacInst::assign("z", "t0"),
        ]
    );
    let writes_to_t0 = ir.instrs.iter().filter(|i| i.def() == Some("t0")).count();
    assert_eq!(writes_to_t0, 1);
}

#[test]
fn identifier_after_the_literal_is_still_avoided() {
    // `t0` has not been pulled yet when the literal's temp is minted.
    let mut session = Session::default();
    let ir = generate(Tokenizer::with_source("x = 1 + t0;"), &mut session).unwrap();
    assert_eq!(
        ir.instrs,
        vec![
            TacInst::load_const("t1", "1"),
            TacInst::binary(ArithOp::Add, "t2", "t1", "t0"),
            TacInst::assign("x", "t2"),
        ]
    );
}

#[test]
fn predeclared_symbol_blocks_temp_name() {
    use sl_compiler::ir::symbol_table::SymbolEntry;

    let mut session = Session::default();
    let entry = SymbolEntry::variable("t0", "float");
    session.symbols.insert(entry, &mut session.diagnostics).unwrap();
    let ir = generate(Tokenizer::with_source("a = 7;"), &mut session).unwrap();
    assert_eq!(
        ir.instrs,
        vec![TacInst::load_const("t1", "7"), TacInst::assign("a", "t1")]
    );
}
