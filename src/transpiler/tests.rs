use crate::error::ErrorKind;
use crate::ir::{self, WsToken};
use crate::lexer::tokenize;
use crate::parser::parse;
use crate::transpiler::transpile;

fn transpile_source(input: &str) -> Vec<crate::ir::Instruction> {
    let tokens = tokenize(input).unwrap_or_else(|e| panic!("lex error: {e}"));
    let program = parse(tokens).unwrap_or_else(|e| panic!("parse error: {e}"));
    transpile(&program).unwrap_or_else(|e| panic!("transpile error: {e}"))
}

fn transpile_err(input: &str) -> ErrorKind {
    let tokens = tokenize(input).unwrap();
    let program = parse(tokens).unwrap();
    transpile(&program)
        .expect_err("expected a transpile error")
        .kind()
        .expect("transpile errors always carry a kind")
}

fn flatten(instructions: &[crate::ir::Instruction]) -> Vec<WsToken> {
    instructions.iter().flat_map(|i| i.tokens().to_vec()).collect()
}

#[test]
fn every_program_ends_with_end_program() {
    let instructions = transpile_source("let x = 1;");
    assert_eq!(instructions.last(), Some(&ir::end_program()));
}

#[test]
fn console_log_single_string_matches_canonical_sequence() {
    // console.log('Hi'); -> store heap[1]='H', store heap[2]='i',
    // retrieve+print-char twice, push '\n'+print-char, end-program.
    let instructions = transpile_source("console.log('Hi');");
    let expected = vec![
        ir::push(1),
        ir::push('H' as i64),
        ir::heap_store(),
        ir::push(2),
        ir::push('i' as i64),
        ir::heap_store(),
        ir::push(1),
        ir::heap_retrieve(),
        ir::print_char(),
        ir::push(2),
        ir::heap_retrieve(),
        ir::print_char(),
        ir::push('\n' as i64),
        ir::print_char(),
        ir::end_program(),
    ];
    assert_eq!(instructions, expected);
}

#[test]
fn console_log_multiple_args_inserts_space_between() {
    let instructions = transpile_source("console.log(1, 2);");
    assert!(flatten(&instructions)
        .windows(ir::push(' ' as i64).tokens().len())
        .any(|w| w == ir::push(' ' as i64).tokens()));
}

#[test]
fn int_literal_allocates_and_stores() {
    let instructions = transpile_source("let x = 42;");
    assert_eq!(
        &instructions[..3],
        &[ir::push(1), ir::push(42), ir::heap_store()]
    );
}

#[test]
fn addition_stores_the_sum_at_the_result_address_not_a_stale_operand() {
    // let x = 1; let y = x + 2; -- x is heap[1], the literal 2 is heap[2].
    // The sum must land in a *fresh* slot (heap[3]), and the final
    // push/swap/heap_store must target that fresh address, not whatever
    // value the binary-operand setup's garbage duplicate leaves beneath
    // the sum on the stack.
    let instructions = transpile_source("let x = 1; let y = x + 2;");
    let body = &instructions[..instructions.len() - 1]; // drop the trailing end-program marker
    let tail = &body[body.len() - 10..];
    assert_eq!(
        tail,
        &[
            ir::push(1),
            ir::heap_retrieve(),
            ir::push(2),
            ir::heap_retrieve(),
            ir::copy_nth(1),
            ir::swap(),
            ir::add(),
            ir::push(3),
            ir::swap(),
            ir::heap_store(),
        ]
    );
}

#[test]
fn comparison_stores_the_boolean_after_the_label_dance_not_before_it() {
    // 1 === 2 only triggers the zero-equality check (no sign check), so
    // the final store should be the very last three instructions emitted
    // for the comparison: push(result_addr), swap, heap_store -- coming
    // *after* both labels, not a `push(result_addr)` emitted up front.
    let instructions = transpile_source("let x = (1 === 2);");
    let body = &instructions[..instructions.len() - 1]; // drop the trailing end-program marker
    let tail = &body[body.len() - 3..];
    // heap[1] and heap[2] hold the two literals; the comparison result
    // must land in the freshly allocated heap[3], not either operand slot.
    assert_eq!(tail, &[ir::push(3), ir::swap(), ir::heap_store()]);
}

#[test]
fn each_literal_gets_a_distinct_heap_slot() {
    let instructions = transpile_source("let a = 1; let b = 2;");
    // First store targets heap[1], second targets heap[2].
    assert_eq!(instructions[0], ir::push(1));
    assert_eq!(instructions[3], ir::push(2));
}

#[test]
fn redeclaration_is_rejected() {
    assert_eq!(
        transpile_err("let x = 1; let x = 2;"),
        ErrorKind::Redeclaration
    );
}

#[test]
fn assignment_to_undeclared_name_is_rejected() {
    assert_eq!(transpile_err("x = 1;"), ErrorKind::UndeclaredAssignment);
}

#[test]
fn assignment_rewrites_the_same_heap_address() {
    let instructions = transpile_source("let x = 1; x = 2;");
    // x's declaration stores into heap[1]; the assignment also targets
    // heap[1], retrieving the freshly transpiled rhs from heap[2].
    assert_eq!(instructions[0], ir::push(1));
    assert!(instructions.contains(&ir::push(1)));
}

#[test]
fn assigning_a_string_is_rejected() {
    assert_eq!(
        transpile_err("let s = 'a'; s = 'b';"),
        ErrorKind::TypeMismatch
    );
}

#[test]
fn break_outside_loop_is_rejected() {
    assert_eq!(transpile_err("break;"), ErrorKind::BreakOutsideLoop);
}

#[test]
fn continue_outside_loop_is_rejected() {
    assert_eq!(transpile_err("continue;"), ErrorKind::ContinueOutsideLoop);
}

#[test]
fn unknown_identifier_is_rejected() {
    assert_eq!(
        transpile_err("console.log(missing);"),
        ErrorKind::UnknownIdentifier
    );
}

#[test]
fn calling_a_non_builtin_is_rejected() {
    assert_eq!(transpile_err("let x = 1; x();"), ErrorKind::CallToNonBuiltin);
}

#[test]
fn string_concatenation_is_compile_time_only() {
    // No extra heap slots beyond the source characters: 'ab' (2) + 'cd' (2).
    let instructions = transpile_source("let s = 'ab' + 'cd'; console.log(s);");
    let store_count = instructions
        .iter()
        .filter(|i| **i == ir::heap_store())
        .count();
    assert_eq!(store_count, 4);
}

#[test]
fn arithmetic_type_mismatch_is_rejected() {
    assert_eq!(
        transpile_err("let s = 'a'; let x = s + 1;"),
        ErrorKind::TypeMismatch
    );
}

fn is_label(i: &crate::ir::Instruction) -> bool {
    i.tokens().first() == Some(&WsToken::Lf)
        && i.tokens().get(1) == Some(&WsToken::Space)
        && i.tokens().get(2) == Some(&WsToken::Space)
}

fn is_jump(i: &crate::ir::Instruction) -> bool {
    i.tokens().first() == Some(&WsToken::Lf)
        && i.tokens().get(1) == Some(&WsToken::Space)
        && i.tokens().get(2) == Some(&WsToken::Lf)
}

#[test]
fn if_without_else_still_emits_an_else_label() {
    let instructions = transpile_source("if (1 === 1) { console.log(1); }");
    let label_count = instructions.iter().filter(|i| is_label(i)).count();
    assert_eq!(label_count, 2);
}

#[test]
fn for_loop_emits_three_distinct_labels() {
    let instructions = transpile_source("for (let i = 0; i < 3; i++) { console.log(i); }");
    let label_count = instructions.iter().filter(|i| is_label(i)).count();
    assert_eq!(label_count, 3);
}

#[test]
fn break_inside_loop_jumps_unconditionally() {
    let instructions = transpile_source("for (let i = 0; i < 3; i++) { break; }");
    assert!(instructions.iter().any(is_jump));
}

#[test]
fn comparison_result_is_an_integer_usable_downstream() {
    let instructions = transpile_source("let ok = (1 < 2); console.log(ok);");
    assert!(!instructions.is_empty());
}

#[test]
fn logical_and_short_circuit_shape_allocates_two_operands_plus_result() {
    let instructions = transpile_source("let x = (1 === 1) && (2 === 2);");
    // Two comparisons plus the && result each allocate a heap slot; just
    // confirm the pipeline accepts boolean-producing operands on both sides.
    assert!(instructions.len() > 10);
}

#[test]
fn logical_or_accepts_integer_operands() {
    let instructions = transpile_source("let x = 0; let y = (x === 0) || (x === 1);");
    assert!(!instructions.is_empty());
}

#[test]
fn prefix_bang_reuses_equality_comparison_machinery() {
    // `!(x === 1)` lowers `===` to the usual match/end label pair, then
    // negates the boolean result in place, so the shape still carries two
    // labels (one comparison, no extra label pair for the bang itself).
    let instructions = transpile_source("let x = 1; let y = !(x === 1);");
    let label_count = instructions.iter().filter(|i| is_label(i)).count();
    assert_eq!(label_count, 2);
}

#[test]
fn suffix_increment_does_not_mutate_original_slot() {
    let instructions = transpile_source("let x = 1; let y = x++;");
    // x's own store stays at heap[1]; y gets a fresh slot, observable as an
    // additional heap_store beyond x's and the literal `1` used by `x++`.
    let store_count = instructions
        .iter()
        .filter(|i| **i == ir::heap_store())
        .count();
    assert_eq!(store_count, 3); // x=1, tmp literal 1 for x++, y=result
}
