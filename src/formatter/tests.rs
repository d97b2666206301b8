use crate::formatter::format;
use crate::ir::{self, Instruction};
use crate::lexer::tokenize;
use crate::parser::parse;
use crate::transpiler::transpile;

fn compile(source: &str) -> Vec<Instruction> {
    let tokens = tokenize(source).unwrap_or_else(|e| panic!("lex error: {e}"));
    let program = parse(tokens).unwrap_or_else(|e| panic!("parse error: {e}"));
    transpile(&program).unwrap_or_else(|e| panic!("transpile error: {e}"))
}

fn raw_program(instructions: &[Instruction]) -> String {
    instructions.iter().map(Instruction::to_string).collect()
}

fn overlay(host: &str, instructions: &[Instruction]) -> String {
    let mut sink = Vec::new();
    format(host.as_bytes(), instructions, &mut sink).expect("formatting should succeed");
    String::from_utf8(sink).expect("formatter output is valid UTF-8")
}

/// Stripping every character outside the Whitespace alphabet should yield
/// exactly the raw program.
fn strip_to_alphabet(formatted: &str) -> String {
    formatted
        .chars()
        .filter(|c| matches!(c, ' ' | '\t' | '\n'))
        .collect()
}

#[test]
fn byte_preservation_over_mixed_host() {
    let instructions = compile("console.log('!');");
    let host = "abc def\nghi";
    let formatted = overlay(host, &instructions);
    assert_eq!(strip_to_alphabet(&formatted), raw_program(&instructions));
}

#[test]
fn non_whitespace_host_content_is_preserved_verbatim() {
    let instructions = compile("let x = 1;");
    let host = "abc def\nghi";
    let formatted = overlay(host, &instructions);
    assert_eq!(
        formatted.chars().filter(|c| !matches!(c, ' ' | '\t' | '\n')).collect::<String>(),
        "abcdefghi"
    );
}

#[test]
fn idempotent_on_whitespace_only_host_modulo_noop_padding() {
    // A host shorter than the instruction stream under-demands tokens, so
    // no Noop padding is ever triggered — every real token is flushed
    // either by a host position or by the end-of-host drain, reproducing
    // the raw program exactly.
    let instructions = compile("console.log('Hi');");
    let host = "   \n\t\t\n  \n\n";
    let formatted = overlay(host, &instructions);
    assert_eq!(strip_to_alphabet(&formatted), raw_program(&instructions));
}

#[test]
fn trailing_end_program_marker_always_appears_once() {
    let instructions = compile("let x = 1;");
    let host = "x";
    let formatted = overlay(host, &instructions);
    assert_eq!(formatted.matches("\n\n\n").count(), 1);
    assert!(formatted.ends_with("\n\n\n"));
}

#[test]
fn short_host_still_yields_a_syntactically_complete_program() {
    let instructions = compile("console.log('Hello, world!');");
    // A host far shorter than the instruction stream: everything still
    // drains out after host EOF, then the end marker.
    let host = "a";
    let formatted = overlay(host, &instructions);
    assert_eq!(strip_to_alphabet(&formatted), raw_program(&instructions));
}

#[test]
fn quoted_string_in_host_is_preserved_with_sanitized_whitespace() {
    let instructions = compile("let x = 1;");
    let host = "\"a b\tc\"";
    let formatted = overlay(host, &instructions);
    assert!(formatted.starts_with('"'));
    assert!(formatted.contains('\u{2007}'));
    assert!(!formatted.starts_with("\"a b\tc\""));
}

#[test]
fn line_comment_is_preserved_and_drains_a_line_feed_token() {
    let instructions = compile("console.log(1);");
    let host = "// note\ncode";
    let formatted = overlay(host, &instructions);
    assert!(formatted.starts_with("//"));
    assert!(formatted.contains("note"));
    assert!(formatted.contains("code"));
}

#[test]
fn block_comment_consumes_no_instruction_tokens() {
    let instructions = compile("console.log(1);");
    let host_with_comment = "/* a\nb */";
    let host_without_comment = "";
    let with = overlay(host_with_comment, &instructions);
    let without = overlay(host_without_comment, &instructions);
    // The block comment contributes no real tokens, so the remaining/
    // trailing token stream is identical either way once comment text is
    // stripped out.
    let with_tokens = strip_to_alphabet(&with);
    let without_tokens = strip_to_alphabet(&without);
    assert_eq!(with_tokens, without_tokens);
}

#[test]
fn arrow_function_space_becomes_placeholder_when_next_token_is_line_feed() {
    // Craft an instruction list whose very first token is LF (a label),
    // so the space immediately preceding "=>" hits the special case.
    let instructions = vec![ir::label(1), ir::end_program()];
    let host = " => x";
    let formatted = overlay(host, &instructions);
    assert!(formatted.starts_with('\u{2007}'));
}

#[test]
fn space_before_non_arrow_consumes_a_real_token() {
    let instructions = vec![ir::label(1), ir::end_program()];
    let host = " x";
    let formatted = overlay(host, &instructions);
    assert!(!formatted.starts_with('\u{2007}'));
}
