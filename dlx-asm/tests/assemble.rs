//! Exercises the lexer+parser pipeline against whole programs rather than
//! single lines.

use dlx::{Argument, DiagnosticKind, Opcode};

#[test]
fn forward_label_reference_resolves_after_full_parse() {
    let source = "\
        BEQZ R1, done\n\
        ADDI R1, R0, #1\n\
    done:\n\
        HALT\n\
    ";
    let program = dlx_asm::parse(source);
    assert!(program.is_valid());
    assert_eq!(program.resolve_label("done"), Some(2));
}

#[test]
fn comments_and_blank_lines_do_not_disturb_instruction_indices() {
    let source = "\
        ; header comment\n\
        \n\
        ADD R1, R1, R1  ; trailing\n\
        / alternate comment marker\n\
        NOP\n\
    ";
    let program = dlx_asm::parse(source);
    assert!(program.is_valid());
    assert_eq!(program.instructions().len(), 2);
    assert_eq!(program.instructions()[0].opcode, Opcode::ADD);
    assert_eq!(program.instructions()[1].opcode, Opcode::NOP);
}

#[test]
fn hash_prefixed_immediate_is_accepted_for_a_plain_immediate_slot() {
    let program = dlx_asm::parse("ADDI R1, R0, #10\n");
    assert!(program.is_valid());
    assert_eq!(program.instructions()[0].arguments[2], Argument::ImmediateInteger(10));
}

#[test]
fn bare_integer_literal_is_rejected_for_a_plain_immediate_slot() {
    let program = dlx_asm::parse("ADDI R2, R0, 10\n");
    assert!(!program.is_valid());
    assert!(program
        .diagnostics()
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::UnexpectedArgumentType { .. })));
}

#[test]
fn too_few_arguments_is_diagnosed() {
    let program = dlx_asm::parse("ADD R1, R1\n");
    assert!(!program.is_valid());
    assert!(program
        .diagnostics()
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::TooFewArguments { .. } | DiagnosticKind::UnexpectedToken { .. })));
}

#[test]
fn wrong_argument_type_is_diagnosed() {
    let program = dlx_asm::parse("ADD R1, R1, #1\n");
    assert!(!program.is_valid());
    assert!(program
        .diagnostics()
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::UnexpectedArgumentType { .. })));
}
