//! Turns a token stream into a `dlx::ParsedProgram`.
//!
//! One line of source becomes at most one instruction. A line may open with
//! a label definition (`name:`); what follows, if anything, must be a single
//! opcode and its arguments. Argument slots are coerced against the
//! opcode's declared `ArgumentType`s, with `AddressDisplacement` accepting
//! either a `#`-prefixed bare immediate (base defaults to `R0`) or an
//! unprefixed `int(Rn)` form; an unprefixed integer with no base register is
//! rejected rather than defaulted.

use crate::identifier::{is_reserved_identifier, is_valid_label_identifier};
use crate::lexer::tokenize;
use crate::token::{Hint, Token, TokenStream, TokenType};
use dlx::{Argument, ArgumentType, Diagnostic, DiagnosticKind, ParsedInstruction, ParsedProgram};

/// Lexes and parses `source` into a `ParsedProgram`. Never panics: malformed
/// input surfaces as diagnostics on the returned program.
pub fn parse(source: &str) -> ParsedProgram {
    let mut tokens = tokenize(source);
    let mut program = ParsedProgram::new();

    while !tokens.reached_end() {
        parse_line(&mut tokens, &mut program);
    }

    program
}

fn parse_line(tokens: &mut TokenStream, program: &mut ParsedProgram) {
    if skip_blank_or_comment_line(tokens) {
        return;
    }

    let label = take_label_definition(tokens, program);

    if matches!(tokens.look_ahead(0).map(|t| t.token_type), Some(TokenType::NewLine) | None) {
        if let Some(label) = label {
            program.push_diagnostic(Diagnostic::new(label.line, label.column, DiagnosticKind::EmptyLabel { name: label.text }));
        }
        consume_newline(tokens);
        return;
    }

    match parse_instruction(tokens) {
        Ok(instruction) => {
            let index = program.push_instruction(instruction);
            if let Some(label) = label {
                define_label(program, label, index);
            }
        }
        Err(diagnostic) => {
            program.push_diagnostic(diagnostic);
        }
    }

    resync_to_newline(tokens, program);
}

/// Skips a line that is empty, whitespace-only, or holds only a comment.
/// Returns true if it consumed such a line (including its trailing newline).
fn skip_blank_or_comment_line(tokens: &mut TokenStream) -> bool {
    match tokens.look_ahead(0).map(|t| t.token_type) {
        Some(TokenType::NewLine) => {
            tokens.consume();
            true
        }
        Some(TokenType::Comment) => {
            tokens.consume();
            consume_newline(tokens);
            true
        }
        None => true,
        _ => false,
    }
}

fn consume_newline(tokens: &mut TokenStream) {
    if matches!(tokens.look_ahead(0).map(|t| t.token_type), Some(TokenType::NewLine)) {
        tokens.consume();
    }
    if matches!(tokens.look_ahead(0).map(|t| t.token_type), Some(TokenType::Comment)) {
        tokens.consume();
        consume_newline(tokens);
    }
}

/// Consumes a `label:` prefix if present. Diagnoses reserved/invalid names
/// immediately, but still returns the label so a following instruction
/// parses normally.
fn take_label_definition(tokens: &mut TokenStream, program: &mut ParsedProgram) -> Option<Token> {
    let is_label = matches!(tokens.look_ahead(0).map(|t| t.token_type), Some(TokenType::LabelIdentifier))
        && tokens.look_ahead(0).map(|t| t.text.ends_with(':')).unwrap_or(false);
    if !is_label {
        return None;
    }

    let token = tokens.consume().unwrap();
    let name = token.text.trim_end_matches(':').to_string();

    if is_reserved_identifier(&name) {
        program.push_diagnostic(Diagnostic::new(
            token.line,
            token.column,
            DiagnosticKind::ReservedIdentifier { identifier: name.clone() },
        ));
    } else if !is_valid_label_identifier(&name) {
        program.push_diagnostic(Diagnostic::new(
            token.line,
            token.column,
            DiagnosticKind::InvalidLabelIdentifier { identifier: name.clone() },
        ));
    }

    Some(Token::new(token.token_type, name, token.line, token.column, None))
}

fn define_label(program: &mut ParsedProgram, label: Token, index: usize) {
    if let Some(&prior_index) = program.labels().get(&label.text) {
        let prior = &program.instructions()[prior_index];
        program.push_diagnostic(Diagnostic::new(
            label.line,
            label.column,
            DiagnosticKind::LabelAlreadyDefined {
                name: label.text,
                prior_line: prior.line,
                prior_column: prior.column,
            },
        ));
        return;
    }
    program.define_label(label.text, index);
}

fn parse_instruction(tokens: &mut TokenStream) -> Result<ParsedInstruction, Diagnostic> {
    let opcode_token = tokens.consume().expect("caller checked a token is present");
    let opcode = match &opcode_token.hint {
        Some(Hint::Opcode(opcode)) if opcode_token.token_type == TokenType::OpCode => *opcode,
        _ => {
            return Err(Diagnostic::new(
                opcode_token.line,
                opcode_token.column,
                DiagnosticKind::UnexpectedToken {
                    expected: TokenType::OpCode.describe(),
                    actual: opcode_token.token_type.describe(),
                },
            ));
        }
    };

    let slot_types = opcode.argument_types();
    let required = opcode.required_argument_count();
    let mut arguments = [Argument::None, Argument::None, Argument::None];

    for (index, slot_type) in slot_types.iter().enumerate().take(required) {
        if index > 0 {
            expect_comma(tokens, opcode_token.line)?;
        }
        arguments[index] = parse_argument(tokens, *slot_type)?;
    }

    if let Some(next) = tokens.look_ahead(0) {
        if !matches!(next.token_type, TokenType::NewLine | TokenType::Comment) {
            return Err(Diagnostic::new(next.line, next.column, DiagnosticKind::OneInstructionPerLine));
        }
    }

    Ok(ParsedInstruction::new(opcode, arguments, opcode_token.line, opcode_token.column))
}

fn expect_comma(tokens: &mut TokenStream, instruction_line: u32) -> Result<(), Diagnostic> {
    match tokens.look_ahead(0) {
        Some(token) if token.token_type == TokenType::Comma => {
            tokens.consume();
            Ok(())
        }
        Some(token) => Err(Diagnostic::new(
            token.line,
            token.column,
            DiagnosticKind::UnexpectedToken { expected: TokenType::Comma.describe(), actual: token.token_type.describe() },
        )),
        None => Err(Diagnostic::new(
            instruction_line,
            0,
            DiagnosticKind::TooFewArguments { required: 1, provided: 0 },
        )),
    }
}

fn parse_argument(tokens: &mut TokenStream, slot_type: ArgumentType) -> Result<Argument, Diagnostic> {
    let token = match tokens.consume() {
        Some(token) => token,
        None => {
            return Err(Diagnostic::new(0, 0, DiagnosticKind::TooFewArguments { required: 1, provided: 0 }));
        }
    };

    match slot_type {
        ArgumentType::IntRegister => match (token.token_type, &token.hint) {
            (TokenType::RegisterInt, Some(Hint::Register(id))) => Ok(Argument::IntRegister(*id)),
            _ => Err(type_mismatch(&token, ArgumentType::IntRegister)),
        },
        ArgumentType::FloatRegister => match (token.token_type, &token.hint) {
            (TokenType::RegisterFloat, Some(Hint::Register(id))) => Ok(Argument::FloatRegister(*id)),
            _ => Err(type_mismatch(&token, ArgumentType::FloatRegister)),
        },
        ArgumentType::ImmediateInteger => parse_immediate(&token).map(Argument::ImmediateInteger),
        ArgumentType::Label => match token.token_type {
            TokenType::LabelIdentifier => Ok(Argument::Label(token.text)),
            _ => Err(type_mismatch(&token, ArgumentType::Label)),
        },
        ArgumentType::AddressDisplacement => parse_address_displacement(tokens, token),
        ArgumentType::None => Ok(Argument::None),
    }
}

/// Parses a plain immediate slot. Only the `#`-prefixed form is accepted; a
/// bare integer literal is an address-displacement production, not this one.
fn parse_immediate(token: &Token) -> Result<i16, Diagnostic> {
    match (token.token_type, &token.hint) {
        (TokenType::ImmediateInteger, Some(Hint::Integer(value))) => Ok(*value),
        (TokenType::ImmediateInteger, None) => {
            Err(Diagnostic::new(token.line, token.column, DiagnosticKind::InvalidNumber { text: token.text.clone() }))
        }
        _ => Err(type_mismatch(token, ArgumentType::ImmediateInteger)),
    }
}

/// Accepts a `#`-prefixed bare immediate (base defaults to `R0`) or an
/// unprefixed integer literal followed by `(Rn)`; a bare literal with no
/// following base register is not a valid address displacement.
fn parse_address_displacement(tokens: &mut TokenStream, first: Token) -> Result<Argument, Diagnostic> {
    if first.token_type == TokenType::ImmediateInteger {
        let displacement = parse_immediate(&first)?;
        return Ok(Argument::AddressDisplacement { base: 0, displacement });
    }

    let displacement = match (first.token_type, &first.hint) {
        (TokenType::IntegerLiteral, Some(Hint::Integer(value))) => *value,
        (TokenType::IntegerLiteral, None) => {
            return Err(Diagnostic::new(first.line, first.column, DiagnosticKind::InvalidNumber { text: first.text.clone() }));
        }
        _ => return Err(type_mismatch(&first, ArgumentType::AddressDisplacement)),
    };

    if !matches!(tokens.look_ahead(0).map(|t| t.token_type), Some(TokenType::OpenBracket)) {
        return Err(type_mismatch(&first, ArgumentType::AddressDisplacement));
    }

    tokens.consume();
    let base_token = tokens.consume().ok_or_else(|| {
        Diagnostic::new(first.line, first.column, DiagnosticKind::TooFewArgumentsAddressDisplacement)
    })?;
    let base = match (base_token.token_type, &base_token.hint) {
        (TokenType::RegisterInt, Some(Hint::Register(id))) => *id,
        _ => return Err(type_mismatch(&base_token, ArgumentType::IntRegister)),
    };

    match tokens.consume() {
        Some(token) if token.token_type == TokenType::ClosingBracket => Ok(Argument::AddressDisplacement { base, displacement }),
        Some(token) => Err(Diagnostic::new(
            token.line,
            token.column,
            DiagnosticKind::UnexpectedToken { expected: TokenType::ClosingBracket.describe(), actual: token.token_type.describe() },
        )),
        None => Err(Diagnostic::new(first.line, first.column, DiagnosticKind::TooFewArgumentsAddressDisplacement)),
    }
}

fn type_mismatch(token: &Token, expected: ArgumentType) -> Diagnostic {
    Diagnostic::new(
        token.line,
        token.column,
        DiagnosticKind::UnexpectedArgumentType { expected: expected.name(), actual: token.token_type.describe() },
    )
}

/// Advances past whatever is left on the current line so one bad token
/// doesn't cascade into spurious diagnostics on the rest of the line.
fn resync_to_newline(tokens: &mut TokenStream, program: &mut ParsedProgram) {
    while let Some(token) = tokens.look_ahead(0) {
        match token.token_type {
            TokenType::NewLine => {
                tokens.consume();
                return;
            }
            TokenType::Comment => {
                tokens.consume();
            }
            _ => {
                tokens.consume();
            }
        }
    }
    let _ = program;
}

#[cfg(test)]
mod test {
    use super::*;
    use dlx::Opcode;

    #[test]
    fn parses_a_simple_instruction() {
        let program = parse("ADD R1, R2, R3\n");
        assert!(program.is_valid());
        assert_eq!(program.instructions().len(), 1);
        let instr = &program.instructions()[0];
        assert_eq!(instr.opcode, Opcode::ADD);
        assert_eq!(instr.arguments[0], Argument::IntRegister(1));
        assert_eq!(instr.arguments[1], Argument::IntRegister(2));
        assert_eq!(instr.arguments[2], Argument::IntRegister(3));
    }

    #[test]
    fn label_definition_resolves_to_following_instruction() {
        let program = parse("loop: ADDI R1, R1, #1\n");
        assert!(program.is_valid());
        assert_eq!(program.resolve_label("loop"), Some(0));
    }

    #[test]
    fn address_displacement_accepts_hash_prefixed_immediate_with_implicit_r0_base() {
        let program = parse("LW R1, #100\n");
        assert!(program.is_valid());
        assert_eq!(program.instructions()[0].arguments[1], Argument::AddressDisplacement { base: 0, displacement: 100 });
    }

    #[test]
    fn address_displacement_rejects_bare_integer_literal_without_base_register() {
        let program = parse("LW R1, 100\n");
        assert!(!program.is_valid());
        assert!(program
            .diagnostics()
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::UnexpectedArgumentType { .. })));
    }

    #[test]
    fn address_displacement_accepts_explicit_base_register() {
        let program = parse("LW R1, 100(R2)\n");
        assert!(program.is_valid());
        assert_eq!(program.instructions()[0].arguments[1], Argument::AddressDisplacement { base: 2, displacement: 100 });
    }

    #[test]
    fn garbage_line_produces_a_diagnostic() {
        let program = parse("This has errors\n");
        assert!(!program.diagnostics().is_empty());
    }

    #[test]
    fn duplicate_label_is_flagged_with_prior_site() {
        let program = parse("l: ADD R1, R1, R1\nl: NOP\n");
        let diag = program
            .diagnostics()
            .iter()
            .find(|d| matches!(d.kind, DiagnosticKind::LabelAlreadyDefined { .. }))
            .expect("expected a LabelAlreadyDefined diagnostic");
        assert_eq!(diag.line, 2);
        match &diag.kind {
            DiagnosticKind::LabelAlreadyDefined { name, prior_line, prior_column } => {
                assert_eq!(name, "l");
                assert_eq!(*prior_line, 1);
                assert_eq!(*prior_column, 1);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn two_instructions_on_one_line_is_flagged() {
        let program = parse("ADD R1, R1, R1 ADD R1, R1, R1\n");
        assert!(program
            .diagnostics()
            .iter()
            .any(|d| d.kind == DiagnosticKind::OneInstructionPerLine));
    }

    #[test]
    fn label_with_nothing_after_it_is_flagged_empty() {
        let program = parse("loop:\n");
        assert_eq!(
            program.diagnostics()[0].kind,
            DiagnosticKind::EmptyLabel { name: "loop".to_string() }
        );
    }

    #[test]
    fn reserved_word_as_label_is_flagged() {
        let program = parse("ADD: NOP\n");
        assert!(program
            .diagnostics()
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::ReservedIdentifier { .. })));
    }

    #[test]
    fn comment_only_and_blank_lines_are_skipped() {
        let program = parse("; just a comment\n\nNOP\n");
        assert!(program.is_valid());
        assert_eq!(program.instructions().len(), 1);
        assert_eq!(program.instructions()[0].line, 3);
    }
}
