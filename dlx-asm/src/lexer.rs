//! Turns DLX assembly source text into a `TokenStream`.
//!
//! A deterministic single-pass scan, grounded on the classification rules
//! laid out by the data model: whitespace runs are skipped, line feeds emit
//! `NewLine`, `;`/`/` start a comment that runs to the next line feed,
//! single-character punctuation becomes its own token, `#` and digit/sign
//! runs become immediates/integer literals, and identifier runs are
//! classified into opcode, register, or label tokens.

use crate::identifier::{float_register_id, int_register_id};
use crate::number::parse_number;
use crate::token::{Hint, Token, TokenStream, TokenType};
use dlx::Opcode;
use util::EnumFromStr;

struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
}

impl Cursor {
    fn new(text: &str) -> Self {
        Self { chars: text.chars().collect(), pos: 0, line: 1, column: 1 }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }
}

fn is_number_run_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '\'' || c == '+' || c == '-'
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Classifies and tokenizes `text`. Never fails: malformed lexemes become
/// tokens the parser will reject rather than an error here.
pub fn tokenize(text: &str) -> TokenStream {
    let mut cursor = Cursor::new(text);
    let mut stream = TokenStream::new();

    while let Some(c) = cursor.peek() {
        match c {
            ' ' | '\t' | '\x0B' => {
                cursor.advance();
            }
            '\n' => {
                let (line, column) = (cursor.line, cursor.column);
                cursor.advance();
                stream.push(Token::new(TokenType::NewLine, "\n".to_string(), line, column, None));
            }
            ';' | '/' => {
                let (line, column) = (cursor.line, cursor.column);
                let mut text = String::new();
                while let Some(c) = cursor.peek() {
                    if c == '\n' {
                        break;
                    }
                    text.push(c);
                    cursor.advance();
                }
                stream.push(Token::new(TokenType::Comment, text, line, column, None));
            }
            ',' => push_punct(&mut cursor, &mut stream, TokenType::Comma, ","),
            ':' => push_punct(&mut cursor, &mut stream, TokenType::Colon, ":"),
            '(' => push_punct(&mut cursor, &mut stream, TokenType::OpenBracket, "("),
            ')' => push_punct(&mut cursor, &mut stream, TokenType::ClosingBracket, ")"),
            '#' => {
                let (line, column) = (cursor.line, cursor.column);
                cursor.advance();
                let mut run = String::new();
                while let Some(c) = cursor.peek() {
                    if !is_number_run_char(c) {
                        break;
                    }
                    run.push(c);
                    cursor.advance();
                }
                let hint = parse_number(&run).map(Hint::Integer);
                stream.push(Token::new(
                    TokenType::ImmediateInteger,
                    format!("#{run}"),
                    line,
                    column,
                    hint,
                ));
            }
            c if c.is_ascii_digit() || ((c == '+' || c == '-') && cursor.peek_at(1).is_some_and(|n| n.is_ascii_digit())) => {
                let (line, column) = (cursor.line, cursor.column);
                let mut run = String::new();
                while let Some(c) = cursor.peek() {
                    if !is_number_run_char(c) {
                        break;
                    }
                    run.push(c);
                    cursor.advance();
                }
                let hint = parse_number(&run).map(Hint::Integer);
                stream.push(Token::new(TokenType::IntegerLiteral, run, line, column, hint));
            }
            c if is_identifier_start(c) => {
                let (line, column) = (cursor.line, cursor.column);
                let mut run = String::new();
                while let Some(c) = cursor.peek() {
                    if !is_identifier_char(c) {
                        break;
                    }
                    run.push(c);
                    cursor.advance();
                }
                let upper = run.to_ascii_uppercase();

                let (mut token_type, mut hint) = if let Ok(opcode) = Opcode::from_str(&upper) {
                    (TokenType::OpCode, Some(Hint::Opcode(opcode)))
                } else if let Some(id) = int_register_id(&upper) {
                    (TokenType::RegisterInt, Some(Hint::Register(id)))
                } else if let Some(id) = float_register_id(&upper) {
                    (TokenType::RegisterFloat, Some(Hint::Register(id)))
                } else if upper == "FPSR" {
                    (TokenType::RegisterStatus, None)
                } else {
                    (TokenType::LabelIdentifier, None)
                };

                let mut text = run;
                if cursor.peek() == Some(':') {
                    cursor.advance();
                    text.push(':');
                    token_type = TokenType::LabelIdentifier;
                    hint = None;
                }

                stream.push(Token::new(token_type, text, line, column, hint));
            }
            _ => {
                // Unrecognized character: consume it as a single-character
                // label identifier so the parser can reject it by name
                // rather than the lexer silently dropping input.
                let (line, column) = (cursor.line, cursor.column);
                let mut text = String::new();
                text.push(c);
                cursor.advance();
                stream.push(Token::new(TokenType::LabelIdentifier, text, line, column, None));
            }
        }
    }

    stream
}

fn push_punct(cursor: &mut Cursor, stream: &mut TokenStream, token_type: TokenType, text: &str) {
    let (line, column) = (cursor.line, cursor.column);
    cursor.advance();
    stream.push(Token::new(token_type, text.to_string(), line, column, None));
}

#[cfg(test)]
mod test {
    use super::*;

    fn types(stream: &TokenStream) -> Vec<TokenType> {
        let mut clone = stream.clone();
        let mut result = Vec::new();
        while let Some(tok) = clone.consume() {
            result.push(tok.token_type);
        }
        result
    }

    #[test]
    fn whitespace_runs_are_skipped() {
        let stream = tokenize("\t  \x0B\tADD\t  \x0B");
        assert_eq!(types(&stream), vec![TokenType::OpCode]);
    }

    #[test]
    fn newlines_each_emit_one_token() {
        let stream = tokenize("\n\n");
        assert_eq!(types(&stream), vec![TokenType::NewLine, TokenType::NewLine]);
    }

    #[test]
    fn comments_run_to_end_of_line() {
        let stream = tokenize("ADD ; trailing comment\nNOP");
        let mut stream = stream;
        let first = stream.consume().unwrap();
        assert_eq!(first.token_type, TokenType::OpCode);
        let comment = stream.consume().unwrap();
        assert_eq!(comment.token_type, TokenType::Comment);
        assert_eq!(comment.text, "; trailing comment");
    }

    #[test]
    fn label_definition_glues_colon_onto_identifier() {
        let mut stream = tokenize("loop: ADD");
        let label = stream.consume().unwrap();
        assert_eq!(label.token_type, TokenType::LabelIdentifier);
        assert_eq!(label.text, "loop:");
    }

    #[test]
    fn reserved_word_followed_by_colon_is_still_a_label_identifier_token() {
        let mut stream = tokenize("ADD: NOP");
        let label = stream.consume().unwrap();
        assert_eq!(label.token_type, TokenType::LabelIdentifier);
        assert_eq!(label.text, "ADD:");
    }

    #[test]
    fn bare_colon_with_no_identifier_stays_standalone() {
        let mut stream = tokenize(":");
        assert_eq!(stream.consume().unwrap().token_type, TokenType::Colon);
    }

    #[test]
    fn registers_and_status_register_are_classified() {
        let mut stream = tokenize("R5 f12 fpsr");
        let r = stream.consume().unwrap();
        assert_eq!(r.token_type, TokenType::RegisterInt);
        assert_eq!(r.hint, Some(Hint::Register(5)));
        let f = stream.consume().unwrap();
        assert_eq!(f.token_type, TokenType::RegisterFloat);
        assert_eq!(f.hint, Some(Hint::Register(12)));
        let s = stream.consume().unwrap();
        assert_eq!(s.token_type, TokenType::RegisterStatus);
    }

    #[test]
    fn immediate_integer_carries_parsed_hint() {
        let mut stream = tokenize("#42");
        let tok = stream.consume().unwrap();
        assert_eq!(tok.token_type, TokenType::ImmediateInteger);
        assert_eq!(tok.text, "#42");
        assert_eq!(tok.hint, Some(Hint::Integer(42)));
    }

    #[test]
    fn unrecognized_numeric_literal_keeps_text_but_drops_hint() {
        let mut stream = tokenize("#99999");
        let tok = stream.consume().unwrap();
        assert_eq!(tok.token_type, TokenType::ImmediateInteger);
        assert_eq!(tok.hint, None);
    }

    #[test]
    fn plain_identifier_is_a_label_identifier() {
        let mut stream = tokenize("loop");
        let tok = stream.consume().unwrap();
        assert_eq!(tok.token_type, TokenType::LabelIdentifier);
        assert_eq!(tok.text, "loop");
    }
}
