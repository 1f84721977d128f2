//! Tokens and the token stream the lexer produces and the parser consumes.

use dlx::Opcode;

/// The lexical category a token was classified into.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum TokenType {
    Comment,
    OpCode,
    LabelIdentifier,
    RegisterInt,
    RegisterFloat,
    RegisterStatus,
    Comma,
    Colon,
    OpenBracket,
    ClosingBracket,
    NewLine,
    ImmediateInteger,
    IntegerLiteral,
}

impl TokenType {
    /// A fixed, human-readable category name, used as the `actual`/`expected`
    /// field of diagnostics that only need to name a token's kind.
    pub fn describe(self) -> &'static str {
        match self {
            TokenType::Comment => "comment",
            TokenType::OpCode => "opcode",
            TokenType::LabelIdentifier => "label identifier",
            TokenType::RegisterInt => "integer register",
            TokenType::RegisterFloat => "float register",
            TokenType::RegisterStatus => "FPSR",
            TokenType::Comma => "comma",
            TokenType::Colon => "colon",
            TokenType::OpenBracket => "'('",
            TokenType::ClosingBracket => "')'",
            TokenType::NewLine => "end of line",
            TokenType::ImmediateInteger => "immediate integer",
            TokenType::IntegerLiteral => "integer literal",
        }
    }
}

/// A pre-resolved value attached to a token so the parser can avoid
/// re-classifying identifiers and re-parsing numbers it already lexed.
#[derive(Clone, PartialEq, Debug)]
pub enum Hint {
    Opcode(Opcode),
    Register(u8),
    Integer(i16),
}

/// One lexical token: its classification, source text, origin, and optional hint.
#[derive(Clone, PartialEq, Debug)]
pub struct Token {
    pub token_type: TokenType,
    pub text: String,
    pub line: u32,
    pub column: u32,
    pub hint: Option<Hint>,
}

impl Token {
    pub fn new(token_type: TokenType, text: String, line: u32, column: u32, hint: Option<Hint>) -> Self {
        Self { token_type, text, line, column, hint }
    }
}

/// A value-typed container over the lexed tokens with an index cursor.
///
/// Not a generator: every token is materialized up front by the lexer, and
/// the parser drives its own cursor over them via `consume`/`look_ahead`.
#[derive(Clone, Debug, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
    cursor: usize,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn reached_end(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    pub fn has_x_more(&self, n: usize) -> bool {
        self.tokens.len().saturating_sub(self.cursor) >= n
    }

    /// Returns the token under the cursor and advances past it.
    pub fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).cloned();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    /// Peeks `offset` tokens ahead of the cursor without consuming anything.
    pub fn look_ahead(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.cursor + offset)
    }

    pub fn skip(&mut self, n: usize) {
        self.cursor = (self.cursor + n).min(self.tokens.len());
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn find_by_type(&self, token_type: TokenType) -> Option<&Token> {
        self.tokens[self.cursor..].iter().find(|t| t.token_type == token_type)
    }

    pub fn find_by<F: Fn(&Token) -> bool>(&self, predicate: F) -> Option<&Token> {
        self.tokens[self.cursor..].iter().find(|t| predicate(t))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> TokenStream {
        let mut stream = TokenStream::new();
        stream.push(Token::new(TokenType::OpCode, "ADD".to_string(), 1, 1, None));
        stream.push(Token::new(TokenType::NewLine, "\n".to_string(), 1, 4, None));
        stream
    }

    #[test]
    fn consume_advances_cursor_and_returns_in_order() {
        let mut stream = sample();
        assert_eq!(stream.consume().unwrap().token_type, TokenType::OpCode);
        assert_eq!(stream.consume().unwrap().token_type, TokenType::NewLine);
        assert!(stream.consume().is_none());
        assert!(stream.reached_end());
    }

    #[test]
    fn look_ahead_does_not_advance() {
        let stream = sample();
        assert_eq!(stream.look_ahead(0).unwrap().token_type, TokenType::OpCode);
        assert_eq!(stream.look_ahead(1).unwrap().token_type, TokenType::NewLine);
        assert!(stream.look_ahead(2).is_none());
    }

    #[test]
    fn has_x_more_counts_remaining_tokens() {
        let mut stream = sample();
        assert!(stream.has_x_more(2));
        assert!(!stream.has_x_more(3));
        stream.consume();
        assert!(!stream.has_x_more(2));
        assert!(stream.has_x_more(1));
    }

    #[test]
    fn reset_returns_cursor_to_start() {
        let mut stream = sample();
        stream.consume();
        stream.reset();
        assert_eq!(stream.look_ahead(0).unwrap().token_type, TokenType::OpCode);
    }

    #[test]
    fn find_by_type_searches_from_the_cursor() {
        let mut stream = sample();
        stream.consume();
        assert!(stream.find_by_type(TokenType::OpCode).is_none());
        assert!(stream.find_by_type(TokenType::NewLine).is_some());
    }
}
