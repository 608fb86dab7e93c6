//! Tokens produced by the [`Lexer`](crate::Lexer).

use std::fmt;

/// Token kinds. `Indent`, `Dedent` and `NewLine` are synthesized from the layout
/// of the source; the rest correspond to characters in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Indent,
    Dedent,
    NewLine,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Colon,
    Comma,
    Number,
    /// A bare word or a double-quoted string. The lexeme of a quoted identifier
    /// holds its unescaped contents, without the quotes.
    Identifier,
}

impl TokenKind {
    /// `true` for the kinds that can stand as a scalar value.
    #[inline]
    #[must_use]
    pub const fn is_value(self) -> bool {
        matches!(self, TokenKind::Number | TokenKind::Identifier)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Indent => "indent",
            TokenKind::Dedent => "dedent",
            TokenKind::NewLine => "end of line",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Number => "number",
            TokenKind::Identifier => "identifier",
        };
        f.write_str(s)
    }
}

/// A single token with its kind, text, and 1-based source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }

    /// Description used in error messages, e.g. `identifier "name"`.
    pub(crate) fn describe(&self) -> String {
        match self.kind {
            TokenKind::Number | TokenKind::Identifier => {
                format!("{} {:?}", self.kind, self.lexeme)
            }
            _ => self.kind.to_string(),
        }
    }
}
