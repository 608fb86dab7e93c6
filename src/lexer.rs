//! Tokenizer.
//!
//! The [`Lexer`] walks the source line by line. Layout is turned into tokens:
//! every non-blank line ends in a `NewLine`, a line indented deeper than the
//! current block opens it with an `Indent`, and a shallower line closes one
//! `Dedent` per block it leaves. Blank and whitespace-only lines produce nothing.
//!
//! The indent stack starts as `[0]`. A deeper width is pushed; a shallower
//! width must equal some entry already on the stack, otherwise the line is
//! rejected with [`Error::InconsistentIndent`]. At end of input every level
//! still open is closed with a `Dedent`.
//!
//! ```rust
//! use rtoon::{tokenize, TokenKind};
//!
//! let kinds: Vec<_> = tokenize("a:\n  b: 1\n")
//!     .unwrap()
//!     .into_iter()
//!     .map(|t| t.kind)
//!     .collect();
//! assert_eq!(
//!     kinds,
//!     vec![
//!         TokenKind::Identifier,
//!         TokenKind::Colon,
//!         TokenKind::NewLine,
//!         TokenKind::Indent,
//!         TokenKind::Identifier,
//!         TokenKind::Colon,
//!         TokenKind::Number,
//!         TokenKind::NewLine,
//!         TokenKind::Dedent,
//!     ]
//! );
//! ```

use crate::token::{Token, TokenKind};
use crate::{Error, Result};

/// Streaming tokenizer over a complete source text.
///
/// Yields `Result<Token>`; the first error ends the stream.
pub struct Lexer<'a> {
    lines: Vec<&'a str>,
    line_index: usize,
    position: usize,            // Byte offset into the current line
    at_line_start: bool,        // Indentation of the current line not yet measured
    indent_stack: Vec<usize>,   // Widths of the currently open blocks
    pending_dedents: usize,     // Dedents owed from a multi-level dedent
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let lines = input
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        Lexer {
            lines,
            line_index: 0,
            position: 0,
            at_line_start: true,
            indent_stack: vec![0],
            pending_dedents: 0,
            finished: false,
        }
    }

    /// Widths of the currently open blocks, outermost first.
    #[must_use]
    pub fn indent_stack(&self) -> &[usize] {
        &self.indent_stack
    }

    /// 1-based number of the line being scanned.
    #[inline]
    fn line_number(&self) -> usize {
        self.line_index + 1
    }

    /// 1-based character column of the current position.
    #[inline]
    fn column(&self) -> usize {
        self.current_line()
            .map(|line| line[..self.position].chars().count() + 1)
            .unwrap_or(1)
    }

    #[inline]
    fn current_line(&self) -> Option<&'a str> {
        self.lines.get(self.line_index).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.current_line()
            .and_then(|line| line[self.position..].chars().next())
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn advance_line(&mut self) {
        self.line_index += 1;
        self.position = 0;
        self.at_line_start = true;
    }

    fn token(&self, kind: TokenKind, lexeme: impl Into<String>, column: usize) -> Token {
        Token::new(kind, lexeme, self.line_number(), column)
    }

    /// Produces the next token, or `None` once the input and all open blocks are exhausted.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        if self.pending_dedents > 0 {
            self.pending_dedents -= 1;
            self.indent_stack.pop();
            let column = self.column();
            return Ok(Some(self.token(TokenKind::Dedent, "", column)));
        }

        if self.at_line_start {
            while let Some(line) = self.current_line() {
                if line.trim().is_empty() {
                    self.advance_line();
                } else {
                    break;
                }
            }

            let Some(line) = self.current_line() else {
                return Ok(self.close_remaining_blocks());
            };

            self.at_line_start = false;
            if let Some(token) = self.measure_indent(line)? {
                return Ok(Some(token));
            }
        }

        self.skip_whitespace_same_line();

        let column = self.column();
        let Some(ch) = self.peek_char() else {
            let token = self.token(TokenKind::NewLine, "\n", column);
            self.advance_line();
            return Ok(Some(token));
        };

        let single = match ch {
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            ':' => Some(TokenKind::Colon),
            ',' => Some(TokenKind::Comma),
            _ => None,
        };
        if let Some(kind) = single {
            self.next_char();
            return Ok(Some(self.token(kind, ch.to_string(), column)));
        }

        let token = match ch {
            '0'..='9' => self.scan_number(column),
            '"' => self.scan_quoted(column)?,
            c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(column),
            other => {
                return Err(Error::UnexpectedChar {
                    line: self.line_number(),
                    col: column,
                    ch: other,
                })
            }
        };
        Ok(Some(token))
    }

    /// Compares the width of a fresh line against the indent stack.
    fn measure_indent(&mut self, line: &'a str) -> Result<Option<Token>> {
        let width = line
            .bytes()
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();
        self.position = width;
        let column = width + 1;
        let top = self.indent_stack.last().copied().unwrap_or(0);

        if width > top {
            self.indent_stack.push(width);
            return Ok(Some(self.token(TokenKind::Indent, "", column)));
        }

        if width < top {
            let mut depth = self.indent_stack.len();
            let mut pops = 0;
            while depth > 1 && self.indent_stack[depth - 1] > width {
                depth -= 1;
                pops += 1;
            }
            if self.indent_stack[depth - 1] != width {
                return Err(Error::inconsistent_indent(self.line_number(), width, line));
            }

            self.indent_stack.pop();
            self.pending_dedents = pops - 1;
            return Ok(Some(self.token(TokenKind::Dedent, "", column)));
        }

        Ok(None)
    }

    /// Emits one `Dedent` per block still open at end of input.
    fn close_remaining_blocks(&mut self) -> Option<Token> {
        if self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            Some(Token::new(TokenKind::Dedent, "", self.line_number(), 1))
        } else {
            None
        }
    }

    fn skip_whitespace_same_line(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch == ' ' || ch == '\t' {
                self.next_char();
            } else {
                break;
            }
        }
    }

    /// Digits with an optional fractional part. A `.` not followed by a digit is left alone.
    fn scan_number(&mut self, column: usize) -> Token {
        let line = self.current_line().unwrap_or_default();
        let bytes = line.as_bytes();
        let start = self.position;
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
            end += 1;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
        }
        self.position = end;
        self.token(TokenKind::Number, &line[start..end], column)
    }

    fn scan_identifier(&mut self, column: usize) -> Token {
        let line = self.current_line().unwrap_or_default();
        let start = self.position;
        let end = line[start..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
            .map_or(line.len(), |offset| start + offset);
        self.position = end;
        self.token(TokenKind::Identifier, &line[start..end], column)
    }

    fn scan_quoted(&mut self, column: usize) -> Result<Token> {
        self.next_char(); // consume opening quote
        let mut result = String::new();

        while let Some(ch) = self.next_char() {
            match ch {
                '"' => return Ok(self.token(TokenKind::Identifier, result, column)),
                '\\' => match self.next_char() {
                    Some('"') => result.push('"'),
                    Some('\\') => result.push('\\'),
                    Some('n') => result.push('\n'),
                    Some('t') => result.push('\t'),
                    Some('r') => result.push('\r'),
                    Some(other) => {
                        // Unknown escape - preserved literally
                        result.push('\\');
                        result.push(other);
                    }
                    None => {
                        return Err(Error::UnterminatedEscape {
                            line: self.line_number(),
                            col: self.column(),
                        })
                    }
                },
                other => result.push(other),
            }
        }

        Err(Error::UnterminatedString {
            line: self.line_number(),
            col: column,
        })
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Tokenizes a complete source text.
///
/// # Errors
///
/// Returns the first lexical error encountered.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    Lexer::new(input).collect()
}
