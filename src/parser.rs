//! Indentation-driven parser.
//!
//! The [`Parser`] consumes the token stream of a [`Lexer`](crate::Lexer) and
//! builds the document tree. Each indentation level holds a list of entries:
//!
//! ```text
//! name: John                  plain field, scalar value
//! tags: a,b,c                 plain field, inline list
//! server:                     nested block
//!   host: localhost
//! users[2]{id,name}:          schema block with a declared row count
//!   1,Ada
//!   2,Bob
//! ids[]{id}:                  schema block with any number of rows
//!   7
//! config{host,port}:          schema block with exactly one row
//!   localhost,8080
//! ```
//!
//! Inside a schema block a line that starts with a key followed by `:`, `[` or
//! `{` is an entry of the current row rather than a row of its own. This is how
//! rows carry nested structure:
//!
//! ```text
//! items[1]{users,status}:
//!   users[2]{id,name}:
//!     1,Ada
//!     2,Bob
//!   status: active
//! ```
//!
//! An entry line whose key the current row already holds starts the next row.
//!
//! Recursion depth follows the nesting depth of the input and is capped by
//! [`ParseOptions::max_depth`].

use crate::token::{Token, TokenKind};
use crate::{Error, Map, ParseOptions, Result, Value};

/// Parses a token stream into a document.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    max_depth: usize,
}

/// Header of a schema block: `name[size]{fields}:`.
struct SchemaHeader {
    /// `[...]` was present, with or without a count
    bracketed: bool,
    declared_size: Option<usize>,
    fields: Vec<String>,
}

/// A row under construction inside a schema block.
struct OpenRow {
    entries: Map,
    line: usize,
    col: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, options: &ParseOptions) -> Self {
        Parser {
            tokens,
            position: 0,
            max_depth: options.max_depth,
        }
    }

    /// Parses the whole token stream as a document. The root is always a mapping.
    ///
    /// # Errors
    ///
    /// Returns a parse error for the first token that does not fit the grammar.
    pub fn parse_document(mut self) -> Result<Value> {
        let map = self.parse_block(0)?;
        match self.peek() {
            None => Ok(Value::Mapping(map)),
            Some(token) => Err(self.unexpected(token, "a key")),
        }
    }

    #[inline]
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    #[inline]
    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    #[inline]
    fn peek_kind_at(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.get(self.position + offset).map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Consumes a token of `kind` or fails with an unexpected-token error.
    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token> {
        if self.peek_kind() != Some(kind) {
            return Err(self.error_here(expected));
        }
        self.advance().ok_or_else(|| self.unexpected_end(expected))
    }

    /// Unexpected-token error for the upcoming token, or for end of input.
    fn error_here(&self, expected: &str) -> Error {
        match self.peek() {
            Some(token) => self.unexpected(token, expected),
            None => self.unexpected_end(expected),
        }
    }

    fn unexpected(&self, token: &Token, expected: &str) -> Error {
        Error::unexpected_token(token.line, token.column, &token.describe(), expected)
    }

    fn unexpected_end(&self, expected: &str) -> Error {
        let (line, col) = self
            .tokens
            .last()
            .map_or((1, 1), |t| (t.line + 1, 1));
        Error::unexpected_token(line, col, "end of input", expected)
    }

    /// Fails if entering a block at `depth` would exceed the configured limit.
    fn check_depth(&self, depth: usize, at: &Token) -> Result<()> {
        if depth > self.max_depth {
            return Err(Error::DepthLimitExceeded {
                line: at.line,
                col: at.column,
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    /// `true` when the upcoming tokens start an entry (`key:`, `key[`, `key{`).
    fn at_entry(&self) -> bool {
        self.peek_kind() == Some(TokenKind::Identifier)
            && matches!(
                self.peek_kind_at(1),
                Some(TokenKind::Colon | TokenKind::LBracket | TokenKind::LBrace)
            )
    }

    /// Parses the entries of one indentation level into a mapping.
    ///
    /// Stops before the `Dedent` closing the level (or at end of input); the
    /// caller consumes it.
    fn parse_block(&mut self, depth: usize) -> Result<Map> {
        let mut map = Map::new();

        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Dedent => break,
                TokenKind::Identifier => {
                    let key_token = token.clone();
                    let (key, value) = self.parse_entry(depth)?;
                    if map.contains_key(&key) {
                        return Err(Error::DuplicateKey {
                            line: key_token.line,
                            col: key_token.column,
                            key,
                        });
                    }
                    map.insert(key, value);
                }
                _ => return Err(self.unexpected(token, "a key")),
            }
        }

        Ok(map)
    }

    /// Parses one entry starting at its key, through the end of its line and any block it owns.
    fn parse_entry(&mut self, depth: usize) -> Result<(String, Value)> {
        let key_token = self.expect(TokenKind::Identifier, "a key")?;

        let value = match self.peek_kind() {
            Some(TokenKind::Colon) => {
                self.advance();
                self.parse_field_value(depth)?
            }
            Some(TokenKind::LBracket | TokenKind::LBrace) => {
                self.parse_schema_block(&key_token, depth)?
            }
            _ => return Err(self.error_here("':', '[' or '{'")),
        };

        Ok((key_token.lexeme, value))
    }

    /// Everything after `key:`: an inline value, a nested block, or nothing.
    fn parse_field_value(&mut self, depth: usize) -> Result<Value> {
        match self.peek_kind() {
            Some(TokenKind::NewLine) => {
                self.advance();
                if self.peek_kind() == Some(TokenKind::Indent) {
                    let indent = self.expect(TokenKind::Indent, "indent")?;
                    self.check_depth(depth + 1, &indent)?;
                    let map = self.parse_block(depth + 1)?;
                    self.expect(TokenKind::Dedent, "end of block")?;
                    Ok(Value::Mapping(map))
                } else {
                    Ok(Value::Scalar(String::new()))
                }
            }
            Some(kind) if kind.is_value() || kind == TokenKind::Comma => {
                let mut cells = self.parse_cells()?;
                self.expect(TokenKind::NewLine, "',' or end of line")?;
                if cells.len() == 1 {
                    Ok(Value::Scalar(cells.remove(0)))
                } else {
                    Ok(Value::Sequence(cells.into_iter().map(Value::Scalar).collect()))
                }
            }
            _ => Err(self.error_here("a value or end of line")),
        }
    }

    /// Comma-separated scalar cells up to (not including) the end of the line.
    /// A missing cell between commas is empty text.
    fn parse_cells(&mut self) -> Result<Vec<String>> {
        let mut cells = Vec::new();
        loop {
            match self.peek_kind() {
                Some(kind) if kind.is_value() => {
                    let token = self.advance().ok_or_else(|| self.unexpected_end("a value"))?;
                    cells.push(token.lexeme);
                }
                _ => cells.push(String::new()),
            }

            if self.peek_kind() == Some(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        Ok(cells)
    }

    /// `[size]{fields}:` followed by the end of the line.
    fn parse_schema_header(&mut self) -> Result<SchemaHeader> {
        let mut declared_size = None;
        let bracketed = self.peek_kind() == Some(TokenKind::LBracket);
        if bracketed {
            self.advance();
            if self.peek_kind() == Some(TokenKind::Number) {
                let token = self.expect(TokenKind::Number, "a row count")?;
                let size = token
                    .lexeme
                    .parse::<usize>()
                    .map_err(|_| self.unexpected(&token, "a whole row count"))?;
                declared_size = Some(size);
            }
            self.expect(TokenKind::RBracket, "']'")?;
        }

        self.expect(TokenKind::LBrace, "'{'")?;
        let mut fields: Vec<String> = Vec::new();
        if self.peek_kind() != Some(TokenKind::RBrace) {
            loop {
                let field = self.expect(TokenKind::Identifier, "a field name")?;
                if fields.contains(&field.lexeme) {
                    return Err(Error::DuplicateKey {
                        line: field.line,
                        col: field.column,
                        key: field.lexeme,
                    });
                }
                fields.push(field.lexeme);

                if self.peek_kind() == Some(TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBrace, "',' or '}'")?;
        self.expect(TokenKind::Colon, "':'")?;
        self.expect(TokenKind::NewLine, "end of line")?;

        Ok(SchemaHeader {
            bracketed,
            declared_size,
            fields,
        })
    }

    /// A schema header and the rows indented beneath it.
    ///
    /// `key[N]{...}:` yields a sequence whose length must equal `N`, and
    /// `key[]{...}:` a sequence of however many rows follow. The bracketless
    /// `key{...}:` yields a one-row sequence, or an empty mapping when no rows
    /// follow.
    fn parse_schema_block(&mut self, key: &Token, depth: usize) -> Result<Value> {
        let header = self.parse_schema_header()?;
        let expected = match (header.bracketed, header.declared_size) {
            (true, size) => size,
            (false, _) => Some(1),
        };

        if self.peek_kind() != Some(TokenKind::Indent) {
            if !header.bracketed {
                return Ok(Value::Mapping(Map::new()));
            }
            return match expected {
                None | Some(0) => Ok(Value::Sequence(Vec::new())),
                Some(declared) => Err(Error::SizeMismatch {
                    line: key.line,
                    col: key.column,
                    name: key.lexeme.clone(),
                    declared,
                    found: 0,
                }),
            };
        }

        let indent = self.expect(TokenKind::Indent, "indent")?;
        self.check_depth(depth + 1, &indent)?;
        let rows = self.parse_rows(&header.fields, depth + 1)?;
        self.expect(TokenKind::Dedent, "end of block")?;

        if let Some(declared) = expected {
            if rows.len() != declared {
                return Err(Error::SizeMismatch {
                    line: key.line,
                    col: key.column,
                    name: key.lexeme.clone(),
                    declared,
                    found: rows.len(),
                });
            }
        }

        log::trace!("decoded {} rows for {:?}", rows.len(), key.lexeme);
        Ok(Value::Sequence(rows.into_iter().map(Value::Mapping).collect()))
    }

    /// Rows of a schema block, up to the `Dedent` that closes it.
    fn parse_rows(&mut self, fields: &[String], depth: usize) -> Result<Vec<Map>> {
        let mut rows = Vec::new();
        let mut open: Option<OpenRow> = None;

        while let Some(token) = self.peek() {
            if token.kind == TokenKind::Dedent {
                break;
            }
            let start = token.clone();

            if self.at_entry() {
                let (key, value) = self.parse_entry(depth)?;
                let starts_new_row = open
                    .as_ref()
                    .map_or(true, |row| row.entries.contains_key(&key));
                if starts_new_row {
                    if let Some(row) = open.take() {
                        rows.push(Self::close_row(row, fields)?);
                    }
                    open = Some(OpenRow {
                        entries: Map::new(),
                        line: start.line,
                        col: start.column,
                    });
                }
                if let Some(row) = open.as_mut() {
                    row.entries.insert(key, value);
                }
            } else if start.kind.is_value() || start.kind == TokenKind::Comma {
                if let Some(row) = open.take() {
                    rows.push(Self::close_row(row, fields)?);
                }
                let cells = self.parse_cells()?;
                self.expect(TokenKind::NewLine, "',' or end of line")?;
                if cells.len() != fields.len() {
                    return Err(Error::ArityMismatch {
                        line: start.line,
                        col: start.column,
                        expected: fields.len(),
                        found: cells.len(),
                    });
                }
                open = Some(OpenRow {
                    entries: fields
                        .iter()
                        .cloned()
                        .zip(cells.into_iter().map(Value::Scalar))
                        .collect(),
                    line: start.line,
                    col: start.column,
                });
            } else {
                return Err(self.unexpected(&start, "a row or an entry"));
            }
        }

        if let Some(row) = open.take() {
            rows.push(Self::close_row(row, fields)?);
        }
        Ok(rows)
    }

    /// Checks that a finished row assigns every header field.
    fn close_row(row: OpenRow, fields: &[String]) -> Result<Map> {
        if let Some(missing) = fields.iter().find(|f| !row.entries.contains_key(f)) {
            return Err(Error::MissingField {
                line: row.line,
                col: row.col,
                field: missing.clone(),
            });
        }
        Ok(row.entries)
    }
}
