//! # rtoon
//!
//! A parser and encoder for a compact, indentation-sensitive notation that mixes
//! YAML-style nested key/value blocks with CSV-style rows declared under a field
//! schema.
//!
//! ## The Notation
//!
//! ```text
//! name: John                  a scalar field
//! tags: admin,ops             an inline list
//! server:                     a nested block
//!   host: localhost
//! users[2]{id,name}:          a schema block: row count and field list
//!   1,Ada
//!   2,Bob
//! ```
//!
//! - Indentation delimits blocks; two spaces per level is canonical
//! - Bare identifiers match `[A-Za-z_][A-Za-z0-9_.]*`, numbers `[0-9]+(\.[0-9]+)?`
//! - Anything else is written as a quoted string with escapes `\" \\ \n \t \r`
//! - Scalars are kept as literal text: `30` parses to the string `"30"`
//!
//! ## Quick Start
//!
//! ```rust
//! use rtoon::{encode, parse, Value};
//!
//! let doc = parse("users[2]{id,name}:\n  1,Ada\n  2,Bob\n").unwrap();
//!
//! let users = doc.get("users").and_then(Value::as_sequence).unwrap();
//! assert_eq!(users.len(), 2);
//! assert_eq!(users[1].get("name").and_then(Value::as_str), Some("Bob"));
//!
//! assert_eq!(encode(&doc).unwrap(), "users[2]{id,name}:\n  1,Ada\n  2,Bob\n");
//! ```
//!
//! ### Rows With Nested Structure
//!
//! Inside a schema block, lines of the form `key: ...` (or a nested header)
//! attach to the current row:
//!
//! ```rust
//! use rtoon::parse;
//!
//! let input = "\
//! items[1]{users,status}:
//!   users[2]{id,name}:
//!     1,Ada
//!     2,Bob
//!   status: active
//! ";
//! let doc = parse(input).unwrap();
//! let json = serde_json::to_string(&doc).unwrap();
//! assert_eq!(
//!     json,
//!     r#"{"items":[{"users":[{"id":"1","name":"Ada"},{"id":"2","name":"Bob"}],"status":"active"}]}"#
//! );
//! ```
//!
//! ### Building Documents
//!
//! ```rust
//! use rtoon::{encode, rtoon};
//!
//! let doc = rtoon!({
//!     "name": "Alice",
//!     "age": 30,
//!     "tags": ["rust", "parsing"]
//! });
//! assert_eq!(encode(&doc).unwrap(), "age: 30\nname: Alice\ntags: rust,parsing\n");
//! ```
//!
//! ## Round Trips
//!
//! Documents made of scalars, or holding flat arrays of mappings, survive
//! `parse(encode(doc))` unchanged. Deeper documents are reshaped by the first
//! encode (nested fields of a row are written before its scalars, and mappings
//! come back as one-row sequences); after that, further encode/parse cycles are
//! stable.
//!
//! ## Concurrency
//!
//! Every call owns its own tokenizer, parser and output buffer. Nothing is
//! shared between calls, so independent calls may run on any number of threads.

pub mod encoder;
pub mod error;
pub mod lexer;
pub mod macros;
pub mod map;
pub mod options;
pub mod parser;
pub mod token;
pub mod value;

pub use encoder::Encoder;
pub use error::{Error, ErrorKind, Result};
pub use lexer::{tokenize, Lexer};
pub use map::Map;
pub use options::{EncodeOptions, FieldOrder, ParseOptions};
pub use parser::Parser;
pub use token::{Token, TokenKind};
pub use value::Value;

use std::io;

/// Parses notation text into a document with default options.
///
/// The result is always a [`Value::Mapping`].
///
/// # Examples
///
/// ```rust
/// use rtoon::{parse, Value};
///
/// let doc = parse("name: John\nage: 30\n").unwrap();
/// assert_eq!(doc.get("name"), Some(&Value::from("John")));
/// assert_eq!(doc.get("age"), Some(&Value::from("30")));
/// ```
///
/// # Errors
///
/// Returns a lex error for text the tokenizer rejects and a parse error for
/// token sequences that do not form a document. No partial document is returned.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(text: &str) -> Result<Value> {
    parse_with_options(text, &ParseOptions::default())
}

/// Alias for [`parse`].
///
/// # Errors
///
/// See [`parse`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode(text: &str) -> Result<Value> {
    parse(text)
}

/// Parses notation text with custom options.
///
/// # Errors
///
/// See [`parse`]; additionally fails when nesting exceeds `options.max_depth`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_with_options(text: &str, options: &ParseOptions) -> Result<Value> {
    let tokens = tokenize(text)?;
    log::debug!("tokenized {} bytes into {} tokens", text.len(), tokens.len());
    Parser::new(tokens, options).parse_document()
}

/// Encodes a document with default options: sorted keys, sorted tabular fields.
///
/// # Examples
///
/// ```rust
/// use rtoon::{encode, parse};
///
/// let doc = parse("name: John\nage: 30\n").unwrap();
/// assert_eq!(encode(&doc).unwrap(), "age: 30\nname: John\n");
/// ```
///
/// # Errors
///
/// Returns [`Error::RootNotMapping`] if `document` is not a mapping, and
/// [`Error::UnsupportedValue`] for values without a representation.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode(document: &Value) -> Result<String> {
    encode_with_options(document, &EncodeOptions::default())
}

/// Encodes a document with custom options.
///
/// # Examples
///
/// ```rust
/// use rtoon::{encode_with_options, parse, EncodeOptions, FieldOrder};
///
/// let doc = parse("users[1]{name,id}:\n  Ada,1\n").unwrap();
/// let options = EncodeOptions::new().with_field_order(FieldOrder::Preserve);
/// assert_eq!(
///     encode_with_options(&doc, &options).unwrap(),
///     "users[1]{name,id}:\n  Ada,1\n"
/// );
/// ```
///
/// # Errors
///
/// See [`encode`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_with_options(document: &Value, options: &EncodeOptions) -> Result<String> {
    let mut encoder = Encoder::new(options.clone());
    encoder.encode_document(document)?;
    let output = encoder.into_inner();
    log::debug!("encoded document into {} bytes", output.len());
    Ok(output)
}

/// Encodes a document and writes it to `writer`.
///
/// # Examples
///
/// ```rust
/// use rtoon::{parse, to_writer};
///
/// let doc = parse("a: 1\n").unwrap();
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &doc).unwrap();
/// assert_eq!(buffer, b"a: 1\n");
/// ```
///
/// # Errors
///
/// Returns an error if encoding fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W>(mut writer: W, document: &Value) -> Result<()>
where
    W: io::Write,
{
    let text = encode(document)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Reads all of `reader` and parses it.
///
/// # Examples
///
/// ```rust
/// use rtoon::{from_reader, Value};
/// use std::io::Cursor;
///
/// let doc = from_reader(Cursor::new(b"name: John\n")).unwrap();
/// assert_eq!(doc.get("name"), Some(&Value::from("John")));
/// ```
///
/// # Errors
///
/// Returns an error if reading fails (including invalid UTF-8) or the text does not parse.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R>(mut reader: R) -> Result<Value>
where
    R: io::Read,
{
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| Error::io(&e.to_string()))?;
    parse(&text)
}
