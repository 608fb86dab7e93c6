//! Encoder.
//!
//! The [`Encoder`] walks a document and writes canonical notation text. For each
//! key it picks one of these forms:
//!
//! - **Scalar**: `key: value`
//! - **Sequence of scalars**: `key: v1,v2,...`
//! - **Sequence of flat mappings**: `key[N]{f1,f2}:` followed by one row per element
//! - **Sequence of mappings with nested values**: `key[N]{f1,f2}:` followed, for each
//!   element, by its nested fields as sub-blocks and then its scalar fields as
//!   `field: value` lines
//! - **Mapping**: `key{fields}:` followed by its scalar fields, then its nested blocks
//!
//! Nested content of a row is always written before that row's scalar fields,
//! whatever order the input had. Parsing the output therefore reproduces flat
//! documents exactly, while deeper documents settle into a fixed point after one
//! encode/parse cycle.
//!
//! Scalars that would not read back as a single bare token are quoted. Keys are
//! never quoted; keys that are not identifiers are rewritten into identifiers,
//! and two keys of one mapping that rewrite to the same identifier are an error.
//!
//! ```rust
//! use rtoon::{encode, parse};
//!
//! let doc = parse("users[2]{name,id}:\n  Ada,1\n  Bob,2\n").unwrap();
//! assert_eq!(encode(&doc).unwrap(), "users[2]{id,name}:\n  1,Ada\n  2,Bob\n");
//! ```

use crate::options::{EncodeOptions, FieldOrder};
use crate::{Error, Map, Result, Value};
use std::borrow::Cow;
use std::collections::HashMap;

/// The notation encoder.
///
/// Created via [`Encoder::new`]; output is collected with [`Encoder::into_inner`].
pub struct Encoder {
    output: String,
    options: EncodeOptions,
}

impl Encoder {
    pub fn new(options: EncodeOptions) -> Self {
        Encoder {
            output: String::with_capacity(256),
            options,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    /// Encodes a whole document. The output always ends in a line break.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RootNotMapping`] when `document` is not a mapping, and
    /// [`Error::UnsupportedValue`] for values the notation cannot express.
    pub fn encode_document(&mut self, document: &Value) -> Result<()> {
        let map = match document {
            Value::Mapping(map) => map,
            other => {
                return Err(Error::RootNotMapping {
                    found: other.type_name().to_string(),
                })
            }
        };

        distinct_idents(map.keys().map(String::as_str))?;
        for (key, value) in self.ordered(map) {
            self.encode_entry(key, value, 0)?;
        }

        if self.output.is_empty() {
            self.output.push('\n');
        }
        Ok(())
    }

    /// Entries of `map` in the configured key order.
    fn ordered<'m>(&self, map: &'m Map) -> Vec<(&'m String, &'m Value)> {
        let mut entries: Vec<_> = map.iter().collect();
        if self.options.sort_keys {
            entries.sort_by(|a, b| a.0.cmp(b.0));
        }
        entries
    }

    fn write_line(&mut self, level: usize, text: &str) {
        for _ in 0..level * self.options.indent {
            self.output.push(' ');
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn encode_entry(&mut self, key: &str, value: &Value, level: usize) -> Result<()> {
        match value {
            Value::Mapping(map) => self.encode_mapping(key, map, level),
            Value::Sequence(rows) if value.is_table() => self.encode_table(key, rows, level),
            _ => self.encode_field(key, value, level),
        }
    }

    /// `key: value` for a scalar or an inline list of scalars.
    fn encode_field(&mut self, key: &str, value: &Value, level: usize) -> Result<()> {
        let text = match value {
            Value::Scalar(s) => format_scalar(s).into_owned(),
            Value::Sequence(items) => inline_list(key, items)?,
            Value::Mapping(_) => {
                return Err(Error::unsupported_value(key, "a mapping has no inline form"))
            }
        };
        self.write_line(level, &format!("{}: {}", emit_ident(key), text));
        Ok(())
    }

    /// A sequence whose every element is a mapping.
    fn encode_table(&mut self, key: &str, rows: &[Value], level: usize) -> Result<()> {
        let rows: Vec<&Map> = rows.iter().filter_map(Value::as_mapping).collect();
        let flat = rows.iter().all(|row| row.values().all(Value::is_scalar));

        if flat {
            self.encode_flat_table(key, &rows, level)
        } else {
            self.encode_nested_table(key, &rows, level)
        }
    }

    /// Header plus one comma-separated line per row.
    fn encode_flat_table(&mut self, key: &str, rows: &[&Map], level: usize) -> Result<()> {
        let mut fields = field_union(rows);
        if self.options.field_order == FieldOrder::Sorted {
            fields.sort();
        }
        distinct_idents(fields.iter().map(String::as_str))?;
        if fields.is_empty() && !rows.is_empty() {
            return Err(Error::unsupported_value(
                key,
                "rows without any fields have no tabular form",
            ));
        }

        self.write_line(level, &header(key, Some(rows.len()), &fields));
        for row in rows {
            let cells: Vec<Cow<'_, str>> = fields
                .iter()
                .map(|field| match row.get(field) {
                    Some(Value::Scalar(s)) => format_scalar(s),
                    _ => Cow::Borrowed(""),
                })
                .collect();
            let mut line = cells.join(",");
            if line.is_empty() {
                // A lone missing cell would leave a blank line, which carries no row
                line.push_str("\"\"");
            }
            self.write_line(level + 1, &line);
        }
        Ok(())
    }

    /// Header, then for every row its nested fields as sub-blocks followed by its
    /// remaining fields as `field: value` lines.
    fn encode_nested_table(&mut self, key: &str, rows: &[&Map], level: usize) -> Result<()> {
        let fields = field_union(rows);
        distinct_idents(fields.iter().map(String::as_str))?;
        self.write_line(level, &header(key, Some(rows.len()), &fields));

        for row in rows {
            for field in &fields {
                match row.get(field) {
                    Some(Value::Mapping(map)) => self.encode_mapping(field, map, level + 1)?,
                    Some(value @ Value::Sequence(items)) if value.is_table() => {
                        self.encode_table(field, items, level + 1)?
                    }
                    _ => {}
                }
            }
            for field in &fields {
                match row.get(field) {
                    None => self.write_line(level + 1, &format!("{}: \"\"", emit_ident(field))),
                    Some(value) if !is_block(value) => self.encode_field(field, value, level + 1)?,
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }

    /// `key{fields}:` followed by scalar fields, then nested blocks.
    ///
    /// The header lists the scalar field names when there are any, otherwise the
    /// nested keys, otherwise the placeholder `_`.
    fn encode_mapping(&mut self, key: &str, map: &Map, level: usize) -> Result<()> {
        distinct_idents(map.keys().map(String::as_str))?;
        let (nested, scalars): (Vec<_>, Vec<_>) =
            self.ordered(map).into_iter().partition(|(_, v)| is_block(v));

        let header_fields: Vec<String> = if !scalars.is_empty() {
            scalars.iter().map(|(k, _)| k.to_string()).collect()
        } else if !nested.is_empty() {
            nested.iter().map(|(k, _)| k.to_string()).collect()
        } else {
            vec!["_".to_string()]
        };

        self.write_line(level, &header(key, None, &header_fields));
        for (k, v) in scalars {
            self.encode_field(k, v, level + 1)?;
        }
        for (k, v) in nested {
            self.encode_entry(k, v, level + 1)?;
        }
        Ok(())
    }
}

/// `true` for values written as their own block: mappings and sequences of mappings.
fn is_block(value: &Value) -> bool {
    value.is_mapping() || value.is_table()
}

/// Keys of all rows, first-seen order.
fn field_union(rows: &[&Map]) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !fields.contains(key) {
                fields.push(key.clone());
            }
        }
    }
    fields
}

/// Fails when two keys of one mapping or header would be written as the same identifier.
fn distinct_idents<'k>(keys: impl IntoIterator<Item = &'k str>) -> Result<()> {
    let mut seen: HashMap<Cow<'k, str>, &'k str> = HashMap::new();
    for key in keys {
        let ident = emit_ident(key);
        if let Some(first) = seen.get(&ident) {
            return Err(Error::unsupported_value(
                key,
                format!("{first:?} is also written as {ident}"),
            ));
        }
        seen.insert(ident, key);
    }
    Ok(())
}

fn header(key: &str, size: Option<usize>, fields: &[String]) -> String {
    let fields: Vec<Cow<'_, str>> = fields.iter().map(|f| emit_ident(f)).collect();
    match size {
        Some(n) => format!("{}[{}]{{{}}}:", emit_ident(key), n, fields.join(",")),
        None => format!("{}{{{}}}:", emit_ident(key), fields.join(",")),
    }
}

fn inline_list(key: &str, items: &[Value]) -> Result<String> {
    let cells = items
        .iter()
        .map(|item| match item {
            Value::Scalar(s) => Ok(format_scalar(s)),
            other => Err(Error::unsupported_value(
                key,
                format!("a {} inside a list of scalars", other.type_name()),
            )),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(cells.join(","))
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Text that reads back as exactly one bare token: `[0-9]+(\.[0-9]+)?` or
/// `[A-Za-z_][A-Za-z0-9_.]*`.
fn is_bare(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => match s.split_once('.') {
            Some((int, frac)) => {
                int.bytes().all(|b| b.is_ascii_digit())
                    && !frac.is_empty()
                    && frac.bytes().all(|b| b.is_ascii_digit())
            }
            None => s.bytes().all(|b| b.is_ascii_digit()),
        },
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        }
        _ => false,
    }
}

/// A scalar as it appears in output: bare when safe, otherwise quoted with escapes.
pub(crate) fn format_scalar(s: &str) -> Cow<'_, str> {
    if is_bare(s) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    Cow::Owned(out)
}

/// A key as it appears in output. Identifiers pass through; anything else has
/// each run of other characters collapsed to `_`, leading characters that cannot
/// start an identifier stripped, and trailing underscores removed. An empty
/// result becomes `_`.
pub(crate) fn emit_ident(key: &str) -> Cow<'_, str> {
    let key = key.trim();
    if is_identifier(key) {
        return Cow::Borrowed(key);
    }

    let mut collapsed = String::with_capacity(key.len());
    let mut in_run = false;
    for ch in key.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            collapsed.push(ch);
            in_run = false;
        } else if !in_run {
            collapsed.push('_');
            in_run = true;
        }
    }

    let sanitized = collapsed
        .trim_start_matches(|c: char| !(c.is_ascii_alphabetic() || c == '_'))
        .trim_end_matches('_');
    if sanitized.is_empty() {
        Cow::Borrowed("_")
    } else {
        Cow::Owned(sanitized.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &Value) -> Result<String> {
        encode_with(value, EncodeOptions::default())
    }

    fn encode_with(value: &Value, options: EncodeOptions) -> Result<String> {
        let mut encoder = Encoder::new(options);
        encoder.encode_document(value)?;
        Ok(encoder.into_inner())
    }

    fn map(pairs: &[(&str, Value)]) -> Map {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn mapping(pairs: &[(&str, Value)]) -> Value {
        Value::Mapping(map(pairs))
    }

    fn s(text: &str) -> Value {
        Value::from(text)
    }

    #[test]
    fn test_scalars_sorted() {
        let doc = mapping(&[("name", s("John")), ("age", s("30"))]);
        assert_eq!(encode(&doc).unwrap(), "age: 30\nname: John\n");

        let unsorted = encode_with(&doc, EncodeOptions::new().with_sort_keys(false)).unwrap();
        assert_eq!(unsorted, "name: John\nage: 30\n");
    }

    #[test]
    fn test_root_must_be_mapping() {
        assert_eq!(
            encode(&s("x")).unwrap_err(),
            Error::RootNotMapping {
                found: "scalar".to_string()
            }
        );
        assert!(matches!(
            encode(&Value::Sequence(vec![])).unwrap_err(),
            Error::RootNotMapping { .. }
        ));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(encode(&Value::Mapping(Map::new())).unwrap(), "\n");
    }

    #[test]
    fn test_inline_list() {
        let doc = mapping(&[("tags", Value::Sequence(vec![s("a"), s("b c"), s("")]))]);
        assert_eq!(encode(&doc).unwrap(), "tags: a,\"b c\",\"\"\n");
    }

    #[test]
    fn test_flat_table_field_order() {
        let doc = mapping(&[(
            "users",
            Value::Sequence(vec![
                mapping(&[("name", s("Ada")), ("id", s("1"))]),
                mapping(&[("name", s("Bob")), ("id", s("2")), ("role", s("admin"))]),
            ]),
        )]);

        assert_eq!(
            encode(&doc).unwrap(),
            "users[2]{id,name,role}:\n  1,Ada,\n  2,Bob,admin\n"
        );

        let preserved =
            encode_with(&doc, EncodeOptions::new().with_field_order(FieldOrder::Preserve))
                .unwrap();
        assert_eq!(
            preserved,
            "users[2]{name,id,role}:\n  Ada,1,\n  Bob,2,admin\n"
        );
    }

    #[test]
    fn test_single_missing_cell_is_not_blank() {
        let doc = mapping(&[(
            "t",
            Value::Sequence(vec![mapping(&[("a", s("1"))]), mapping(&[])]),
        )]);
        assert_eq!(encode(&doc).unwrap(), "t[2]{a}:\n  1\n  \"\"\n");
    }

    #[test]
    fn test_empty_sequence() {
        let doc = mapping(&[("items", Value::Sequence(vec![]))]);
        assert_eq!(encode(&doc).unwrap(), "items[0]{}:\n");
    }

    #[test]
    fn test_nested_table_emits_blocks_first() {
        let users = Value::Sequence(vec![
            mapping(&[("id", s("1")), ("name", s("Ada"))]),
            mapping(&[("id", s("2")), ("name", s("Bob"))]),
        ]);
        let doc = mapping(&[(
            "items",
            Value::Sequence(vec![mapping(&[("status", s("active")), ("users", users)])]),
        )]);

        assert_eq!(
            encode(&doc).unwrap(),
            "items[1]{status,users}:\n  users[2]{id,name}:\n    1,Ada\n    2,Bob\n  status: active\n"
        );
    }

    #[test]
    fn test_nested_table_fills_missing_fields() {
        let doc = mapping(&[(
            "rows",
            Value::Sequence(vec![
                mapping(&[("meta", mapping(&[("k", s("v"))])), ("n", s("1"))]),
                mapping(&[("n", s("2"))]),
            ]),
        )]);
        assert_eq!(
            encode(&doc).unwrap(),
            "rows[2]{meta,n}:\n  meta{k}:\n    k: v\n  n: 1\n  meta: \"\"\n  n: 2\n"
        );
    }

    #[test]
    fn test_mapping_block_header() {
        let doc = mapping(&[(
            "server",
            mapping(&[
                ("port", s("8080")),
                ("tls", mapping(&[("cert", s("a.pem"))])),
                ("host", s("localhost")),
            ]),
        )]);
        assert_eq!(
            encode(&doc).unwrap(),
            "server{host,port}:\n  host: localhost\n  port: 8080\n  tls{cert}:\n    cert: a.pem\n"
        );
    }

    #[test]
    fn test_mapping_header_falls_back_to_nested_keys() {
        let doc = mapping(&[
            ("outer", mapping(&[("inner", mapping(&[("x", s("1"))]))])),
            ("empty", mapping(&[])),
        ]);
        assert_eq!(
            encode(&doc).unwrap(),
            "empty{_}:\nouter{inner}:\n  inner{x}:\n    x: 1\n"
        );
    }

    #[test]
    fn test_scalar_quoting() {
        assert_eq!(format_scalar("Ada"), "Ada");
        assert_eq!(format_scalar("3.14"), "3.14");
        assert_eq!(format_scalar("a.b_c"), "a.b_c");
        assert_eq!(format_scalar(""), "\"\"");
        assert_eq!(format_scalar("1."), "\"1.\"");
        assert_eq!(format_scalar("1.2.3"), "\"1.2.3\"");
        assert_eq!(format_scalar("2nd"), "\"2nd\"");
        assert_eq!(format_scalar("-5"), "\"-5\"");
        assert_eq!(format_scalar("say \"hi\"\n"), "\"say \\\"hi\\\"\\n\"");
    }

    #[test]
    fn test_key_sanitizing() {
        assert_eq!(emit_ident("user_name"), "user_name");
        assert_eq!(emit_ident("user name"), "user_name");
        assert_eq!(emit_ident("user--id!!"), "user_id");
        assert_eq!(emit_ident("2nd place"), "nd_place");
        assert_eq!(emit_ident("-lead"), "_lead");
        assert_eq!(emit_ident("a.b"), "a_b");
        assert_eq!(emit_ident("!!!"), "_");
        assert_eq!(emit_ident(""), "_");
        assert_eq!(emit_ident("123"), "_");
    }

    #[test]
    fn test_unsupported_values() {
        let doc = mapping(&[("mixed", Value::Sequence(vec![s("a"), mapping(&[])]))]);
        assert!(matches!(
            encode(&doc).unwrap_err(),
            Error::UnsupportedValue { ref key, .. } if key == "mixed"
        ));

        let doc = mapping(&[("rows", Value::Sequence(vec![mapping(&[]), mapping(&[])]))]);
        assert!(matches!(
            encode(&doc).unwrap_err(),
            Error::UnsupportedValue { .. }
        ));
    }

    #[test]
    fn test_colliding_keys_rejected() {
        let doc = mapping(&[("a b", s("1")), ("a_b", s("2"))]);
        assert!(matches!(
            encode(&doc).unwrap_err(),
            Error::UnsupportedValue { ref key, .. } if key == "a_b"
        ));

        let doc = mapping(&[(
            "rows",
            Value::Sequence(vec![mapping(&[("x-1", s("1")), ("x 1", s("2"))])]),
        )]);
        assert!(matches!(
            encode(&doc).unwrap_err(),
            Error::UnsupportedValue { .. }
        ));

        let doc = mapping(&[("outer", mapping(&[("k!", s("1")), ("k", s("2"))]))]);
        assert!(matches!(
            encode(&doc).unwrap_err(),
            Error::UnsupportedValue { .. }
        ));
    }

    #[test]
    fn test_custom_indent() {
        let doc = mapping(&[("t", Value::Sequence(vec![mapping(&[("a", s("1"))])]))]);
        let out = encode_with(&doc, EncodeOptions::new().with_indent(4)).unwrap();
        assert_eq!(out, "t[1]{a}:\n    1\n");
    }
}
