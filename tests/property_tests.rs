//! Property-based tests for the codec guarantees
//!
//! Flat documents (scalars, lists of scalars, one flat table) must survive
//! `parse(encode(doc))` unchanged. Arbitrary nested documents must reach a
//! fixed point after one encode/parse cycle.

use proptest::prelude::*;
use rtoon::{encode, parse, tokenize, Map, Value};

fn key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}"
}

fn scalar() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z_][A-Za-z0-9_.]{0,8}",
        "[0-9]{1,5}(\\.[0-9]{1,3})?",
        "[ -~\t\n]{0,10}",
    ]
}

fn field_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => scalar().prop_map(Value::Scalar),
        1 => prop::collection::vec(scalar().prop_map(Value::Scalar), 2..5).prop_map(Value::Sequence),
        1 => Just(Value::Sequence(vec![])),
    ]
}

fn scalar_document() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(key(), field_value(), 0..8)
        .prop_map(|entries| Value::Mapping(entries.into_iter().collect()))
}

fn table_document() -> impl Strategy<Value = Value> {
    prop::collection::btree_set(key(), 1..5)
        .prop_flat_map(|fields| {
            let fields: Vec<String> = fields.into_iter().collect();
            let width = fields.len();
            (
                Just(fields),
                prop::collection::vec(prop::collection::vec(scalar(), width), 0..6),
            )
        })
        .prop_map(|(fields, rows)| {
            let rows = rows
                .into_iter()
                .map(|cells| {
                    let row: Map = fields
                        .iter()
                        .cloned()
                        .zip(cells.into_iter().map(Value::Scalar))
                        .collect();
                    Value::Mapping(row)
                })
                .collect();
            let mut doc = Map::new();
            doc.insert("rows".to_string(), Value::Sequence(rows));
            Value::Mapping(doc)
        })
}

fn nested_value() -> impl Strategy<Value = Value> {
    let leaf = scalar().prop_map(Value::Scalar);
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(scalar().prop_map(Value::Scalar), 0..4)
                .prop_map(Value::Sequence),
            prop::collection::btree_map(key(), inner.clone(), 0..4)
                .prop_map(|entries| Value::Mapping(entries.into_iter().collect())),
            prop::collection::vec(prop::collection::btree_map(key(), inner, 1..4), 0..3)
                .prop_map(|rows| {
                    Value::Sequence(
                        rows.into_iter()
                            .map(|row| Value::Mapping(row.into_iter().collect()))
                            .collect(),
                    )
                }),
        ]
    })
}

fn nested_document() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(key(), nested_value(), 0..5)
        .prop_map(|entries| Value::Mapping(entries.into_iter().collect()))
}

proptest! {
    #[test]
    fn prop_scalar_documents_round_trip(doc in scalar_document()) {
        let text = encode(&doc).unwrap();
        prop_assert_eq!(parse(&text).unwrap(), doc, "encoded as:\n{}", text);
    }

    #[test]
    fn prop_flat_tables_round_trip(doc in table_document()) {
        let text = encode(&doc).unwrap();
        prop_assert_eq!(parse(&text).unwrap(), doc, "encoded as:\n{}", text);
    }

    #[test]
    fn prop_encode_parse_reaches_fixed_point(doc in nested_document()) {
        let first = encode(&doc).unwrap();
        let once = parse(&first).unwrap();
        let second = encode(&once).unwrap();
        let twice = parse(&second).unwrap();
        prop_assert_eq!(&once, &twice, "first:\n{}\nsecond:\n{}", first, second);
    }

    #[test]
    fn prop_encoded_text_ends_with_newline(doc in nested_document()) {
        prop_assert!(encode(&doc).unwrap().ends_with('\n'));
    }

    #[test]
    fn prop_indent_tokens_balance(doc in nested_document()) {
        let tokens = tokenize(&encode(&doc).unwrap()).unwrap();
        let depth = tokens.iter().try_fold(0usize, |depth, t| match t.kind {
            rtoon::TokenKind::Indent => Some(depth + 1),
            rtoon::TokenKind::Dedent => depth.checked_sub(1),
            _ => Some(depth),
        });
        prop_assert_eq!(depth, Some(0));
    }

    #[test]
    fn prop_tokenizer_never_panics(input in "[ -~\t\n]{0,64}") {
        let _ = tokenize(&input);
        let _ = parse(&input);
    }
}
