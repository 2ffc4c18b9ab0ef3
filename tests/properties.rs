//! Property tests for name list parsing and header map encoding.

use gateway_header_transform::{
    decode_header_map, encode_header_map, split_header_names, HeaderMap, HeaderTransformer,
    MissingValue, VariableContext,
};
use proptest::collection::{hash_map, vec};
use proptest::option;
use proptest::prelude::*;
use proptest::test_runner::Config;

/// Header-like names that never contain the list separator.
fn header_name() -> impl Strategy<Value = String> {
    "[A-Za-z0-9!#$%&'*+.^_`|~-]{1,24}"
}

/// Arbitrary text, including quotes, backslashes, control characters and
/// non-ASCII code points.
fn any_text() -> impl Strategy<Value = String> {
    any::<String>()
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn bracketed_list_splits_in_order(names in vec(header_name(), 1..16)) {
        let raw = format!("[{}]", names.join(", "));
        let split = split_header_names(&raw);
        prop_assert_eq!(split.len(), names.len());
        prop_assert_eq!(split, names);
    }

    #[test]
    fn encode_decode_roundtrip(
        entries in vec((any_text(), option::of(any_text())), 0..12)
    ) {
        let map: HeaderMap = entries.into_iter().collect();
        let encoded = encode_header_map(&map, MissingValue::Null).unwrap();

        let inner: String = serde_json::from_str(&encoded).unwrap();
        prop_assert_eq!(inner, map.to_json(MissingValue::Null).unwrap());

        let decoded = decode_header_map(&encoded).unwrap();
        prop_assert_eq!(
            decoded.iter().collect::<Vec<_>>(),
            map.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn omit_drops_only_missing(
        entries in vec((any_text(), option::of(any_text())), 0..12)
    ) {
        let map: HeaderMap = entries.into_iter().collect();
        let decoded =
            decode_header_map(&encode_header_map(&map, MissingValue::Omit).unwrap()).unwrap();

        let present: Vec<_> = map.iter().filter(|(_, v)| v.is_some()).collect();
        prop_assert_eq!(decoded.iter().collect::<Vec<_>>(), present);
    }

    #[test]
    fn every_listed_name_is_written(
        headers in hash_map(header_name(), option::of(any_text()), 1..12)
    ) {
        let names: Vec<&str> = headers.keys().map(String::as_str).collect();
        let mut ctx = VariableContext::new()
            .with_variable("request.headers.names", format!("[{}]", names.join(", ")));
        for (name, value) in &headers {
            if let Some(value) = value {
                ctx = ctx.with_variable(format!("request.header.{name}"), value.clone());
            }
        }

        HeaderTransformer::default().apply(&mut ctx);
        let decoded = decode_header_map(ctx.get("apic.reqHeaders").unwrap()).unwrap();

        prop_assert_eq!(decoded.names().collect::<Vec<_>>(), names);
        for (name, value) in &headers {
            prop_assert_eq!(decoded.get(name), Some(value.as_deref()));
        }
    }
}
