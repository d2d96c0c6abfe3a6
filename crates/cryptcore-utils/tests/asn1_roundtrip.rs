//! Builder/Parser agreement on generated inputs.

use cryptcore_utils::asn1::{tags, Builder, Parser};
use proptest::prelude::*;

/// A non-empty big-endian magnitude without redundant leading zeros.
fn magnitude() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..64).prop_map(|mut v| {
        if v[0] == 0 {
            v[0] = 1;
        }
        v
    })
}

proptest! {
    #[test]
    fn prop_int32_roundtrip(value in any::<i32>()) {
        let mut b = Builder::new();
        b.add_int32(value);
        let der = b.to_der();
        prop_assert_eq!(der.len(), b.encoded_len());

        let mut outer = Parser::new(&der);
        let mut seq = outer.get_sequence().unwrap();
        prop_assert_eq!(seq.get_int32().unwrap(), value);
        prop_assert!(seq.at_end().is_ok());
        prop_assert!(outer.at_end().is_ok());
    }

    #[test]
    fn prop_int64_roundtrip(value in any::<i64>()) {
        let mut b = Builder::new();
        b.add_int64(value);
        let der = b.to_der();
        let mut seq = Parser::new(&der).get_sequence().unwrap();
        prop_assert_eq!(seq.peek_type().unwrap(), tags::INTEGER);
        prop_assert_eq!(seq.get_int64().unwrap(), value);
    }

    #[test]
    fn prop_int64_is_minimal(value in any::<i64>()) {
        let mut b = Builder::new();
        b.add_int64(value);
        let der = b.to_der();
        let contents = &der[4..];
        prop_assert_eq!(der[3] as usize, contents.len());
        if contents.len() > 1 {
            // No redundant sign-extension byte.
            let redundant = (contents[0] == 0x00 && contents[1] & 0x80 == 0)
                || (contents[0] == 0xFF && contents[1] & 0x80 != 0);
            prop_assert!(!redundant);
        }
    }

    #[test]
    fn prop_big_int_roundtrip(value in magnitude()) {
        let mut b = Builder::new();
        b.add_big_int(&value);
        let der = b.to_der();
        let mut seq = Parser::new(&der).get_sequence().unwrap();
        prop_assert_eq!(seq.get_big_int().unwrap(), value);
    }

    #[test]
    fn prop_nested_octet_strings(
        items in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..300), 0..6),
    ) {
        let mut b = Builder::new();
        {
            let set = b.add_set();
            for item in &items {
                set.add_octet_string(item);
            }
        }
        b.add_null();
        let der = b.to_der();
        prop_assert_eq!(der.len(), b.encoded_len());

        let mut seq = Parser::new(&der).get_sequence().unwrap();
        let mut set = seq.get_set().unwrap();
        for item in &items {
            prop_assert_eq!(&set.get_octet_string().unwrap(), item);
        }
        prop_assert!(set.at_end().is_ok());
        seq.get_null().unwrap();
        prop_assert!(seq.at_end().is_ok());
    }

    #[test]
    fn prop_parser_never_panics(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut p = Parser::new(&data);
        while !p.is_empty() {
            if p.skip().is_err() {
                break;
            }
        }
    }
}

#[test]
fn test_deep_nesting() {
    let mut b = Builder::new();
    let mut level = &mut b;
    for depth in 0..20 {
        level.add_int32(depth);
        level = level.add_sequence();
    }
    level.add_string("bottom");
    let der = b.to_der();
    assert_eq!(der.len(), b.encoded_len());

    let mut p = Parser::new(&der).get_sequence().unwrap();
    for depth in 0..20 {
        assert_eq!(p.get_int32().unwrap(), depth);
        p = p.get_sequence().unwrap();
    }
    assert_eq!(p.get_string().unwrap(), "bottom");
    assert!(p.at_end().is_ok());
}
