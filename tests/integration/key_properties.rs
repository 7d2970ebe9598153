//! Generative checks on capture key derivation

use std::collections::{BTreeMap, HashMap};

use capture_replay::data::{argument_hash, symbol_hash, NULL_ARGUMENT_HASH};
use capture_replay::CallIdentity;
use proptest::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
enum Side {
    Buy,
    Sell,
}

proptest! {
    #[test]
    fn key_is_deterministic(method in "[a-zA-Z][a-zA-Z0-9_]{0,20}", args in proptest::collection::vec(any::<i64>(), 0..6)) {
        let build = || {
            args.iter()
                .fold(CallIdentity::new(method.as_str()), |call, arg| call.arg(arg).unwrap())
        };
        prop_assert_eq!(build().capture_key(), build().capture_key());
    }

    #[test]
    fn key_shape_is_method_then_hashes(method in "[a-zA-Z][a-zA-Z0-9]{0,12}", args in proptest::collection::vec(".*", 0..5)) {
        let call = args
            .iter()
            .fold(CallIdentity::new(method.as_str()), |call, arg| call.arg(arg).unwrap());
        let key = call.capture_key().into_string();

        let mut expected = method.clone();
        for hash in call.argument_hashes() {
            expected.push('-');
            expected.push_str(&hash.to_string());
        }
        prop_assert_eq!(key, expected);
        prop_assert_eq!(call.arity(), args.len());
    }

    #[test]
    fn strings_hash_by_content(text in ".*") {
        let owned = text.clone();
        prop_assert_eq!(argument_hash(text.as_str()).unwrap(), argument_hash(&owned).unwrap());
        prop_assert_eq!(argument_hash(&text).unwrap(), symbol_hash(&text));
    }

    #[test]
    fn maps_hash_independent_of_iteration_order(entries in proptest::collection::vec(("[a-z]{1,8}", any::<u32>()), 0..12)) {
        let hashed: HashMap<String, u32> = entries.iter().cloned().collect();
        let sorted: BTreeMap<String, u32> = entries.iter().cloned().collect();
        prop_assert_eq!(argument_hash(&hashed).unwrap(), argument_hash(&sorted).unwrap());
    }

    #[test]
    fn argument_order_matters(a in any::<u32>(), b in any::<u32>()) {
        prop_assume!(a != b);
        let forward = CallIdentity::new("pair").arg(&a).unwrap().arg(&b).unwrap();
        let backward = CallIdentity::new("pair").arg(&b).unwrap().arg(&a).unwrap();
        prop_assert_ne!(forward.capture_key(), backward.capture_key());
    }
}

#[test]
fn test_absent_arguments_hash_to_zero() {
    let none: Option<String> = None;
    assert_eq!(argument_hash(&none).unwrap(), NULL_ARGUMENT_HASH);
    assert_eq!(argument_hash(&()).unwrap(), NULL_ARGUMENT_HASH);

    let call = CallIdentity::new("lookup").arg(&none).unwrap().null();
    assert_eq!(call.capture_key().as_str(), "lookup-0-0");
}

#[test]
fn test_no_argument_key_is_the_method_name() {
    assert_eq!(CallIdentity::new("getString").capture_key().as_str(), "getString");
}

#[test]
fn test_enum_constants_hash_like_their_name() {
    assert_eq!(argument_hash(&Side::Buy).unwrap(), symbol_hash("Buy"));
    assert_ne!(argument_hash(&Side::Buy).unwrap(), argument_hash(&Side::Sell).unwrap());

    let by_value = CallIdentity::new("order").arg(&Side::Sell).unwrap();
    let by_symbol = CallIdentity::new("order").symbol("Sell");
    assert_eq!(by_value.capture_key(), by_symbol.capture_key());
}

#[test]
fn test_some_hashes_like_the_bare_value() {
    assert_eq!(argument_hash(&Some(5u8)).unwrap(), argument_hash(&5u8).unwrap());
}
