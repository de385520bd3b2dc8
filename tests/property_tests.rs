//! Property-based tests for the load/dump round trip guarantees.
//!
//! Generated inputs cover the serde bridge on primitives and collections,
//! and dynamic `Value` trees through `dump`/`load` directly.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_yamlet::{dump, from_str, load, to_string, DumpOptions, Mapping, Value};
use std::collections::BTreeMap;

fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(
    value: &T,
) -> bool {
    match to_string(value) {
        Ok(serialized) => match from_str::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {:?}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

fn scalar_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<f64>().prop_map(Value::from),
        "[^\\p{C}\\p{Zl}\\p{Zp}]{0,12}".prop_map(Value::from),
    ]
}

fn tree_value() -> impl Strategy<Value = Value> {
    scalar_value().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Sequence),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..6).prop_map(|entries| {
                let map: Mapping = entries
                    .into_iter()
                    .map(|(key, value)| (Value::from(key), value))
                    .collect();
                Value::Mapping(map)
            }),
        ]
    })
}

proptest! {
    #[test]
    fn prop_i32(n in any::<i32>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_i64(n in any::<i64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_u64(n in any::<u64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_bool(b in any::<bool>()) {
        prop_assert!(roundtrip(&b));
    }

    #[test]
    fn prop_finite_f64(f in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
        prop_assert!(roundtrip(&f));
    }

    #[test]
    fn prop_string(s in "[^\\p{C}\\p{Zl}\\p{Zp}]*") {
        prop_assert!(roundtrip(&s));
    }

    #[test]
    fn prop_vec_i32(v in prop::collection::vec(any::<i32>(), 0..20)) {
        prop_assert!(roundtrip(&v));
    }

    #[test]
    fn prop_option_i32(opt in proptest::option::of(any::<i32>())) {
        prop_assert!(roundtrip(&opt));
    }

    #[test]
    fn prop_map_string_vec(m in prop::collection::btree_map("[^\\p{C}]{0,8}", prop::collection::vec(any::<i16>(), 0..4), 0..6)) {
        let m: BTreeMap<String, Vec<i16>> = m;
        prop_assert!(roundtrip(&m));
    }

    #[test]
    fn prop_tuple_i32_bool(t in (any::<i32>(), any::<bool>())) {
        prop_assert!(roundtrip(&t));
    }

    #[test]
    fn prop_value_tree(value in tree_value()) {
        let text = dump(&value, &DumpOptions::new()).unwrap();
        let loaded = load(&text).unwrap();
        prop_assert_eq!(loaded, value, "dumped as {:?}", text);
    }

    #[test]
    fn prop_value_tree_flow(value in tree_value()) {
        let options = DumpOptions::new().with_default_flow_style(Some(true)).with_width(20);
        let text = dump(&value, &options).unwrap();
        let loaded = load(&text).unwrap();
        prop_assert_eq!(loaded, value, "dumped as {:?}", text);
    }
}
