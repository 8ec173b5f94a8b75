use proptest::prelude::*;

use jsorb::{DeserializeOptions, SerializeOptions, Serializer, Value};

/// Acyclic value trees over primitives, lists and maps.
///
/// Floats stay in a finite range: non-finite values have no JSON form and
/// are lossy by design.
fn value_tree() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e12..1.0e12f64).prop_map(Value::Float),
        "[a-z0-9_]{0,8}".prop_map(Value::Str),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(|items| Value::list_from(items)),
            prop::collection::hash_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|fields| Value::map_from(fields)),
        ]
    })
}

proptest! {
    /// Wrapped round trip rebuilds a structurally equal graph.
    #[test]
    fn prop_wrapped_roundtrip(value in value_tree()) {
        let ser = Serializer::new();
        let options = SerializeOptions { wrap: true, ..SerializeOptions::default() };
        let tree = ser.serialize(&value, &options).unwrap().unwrap();
        let back = ser.deserialize(&tree, &DeserializeOptions { unwrap: true }).unwrap();
        prop_assert_eq!(back, value);
    }

    /// Plain round trip (no envelopes, pass-through decode) is also exact.
    #[test]
    fn prop_plain_roundtrip(value in value_tree()) {
        let ser = Serializer::new();
        let tree = ser.serialize(&value, &SerializeOptions::default()).unwrap().unwrap();
        let back = ser.deserialize(&tree, &DeserializeOptions::default()).unwrap();
        prop_assert_eq!(back, value);
    }

    /// The text facade changes nothing about the round trip.
    #[test]
    fn prop_text_roundtrip(value in value_tree()) {
        let ser = Serializer::new();
        let options = SerializeOptions { wrap: true, ..SerializeOptions::default() };
        let text = ser.to_text(&value, &options).unwrap().unwrap();
        let back = ser.from_text(&text, &DeserializeOptions { unwrap: true }).unwrap();
        prop_assert_eq!(back, value);
    }
}
