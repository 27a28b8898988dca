use fieldbind::{BindSpec, FieldKey, MapError, TypeRegistry};
use proptest::prelude::*;
use serde_json::{json, Value};

#[test]
fn opaque_fields_need_and_use_explicit_keys() {
    let test = FieldKey::opaque("test");
    let test2 = FieldKey::opaque("test");

    let mut reg = TypeRegistry::new();
    reg.declare("Broken", None).unwrap();
    let err = reg.register("Broken", test.clone(), ()).unwrap_err();
    assert!(matches!(err, MapError::OpaqueKeyWithoutName(_)));

    reg.declare("Test", None).unwrap();
    reg.register("Test", test.clone(), "test_name").unwrap();
    reg.register("Test", test2.clone(), BindSpec::new().key("test_name2")).unwrap();

    let mut rec = reg.instantiate("Test").unwrap();
    rec.set(test.clone(), "toJson").set(test2.clone(), "toJson2");
    assert_eq!(rec.to_json(), r#"{"test_name":"toJson","test_name2":"toJson2"}"#);

    rec.from_json(r#"{"test_name":"fromJson","test_name2":"fromJson2"}"#)
        .unwrap();
    assert_eq!(rec.get(&test), Some(&json!("fromJson")));
    assert_eq!(rec.get(&test2), Some(&json!("fromJson2")));
}

#[test]
fn inherited_field_rebound_to_new_key() {
    let mut reg = TypeRegistry::new();
    reg.declare("Test1", None).unwrap();
    reg.register("Test1", "f", "k1").unwrap();
    reg.declare("Test2", Some("Test1")).unwrap();
    reg.register("Test2", "f", "k2").unwrap();

    let mut rec = reg.instantiate("Test2").unwrap();
    rec.set("f", "v0");
    assert_eq!(rec.to_json(), r#"{"k2":"v0"}"#);

    rec.from_json(json!({"k1": "ignored"})).unwrap();
    assert_eq!(rec.get(&"f".into()), Some(&json!("v0")));

    rec.from_json(json!({"k2": "v"})).unwrap();
    assert_eq!(rec.get(&"f".into()), Some(&json!("v")));

    let mut parent = reg.instantiate("Test1").unwrap();
    parent.set("f", 1);
    assert_eq!(parent.to_json(), r#"{"k1":1}"#);
}

#[test]
fn inherited_key_shadowed_by_new_field() {
    let mut reg = TypeRegistry::new();
    reg.declare("Test1", None).unwrap();
    reg.register("Test1", "f1", "k").unwrap();
    reg.declare("Test2", Some("Test1")).unwrap();
    reg.register("Test2", "f2", "k").unwrap();

    let mut rec = reg.instantiate("Test2").unwrap();
    rec.set("f1", "a").set("f2", "b");
    assert_eq!(rec.to_json(), r#"{"k":"b"}"#);

    rec.from_json(r#"{"k":"c"}"#).unwrap();
    assert_eq!(rec.get(&"f1".into()), Some(&json!("a")));
    assert_eq!(rec.get(&"f2".into()), Some(&json!("c")));
}

#[test]
fn shadow_then_rebind_keeps_inherited_route() {
    let mut reg = TypeRegistry::new();
    reg.declare("P", None).unwrap();
    reg.register("P", "g", "k").unwrap();
    reg.declare("C", Some("P")).unwrap();
    reg.register("C", "f", "k").unwrap();
    reg.register("C", "f", "k2").unwrap();

    let map = reg.field_map("C").unwrap();
    assert_eq!(map.owner_of("k"), Some(&FieldKey::from("g")));

    let mut source = reg.instantiate("C").unwrap();
    source.set("g", "a").set("f", "b");
    let text = source.to_json();
    assert_eq!(text, r#"{"k":"a","k2":"b"}"#);

    let mut target = reg.instantiate("C").unwrap();
    target.from_json(text.as_str()).unwrap();
    assert_eq!(target.get(&"g".into()), Some(&json!("a")));
    assert_eq!(target.get(&"f".into()), Some(&json!("b")));
}

#[test]
fn constant_strategy_ignores_incoming_value() {
    let mut reg = TypeRegistry::new();
    reg.declare("Test", None).unwrap();
    reg.register("Test", "field", BindSpec::new().from_document(|_| json!("Z")))
        .unwrap();

    let mut rec = reg.instantiate("Test").unwrap();
    for incoming in [json!(1), json!(null), json!({"a": []}), json!("Y")] {
        rec.from_json(json!({ "field": incoming })).unwrap();
        assert_eq!(rec.get(&"field".into()), Some(&json!("Z")));
    }
}

#[test]
fn unregistered_and_unknown_keys_are_ignored() {
    let mut reg = TypeRegistry::new();
    reg.declare("Test", None).unwrap();
    reg.register("Test", "serializeMe", "serialize_me").unwrap();

    let mut rec = reg.instantiate("Test").unwrap();
    rec.set("serializeMe", "nice").set("dontSerializeMe", "great");
    assert_eq!(rec.to_json(), r#"{"serialize_me":"nice"}"#);

    rec.from_json(r#"{"dontSerializeMe":"x","serializeMe":"y","extra":true}"#)
        .unwrap();
    assert_eq!(rec.get(&"serializeMe".into()), Some(&json!("nice")));
    assert_eq!(rec.get(&"dontSerializeMe".into()), Some(&json!("great")));
    assert_eq!(rec.get(&"extra".into()), None);
}

#[test]
fn registration_after_use_is_rejected() {
    let mut reg = TypeRegistry::new();
    reg.declare("Test", None).unwrap();
    reg.register("Test", "a", ()).unwrap();
    let _ = reg.instantiate("Test").unwrap();
    assert!(matches!(reg.register("Test", "b", ()), Err(MapError::Frozen(_))));
}

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        (-1_000_000i32..1_000_000).prop_map(|n| Value::from(f64::from(n) / 4.0)),
        "[a-z]{0,8}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn identity_fields_round_trip(values in prop::collection::vec(json_value(), 1..6)) {
        let mut reg = TypeRegistry::new();
        reg.declare("T", None).unwrap();
        let keys: Vec<String> = (0..values.len()).map(|i| format!("f{i}")).collect();
        for key in &keys {
            reg.register("T", key.clone(), format!("out_{key}")).unwrap();
        }

        let mut source = reg.instantiate("T").unwrap();
        for (key, value) in keys.iter().zip(&values) {
            source.set(key.clone(), value.clone());
        }
        let text = source.to_json();

        let mut target = reg.instantiate("T").unwrap();
        target.from_json(text.as_str()).unwrap();
        for (key, value) in keys.iter().zip(&values) {
            prop_assert_eq!(target.get(&FieldKey::from(key.clone())), Some(value));
        }
    }
}
