use serde_yamlet::{dump, load, yaml, DumpOptions, Mapping, Number, Value};

#[test]
fn test_yaml_macro_null() {
    let value = yaml!(null);
    assert_eq!(value, Value::Null);
}

#[test]
fn test_yaml_macro_booleans() {
    assert_eq!(yaml!(true), Value::Bool(true));
    assert_eq!(yaml!(false), Value::Bool(false));
}

#[test]
fn test_yaml_macro_numbers() {
    let int_val = yaml!(42);
    assert_eq!(int_val, Value::Number(Number::Integer(42)));

    let float_val = yaml!(3.5);
    assert_eq!(float_val, Value::Number(Number::Float(3.5)));

    let negative_val = yaml!(-123);
    assert_eq!(negative_val, Value::Number(Number::Integer(-123)));

    assert_eq!(yaml!(f64::INFINITY), Value::Number(Number::Infinity));
    assert_eq!(yaml!(u64::MAX).kind(), serde_yamlet::ValueKind::BigInt);
}

#[test]
fn test_yaml_macro_strings() {
    assert_eq!(yaml!("hello world"), Value::String("hello world".to_string()));
    assert_eq!(yaml!(""), Value::String(String::new()));
}

#[test]
fn test_yaml_macro_sequences() {
    assert_eq!(yaml!([]), Value::Sequence(vec![]));

    assert_eq!(
        yaml!([1, "hello", true, null]),
        Value::Sequence(vec![
            Value::Number(Number::Integer(1)),
            Value::String("hello".to_string()),
            Value::Bool(true),
            Value::Null,
        ])
    );
}

#[test]
fn test_yaml_macro_mappings() {
    assert_eq!(yaml!({}), Value::Mapping(Mapping::new()));

    let value = yaml!({
        "name": "Alice",
        "age": 30
    });
    let map = value.as_mapping().unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get_str("name"), Some(&Value::from("Alice")));
    assert_eq!(map.get_str("age"), Some(&Value::from(30)));
}

#[test]
fn test_yaml_macro_nested() {
    let nested = yaml!({
        "user": {
            "id": 123,
            "name": "Bob",
            "active": true
        },
        "tags": ["admin", "developer"],
        "count": 42,
    });

    let user = nested.get("user").unwrap();
    assert_eq!(user.get("id").and_then(Value::as_i64), Some(123));
    assert_eq!(user.get("name").and_then(Value::as_str), Some("Bob"));
    assert_eq!(user.get("active").and_then(Value::as_bool), Some(true));

    let tags = nested.get("tags").and_then(Value::as_sequence).unwrap();
    assert_eq!(tags, &vec![Value::from("admin"), Value::from("developer")]);
    assert_eq!(nested.get("count"), Some(&Value::from(42)));
}

#[test]
fn test_yaml_macro_matches_loaded_document() {
    let built = yaml!({
        "server": {"host": "localhost", "ports": [80, 443]},
        "debug": false,
        "ratio": 0.25,
        "owner": null
    });
    let loaded = load(
        "server:\n  host: localhost\n  ports: [80, 443]\ndebug: no\nratio: .25\nowner: ~\n",
    )
    .unwrap();
    assert_eq!(built, loaded);
}

#[test]
fn test_yaml_macro_dump() {
    let value = yaml!({"list": [1, 2], "empty": {}, "text": "a: b"});
    assert_eq!(
        dump(&value, &DumpOptions::new()).unwrap(),
        "list:\n- 1\n- 2\nempty: {}\ntext: 'a: b'\n"
    );
}

#[test]
fn test_value_methods() {
    let null_val = yaml!(null);
    assert!(null_val.is_null());
    assert!(!null_val.is_bool());
    assert!(!null_val.is_number());
    assert!(!null_val.is_string());
    assert!(!null_val.is_sequence());
    assert!(!null_val.is_mapping());

    let bool_val = yaml!(true);
    assert!(bool_val.is_bool());
    assert_eq!(bool_val.as_bool(), Some(true));

    let str_val = yaml!("hello");
    assert!(str_val.is_string());
    assert_eq!(str_val.as_str(), Some("hello"));

    let seq_val = yaml!([1, 2, 3]);
    assert!(seq_val.is_sequence());
    assert_eq!(seq_val.as_sequence().unwrap().len(), 3);

    let map_val = yaml!({"key": "value"});
    assert!(map_val.is_mapping());
    assert_eq!(map_val.as_mapping().unwrap().len(), 1);
}

#[test]
fn test_value_display() {
    assert_eq!(yaml!({"a": [1, 2]}).to_string(), "a:\n- 1\n- 2");
    assert_eq!(yaml!("yes").to_string(), "'yes'");
    assert_eq!(yaml!(7).to_string(), "7");
}
