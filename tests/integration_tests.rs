use serde::{Deserialize, Serialize};
use serde_yamlet::{
    dump, dump_all, from_slice, from_str, load, load_all, to_string, to_string_with_options,
    to_value, DumpOptions, LineBreak, Number, Value,
};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct User {
    id: u32,
    name: String,
    active: bool,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Product {
    sku: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Order {
    order_id: u32,
    customer: User,
    items: Vec<Product>,
    total: f64,
    note: Option<String>,
}

fn alice() -> User {
    User {
        id: 123,
        name: "Alice".to_string(),
        active: true,
        tags: vec!["admin".to_string(), "developer".to_string()],
    }
}

#[test]
fn test_simple_struct() {
    let yaml = to_string(&alice()).unwrap();
    assert_eq!(
        yaml,
        "id: 123\nname: Alice\nactive: true\ntags:\n- admin\n- developer\n"
    );

    let user_back: User = from_str(&yaml).unwrap();
    assert_eq!(alice(), user_back);
}

#[test]
fn test_nested_struct() {
    let order = Order {
        order_id: 12345,
        customer: alice(),
        items: vec![
            Product {
                sku: "WIDGET-001".to_string(),
                price: 29.99,
                quantity: 2,
            },
            Product {
                sku: "GADGET-002".to_string(),
                price: 49.99,
                quantity: 1,
            },
        ],
        total: 109.97,
        note: None,
    };

    let yaml = to_string(&order).unwrap();
    assert!(yaml.contains("customer:\n  id: 123\n"));
    assert!(yaml.contains("items:\n- sku: WIDGET-001\n  price: 29.99\n"));
    assert!(yaml.ends_with("note: null\n"));

    let order_back: Order = from_str(&yaml).unwrap();
    assert_eq!(order, order_back);
}

#[test]
fn test_hand_written_document() {
    let yaml = "\
# an order
order_id: 7
customer:
  id: 1
  name: Bob
  active: no
  tags: []
items:
  - {sku: A, price: 1.5, quantity: 3}
  - sku: B
    price: 2
    quantity: 0x10
total: 20.5
";
    let order: Order = from_str(yaml).unwrap();
    assert!(!order.customer.active);
    assert_eq!(order.items[1].price, 2.0);
    assert_eq!(order.items[1].quantity, 16);
    assert_eq!(order.note, None);
}

#[test]
fn test_primitives() {
    assert_roundtrip(&42i32);
    assert_roundtrip(&3.5f64);
    assert_roundtrip(&true);
    assert_roundtrip(&false);
    assert_roundtrip(&"hello world".to_string());
    assert_roundtrip(&vec![1, 2, 3, 4, 5]);
    assert_roundtrip(&'c');
}

#[test]
fn test_special_strings() {
    let special_strings = [
        "",
        "hello, world",
        "line1\nline2",
        "trailing newline\n",
        "tab\there",
        " leading space",
        "trailing space ",
        "true",
        "yes",
        "Off",
        "null",
        "~",
        "123",
        "0o17",
        "1:30",
        "3.5",
        ".inf",
        "2002-12-14",
        "- dash",
        "key: value",
        "# comment",
        "&anchor",
        "*alias",
        "!tag",
        "'single'",
        "\"quoted\"",
        "[flow]",
        "{flow}",
        "---",
        "...",
        "<<",
        "=",
        "caf\u{e9}",
        "bell\u{7}",
    ];

    for s in special_strings {
        assert_roundtrip(&s.to_string());
    }
}

#[test]
fn test_numbers() {
    assert_roundtrip(&-128i8);
    assert_roundtrip(&32767i16);
    assert_roundtrip(&-2147483648i32);
    assert_roundtrip(&i64::MAX);
    assert_roundtrip(&i64::MIN);
    assert_roundtrip(&u64::MAX);
    assert_roundtrip(&u128::MAX);
    assert_roundtrip(&i128::MIN);

    assert_roundtrip(&0.0f32);
    assert_roundtrip(&-2.5f32);
    assert_roundtrip(&4.25f64);
    assert_roundtrip(&1e300f64);
    assert_roundtrip(&-1.5e-10f64);
    assert_roundtrip(&f64::INFINITY);
    assert_roundtrip(&f64::NEG_INFINITY);

    let nan: f64 = from_str(&to_string(&f64::NAN).unwrap()).unwrap();
    assert!(nan.is_nan());
}

#[test]
fn test_float_text() {
    assert_eq!(to_string(&1.0f64).unwrap(), "1.0\n...\n");
    assert_eq!(to_string(&1e20f64).unwrap(), "1.0e+20\n...\n");
    assert_eq!(to_string(&f64::NAN).unwrap(), ".nan\n...\n");
}

#[test]
fn test_maps_with_non_string_keys() {
    let mut map = BTreeMap::new();
    map.insert(3, vec!["c"]);
    map.insert(1, vec!["a"]);
    let yaml = to_string(&map).unwrap();
    assert_eq!(yaml, "1:\n- a\n3:\n- c\n");

    let back: BTreeMap<i32, Vec<String>> = from_str(&yaml).unwrap();
    assert_eq!(back[&3], vec!["c"]);
}

#[test]
fn test_enums() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    enum Shape {
        Empty,
        Circle(f64),
        Rect { w: u32, h: u32 },
        Line(i32, i32),
    }

    let shapes = vec![
        Shape::Empty,
        Shape::Circle(1.5),
        Shape::Rect { w: 2, h: 3 },
        Shape::Line(-1, 1),
    ];
    let yaml = to_string(&shapes).unwrap();
    assert_eq!(
        yaml,
        "- Empty\n- Circle: 1.5\n- Rect:\n    w: 2\n    h: 3\n- Line:\n  - -1\n  - 1\n"
    );
    assert_roundtrip(&shapes);
}

#[test]
fn test_to_value() {
    let value = to_value(&alice()).unwrap();

    assert_eq!(value.get("id"), Some(&Value::Number(Number::Integer(123))));
    assert_eq!(value.get("name"), Some(&Value::String("Alice".to_string())));
    assert_eq!(value.get("active"), Some(&Value::Bool(true)));
    let tags = value.get("tags").and_then(Value::as_sequence).unwrap();
    assert_eq!(tags[0], Value::from("admin"));
}

#[test]
fn test_empty_collections() {
    let empty_vec: Vec<i32> = vec![];
    assert_eq!(to_string(&empty_vec).unwrap(), "[]\n");
    assert_roundtrip(&empty_vec);

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Empty {}

    assert_eq!(to_string(&Empty {}).unwrap(), "{}\n");
    assert_roundtrip(&Empty {});
}

#[test]
fn test_options() {
    let options = DumpOptions::new()
        .with_indent(4)
        .with_line_break(LineBreak::CrLf)
        .with_explicit_start(true)
        .with_explicit_end(true);
    let yaml = to_string_with_options(&BTreeMap::from([("k", vec![1])]), &options).unwrap();
    assert_eq!(yaml, "---\r\nk:\r\n- 1\r\n...\r\n");

    let options = DumpOptions::new().with_sort_keys(true);
    let yaml = to_string_with_options(&alice(), &options).unwrap();
    assert!(yaml.starts_with("active: true\nid: 123\nname: Alice\n"));

    let user_back: User = from_str(&yaml).unwrap();
    assert_eq!(alice(), user_back);
}

#[test]
fn test_canonical_output_loads_back() {
    let value = to_value(&alice()).unwrap();
    let yaml = dump(&value, &DumpOptions::canonical()).unwrap();
    assert!(yaml.starts_with("---\n!!map {\n  ? !!str \"id\"\n  : !!int \"123\",\n"));
    assert_eq!(load(&yaml).unwrap(), value);
}

#[test]
fn test_multiple_documents() {
    let values = vec![Value::from(1), Value::from(vec!["a"]), Value::Null];
    let yaml = dump_all(&values, &DumpOptions::new()).unwrap();
    assert_eq!(yaml, "1\n---\n- a\n--- null\n...\n");
    assert_eq!(load_all(&yaml).unwrap(), values);
}

#[test]
fn test_utf16_input() {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in "name: \u{e9}t\u{e9}".encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    let map: BTreeMap<String, String> = from_slice(&bytes).unwrap();
    assert_eq!(map["name"], "\u{e9}t\u{e9}");
}

#[test]
fn test_error_positions() {
    let err = from_str::<User>("id: 1\nname: [x\n").unwrap_err();
    assert!(err.is_parser());
    let mark = err.problem_mark().unwrap();
    assert_eq!(mark.line, 2);

    let err = from_str::<User>("id: one\n").unwrap_err();
    assert!(!err.is_parser());
}

fn assert_roundtrip<T>(original: &T)
where
    T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug,
{
    let yaml = to_string(original).unwrap();
    let deserialized: T = from_str(&yaml)
        .unwrap_or_else(|e| panic!("failed to load {:?}: {}", yaml, e));
    assert_eq!(*original, deserialized);
}
