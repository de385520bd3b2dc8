use serde_yamlet::tokens::TokenKind;
use serde_yamlet::{
    compose, dump, emit, load, load_all, parse, scan, DumpOptions, Mapping, SharedValue, Value,
};

fn mapping(entries: Vec<(&str, Value)>) -> Value {
    let mut map = Mapping::new();
    for (key, value) in entries {
        map.insert(Value::from(key), value);
    }
    Value::Mapping(map)
}

#[test]
fn test_scanner_token_stream() {
    let kinds: Vec<TokenKind> = scan("key: [a, b]\n")
        .unwrap()
        .into_iter()
        .map(|token| token.kind)
        .collect();
    let ids: Vec<&str> = kinds.iter().map(TokenKind::id).collect();
    assert_eq!(
        ids,
        vec![
            "<stream start>",
            "<block mapping start>",
            "?",
            "<scalar>",
            ":",
            "[",
            "<scalar>",
            ",",
            "<scalar>",
            "]",
            "<block end>",
            "<stream end>",
        ]
    );
}

#[test]
fn test_parser_event_stream() {
    let names: Vec<&str> = parse("- &x a\n- *x\n")
        .unwrap()
        .iter()
        .map(|event| event.kind.name())
        .collect();
    assert_eq!(
        names,
        vec![
            "StreamStartEvent",
            "DocumentStartEvent",
            "SequenceStartEvent",
            "ScalarEvent",
            "AliasEvent",
            "SequenceEndEvent",
            "DocumentEndEvent",
            "StreamEndEvent",
        ]
    );
}

#[test]
fn test_parse_then_emit_keeps_layout() {
    let text = "a:\n- 1\n- 2\nb: {c: d}\n";
    let events = parse(text).unwrap();
    assert_eq!(emit(events, &DumpOptions::new()).unwrap(), text);
}

#[test]
fn test_indentation_round_trip() {
    let value = load("a:\n  - 1\n  - 2\n").unwrap();
    assert_eq!(value, mapping(vec![("a", Value::from(vec![1, 2]))]));

    let text = dump(&value, &DumpOptions::new()).unwrap();
    assert_eq!(text, "a:\n- 1\n- 2\n");
    assert_eq!(load(&text).unwrap(), value);

    let wide = dump(&value, &DumpOptions::new().with_indent(4)).unwrap();
    assert_eq!(load(&wide).unwrap(), value);
}

#[test]
fn test_redump_is_stable() {
    let text = "\
name: demo
ports:
- 80
- 443
limits: {cpu: 0.5, mem: 512}
notes: |
  first
  second
";
    let options = DumpOptions::new();
    let once = dump(&load(text).unwrap(), &options).unwrap();
    let twice = dump(&load(&once).unwrap(), &options).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_anchor_and_alias_load_as_values() {
    let value = load("a: &x 1\nb: *x\n").unwrap();
    assert_eq!(
        value,
        mapping(vec![("a", Value::from(1)), ("b", Value::from(1))])
    );
}

#[test]
fn test_shared_value_dumps_one_anchor() {
    let shared = SharedValue::new(Value::from(vec![1, 2]));
    let value = mapping(vec![
        ("a", Value::Shared(shared.clone())),
        ("b", Value::Shared(shared)),
    ]);
    let text = dump(&value, &DumpOptions::new()).unwrap();
    assert_eq!(text, "a: &id0001\n- 1\n- 2\nb: *id0001\n");
    assert_eq!(text.matches('&').count(), 1);
    assert_eq!(text.matches('*').count(), 1);

    let back = load(&text).unwrap();
    let (a, b) = (back.get("a").unwrap(), back.get("b").unwrap());
    assert!(a.as_shared().unwrap().ptr_eq(b.as_shared().unwrap()));
    assert_eq!(back.unshare().unwrap(), value.unshare().unwrap());
}

#[test]
fn test_recursive_sequence() {
    let value = load("&a [*a]\n").unwrap();
    let outer = value.as_shared().unwrap();
    let inner = outer.borrow();
    let items = inner.as_sequence().unwrap();
    assert_eq!(items.len(), 1);
    assert!(items[0].as_shared().unwrap().ptr_eq(outer));
    drop(inner);

    assert!(value.unshare().is_err());
    let text = dump(&value, &DumpOptions::new()).unwrap();
    assert_eq!(text, "&id0001\n- *id0001\n");
}

#[test]
fn test_merge_key_precedence() {
    let value = load("base: &b {x: 1}\nover: {<<: *b, x: 2}\n").unwrap();
    assert_eq!(value.get("over"), Some(&mapping(vec![("x", Value::from(2))])));

    let value = load(
        "\
one: &one {a: 1, b: 1}
two: &two {b: 2, c: 2}
both:
  <<: [*one, *two]
  c: 3
",
    )
    .unwrap();
    let both = value.get("both").unwrap();
    assert_eq!(both.get("a"), Some(&Value::from(1)));
    assert_eq!(both.get("b"), Some(&Value::from(1)));
    assert_eq!(both.get("c"), Some(&Value::from(3)));
}

#[test]
fn test_unterminated_flow_sequence() {
    let text = "a: [1, 2\n";
    let err = load(text).unwrap_err();
    assert!(err.is_parser());

    let marked = err.marked().unwrap();
    assert_eq!(marked.context.as_deref(), Some("while parsing a flow sequence"));
    let rendered = err.to_string();
    assert!(rendered.contains("expected ',' or ']'"));

    let open = text.find('[').unwrap();
    assert!(err.problem_mark().unwrap().index >= open);
    assert_eq!(marked.context_mark.as_ref().unwrap().index, open);
}

#[test]
fn test_stale_simple_key() {
    let key = "k".repeat(1100);

    let err = load(&format!("a: 1\n{}: 2\n", key)).unwrap_err();
    assert!(err.is_scanner());
    assert!(err.to_string().contains("could not find expected ':'"));

    let err = load(&format!("{}: 1\n", key)).unwrap_err();
    assert!(err.is_scanner());
    assert!(err.to_string().contains("mapping values are not allowed here"));
}

#[test]
fn test_empty_stream_boundary() {
    assert_eq!(load("").unwrap(), Value::Null);
    assert_eq!(load("# only a comment\n").unwrap(), Value::Null);
    assert!(load_all("").unwrap().is_empty());
    assert!(compose("").unwrap().is_none());
}

#[test]
fn test_multiple_documents_with_markers() {
    let values = load_all("--- 1\n...\n--- [2]\n---\n").unwrap();
    assert_eq!(values, vec![Value::from(1), Value::from(vec![2]), Value::Null]);
}

#[test]
fn test_implicit_types() {
    let value = load(
        "\
nothing: ~
bool: [yes, No, on, OFF, true]
int: [0x1F, 0o17, 017, 0b101, 1_000, '190:20:30']
sexagesimal: 190:20:30
float: [1.5e+3, .inf, -.Inf, 1_0.5]
stamp: 2001-12-14t21:59:43.10-05:00
",
    )
    .unwrap();

    assert_eq!(value.get("nothing"), Some(&Value::Null));
    assert_eq!(
        value.get("bool"),
        Some(&Value::from(vec![true, false, true, false, true]))
    );
    let ints = value.get("int").and_then(Value::as_sequence).unwrap();
    assert_eq!(ints[0], Value::from(31));
    assert_eq!(ints[1], Value::from(15));
    assert_eq!(ints[2], Value::from(15));
    assert_eq!(ints[3], Value::from(5));
    assert_eq!(ints[4], Value::from(1000));
    assert_eq!(ints[5], Value::from("190:20:30"));
    assert_eq!(value.get("sexagesimal"), Some(&Value::from(685_230)));

    let floats = value.get("float").and_then(Value::as_sequence).unwrap();
    assert_eq!(floats[0].as_f64(), Some(1500.0));
    assert_eq!(floats[1].as_f64(), Some(f64::INFINITY));
    assert_eq!(floats[2].as_f64(), Some(f64::NEG_INFINITY));
    assert_eq!(floats[3].as_f64(), Some(10.5));

    let stamp = value.get("stamp").and_then(Value::as_timestamp).unwrap();
    assert_eq!(stamp.to_rfc3339(), "2001-12-15T02:59:43.100+00:00");
}

#[test]
fn test_explicit_tags() {
    let value = load("a: !!str 123\nb: !!float 1\nc: !!binary aGk=\n").unwrap();
    assert_eq!(value.get("a"), Some(&Value::from("123")));
    assert_eq!(value.get("b").and_then(Value::as_f64), Some(1.0));
    assert_eq!(value.get("c").and_then(Value::as_binary), Some(&b"hi"[..]));

    let err = load("!unknown x\n").unwrap_err();
    assert!(err.is_constructor());
}

#[test]
fn test_block_scalars() {
    let value = load("lit: |\n  a\n  b\nfold: >\n  a\n  b\n\n  c\nstrip: |-\n  x\n").unwrap();
    assert_eq!(value.get("lit"), Some(&Value::from("a\nb\n")));
    assert_eq!(value.get("fold"), Some(&Value::from("a b\nc\n")));
    assert_eq!(value.get("strip"), Some(&Value::from("x")));
}

#[test]
fn test_emitter_scalar_styles() {
    let options = DumpOptions::new();
    let cases = [
        (Value::from("plain"), "plain\n...\n"),
        (Value::from("yes"), "'yes'\n"),
        (Value::from("it's"), "it's\n...\n"),
        (Value::from(" padded"), "' padded'\n"),
        (Value::from("tab\there"), "\"tab\\there\"\n"),
        (Value::from("bell\u{7}"), "\"bell\\a\"\n"),
    ];
    for (value, expected) in cases {
        let text = dump(&value, &options).unwrap();
        assert_eq!(text, expected);
        assert_eq!(load(&text).unwrap(), value);
    }

    let text = dump(&Value::from("caf\u{e9}"), &options).unwrap();
    assert_eq!(text, "caf\u{e9}\n...\n");
    let text = dump(
        &Value::from("caf\u{e9}"),
        &DumpOptions::new().with_allow_unicode(false),
    )
    .unwrap();
    assert_eq!(text, "\"caf\\xE9\"\n");
}

#[test]
fn test_long_scalar_wraps_and_loads_back() {
    let words = vec!["word"; 40].join(" ");
    let value = mapping(vec![("text", Value::from(words.as_str()))]);
    let text = dump(&value, &DumpOptions::new().with_width(30)).unwrap();
    assert!(text.lines().count() > 2);
    assert_eq!(load(&text).unwrap(), value);
}

#[test]
fn test_reader_rejects_control_characters() {
    let err = load("a: \u{1}\n").unwrap_err();
    assert!(err.is_reader());
    assert!(err.to_string().contains("#x0001"));
}

#[test]
fn test_unicode_line_breaks_round_trip() {
    let strings = ["\u{85}", "?,\u{85}x", "a\u{2028}b", "para\u{2029}", "mix\u{85}\n\u{2028} end"];
    let layouts = [
        DumpOptions::new(),
        DumpOptions::new().with_default_flow_style(Some(true)),
        DumpOptions::canonical(),
    ];
    for options in layouts.iter() {
        for s in strings {
            let value = mapping(vec![("k", Value::from(s)), ("seq", Value::from(vec![s]))]);
            let text = dump(&value, options).unwrap();
            let back = load(&text).unwrap_or_else(|e| panic!("failed to load {:?}: {}", text, e));
            assert_eq!(back, value, "dumped as {:?}", text);
            assert_eq!(dump(&back, options).unwrap(), text);
        }
    }
    assert_eq!(dump(&Value::from("\u{85}"), &DumpOptions::new()).unwrap(), "\"\\N\"\n");
}
