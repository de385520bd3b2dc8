//! Customizing YAML output with DumpOptions.
//!
//! Run with: cargo run --example custom_options

use serde::{Deserialize, Serialize};
use serde_yamlet::constructor::{Constructor, ConstructorRegistry};
use serde_yamlet::nodes::{Node, NodeId};
use serde_yamlet::representer::{Representer, RepresenterRegistry};
use serde_yamlet::{
    from_str, to_string_with_options, DumpOptions, Dumper, LineBreak, Loader, ScalarStyle,
    Value, ValueKind,
};
use std::error::Error;

/// Writes every string as a `!secret` scalar with its text reversed.
fn represent_secret(representer: &mut Representer<'_>, value: &Value) -> serde_yamlet::Result<Node> {
    let hidden: String = value.as_str().unwrap_or_default().chars().rev().collect();
    Ok(representer.represent_scalar("!secret", hidden))
}

fn construct_secret(constructor: &mut Constructor<'_>, id: NodeId) -> serde_yamlet::Result<Value> {
    let hidden = constructor.construct_scalar(id)?;
    Ok(Value::from(hidden.chars().rev().collect::<String>()))
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Server {
    name: String,
    address: String,
    ports: Vec<u16>,
    motd: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let server = Server {
        name: "edge-1".to_string(),
        address: "10.0.0.1".to_string(),
        ports: vec![80, 443],
        motd: "Welcome to edge-1.\nAuthorized users only.\n".to_string(),
    };

    let variants = [
        ("Default block style", DumpOptions::new()),
        (
            "Flow collections",
            DumpOptions::new().with_default_flow_style(Some(true)),
        ),
        (
            "Four-space indent, sorted keys, document markers",
            DumpOptions::new()
                .with_indent(4)
                .with_sort_keys(true)
                .with_explicit_start(true)
                .with_explicit_end(true),
        ),
        (
            "Literal block scalars",
            DumpOptions::new().with_default_style(Some(ScalarStyle::Literal)),
        ),
        (
            "ASCII only with a %YAML directive",
            DumpOptions::new()
                .with_allow_unicode(false)
                .with_version(Some((1, 1))),
        ),
        ("Canonical", DumpOptions::canonical()),
        ("Narrow width", DumpOptions::new().with_width(20)),
    ];

    for (title, options) in variants.iter() {
        let yaml = to_string_with_options(&server, options)?;
        println!("{}:\n{}", title, yaml);

        let back: Server = from_str(&yaml)?;
        assert_eq!(server, back);
    }

    let crlf = to_string_with_options(
        &server.ports,
        &DumpOptions::new().with_line_break(LineBreak::CrLf),
    )?;
    println!("CRLF line breaks: {:?}\n", crlf);

    // Custom tags: a representer on the way out, a constructor on the way in
    let mut representers = RepresenterRegistry::new();
    representers.add_representer(ValueKind::String, represent_secret);
    let dumper = Dumper::new(DumpOptions::new()).with_representers(representers);
    let yaml = dumper.dump(&Value::from(vec!["hunter2", "swordfish"]))?;
    println!("Custom tag output:\n{}", yaml);

    let mut constructors = ConstructorRegistry::new();
    constructors.add_constructor("!secret", construct_secret);
    let mut loader = Loader::new(&yaml)?.with_constructors(constructors);
    if let Some(value) = loader.next_value()? {
        println!("Loaded back: {}", value);
    }

    Ok(())
}
