//! Anchors, aliases, merge keys and shared values.
//!
//! Run with: cargo run --example anchors

use serde_yamlet::{dump, load, DumpOptions, SharedValue, Value};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let options = DumpOptions::new();

    // Merge keys pull entries from anchored mappings; explicit keys win
    let text = "\
defaults: &defaults
  adapter: postgres
  host: localhost
development:
  <<: *defaults
  database: dev
test:
  <<: *defaults
  host: ci.internal
  database: test
";
    let config = load(text)?;
    if let Some(test) = config.get("test") {
        println!("test.host    = {}", test.get("host").unwrap_or(&Value::Null));
        println!("test.adapter = {}", test.get("adapter").unwrap_or(&Value::Null));
    }

    // An aliased collection loads as one shared value
    let doc = load("first: &list [1, 2]\nsecond: *list\n")?;
    if let (Some(Value::Shared(a)), Some(Value::Shared(b))) = (doc.get("first"), doc.get("second")) {
        println!("\nfirst and second share storage: {}", a.ptr_eq(b));
        if let Value::Sequence(items) = &mut *b.borrow_mut() {
            items.push(Value::from(3));
        }
        println!("after pushing through `second`: first = {}", a.borrow());
    }

    // Dumping a shared value writes one anchor and one alias per extra use
    let shared = SharedValue::new(Value::from(vec!["x", "y"]));
    let value = Value::from(vec![Value::Shared(shared.clone()), Value::Shared(shared)]);
    println!("\nShared sequence:\n{}", dump(&value, &options)?);

    // A recursive structure round-trips through an alias to itself
    let recursive = load("&me [a, *me]\n")?;
    println!("Recursive sequence:\n{}", dump(&recursive, &options)?);
    match recursive.unshare() {
        Ok(_) => println!("unexpectedly finite"),
        Err(err) => println!("unshare: {}", err),
    }

    Ok(())
}
