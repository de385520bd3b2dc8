//! Working with Value for runtime flexibility.
//!
//! Run with: cargo run --example dynamic_values

use serde::{Deserialize, Serialize};
use serde_yamlet::{dump, from_value, load, to_value, DumpOptions, Value};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize)]
struct User {
    id: u32,
    name: String,
    roles: Vec<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Every implicit type resolves to a distinct Value variant
    let doc = load(
        "\
host: localhost
port: 8080
ratio: 1.5e-3
debug: off
big: 123456789012345678901234567890
created: 2001-12-14 21:59:43.10 -5
payload: !!binary aGVsbG8=
tags: !!set {a, b}
steps: !!omap [{one: 1}, {two: 2}]
",
    )?;

    if let Value::Mapping(map) = &doc {
        for (key, value) in map.iter() {
            println!("{:<8} {:?}", key.to_string(), value.kind());
        }
    }

    if let Some(port) = doc.get("port").and_then(Value::as_i64) {
        println!("\nport + 1 = {}", port + 1);
    }
    if let Some(created) = doc.get("created").and_then(Value::as_timestamp) {
        println!("created (UTC) = {}", created.to_rfc3339());
    }
    if let Some(payload) = doc.get("payload").and_then(Value::as_binary) {
        println!("payload = {}", String::from_utf8_lossy(payload));
    }

    println!("\nDumped back:\n{}", dump(&doc, &DumpOptions::new())?);

    // Convert existing struct to Value and back
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        roles: vec!["admin".to_string(), "developer".to_string()],
    };

    let user_value = to_value(&user)?;
    println!("User as Value:\n{}\n", user_value);

    println!("Type checks:");
    println!("  is_mapping:  {}", user_value.is_mapping());
    println!("  is_sequence: {}", user_value.is_sequence());
    println!("  is_string:   {}", user_value.is_string());

    let user_back: User = from_value(user_value)?;
    println!("\nBack to struct: {:?}", user_back);

    Ok(())
}
