//! Using the yaml! macro for dynamic value construction.
//!
//! Run with: cargo run --example macro

use serde_yamlet::{dump, yaml, DumpOptions, Value};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let options = DumpOptions::new();

    println!("Primitives:");
    println!("  null:   {}", yaml!(null));
    println!("  bool:   {}", yaml!(true));
    println!("  number: {}", yaml!(42));
    println!("  text:   {}\n", yaml!("Hello, YAML!"));

    let numbers = yaml!([1, 2, 3, 4, 5]);
    let mixed = yaml!([1, "two", true, null, (-3.5)]);

    println!("Sequences:");
    print!("{}", dump(&numbers, &options)?);
    println!("{}", dump(&mixed, &options.clone().with_default_flow_style(Some(true)))?);

    let config = yaml!({
        "app": {
            "name": "MyApp",
            "version": "1.0.0"
        },
        "database": {
            "host": "localhost",
            "port": 5432,
            "name": "mydb"
        },
        "features": ["auth", "logging", "metrics"],
        "debug": true,
        404: "numeric keys work too"
    });

    println!("Nested structures:");
    println!("{}", dump(&config, &options)?);

    let items: Vec<Value> = (1..=3)
        .map(|id| yaml!({"id": id, "status": (if id == 1 { "active" } else { "pending" })}))
        .collect();
    let summary = yaml!({
        "total": (items.len()),
        "items": items
    });

    println!("Dynamic construction:");
    println!("{}", dump(&summary, &options)?);

    if let Some(name) = config.get("app").and_then(|app| app.get("name")) {
        println!("App name: {}", name);
    }
    if let Some(features) = config.get("features").and_then(Value::as_sequence) {
        println!("Features: {}", features.len());
    }

    Ok(())
}
