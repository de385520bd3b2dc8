//! Basic YAML serialization and deserialization.
//!
//! Run with: cargo run --example simple

use serde::{Deserialize, Serialize};
use serde_yamlet::{from_str, to_string};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct User {
    id: u32,
    name: String,
    email: String,
    roles: Vec<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let users = vec![
        User {
            id: 42,
            name: "Alice Johnson".to_string(),
            email: "alice@example.com".to_string(),
            roles: vec!["admin".to_string()],
        },
        User {
            id: 43,
            name: "Bob Smith".to_string(),
            email: "bob@example.com".to_string(),
            roles: vec![],
        },
    ];

    // Serialize to YAML
    let yaml = to_string(&users)?;
    println!("YAML output:\n{}", yaml);

    // Deserialize back to struct
    let users_back: Vec<User> = from_str(&yaml)?;
    assert_eq!(users, users_back);
    println!("Round-trip successful");

    // Hand-written documents may use any YAML layout
    let written = "\
- {id: 44, name: Carol, email: carol@example.com, roles: [ops, 'on']}
- id: 0x2D
  name: >
    Dave
  email: dave@example.com
  roles:
    - dev
";
    let more: Vec<User> = from_str(written)?;
    println!("\nLoaded {} users, second id = {}", more.len(), more[1].id);
    println!("Carol's roles: {:?}", more[0].roles);

    Ok(())
}
