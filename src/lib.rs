//! # serde_yamlet
//!
//! A YAML 1.1 processor with a Serde bridge.
//!
//! ## Pipeline
//!
//! Loading runs text through four stages, each usable on its own:
//!
//! - **Scanner** ([`scan`]): characters to tokens, tracking indentation and
//!   simple keys
//! - **Parser** ([`parse`]): tokens to events, expanding tag handles
//! - **Composer** ([`compose`]): events to a representation graph, resolving
//!   implicit tags and aliases
//! - **Constructor** ([`load`]): graph to native [`Value`]s
//!
//! Dumping runs the inverse chain: representer, serializer (anchors and
//! aliases), emitter (layout and scalar styles). [`dump`] runs all three;
//! [`serialize`] and [`emit`] start further down.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_yamlet::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     roles: Vec<String>,
//! }
//!
//! let user = User { id: 7, name: "Ada".into(), roles: vec!["admin".into()] };
//! let text = to_string(&user).unwrap();
//! assert_eq!(text, "id: 7\nname: Ada\nroles:\n- admin\n");
//!
//! let back: User = from_str(&text).unwrap();
//! assert_eq!(user, back);
//! ```
//!
//! ### Dynamic Values
//!
//! ```rust
//! use serde_yamlet::{load, Value};
//!
//! let doc = load("defaults: &d {retries: 3}\nprod:\n  <<: *d\n  host: example.org\n").unwrap();
//! let prod = doc.get("prod").unwrap();
//! assert_eq!(prod.get("retries"), Some(&Value::from(3)));
//! ```
//!
//! ### Building Values with `yaml!`
//!
//! ```rust
//! use serde_yamlet::{dump, yaml, DumpOptions};
//!
//! let value = yaml!({"when": "2001-12-14", "on": "yes"});
//! let text = dump(&value, &DumpOptions::new()).unwrap();
//! // Strings that would load as other types are quoted.
//! assert_eq!(text, "when: '2001-12-14'\n'on': 'yes'\n");
//! ```
//!
//! ## Demos
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - serde round trip of user records
//! - **`macro.rs`** - building values with the `yaml!` macro
//! - **`anchors.rs`** - anchors, aliases, merge keys and shared values
//! - **`dynamic_values.rs`** - inspecting loaded `Value`s
//! - **`custom_options.rs`** - dump options and custom tags
//! - **`event_stream.rs`** - the token and event layers
//!
//! Run any demo with: `cargo run --example <name>`

pub mod composer;
pub mod constructor;
pub mod de;
pub mod dumper;
pub mod emitter;
pub mod error;
pub mod events;
pub mod loader;
pub mod macros;
pub mod map;
pub mod mark;
pub mod nodes;
pub mod options;
pub mod parser;
pub mod reader;
pub mod representer;
pub mod resolver;
pub mod scanner;
pub mod ser;
pub mod serializer;
pub mod tokens;
pub mod value;

pub use de::Deserializer;
pub use dumper::Dumper;
pub use error::{Error, MarkedError, Result};
pub use loader::Loader;
pub use map::Mapping;
pub use mark::Mark;
pub use options::{DumpOptions, LineBreak};
pub use ser::ValueSerializer;
pub use tokens::ScalarStyle;
pub use value::{Number, SharedValue, Value, ValueKind};

use crate::composer::Composer;
use crate::emitter::Emitter;
use crate::events::Event;
use crate::nodes::Document;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::serializer::Serializer;
use crate::tokens::Token;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Scans `text` into tokens.
///
/// # Errors
///
/// Returns the first reader or scanner error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn scan(text: &str) -> Result<Vec<Token>> {
    Scanner::new(text)?.collect()
}

/// Parses `text` into events.
///
/// # Errors
///
/// Returns the first reader, scanner or parser error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(text: &str) -> Result<Vec<Event>> {
    Parser::new(text)?.collect()
}

/// Composes the single document of `text`, or `None` for an empty stream.
///
/// # Examples
///
/// ```rust
/// use serde_yamlet::compose;
/// use serde_yamlet::resolver::INT_TAG;
///
/// let doc = compose("- &a 1\n- *a\n").unwrap().unwrap();
/// let items = doc.root_node().unwrap().as_sequence().unwrap();
/// assert_eq!(items[0], items[1]);
/// assert_eq!(doc.node(items[0]).tag, INT_TAG);
/// ```
///
/// # Errors
///
/// Fails on invalid YAML or when the stream holds more than one document.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn compose(text: &str) -> Result<Option<Document>> {
    Composer::new(text)?.single_document()
}

/// Composes every document of `text`.
///
/// # Errors
///
/// Returns the first error met while composing.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn compose_all(text: &str) -> Result<Vec<Document>> {
    Composer::new(text)?.collect()
}

/// Loads the single document of `text` as a [`Value`].
///
/// An empty stream loads as [`Value::Null`].
///
/// # Examples
///
/// ```rust
/// use serde_yamlet::{load, Value};
///
/// assert_eq!(load("").unwrap(), Value::Null);
/// assert_eq!(load("0x1F").unwrap(), Value::from(31));
/// assert!(load("a\n--- b\n").is_err());
/// ```
///
/// # Errors
///
/// Fails on invalid YAML, on a node that cannot be constructed, or when the
/// stream holds more than one document.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn load(text: &str) -> Result<Value> {
    Loader::new(text)?.single_value()
}

/// Loads every document of `text`.
///
/// # Examples
///
/// ```rust
/// use serde_yamlet::{load_all, Value};
///
/// assert_eq!(load_all("").unwrap(), Vec::<Value>::new());
/// assert_eq!(load_all("1\n--- 2\n").unwrap(), vec![Value::from(1), Value::from(2)]);
/// ```
///
/// # Errors
///
/// Returns the first error met while loading.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn load_all(text: &str) -> Result<Vec<Value>> {
    Loader::new(text)?.collect()
}

/// Loads the single document of encoded bytes (UTF-8, or UTF-16 with a byte
/// order mark).
///
/// # Errors
///
/// Fails like [`load`], or with a decode error for malformed bytes.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn load_from_slice(bytes: &[u8]) -> Result<Value> {
    Loader::from_slice(bytes)?.single_value()
}

/// Dumps one value as a single-document stream.
///
/// # Errors
///
/// Fails if the value cannot be represented or emitted.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn dump(value: &Value, options: &DumpOptions) -> Result<String> {
    Dumper::new(options.clone()).dump(value)
}

/// Dumps each value as one document of a stream.
///
/// # Errors
///
/// Fails if a value cannot be represented or emitted.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn dump_all(values: &[Value], options: &DumpOptions) -> Result<String> {
    Dumper::new(options.clone()).dump_all(values)
}

/// Writes an event stream as text.
///
/// # Examples
///
/// ```rust
/// use serde_yamlet::{emit, parse, DumpOptions};
///
/// let events = parse("{a: [1, 2]}").unwrap();
/// assert_eq!(emit(events, &DumpOptions::new()).unwrap(), "{a: [1, 2]}\n");
/// ```
///
/// # Errors
///
/// Fails if the events are out of order or cannot be written.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn emit(events: impl IntoIterator<Item = Event>, options: &DumpOptions) -> Result<String> {
    let mut emitter = Emitter::new(options);
    for event in events {
        emitter.emit(event)?;
    }
    Ok(emitter.into_output())
}

/// Writes one representation graph as a single-document stream.
///
/// # Errors
///
/// Fails if the document has no root node or cannot be emitted.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn serialize(document: &Document, options: &DumpOptions) -> Result<String> {
    serialize_all(std::slice::from_ref(document), options)
}

/// Writes each representation graph as one document of a stream.
///
/// # Errors
///
/// Fails if a document has no root node or cannot be emitted.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn serialize_all(documents: &[Document], options: &DumpOptions) -> Result<String> {
    let mut serializer = Serializer::new(options, Resolver::new());
    serializer.open()?;
    for document in documents {
        serializer.serialize(document)?;
    }
    serializer.close()?;
    Ok(serializer.into_output())
}

/// Serialize any `T: Serialize` to a YAML string.
///
/// # Examples
///
/// ```rust
/// use serde_yamlet::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// assert_eq!(to_string(&Point { x: 1, y: 2 }).unwrap(), "x: 1\ny: 2\n");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized (for example a map
/// key that cannot be hashed).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &DumpOptions::default())
}

/// Serialize any `T: Serialize` to a YAML string with custom options.
///
/// # Examples
///
/// ```rust
/// use serde_yamlet::{to_string_with_options, DumpOptions};
///
/// let options = DumpOptions::new().with_default_flow_style(Some(true));
/// assert_eq!(to_string_with_options(&vec![1, 2], &options).unwrap(), "[1, 2]\n");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: &DumpOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    dump(&to_value(value)?, options)
}

/// Convert any `T: Serialize` to a [`Value`].
///
/// # Examples
///
/// ```rust
/// use serde_yamlet::{to_value, Value};
///
/// let value = to_value(&("a", 1)).unwrap();
/// assert_eq!(value, Value::from(vec![Value::from("a"), Value::from(1)]));
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

/// Serialize any `T: Serialize` to a writer as YAML.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, &DumpOptions::default())
}

/// Serialize any `T: Serialize` to a writer as YAML with custom options.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: &DumpOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string_with_options(value, options)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Deserialize an instance of type `T` from YAML text.
///
/// An empty stream deserializes from null, which fits `Option<T>` and `()`.
///
/// # Examples
///
/// ```rust
/// use serde_yamlet::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("x: 1\ny: 2").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is not valid YAML, holds more than one
/// document, or cannot be deserialized to type `T`. Syntax errors carry
/// line and column information.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(text: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(load(text)?)
}

/// Deserialize an instance of type `T` from YAML bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid in the detected encoding, or
/// for any reason [`from_str`] would.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(load_from_slice(bytes)?)
}

/// Deserialize an instance of type `T` from an I/O stream of YAML.
///
/// # Examples
///
/// ```rust
/// use serde_yamlet::from_reader;
/// use std::io::Cursor;
///
/// let values: Vec<u8> = from_reader(Cursor::new(b"[1, 2]")).unwrap();
/// assert_eq!(values, vec![1, 2]);
/// ```
///
/// # Errors
///
/// Returns an error if reading from the reader fails, or for any reason
/// [`from_slice`] would.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_slice(&bytes)
}

/// Deserialize an instance of type `T` from a [`Value`].
///
/// # Examples
///
/// ```rust
/// use serde_yamlet::{from_value, yaml};
///
/// let pair: (String, i64) = from_value(yaml!(["a", 1])).unwrap();
/// assert_eq!(pair, ("a".to_string(), 1));
/// ```
///
/// # Errors
///
/// Returns an error if the value does not match the shape of `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(Deserializer::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
        active: bool,
        tags: Vec<String>,
    }

    fn user() -> User {
        User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["admin".to_string(), "on".to_string()],
        }
    }

    #[test]
    fn test_serialize_deserialize_point() {
        let point = Point { x: 1, y: 2 };
        let text = to_string(&point).unwrap();
        let point_back: Point = from_str(&text).unwrap();
        assert_eq!(point, point_back);
    }

    #[test]
    fn test_serialize_deserialize_user() {
        let text = to_string(&user()).unwrap();
        assert_eq!(
            text,
            "id: 123\nname: Alice\nactive: true\ntags:\n- admin\n- 'on'\n"
        );
        let user_back: User = from_str(&text).unwrap();
        assert_eq!(user(), user_back);
    }

    #[test]
    fn test_custom_options_round_trip() {
        let options = DumpOptions::new()
            .with_indent(4)
            .with_default_flow_style(Some(true))
            .with_explicit_start(true);
        let text = to_string_with_options(&user(), &options).unwrap();
        assert!(text.starts_with("--- {"));
        let user_back: User = from_str(&text).unwrap();
        assert_eq!(user(), user_back);
    }

    #[test]
    fn test_to_value() {
        let value = to_value(&Point { x: 1, y: 2 }).unwrap();
        assert_eq!(value.get("x"), Some(&Value::Number(Number::Integer(1))));
        assert_eq!(value.get("y"), Some(&Value::Number(Number::Integer(2))));
    }

    #[test]
    fn test_scan_parse_compose() {
        assert_eq!(scan("a").unwrap().len(), 3);
        assert_eq!(parse("a").unwrap().len(), 5);
        assert!(compose("").unwrap().is_none());
        assert_eq!(compose_all("1\n--- 2\n").unwrap().len(), 2);
    }

    #[test]
    fn test_serialize_round_trip() {
        let text = "- &a [1, b]\n- *a\n";
        let document = compose(text).unwrap().unwrap();
        let out = serialize(&document, &DumpOptions::new()).unwrap();
        assert_eq!(out, "- &id0001 [1, b]\n- *id0001\n");
        let reloaded = load(&out).unwrap().unshare().unwrap();
        assert_eq!(reloaded, load(text).unwrap().unshare().unwrap());
    }

    #[test]
    fn test_emit_round_trip() {
        let text = "a:\n- 1\n- 'x y'\n";
        let events = parse(text).unwrap();
        assert_eq!(emit(events, &DumpOptions::new()).unwrap(), text);
    }

    #[test]
    fn test_load_from_slice_rejects_bad_utf8() {
        let err = load_from_slice(b"a: \xff").unwrap_err();
        assert!(matches!(err, Error::Decode { offset: 3, .. }));
    }

    #[test]
    fn test_writer_and_reader() {
        let mut buffer = Vec::new();
        to_writer(&mut buffer, &Point { x: 3, y: 4 }).unwrap();
        let point: Point = from_reader(buffer.as_slice()).unwrap();
        assert_eq!(point, Point { x: 3, y: 4 });
    }
}
