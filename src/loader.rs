//! Loading pipeline front end.
//!
//! A [`Loader`] chains the reader, scanner, parser and composer over one
//! input and constructs each composed document with its
//! [`ConstructorRegistry`]. Use it directly when a custom resolver or
//! constructor is needed; otherwise [`load`](crate::load) and
//! [`load_all`](crate::load_all) are shorter.
//!
//! ```rust
//! use serde_yamlet::{Loader, Value};
//!
//! let loader = Loader::new("--- 1\n--- two\n").unwrap();
//! let values: Vec<Value> = loader.collect::<Result<_, _>>().unwrap();
//! assert_eq!(values, vec![Value::from(1), Value::from("two")]);
//! ```

use crate::composer::Composer;
use crate::constructor::{Constructor, ConstructorRegistry};
use crate::error::{Error, Result};
use crate::parser::Parser;
use crate::reader::Reader;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::value::Value;

/// Yields one native value per document of the input.
#[derive(Debug)]
pub struct Loader {
    composer: Composer,
    constructors: ConstructorRegistry,
    failed: bool,
}

impl Loader {
    /// Creates a loader over `text` with the default resolver and constructors.
    ///
    /// # Errors
    ///
    /// Fails with a reader error if the text contains characters YAML does
    /// not allow.
    pub fn new(text: &str) -> Result<Self> {
        Ok(Self::from_reader(Reader::new(text)?))
    }

    /// Creates a loader over encoded bytes. The encoding is detected from the
    /// byte order mark and defaults to UTF-8.
    ///
    /// # Errors
    ///
    /// Fails with a decode error if the bytes are not valid in the detected
    /// encoding.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_reader(Reader::from_slice(bytes)?))
    }

    fn from_reader(reader: Reader) -> Self {
        let parser = Parser::from_scanner(Scanner::from_reader(reader));
        Loader {
            composer: Composer::from_parser(parser, Resolver::new()),
            constructors: ConstructorRegistry::new(),
            failed: false,
        }
    }

    /// Replaces the resolver used for implicit tags.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.composer = self.composer.with_resolver(resolver);
        self
    }

    /// Replaces the constructor registry.
    #[must_use]
    pub fn with_constructors(mut self, constructors: ConstructorRegistry) -> Self {
        self.constructors = constructors;
        self
    }

    /// Returns `true` if another document follows.
    pub fn check_value(&mut self) -> Result<bool> {
        self.composer.check_document()
    }

    /// Loads the next document, or returns `None` at the end of the stream.
    pub fn next_value(&mut self) -> Result<Option<Value>> {
        match self.composer.next_document()? {
            Some(document) => Constructor::new(&document, &self.constructors)
                .construct_document()
                .map(Some),
            None => Ok(None),
        }
    }

    /// Loads the only document of the stream; an empty stream loads as null.
    ///
    /// # Errors
    ///
    /// Fails with a composer error if the stream holds more than one document.
    pub fn single_value(&mut self) -> Result<Value> {
        match self.composer.single_document()? {
            Some(document) => {
                Constructor::new(&document, &self.constructors).construct_document()
            }
            None => Ok(Value::Null),
        }
    }
}

impl Iterator for Loader {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.next_value().transpose();
        if matches!(result, Some(Err(_))) {
            self.failed = true;
        }
        result
    }
}

/// Reads all of `reader` and creates a loader over its bytes.
///
/// # Errors
///
/// Fails with an IO error if reading fails, or a decode error if the bytes
/// are not valid in the detected encoding.
pub fn loader_from_reader<R: std::io::Read>(mut reader: R) -> Result<Loader> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Error::io(&e.to_string()))?;
    Loader::from_slice(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::NodeId;

    #[test]
    fn test_next_value_sequence() {
        let mut loader = Loader::new("a: 1\n---\n- x\n").unwrap();
        assert!(loader.check_value().unwrap());
        let first = loader.next_value().unwrap().unwrap();
        assert_eq!(first.get("a"), Some(&Value::from(1)));
        let second = loader.next_value().unwrap().unwrap();
        assert_eq!(second, Value::from(vec!["x"]));
        assert_eq!(loader.next_value().unwrap(), None);
    }

    #[test]
    fn test_single_value() {
        assert_eq!(Loader::new("").unwrap().single_value().unwrap(), Value::Null);
        let err = Loader::new("a\n--- b\n").unwrap().single_value().unwrap_err();
        assert!(err.is_composer());
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let mut loader = Loader::new("--- 1\n--- [\n--- 3\n").unwrap();
        assert_eq!(loader.next().unwrap().unwrap(), Value::from(1));
        assert!(loader.next().unwrap().is_err());
        assert!(loader.next().is_none());
    }

    #[test]
    fn test_custom_resolver() {
        let loader = Loader::new("yes").unwrap().with_resolver(Resolver::empty());
        let values: Vec<_> = loader.collect::<Result<_>>().unwrap();
        assert_eq!(values, vec![Value::from("yes")]);
    }

    #[test]
    fn test_custom_constructors() {
        fn shout(constructor: &mut Constructor<'_>, id: NodeId) -> Result<Value> {
            Ok(Value::from(format!("{}!", constructor.construct_scalar(id)?)))
        }
        let mut registry = ConstructorRegistry::new();
        registry.add_constructor("!shout", shout);
        let mut loader = Loader::new("- !shout hi\n").unwrap().with_constructors(registry);
        assert_eq!(loader.next_value().unwrap(), Some(Value::from(vec!["hi!"])));
    }

    #[test]
    fn test_from_slice_utf16() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "k: v".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let value = Loader::from_slice(&bytes).unwrap().single_value().unwrap();
        assert_eq!(value.get("k"), Some(&Value::from("v")));
    }

    #[test]
    fn test_loader_from_reader() {
        let value = loader_from_reader("x: 2".as_bytes())
            .unwrap()
            .single_value()
            .unwrap();
        assert_eq!(value.get("x").and_then(Value::as_i64), Some(2));
    }
}
