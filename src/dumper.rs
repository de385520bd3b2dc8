//! Dumping pipeline front end.
//!
//! A [`Dumper`] chains the representer, serializer and emitter. It keeps
//! the options, the resolver used to decide which tags may stay implicit,
//! and the representer registry, so one dumper can write many streams.
//!
//! ```rust
//! use serde_yamlet::{yaml, DumpOptions, Dumper};
//!
//! let dumper = Dumper::new(DumpOptions::new().with_explicit_start(true));
//! let text = dumper.dump_all(&[yaml!(1), yaml!({"a": null})]).unwrap();
//! assert_eq!(text, "--- 1\n--- a: null\n");
//! ```

use crate::error::Result;
use crate::options::DumpOptions;
use crate::representer::{Representer, RepresenterRegistry};
use crate::resolver::Resolver;
use crate::serializer::Serializer;
use crate::value::Value;

/// Writes native values as YAML text.
#[derive(Clone, Debug, Default)]
pub struct Dumper {
    options: DumpOptions,
    resolver: Resolver,
    representers: RepresenterRegistry,
}

impl Dumper {
    /// Creates a dumper with the default resolver and representers.
    #[must_use]
    pub fn new(options: DumpOptions) -> Self {
        Dumper {
            options,
            resolver: Resolver::new(),
            representers: RepresenterRegistry::new(),
        }
    }

    #[must_use]
    pub fn options(&self) -> &DumpOptions {
        &self.options
    }

    /// Replaces the resolver used to decide implicit tags.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replaces the representer registry.
    #[must_use]
    pub fn with_representers(mut self, representers: RepresenterRegistry) -> Self {
        self.representers = representers;
        self
    }

    /// Writes one value as a single-document stream.
    ///
    /// # Errors
    ///
    /// Fails if a value cannot be represented or the emitter rejects the
    /// resulting events.
    pub fn dump(&self, value: &Value) -> Result<String> {
        self.dump_all(std::slice::from_ref(value))
    }

    /// Writes each value as one document of a stream.
    ///
    /// # Errors
    ///
    /// Fails if a value cannot be represented or the emitter rejects the
    /// resulting events.
    pub fn dump_all(&self, values: &[Value]) -> Result<String> {
        let mut serializer = Serializer::new(&self.options, self.resolver.clone());
        serializer.open()?;
        let mut representer = Representer::new(&self.representers, &self.options);
        for value in values {
            let document = representer.represent(value)?;
            serializer.serialize(&document)?;
        }
        serializer.close()?;
        Ok(serializer.into_output())
    }
}
