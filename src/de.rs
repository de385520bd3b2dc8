//! Serde deserialization from YAML.
//!
//! Text is loaded into a [`Value`] by the regular pipeline and then handed to
//! [`Deserializer`], which drives any `T: Deserialize` from that tree. Shared
//! values are read through their handle, so an aliased node deserializes into
//! independent copies. A recursive value would never end, so nesting deeper
//! than [`MAX_DEPTH`] is an error.
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_yamlet::from_str;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Server {
//!     host: String,
//!     ports: Vec<u16>,
//!     tls: Option<bool>,
//! }
//!
//! let yaml = "host: example.org\nports: [80, 443]\n";
//! let server: Server = from_str(yaml).unwrap();
//! assert_eq!(
//!     server,
//!     Server { host: "example.org".into(), ports: vec![80, 443], tls: None }
//! );
//! ```
//!
//! Anchors and merge keys are resolved before deserialization:
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use serde_yamlet::from_str;
//!
//! let yaml = "base: &b {x: 1}\nderived: {<<: *b, y: 2}\n";
//! let doc: BTreeMap<String, BTreeMap<String, i32>> = from_str(yaml).unwrap();
//! assert_eq!(doc["derived"]["x"], 1);
//! assert_eq!(doc["derived"]["y"], 2);
//! ```

use crate::error::{Error, Result};
use crate::value::{Number, Value};
use num_bigint::BigInt;
use serde::de::{self, IntoDeserializer};
use serde::forward_to_deserialize_any;

/// Maximum nesting of collections followed while deserializing.
pub const MAX_DEPTH: usize = 512;

/// Serde deserializer reading from a [`Value`] tree.
pub struct Deserializer {
    value: Value,
    depth: usize,
}

impl Deserializer {
    #[must_use]
    pub fn new(value: Value) -> Self {
        Deserializer { value, depth: 0 }
    }

    /// Loads the single document of `text`.
    ///
    /// # Errors
    ///
    /// Fails if the text is not valid YAML or holds more than one document.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Result<Self> {
        Ok(Self::new(crate::load(text)?))
    }

    fn nested(&self, value: Value) -> Result<Self> {
        if self.depth >= MAX_DEPTH {
            return Err(Error::custom(format!(
                "recursion limit of {} exceeded while deserializing",
                MAX_DEPTH
            )));
        }
        Ok(Deserializer {
            value,
            depth: self.depth + 1,
        })
    }

    /// Replaces a shared handle with a copy of its content.
    fn resolve_shared(self) -> Result<Self> {
        match &self.value {
            Value::Shared(shared) => {
                let inner = shared.borrow().clone();
                self.nested(inner)?.resolve_shared()
            }
            _ => Ok(self),
        }
    }
}

fn visit_bigint<'de, V>(number: BigInt, visitor: V) -> Result<V::Value>
where
    V: de::Visitor<'de>,
{
    if let Ok(v) = i64::try_from(&number) {
        visitor.visit_i64(v)
    } else if let Ok(v) = u64::try_from(&number) {
        visitor.visit_u64(v)
    } else if let Ok(v) = i128::try_from(&number) {
        visitor.visit_i128(v)
    } else if let Ok(v) = u128::try_from(&number) {
        visitor.visit_u128(v)
    } else {
        visitor.visit_string(number.to_string())
    }
}

fn pairs_deserializer(pairs: Vec<(Value, Value)>, depth: usize) -> MapDeserializer {
    MapDeserializer {
        iter: pairs.into_iter(),
        value: None,
        depth,
    }
}

impl<'de> de::Deserializer<'de> for Deserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let this = self.resolve_shared()?;
        let depth = this.depth;
        match this.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(Number::Integer(i)) => visitor.visit_i64(i),
            Value::Number(number) => visitor.visit_f64(number.as_f64()),
            Value::BigInt(number) => visit_bigint(number, visitor),
            Value::String(s) => visitor.visit_string(s),
            Value::Timestamp(t) => visitor.visit_string(t.to_rfc3339()),
            Value::Binary(bytes) => visitor.visit_byte_buf(bytes),
            Value::Sequence(items) => visitor.visit_seq(SeqDeserializer::new(items, depth)),
            Value::Set(items) => {
                visitor.visit_seq(SeqDeserializer::new(items.into_iter().collect(), depth))
            }
            Value::Mapping(map) => {
                visitor.visit_map(pairs_deserializer(map.into_iter().collect(), depth))
            }
            Value::OrderedMap(pairs) | Value::Pairs(pairs) => {
                visitor.visit_map(pairs_deserializer(pairs, depth))
            }
            Value::Shared(_) => Err(Error::custom("unresolved shared value")),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let this = self.resolve_shared()?;
        match this.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(this),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.resolve_shared()?.value {
            Value::Null => visitor.visit_unit(),
            other => Err(Error::custom(format!(
                "expected null, found {:?}",
                other.kind()
            ))),
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let this = self.resolve_shared()?;
        match this.value {
            Value::Binary(bytes) => visitor.visit_byte_buf(bytes),
            Value::String(s) => visitor.visit_string(s),
            _ => this.deserialize_any(visitor),
        }
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let this = self.resolve_shared()?;
        let depth = this.depth;
        match this.value {
            Value::String(s) => visitor.visit_enum(s.into_deserializer()),
            Value::Mapping(map) => {
                if map.len() != 1 {
                    return Err(Error::custom(format!(
                        "expected a mapping with a single variant, found {} entries",
                        map.len()
                    )));
                }
                let mut entries = map.into_iter();
                match entries.next() {
                    Some((Value::String(variant), value)) => {
                        visitor.visit_enum(EnumDeserializer {
                            variant,
                            value,
                            depth,
                        })
                    }
                    _ => Err(Error::custom("enum variant name must be a string")),
                }
            }
            other => Err(Error::custom(format!(
                "expected an enum variant, found {:?}",
                other.kind()
            ))),
        }
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        seq tuple tuple_struct map struct identifier
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
    depth: usize,
}

impl SeqDeserializer {
    fn new(items: Vec<Value>, depth: usize) -> Self {
        SeqDeserializer {
            iter: items.into_iter(),
            depth,
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => {
                let parent = Deserializer {
                    value: Value::Null,
                    depth: self.depth,
                };
                seed.deserialize(parent.nested(value)?).map(Some)
            }
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: std::vec::IntoIter<(Value, Value)>,
    value: Option<Value>,
    depth: usize,
}

impl MapDeserializer {
    fn child(&self, value: Value) -> Result<Deserializer> {
        Deserializer {
            value: Value::Null,
            depth: self.depth,
        }
        .nested(value)
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(self.child(key)?).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(self.child(value)?),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: Value,
    depth: usize,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = Deserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(Deserializer::new(Value::String(self.variant)))?;
        let content = Deserializer {
            value: Value::Null,
            depth: self.depth,
        }
        .nested(self.value)?;
        Ok((variant, content))
    }
}

impl<'de> de::VariantAccess<'de> for Deserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.resolve_shared()?.value {
            Value::Null => Ok(()),
            other => Err(Error::custom(format!(
                "expected a unit variant, found {:?}",
                other.kind()
            ))),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(self)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(self, visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_map(self, visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SharedValue;
    use crate::{from_reader, from_str, from_value};
    use serde::Deserialize;
    use std::collections::{BTreeMap, HashSet};

    #[derive(Deserialize, Debug, PartialEq)]
    struct Config {
        name: String,
        retries: u8,
        ratio: f64,
        tags: Vec<String>,
        parent: Option<Box<Config>>,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    enum Action {
        Stop,
        Go(u32),
        Turn(i32, i32),
        Jump { height: f32 },
    }

    #[test]
    fn test_struct() {
        let yaml = "name: a\nretries: 3\nratio: 0.5\ntags: [x, y]\nparent:\n";
        let config: Config = from_str(yaml).unwrap();
        assert_eq!(config.retries, 3);
        assert_eq!(config.tags, vec!["x", "y"]);
        assert!(config.parent.is_none());
    }

    #[test]
    fn test_integer_into_float_field() {
        let yaml = "name: a\nretries: 0\nratio: 2\ntags: []\nparent: ~\n";
        let config: Config = from_str(yaml).unwrap();
        assert_eq!(config.ratio, 2.0);
    }

    #[test]
    fn test_enums() {
        let actions: Vec<Action> =
            from_str("- Stop\n- Go: 5\n- Turn: [1, -1]\n- Jump: {height: 1.5}\n").unwrap();
        assert_eq!(
            actions,
            vec![
                Action::Stop,
                Action::Go(5),
                Action::Turn(1, -1),
                Action::Jump { height: 1.5 },
            ]
        );
    }

    #[test]
    fn test_enum_mapping_must_have_one_entry() {
        let err = from_str::<Action>("{Go: 1, Stop: null}").unwrap_err();
        assert!(err.to_string().contains("single variant"));
    }

    #[test]
    fn test_out_of_range() {
        assert!(from_str::<u8>("300").is_err());
        assert!(from_str::<u32>("-1").is_err());
        assert_eq!(from_str::<u64>("18446744073709551615").unwrap(), u64::MAX);
        assert_eq!(from_str::<i128>("-170141183460469231731687303715884105728").unwrap(), i128::MIN);
    }

    #[test]
    fn test_aliases_deserialize_as_copies() {
        let doc: BTreeMap<String, Vec<i32>> = from_str("a: &x [1, 2]\nb: *x\n").unwrap();
        assert_eq!(doc["a"], doc["b"]);
    }

    #[test]
    fn test_set_and_binary() {
        let set: HashSet<String> = from_str("!!set {a, b}").unwrap();
        assert!(set.contains("a") && set.contains("b"));
        let bytes: Vec<u8> = from_value(Value::Binary(vec![1, 2])).unwrap();
        assert_eq!(bytes, vec![1, 2]);
    }

    #[test]
    fn test_recursive_value_hits_depth_limit() {
        let shared = SharedValue::new(Value::Null);
        shared.replace(Value::Sequence(vec![Value::Shared(shared.clone())]));
        let err = from_value::<serde::de::IgnoredAny>(Value::Shared(shared.clone()));
        assert!(err.is_ok());
        let err = from_value::<Vec<Vec<Vec<()>>>>(Value::Shared(shared.clone())).unwrap_err();
        assert!(err.to_string().contains("expected null"));
        let err = from_value::<crate::Value>(Value::Shared(shared)).unwrap_err();
        assert!(err.to_string().contains("recursion limit"));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(from_str::<Option<i32>>("").unwrap(), None);
        from_str::<()>("").unwrap();
    }

    #[test]
    fn test_from_reader() {
        let value: Vec<bool> = from_reader("[yes, off]".as_bytes()).unwrap();
        assert_eq!(value, vec![true, false]);
    }
}
