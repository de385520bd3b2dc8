//! Native value representation for YAML data.
//!
//! This module provides the [`Value`] enum, the native form every document is
//! constructed into and every dump starts from. It covers the YAML 1.1 type
//! repository: scalars, sequences, mappings and the `!!omap`, `!!pairs` and
//! `!!set` collections.
//!
//! ## Core Types
//!
//! - [`Value`]: any YAML value
//! - [`Number`]: integers, floats and the special float values
//! - [`SharedValue`]: a reference-counted handle used for nodes that a
//!   document references more than once, including self-references
//!
//! ## Usage Patterns
//!
//! ### Creating Values
//!
//! ```rust
//! use serde_yamlet::{yaml, Value};
//!
//! let null = Value::Null;
//! let number = Value::from(42);
//! let text = Value::from("hello");
//!
//! let config = yaml!({
//!     "name": "server",
//!     "ports": [80, 443]
//! });
//! assert_eq!(config.get("name").and_then(Value::as_str), Some("server"));
//! ```
//!
//! ### Shared Values
//!
//! Anchored nodes that are aliased elsewhere in the same document load as
//! [`Value::Shared`], so identity survives a load/dump round trip:
//!
//! ```rust
//! use serde_yamlet::{load, Value};
//!
//! let value = load("- &a [1, 2]\n- *a\n").unwrap();
//! let items = value.as_sequence().unwrap();
//! match (&items[0], &items[1]) {
//!     (Value::Shared(first), Value::Shared(second)) => assert!(first.ptr_eq(second)),
//!     other => panic!("expected shared values, got {:?}", other),
//! }
//! ```
//!
//! ### Equality and Hashing
//!
//! Values are `Eq` and `Hash` so they can be mapping keys. Floats compare by
//! value with all NaNs equal, mappings compare without regard to order, and a
//! shared handle only equals another shared handle (by identity, or by
//! content when the handles differ).

use crate::error::{Error, Result};
use crate::map::Mapping;
use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use num_bigint::BigInt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cell::{Ref, RefCell, RefMut};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Any YAML value.
///
/// # Examples
///
/// ```rust
/// use serde_yamlet::{Number, Value};
///
/// let num = Value::Number(Number::Integer(42));
/// let text = Value::String("hello".to_string());
///
/// assert!(Value::Null.is_null());
/// assert!(num.is_number());
/// assert!(text.is_string());
/// ```
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    /// An integer outside the `i64` range.
    BigInt(BigInt),
    String(String),
    Timestamp(DateTime<Utc>),
    Binary(Vec<u8>),
    Sequence(Vec<Value>),
    Mapping(Mapping),
    /// `!!omap`: ordered pairs with unique keys.
    OrderedMap(Vec<(Value, Value)>),
    /// `!!pairs`: ordered pairs, duplicates allowed.
    Pairs(Vec<(Value, Value)>),
    /// `!!set`: unique values.
    Set(IndexSet<Value>),
    /// A collection referenced from more than one place.
    Shared(SharedValue),
}

/// The variant of a [`Value`], without its content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    BigInt,
    String,
    Timestamp,
    Binary,
    Sequence,
    Mapping,
    OrderedMap,
    Pairs,
    Set,
    Shared,
}

/// A numeric value: an integer, a float, or one of the special floats.
///
/// # Examples
///
/// ```rust
/// use serde_yamlet::Number;
///
/// let integer = Number::Integer(42);
/// let float = Number::from(3.5);
///
/// assert!(integer.is_integer());
/// assert_eq!(integer.as_i64(), Some(42));
/// assert_eq!(float.as_f64(), 3.5);
/// assert!(Number::from(f64::INFINITY).is_special());
/// ```
#[derive(Clone, Copy, Debug)]
pub enum Number {
    Integer(i64),
    Float(f64),
    Infinity,
    NegativeInfinity,
    NaN,
}

impl Number {
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        !self.is_integer()
    }

    /// Returns `true` for `.inf`, `-.inf` and `.nan`.
    #[inline]
    #[must_use]
    pub const fn is_special(&self) -> bool {
        matches!(
            self,
            Number::Infinity | Number::NegativeInfinity | Number::NaN
        )
    }

    /// Converts to `i64` when the number is an integer or a whole float in
    /// range.
    ///
    /// ```rust
    /// use serde_yamlet::Number;
    ///
    /// assert_eq!(Number::Float(42.0).as_i64(), Some(42));
    /// assert_eq!(Number::Float(42.5).as_i64(), None);
    /// assert_eq!(Number::Infinity.as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(i) => Some(*i),
            Number::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::Float(f) => *f,
            Number::Infinity => f64::INFINITY,
            Number::NegativeInfinity => f64::NEG_INFINITY,
            Number::NaN => f64::NAN,
        }
    }
}

/// Formats a finite float so that it reads back as a YAML float: it always
/// has a decimal point, and an exponent always has a sign.
pub(crate) fn format_float(value: f64) -> String {
    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let point = if mantissa.contains('.') { "" } else { ".0" };
            let sign = if exponent.starts_with('-') { "" } else { "+" };
            format!("{}{}e{}{}", mantissa, point, sign, exponent)
        }
        None if repr.contains('.') => repr,
        None => format!("{}.0", repr),
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Float(value) => f.write_str(&format_float(*value)),
            Number::Infinity => f.write_str(".inf"),
            Number::NegativeInfinity => f.write_str("-.inf"),
            Number::NaN => f.write_str(".nan"),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Number::Infinity, Number::Infinity)
            | (Number::NegativeInfinity, Number::NegativeInfinity)
            | (Number::NaN, Number::NaN) => true,
            _ => false,
        }
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Number::Integer(i) => i.hash(state),
            // 0.0 and -0.0 are equal, so they must hash alike.
            Number::Float(f) if *f == 0.0 => 0u64.hash(state),
            Number::Float(f) if f.is_nan() => u64::MAX.hash(state),
            Number::Float(f) => f.to_bits().hash(state),
            _ => {}
        }
    }
}

macro_rules! number_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number::Integer(i64::from(value))
                }
            }
        )*
    };
}

number_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Number::from(f64::from(value))
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            Number::NaN
        } else if value == f64::INFINITY {
            Number::Infinity
        } else if value == f64::NEG_INFINITY {
            Number::NegativeInfinity
        } else {
            Number::Float(value)
        }
    }
}

/// A shared, mutable handle to a [`Value`].
///
/// Cloning the handle clones the reference, not the value.
#[derive(Clone)]
pub struct SharedValue(Rc<RefCell<Value>>);

impl SharedValue {
    #[must_use]
    pub fn new(value: Value) -> Self {
        SharedValue(Rc::new(RefCell::new(value)))
    }

    /// Borrows the value.
    ///
    /// # Panics
    ///
    /// Panics if the value is currently mutably borrowed.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, Value> {
        self.0.borrow()
    }

    /// Mutably borrows the value.
    ///
    /// # Panics
    ///
    /// Panics if the value is currently borrowed.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, Value> {
        self.0.borrow_mut()
    }

    /// Replaces the value, returning the old one.
    pub fn replace(&self, value: Value) -> Value {
        self.0.replace(value)
    }

    /// Returns `true` if both handles point to the same value.
    #[must_use]
    pub fn ptr_eq(&self, other: &SharedValue) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the shared cell, usable as an identity key.
    #[must_use]
    pub fn as_ptr(&self) -> *const RefCell<Value> {
        Rc::as_ptr(&self.0)
    }

    pub(crate) fn try_borrow(&self) -> Option<Ref<'_, Value>> {
        self.0.try_borrow().ok()
    }
}

impl fmt::Debug for SharedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedValue({:p})", self.as_ptr())
    }
}

impl PartialEq for SharedValue {
    fn eq(&self, other: &Self) -> bool {
        values_equal(
            &Value::Shared(self.clone()),
            &Value::Shared(other.clone()),
            &mut Vec::new(),
        )
    }
}

type SeenPairs = Vec<(*const RefCell<Value>, *const RefCell<Value>)>;

fn values_equal(a: &Value, b: &Value, seen: &mut SeenPairs) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::BigInt(x), Value::BigInt(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Timestamp(x), Value::Timestamp(y)) => x == y,
        (Value::Binary(x), Value::Binary(y)) => x == y,
        (Value::Sequence(x), Value::Sequence(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(v, w)| values_equal(v, w, seen))
        }
        (Value::Mapping(x), Value::Mapping(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).map_or(false, |w| values_equal(v, w, seen)))
        }
        (Value::OrderedMap(x), Value::OrderedMap(y)) | (Value::Pairs(x), Value::Pairs(y)) => {
            x.len() == y.len()
                && x.iter().zip(y).all(|((k1, v1), (k2, v2))| {
                    values_equal(k1, k2, seen) && values_equal(v1, v2, seen)
                })
        }
        (Value::Set(x), Value::Set(y)) => x == y,
        (Value::Shared(x), Value::Shared(y)) => {
            if x.ptr_eq(y) {
                return true;
            }
            let pair = (x.as_ptr(), y.as_ptr());
            if seen.contains(&pair) {
                return true;
            }
            seen.push(pair);
            match (x.try_borrow(), y.try_borrow()) {
                (Some(inner_x), Some(inner_y)) => values_equal(&inner_x, &inner_y, seen),
                _ => false,
            }
        }
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other, &mut Vec::new())
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null | Value::Shared(_) => {}
            Value::Bool(b) => b.hash(state),
            Value::Number(n) => n.hash(state),
            Value::BigInt(b) => b.hash(state),
            Value::String(s) => s.hash(state),
            Value::Timestamp(t) => t.hash(state),
            Value::Binary(b) => b.hash(state),
            Value::Sequence(items) => items.hash(state),
            Value::Mapping(map) => map.hash(state),
            Value::OrderedMap(pairs) | Value::Pairs(pairs) => pairs.hash(state),
            Value::Set(set) => {
                let mut combined: u64 = 0;
                for item in set {
                    let mut hasher = std::collections::hash_map::DefaultHasher::new();
                    item.hash(&mut hasher);
                    combined ^= hasher.finish();
                }
                set.len().hash(state);
                combined.hash(state);
            }
        }
    }
}

impl Value {
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::BigInt(_) => ValueKind::BigInt,
            Value::String(_) => ValueKind::String,
            Value::Timestamp(_) => ValueKind::Timestamp,
            Value::Binary(_) => ValueKind::Binary,
            Value::Sequence(_) => ValueKind::Sequence,
            Value::Mapping(_) => ValueKind::Mapping,
            Value::OrderedMap(_) => ValueKind::OrderedMap,
            Value::Pairs(_) => ValueKind::Pairs,
            Value::Set(_) => ValueKind::Set,
            Value::Shared(_) => ValueKind::Shared,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_sequence(&self) -> bool {
        matches!(self, Value::Sequence(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_shared(&self) -> bool {
        matches!(self, Value::Shared(_))
    }

    /// Returns `true` for values that contain no shared handle anywhere.
    ///
    /// Only such values are accepted as mapping keys by the constructor.
    #[must_use]
    pub fn is_hashable(&self) -> bool {
        match self {
            Value::Shared(_) => false,
            Value::Sequence(items) => items.iter().all(Value::is_hashable),
            Value::Mapping(map) => map.iter().all(|(k, v)| k.is_hashable() && v.is_hashable()),
            Value::OrderedMap(pairs) | Value::Pairs(pairs) => pairs
                .iter()
                .all(|(k, v)| k.is_hashable() && v.is_hashable()),
            Value::Set(set) => set.iter().all(Value::is_hashable),
            _ => true,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer for integer numbers and whole floats.
    ///
    /// ```rust
    /// use serde_yamlet::{Number, Value};
    ///
    /// assert_eq!(Value::from(42).as_i64(), Some(42));
    /// assert_eq!(Value::Number(Number::Float(2.0)).as_i64(), Some(2));
    /// assert_eq!(Value::from("42").as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Value::BigInt(b) => Some(b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(t),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_sequence(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_shared(&self) -> Option<&SharedValue> {
        match self {
            Value::Shared(shared) => Some(shared),
            _ => None,
        }
    }

    /// Looks up a string key in a mapping or ordered map.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Mapping(map) => map.get_str(key),
            Value::OrderedMap(pairs) => pairs
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Returns the value with every shared handle replaced by a copy of its
    /// content.
    ///
    /// # Errors
    ///
    /// Fails for self-referential values, which have no finite copy.
    pub fn unshare(&self) -> Result<Value> {
        self.unshare_inner(&mut Vec::new())
    }

    fn unshare_inner(&self, active: &mut Vec<*const RefCell<Value>>) -> Result<Value> {
        Ok(match self {
            Value::Shared(shared) => {
                let ptr = shared.as_ptr();
                if active.contains(&ptr) {
                    return Err(Error::custom("cannot unshare a recursive value"));
                }
                active.push(ptr);
                let inner = shared.borrow().unshare_inner(active);
                active.pop();
                inner?
            }
            Value::Sequence(items) => Value::Sequence(
                items
                    .iter()
                    .map(|item| item.unshare_inner(active))
                    .collect::<Result<_>>()?,
            ),
            Value::Mapping(map) => Value::Mapping(
                map.iter()
                    .map(|(k, v)| Ok((k.unshare_inner(active)?, v.unshare_inner(active)?)))
                    .collect::<Result<_>>()?,
            ),
            Value::OrderedMap(pairs) => Value::OrderedMap(unshare_pairs(pairs, active)?),
            Value::Pairs(pairs) => Value::Pairs(unshare_pairs(pairs, active)?),
            other => other.clone(),
        })
    }
}

fn unshare_pairs(
    pairs: &[(Value, Value)],
    active: &mut Vec<*const RefCell<Value>>,
) -> Result<Vec<(Value, Value)>> {
    pairs
        .iter()
        .map(|(k, v)| Ok((k.unshare_inner(active)?, v.unshare_inner(active)?)))
        .collect()
}

/// Total order used when dumping with sorted keys.
///
/// Keys of different kinds order by kind; collections and shared values keep
/// their relative order.
pub(crate) fn compare_keys(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) | Value::BigInt(_) => 2,
            Value::String(_) => 3,
            Value::Timestamp(_) => 4,
            Value::Binary(_) => 5,
            _ => 6,
        }
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::BigInt(x), Value::BigInt(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        (Value::Binary(x), Value::Binary(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

impl fmt::Display for Value {
    /// Renders the value as a YAML document with default options, without
    /// the trailing document end marker.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = crate::dump(self, &crate::DumpOptions::default()).map_err(|_| fmt::Error)?;
        let text = text.strip_suffix("...\n").unwrap_or(&text);
        f.write_str(text.trim_end_matches('\n'))
    }
}

thread_local! {
    static SERIALIZING: RefCell<Vec<*const RefCell<Value>>> = RefCell::new(Vec::new());
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::{Error as _, SerializeMap, SerializeSeq};

        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Integer(i)) => serializer.serialize_i64(*i),
            Value::Number(n) => serializer.serialize_f64(n.as_f64()),
            Value::BigInt(b) => serializer.serialize_str(&b.to_string()),
            Value::String(s) => serializer.serialize_str(s),
            Value::Timestamp(t) => serializer.serialize_str(&t.to_rfc3339()),
            Value::Binary(bytes) => serializer.serialize_bytes(bytes),
            Value::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Mapping(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Value::OrderedMap(pairs) => {
                let mut out = serializer.serialize_map(Some(pairs.len()))?;
                for (k, v) in pairs {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Value::Pairs(pairs) => {
                let mut seq = serializer.serialize_seq(Some(pairs.len()))?;
                for (k, v) in pairs {
                    let single: Mapping = std::iter::once((k.clone(), v.clone())).collect();
                    seq.serialize_element(&Value::Mapping(single))?;
                }
                seq.end()
            }
            Value::Set(set) => {
                let mut seq = serializer.serialize_seq(Some(set.len()))?;
                for item in set {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Shared(shared) => {
                let ptr = shared.as_ptr();
                let recursive = SERIALIZING.with(|active| {
                    let mut active = active.borrow_mut();
                    if active.contains(&ptr) {
                        true
                    } else {
                        active.push(ptr);
                        false
                    }
                });
                if recursive {
                    return Err(S::Error::custom("cannot serialize a recursive value"));
                }
                let result = shared.borrow().serialize(serializer);
                SERIALIZING.with(|active| {
                    active.borrow_mut().pop();
                });
                result
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any YAML value")
            }

            fn visit_bool<E>(self, value: bool) -> std::result::Result<Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> std::result::Result<Value, E> {
                Ok(Value::Number(Number::Integer(value)))
            }

            fn visit_i128<E>(self, value: i128) -> std::result::Result<Value, E> {
                Ok(Value::from(BigInt::from(value)))
            }

            fn visit_u64<E>(self, value: u64) -> std::result::Result<Value, E> {
                Ok(Value::from(value))
            }

            fn visit_u128<E>(self, value: u128) -> std::result::Result<Value, E> {
                Ok(Value::from(BigInt::from(value)))
            }

            fn visit_f64<E>(self, value: f64) -> std::result::Result<Value, E> {
                Ok(Value::Number(Number::from(value)))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> std::result::Result<Value, E> {
                Ok(Value::String(value))
            }

            fn visit_bytes<E>(self, value: &[u8]) -> std::result::Result<Value, E> {
                Ok(Value::Binary(value.to_vec()))
            }

            fn visit_byte_buf<E>(self, value: Vec<u8>) -> std::result::Result<Value, E> {
                Ok(Value::Binary(value))
            }

            fn visit_unit<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> std::result::Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Value::Sequence(items))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = Mapping::new();
                while let Some((key, value)) = map.next_entry()? {
                    values.insert(key, value);
                }
                Ok(Value::Mapping(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl TryFrom<Value> for i64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match &value {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| Error::custom(format!("cannot convert {} to i64", n))),
            _ => Err(Error::custom(format!("expected integer, found {:?}", value))),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Number(n) => Ok(n.as_f64()),
            _ => Err(Error::custom(format!("expected number, found {:?}", value))),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            _ => Err(Error::custom(format!("expected bool, found {:?}", value))),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            _ => Err(Error::custom(format!("expected string, found {:?}", value))),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! value_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(Number::from(value))
                }
            }
        )*
    };
}

value_from_number!(i8, i16, i32, i64, u8, u16, u32, f32, f64);

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => Value::Number(Number::Integer(i)),
            Err(_) => Value::BigInt(BigInt::from(value)),
        }
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

/// Narrows to [`Value::Number`] when the integer fits in `i64`.
impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        match i64::try_from(&value) {
            Ok(i) => Value::Number(Number::Integer(i)),
            Err(_) => Value::BigInt(value),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Sequence(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<Mapping> for Value {
    fn from(value: Mapping) -> Self {
        Value::Mapping(value)
    }
}

impl From<SharedValue> for Value {
    fn from(value: SharedValue) -> Self {
        Value::Shared(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tryfrom_i64() {
        assert_eq!(i64::try_from(Value::from(42)).unwrap(), 42);
        assert_eq!(i64::try_from(Value::Number(Number::Float(42.0))).unwrap(), 42);
        assert!(i64::try_from(Value::from("test")).is_err());
    }

    #[test]
    fn test_tryfrom_f64_and_bool() {
        assert_eq!(f64::try_from(Value::from(3.5)).unwrap(), 3.5);
        assert_eq!(f64::try_from(Value::from(f64::INFINITY)).unwrap(), f64::INFINITY);
        assert!(bool::try_from(Value::from(true)).unwrap());
        assert!(bool::try_from(Value::from(1)).is_err());
    }

    #[test]
    fn test_from_special_floats() {
        assert_eq!(Value::from(f64::NAN), Value::Number(Number::NaN));
        assert_eq!(
            Value::from(f64::NEG_INFINITY),
            Value::Number(Number::NegativeInfinity)
        );
    }

    #[test]
    fn test_from_u64_overflow() {
        assert!(Value::from(u64::MAX).as_bigint().is_some());
        assert_eq!(Value::from(7u64), Value::from(7));
    }

    #[test]
    fn test_float_formatting() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(1e20), "1.0e+20");
        assert_eq!(format_float(1.5e-7), "1.5e-7");
        assert_eq!(Number::NegativeInfinity.to_string(), "-.inf");
    }

    #[test]
    fn test_number_equality_and_hash() {
        use std::collections::hash_map::DefaultHasher;
        let hash = |n: &Number| {
            let mut hasher = DefaultHasher::new();
            n.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(Number::Float(0.0), Number::Float(-0.0));
        assert_eq!(hash(&Number::Float(0.0)), hash(&Number::Float(-0.0)));
        assert_eq!(Number::Float(f64::NAN), Number::Float(f64::NAN));
        assert_ne!(Number::Integer(1), Number::Float(1.0));
    }

    #[test]
    fn test_shared_equality() {
        let a = SharedValue::new(Value::from(vec![1, 2]));
        let b = SharedValue::new(Value::from(vec![1, 2]));
        assert_eq!(Value::Shared(a.clone()), Value::Shared(a.clone()));
        assert_eq!(Value::Shared(a.clone()), Value::Shared(b));
        assert_ne!(Value::Shared(a), Value::from(vec![1, 2]));
    }

    #[test]
    fn test_recursive_equality_terminates() {
        let a = SharedValue::new(Value::Sequence(Vec::new()));
        *a.borrow_mut() = Value::Sequence(vec![Value::Shared(a.clone())]);
        let b = SharedValue::new(Value::Sequence(Vec::new()));
        *b.borrow_mut() = Value::Sequence(vec![Value::Shared(b.clone())]);
        assert_eq!(Value::Shared(a), Value::Shared(b));
    }

    #[test]
    fn test_hashable() {
        let shared = Value::Shared(SharedValue::new(Value::Null));
        assert!(!Value::Sequence(vec![shared]).is_hashable());
        assert!(Value::from(vec!["a", "b"]).is_hashable());
    }

    #[test]
    fn test_unshare() {
        let inner = SharedValue::new(Value::from(vec![1]));
        let value = Value::Sequence(vec![Value::Shared(inner.clone()), Value::Shared(inner)]);
        let plain = value.unshare().unwrap();
        assert_eq!(plain, Value::from(vec![vec![1], vec![1]]));

        let cycle = SharedValue::new(Value::Null);
        cycle.replace(Value::Sequence(vec![Value::Shared(cycle.clone())]));
        assert!(Value::Shared(cycle).unshare().is_err());
    }

    #[test]
    fn test_serialize_recursive_value_fails() {
        let cycle = SharedValue::new(Value::Null);
        cycle.replace(Value::Sequence(vec![Value::Shared(cycle.clone())]));
        assert!(serde_json::to_string(&Value::Shared(cycle)).is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let value: Value = serde_json::from_str(r#"{"a": [1, 2.5, null, true]}"#).unwrap();
        assert_eq!(
            value.get("a").and_then(Value::as_sequence).map(Vec::len),
            Some(4)
        );
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"a":[1,2.5,null,true]}"#);
    }

    #[test]
    fn test_compare_keys() {
        let mut keys = vec![Value::from("b"), Value::from(2), Value::Null, Value::from("a")];
        keys.sort_by(compare_keys);
        assert_eq!(
            keys,
            vec![Value::Null, Value::from(2), Value::from("a"), Value::from("b")]
        );
    }
}
