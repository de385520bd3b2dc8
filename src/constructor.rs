//! Builds native values from representation graphs.
//!
//! Construction is dispatched on the node tag through a
//! [`ConstructorRegistry`]: an exact-tag table, then a list of tag prefixes
//! (multi-constructors), then an optional fallback. The default registry
//! covers the YAML 1.1 type repository.
//!
//! ## Shared and Recursive Nodes
//!
//! A collection node reachable more than once in its document (through an
//! alias, or because it contains itself) is constructed as a
//! [`Value::Shared`] handle. The handle is handed out immediately with
//! placeholder content and filled once the rest of the document is built,
//! which is what lets a sequence contain itself:
//!
//! ```rust
//! use serde_yamlet::{load, Value};
//!
//! let value = load("&a [*a]").unwrap();
//! let outer = value.as_shared().unwrap();
//! let inner = outer.borrow();
//! match &inner.as_sequence().unwrap()[0] {
//!     Value::Shared(item) => assert!(item.ptr_eq(outer)),
//!     other => panic!("expected a shared value, got {:?}", other),
//! }
//! ```
//!
//! ## Custom Tags
//!
//! ```rust
//! use serde_yamlet::constructor::{Constructor, ConstructorRegistry};
//! use serde_yamlet::nodes::NodeId;
//! use serde_yamlet::{Loader, Result, Value};
//!
//! fn upper(constructor: &mut Constructor<'_>, id: NodeId) -> Result<Value> {
//!     Ok(Value::from(constructor.construct_scalar(id)?.to_uppercase()))
//! }
//!
//! let mut registry = ConstructorRegistry::new();
//! registry.add_constructor("!upper", upper);
//! let mut loader = Loader::new("!upper shout").unwrap().with_constructors(registry);
//! assert_eq!(loader.next_value().unwrap(), Some(Value::from("SHOUT")));
//! ```

use crate::error::{Error, Result};
use crate::map::Mapping;
use crate::nodes::{Document, Node, NodeId, NodeKind, NodeType};
use crate::resolver::{
    BINARY_TAG, BOOL_TAG, FLOAT_TAG, INT_TAG, MAP_TAG, MERGE_TAG, NULL_TAG, OMAP_TAG, PAIRS_TAG,
    SEQ_TAG, SET_TAG, STR_TAG, TIMESTAMP_TAG, VALUE_TAG, YAML_TAG,
};
use crate::value::{Number, SharedValue, Value};
use base64::Engine;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use indexmap::IndexSet;
use num_bigint::BigInt;
use regex::Regex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::OnceLock;

/// Builds the value for one node.
pub type ConstructFn = fn(&mut Constructor<'_>, NodeId) -> Result<Value>;

/// Builds the value for a node whose tag starts with a registered prefix.
/// The second argument is the rest of the tag after the prefix.
pub type MultiConstructFn = fn(&mut Constructor<'_>, &str, NodeId) -> Result<Value>;

/// Tag dispatch table used by [`Constructor`].
#[derive(Clone, Debug)]
pub struct ConstructorRegistry {
    constructors: HashMap<String, ConstructFn>,
    multi_constructors: Vec<(String, MultiConstructFn)>,
    fallback: Option<ConstructFn>,
}

impl Default for ConstructorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructorRegistry {
    /// Creates a registry for the YAML 1.1 types.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.add_constructor(NULL_TAG, construct_yaml_null);
        registry.add_constructor(BOOL_TAG, construct_yaml_bool);
        registry.add_constructor(INT_TAG, construct_yaml_int);
        registry.add_constructor(FLOAT_TAG, construct_yaml_float);
        registry.add_constructor(STR_TAG, construct_yaml_str);
        registry.add_constructor(MERGE_TAG, construct_yaml_str);
        registry.add_constructor(VALUE_TAG, construct_yaml_str);
        registry.add_constructor(YAML_TAG, construct_yaml_str);
        registry.add_constructor(TIMESTAMP_TAG, construct_yaml_timestamp);
        registry.add_constructor(BINARY_TAG, construct_yaml_binary);
        registry.add_constructor(SEQ_TAG, construct_yaml_seq);
        registry.add_constructor(MAP_TAG, construct_yaml_map);
        registry.add_constructor(OMAP_TAG, construct_yaml_omap);
        registry.add_constructor(PAIRS_TAG, construct_yaml_pairs);
        registry.add_constructor(SET_TAG, construct_yaml_set);
        registry
    }

    /// Creates a registry with no constructors at all.
    #[must_use]
    pub fn empty() -> Self {
        ConstructorRegistry {
            constructors: HashMap::new(),
            multi_constructors: Vec::new(),
            fallback: None,
        }
    }

    /// Registers a constructor for an exact tag, replacing any previous one.
    pub fn add_constructor(&mut self, tag: impl Into<String>, constructor: ConstructFn) {
        self.constructors.insert(tag.into(), constructor);
    }

    /// Registers a constructor for every tag starting with `prefix`.
    ///
    /// Prefixes are tried in registration order.
    pub fn add_multi_constructor(&mut self, prefix: impl Into<String>, constructor: MultiConstructFn) {
        self.multi_constructors.push((prefix.into(), constructor));
    }

    /// Sets the constructor used when no tag matches.
    ///
    /// [`construct_untagged`] builds strings, sequences and mappings by node
    /// kind and is a ready-made choice.
    pub fn set_fallback(&mut self, constructor: ConstructFn) {
        self.fallback = Some(constructor);
    }
}

/// Builds the native value of one document.
pub struct Constructor<'a> {
    document: &'a Document,
    registry: &'a ConstructorRegistry,
    shared: HashSet<NodeId>,
    built: HashMap<NodeId, Value>,
    constructing: HashSet<NodeId>,
    flattening: Vec<NodeId>,
    deferred: VecDeque<(SharedValue, NodeId)>,
}

impl<'a> Constructor<'a> {
    #[must_use]
    pub fn new(document: &'a Document, registry: &'a ConstructorRegistry) -> Self {
        Constructor {
            document,
            registry,
            shared: shared_nodes(document),
            built: HashMap::new(),
            constructing: HashSet::new(),
            flattening: Vec::new(),
            deferred: VecDeque::new(),
        }
    }

    /// Constructs the document root, or `Value::Null` for an empty document.
    pub fn construct_document(mut self) -> Result<Value> {
        let root = match self.document.root() {
            Some(root) => self.construct_object(root)?,
            None => return Ok(Value::Null),
        };
        while let Some((handle, id)) = self.deferred.pop_front() {
            let value = self.construct_guarded(id)?;
            handle.replace(value);
        }
        tracing::debug!(
            nodes = self.document.len(),
            shared = self.shared.len(),
            "constructed document"
        );
        Ok(root)
    }

    /// Returns the node for `id`.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &'a Node {
        self.document.node(id)
    }

    /// Constructs the value of any node, reusing the value of a shared node
    /// that was already built.
    pub fn construct_object(&mut self, id: NodeId) -> Result<Value> {
        if let Some(value) = self.built.get(&id) {
            return Ok(value.clone());
        }
        if self.constructing.contains(&id) {
            return Err(Error::constructor(
                None,
                None,
                "found unconstructable recursive node",
                self.node(id).start_mark.clone(),
            ));
        }
        let shared = self.shared.contains(&id);
        if shared && self.node(id).node_type() != NodeType::Scalar {
            let handle = SharedValue::new(Value::Null);
            self.built.insert(id, Value::Shared(handle.clone()));
            self.deferred.push_back((handle.clone(), id));
            return Ok(Value::Shared(handle));
        }
        let value = self.construct_guarded(id)?;
        if shared {
            self.built.insert(id, value.clone());
        }
        Ok(value)
    }

    fn construct_guarded(&mut self, id: NodeId) -> Result<Value> {
        self.constructing.insert(id);
        let value = self.dispatch(id);
        self.constructing.remove(&id);
        value
    }

    fn dispatch(&mut self, id: NodeId) -> Result<Value> {
        let registry = self.registry;
        let node = self.node(id);
        if let Some(constructor) = registry.constructors.get(&node.tag) {
            return constructor(self, id);
        }
        for (prefix, constructor) in &registry.multi_constructors {
            if let Some(suffix) = node.tag.strip_prefix(prefix.as_str()) {
                return constructor(self, suffix, id);
            }
        }
        if let Some(constructor) = registry.fallback {
            return constructor(self, id);
        }
        Err(Error::constructor(
            None,
            None,
            format!("could not determine a constructor for the tag '{}'", node.tag),
            node.start_mark.clone(),
        ))
    }

    /// Returns the text of a scalar node.
    ///
    /// A mapping with a `=` key stands for the scalar under that key.
    pub fn construct_scalar(&mut self, id: NodeId) -> Result<String> {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Scalar { value, .. } => Ok(value.clone()),
            NodeKind::Mapping { pairs, .. } => {
                for (key, value) in pairs {
                    if self.node(*key).tag == VALUE_TAG {
                        return self.construct_scalar(*value);
                    }
                }
                Err(expected_kind(node, "scalar"))
            }
            NodeKind::Sequence { .. } => Err(expected_kind(node, "scalar")),
        }
    }

    pub fn construct_sequence(&mut self, id: NodeId) -> Result<Vec<Value>> {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Sequence { items, .. } => items
                .iter()
                .map(|item| self.construct_object(*item))
                .collect(),
            _ => Err(expected_kind(node, "sequence")),
        }
    }

    /// Constructs a mapping after resolving merge keys.
    ///
    /// Later keys replace earlier ones; merged entries never replace keys
    /// written in the mapping itself.
    pub fn construct_mapping(&mut self, id: NodeId) -> Result<Mapping> {
        let pairs = self.flatten_mapping(id)?;
        let mut mapping = Mapping::with_capacity(pairs.len());
        for (key_id, value_id) in pairs {
            let key = self.construct_key(id, key_id)?;
            let value = self.construct_object(value_id)?;
            mapping.insert(key, value);
        }
        Ok(mapping)
    }

    /// Constructs the entries of a mapping in order, keeping duplicates.
    pub fn construct_pairs(&mut self, id: NodeId) -> Result<Vec<(Value, Value)>> {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Mapping { pairs, .. } => pairs
                .iter()
                .map(|(key, value)| Ok((self.construct_object(*key)?, self.construct_object(*value)?)))
                .collect(),
            _ => Err(expected_kind(node, "mapping")),
        }
    }

    fn construct_key(&mut self, mapping_id: NodeId, key_id: NodeId) -> Result<Value> {
        let key_node = self.node(key_id);
        let key = if key_node.tag == VALUE_TAG {
            Value::String(self.construct_scalar(key_id)?)
        } else {
            self.construct_object(key_id)?
        };
        if !key.is_hashable() {
            return Err(Error::constructor(
                Some("while constructing a mapping"),
                Some(self.node(mapping_id).start_mark.clone()),
                "found unhashable key",
                key_node.start_mark.clone(),
            ));
        }
        Ok(key)
    }

    fn flatten_mapping(&mut self, id: NodeId) -> Result<Vec<(NodeId, NodeId)>> {
        let node = self.node(id);
        let pairs = match &node.kind {
            NodeKind::Mapping { pairs, .. } => pairs,
            _ => return Err(expected_kind(node, "mapping")),
        };
        if self.flattening.contains(&id) {
            return Err(Error::constructor(
                Some("while constructing a mapping"),
                Some(node.start_mark.clone()),
                "found unconstructable recursive node",
                node.start_mark.clone(),
            ));
        }
        if !pairs.iter().any(|(key, _)| self.node(*key).tag == MERGE_TAG) {
            return Ok(pairs.clone());
        }

        self.flattening.push(id);
        let result = self.merge_pairs(node, pairs);
        self.flattening.pop();
        result
    }

    fn merge_pairs(&mut self, node: &'a Node, pairs: &'a [(NodeId, NodeId)]) -> Result<Vec<(NodeId, NodeId)>> {
        let mut merged = Vec::new();
        let mut own = Vec::with_capacity(pairs.len());
        for &(key, value) in pairs {
            if self.node(key).tag != MERGE_TAG {
                own.push((key, value));
                continue;
            }
            let value_node = self.node(value);
            match &value_node.kind {
                NodeKind::Mapping { .. } => merged.extend(self.flatten_mapping(value)?),
                NodeKind::Sequence { items, .. } => {
                    let mut submerge = Vec::with_capacity(items.len());
                    for &item in items {
                        let item_node = self.node(item);
                        if item_node.node_type() != NodeType::Mapping {
                            return Err(Error::constructor(
                                Some("while constructing a mapping"),
                                Some(node.start_mark.clone()),
                                format!(
                                    "expected a mapping for merging, but found {}",
                                    kind_name(item_node)
                                ),
                                item_node.start_mark.clone(),
                            ));
                        }
                        submerge.push(self.flatten_mapping(item)?);
                    }
                    // Earlier mappings take precedence, so they go last.
                    for entries in submerge.into_iter().rev() {
                        merged.extend(entries);
                    }
                }
                NodeKind::Scalar { .. } => {
                    return Err(Error::constructor(
                        Some("while constructing a mapping"),
                        Some(node.start_mark.clone()),
                        format!(
                            "expected a mapping or list of mappings for merging, but found {}",
                            kind_name(value_node)
                        ),
                        value_node.start_mark.clone(),
                    ));
                }
            }
        }
        merged.extend(own);
        Ok(merged)
    }
}

/// Counts references to every node reachable from the root and returns the
/// nodes referenced more than once. The root counts as one reference.
fn shared_nodes(document: &Document) -> HashSet<NodeId> {
    let mut counts: HashMap<NodeId, usize> = HashMap::new();
    let mut visited = HashSet::new();
    let mut stack = Vec::new();
    if let Some(root) = document.root() {
        counts.insert(root, 1);
        stack.push(root);
    }
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let children: Vec<NodeId> = match &document.node(id).kind {
            NodeKind::Scalar { .. } => Vec::new(),
            NodeKind::Sequence { items, .. } => items.clone(),
            NodeKind::Mapping { pairs, .. } => {
                pairs.iter().flat_map(|(k, v)| [*k, *v]).collect()
            }
        };
        for child in children {
            *counts.entry(child).or_insert(0) += 1;
            stack.push(child);
        }
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id)
        .collect()
}

fn kind_name(node: &Node) -> &'static str {
    match node.node_type() {
        NodeType::Scalar => "scalar",
        NodeType::Sequence => "sequence",
        NodeType::Mapping => "mapping",
    }
}

fn expected_kind(node: &Node, expected: &str) -> Error {
    Error::constructor(
        None,
        None,
        format!("expected a {} node, but found {}", expected, kind_name(node)),
        node.start_mark.clone(),
    )
}

fn invalid_scalar(context: &str, what: &str, value: &str, node: &Node) -> Error {
    Error::constructor(
        Some(context),
        Some(node.start_mark.clone()),
        format!("found invalid {} '{}'", what, value),
        node.start_mark.clone(),
    )
}

/// Builds strings, sequences and mappings by node kind, ignoring the tag.
pub fn construct_untagged(constructor: &mut Constructor<'_>, id: NodeId) -> Result<Value> {
    match constructor.node(id).node_type() {
        NodeType::Scalar => construct_yaml_str(constructor, id),
        NodeType::Sequence => construct_yaml_seq(constructor, id),
        NodeType::Mapping => construct_yaml_map(constructor, id),
    }
}

fn construct_yaml_null(constructor: &mut Constructor<'_>, id: NodeId) -> Result<Value> {
    constructor.construct_scalar(id)?;
    Ok(Value::Null)
}

fn construct_yaml_bool(constructor: &mut Constructor<'_>, id: NodeId) -> Result<Value> {
    let value = constructor.construct_scalar(id)?;
    match value.to_lowercase().as_str() {
        "yes" | "true" | "on" => Ok(Value::Bool(true)),
        "no" | "false" | "off" => Ok(Value::Bool(false)),
        _ => Err(invalid_scalar(
            "while constructing a boolean",
            "boolean",
            &value,
            constructor.node(id),
        )),
    }
}

fn parse_int(text: &str) -> Option<BigInt> {
    let cleaned = text.replace('_', "");
    let (negative, digits) = match cleaned.as_bytes().first()? {
        b'-' => (true, &cleaned[1..]),
        b'+' => (false, &cleaned[1..]),
        _ => (false, cleaned.as_str()),
    };
    let magnitude = if digits == "0" {
        BigInt::from(0)
    } else if let Some(bin) = digits.strip_prefix("0b") {
        BigInt::parse_bytes(bin.as_bytes(), 2)?
    } else if let Some(hex) = digits.strip_prefix("0x") {
        BigInt::parse_bytes(hex.as_bytes(), 16)?
    } else if let Some(oct) = digits.strip_prefix("0o") {
        BigInt::parse_bytes(oct.as_bytes(), 8)?
    } else if digits.starts_with('0') {
        BigInt::parse_bytes(digits.as_bytes(), 8)?
    } else if digits.contains(':') {
        let mut total = BigInt::from(0);
        for part in digits.split(':') {
            total = total * 60 + BigInt::parse_bytes(part.as_bytes(), 10)?;
        }
        total
    } else {
        BigInt::parse_bytes(digits.as_bytes(), 10)?
    };
    Some(if negative { -magnitude } else { magnitude })
}

fn construct_yaml_int(constructor: &mut Constructor<'_>, id: NodeId) -> Result<Value> {
    let value = constructor.construct_scalar(id)?;
    match parse_int(&value) {
        Some(number) => Ok(Value::from(number)),
        None => Err(invalid_scalar(
            "while constructing an integer",
            "integer",
            &value,
            constructor.node(id),
        )),
    }
}

fn parse_float(text: &str) -> Option<f64> {
    let cleaned = text.replace('_', "").to_lowercase();
    let (sign, digits) = match cleaned.as_bytes().first()? {
        b'-' => (-1.0, &cleaned[1..]),
        b'+' => (1.0, &cleaned[1..]),
        _ => (1.0, cleaned.as_str()),
    };
    if digits == ".inf" {
        Some(sign * f64::INFINITY)
    } else if digits == ".nan" {
        Some(f64::NAN)
    } else if digits.contains(':') {
        let mut total = 0.0;
        for part in digits.split(':') {
            total = total * 60.0 + part.parse::<f64>().ok()?;
        }
        Some(sign * total)
    } else {
        digits.parse::<f64>().ok().map(|value| sign * value)
    }
}

fn construct_yaml_float(constructor: &mut Constructor<'_>, id: NodeId) -> Result<Value> {
    let value = constructor.construct_scalar(id)?;
    match parse_float(&value) {
        Some(number) => Ok(Value::Number(Number::from(number))),
        None => Err(invalid_scalar(
            "while constructing a float",
            "float",
            &value,
            constructor.node(id),
        )),
    }
}

fn construct_yaml_str(constructor: &mut Constructor<'_>, id: NodeId) -> Result<Value> {
    constructor.construct_scalar(id).map(Value::String)
}

fn timestamp_regex() -> &'static Regex {
    static TIMESTAMP: OnceLock<Regex> = OnceLock::new();
    TIMESTAMP.get_or_init(|| {
        Regex::new(concat!(
            r"^(?P<year>[0-9][0-9][0-9][0-9])-(?P<month>[0-9][0-9]?)-(?P<day>[0-9][0-9]?)",
            r"(?:(?:[Tt]|[ \t]+)(?P<hour>[0-9][0-9]?):(?P<minute>[0-9][0-9]):(?P<second>[0-9][0-9])",
            r"(?:\.(?P<fraction>[0-9]*))?",
            r"(?:[ \t]*(?P<tz>Z|(?P<tz_sign>[-+])(?P<tz_hour>[0-9][0-9]?)(?::(?P<tz_minute>[0-9][0-9]))?))?)?$",
        ))
        .expect("invalid timestamp pattern")
    })
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let caps = timestamp_regex().captures(text)?;
    let number = |name: &str| -> Option<u32> {
        caps.name(name).map_or(Some(0), |m| m.as_str().parse().ok())
    };
    let year: i32 = caps.name("year")?.as_str().parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, number("month")?, number("day")?)?;

    let nanos = match caps.name("fraction") {
        Some(fraction) => {
            let digits: String = fraction.as_str().chars().take(9).collect();
            format!("{:0<9}", digits).parse().ok()?
        }
        None => 0,
    };
    let naive = date.and_hms_nano_opt(number("hour")?, number("minute")?, number("second")?, nanos)?;

    let mut offset = i64::from(number("tz_hour")?) * 3600 + i64::from(number("tz_minute")?) * 60;
    if caps.name("tz_sign").map(|m| m.as_str()) == Some("-") {
        offset = -offset;
    }
    let utc = naive.checked_sub_signed(chrono::Duration::seconds(offset))?;
    Some(Utc.from_utc_datetime(&utc))
}

fn construct_yaml_timestamp(constructor: &mut Constructor<'_>, id: NodeId) -> Result<Value> {
    let value = constructor.construct_scalar(id)?;
    match parse_timestamp(&value) {
        Some(timestamp) => Ok(Value::Timestamp(timestamp)),
        None => Err(invalid_scalar(
            "while constructing a timestamp",
            "timestamp",
            &value,
            constructor.node(id),
        )),
    }
}

fn construct_yaml_binary(constructor: &mut Constructor<'_>, id: NodeId) -> Result<Value> {
    let value = constructor.construct_scalar(id)?;
    let encoded: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map(Value::Binary)
        .map_err(|err| {
            Error::constructor(
                None,
                None,
                format!("failed to decode base64 data: {}", err),
                constructor.node(id).start_mark.clone(),
            )
        })
}

fn construct_yaml_seq(constructor: &mut Constructor<'_>, id: NodeId) -> Result<Value> {
    constructor.construct_sequence(id).map(Value::Sequence)
}

fn construct_yaml_map(constructor: &mut Constructor<'_>, id: NodeId) -> Result<Value> {
    constructor.construct_mapping(id).map(Value::Mapping)
}

/// Reads a sequence of single-pair mappings, as `!!omap` and `!!pairs` use.
fn construct_pair_list(
    constructor: &mut Constructor<'_>,
    id: NodeId,
    context: &str,
) -> Result<Vec<(Value, Value)>> {
    let node = constructor.node(id);
    let items = match &node.kind {
        NodeKind::Sequence { items, .. } => items,
        _ => {
            return Err(Error::constructor(
                Some(context),
                Some(node.start_mark.clone()),
                format!("expected a sequence, but found {}", kind_name(node)),
                node.start_mark.clone(),
            ))
        }
    };
    let mut pairs = Vec::with_capacity(items.len());
    for &item in items {
        let item_node = constructor.node(item);
        let entries = match &item_node.kind {
            NodeKind::Mapping { pairs, .. } => pairs,
            _ => {
                return Err(Error::constructor(
                    Some(context),
                    Some(node.start_mark.clone()),
                    format!(
                        "expected a mapping of length 1, but found {}",
                        kind_name(item_node)
                    ),
                    item_node.start_mark.clone(),
                ))
            }
        };
        if entries.len() != 1 {
            return Err(Error::constructor(
                Some(context),
                Some(node.start_mark.clone()),
                format!(
                    "expected a single mapping item, but found {} items",
                    entries.len()
                ),
                item_node.start_mark.clone(),
            ));
        }
        let (key, value) = entries[0];
        pairs.push((constructor.construct_object(key)?, constructor.construct_object(value)?));
    }
    Ok(pairs)
}

fn construct_yaml_omap(constructor: &mut Constructor<'_>, id: NodeId) -> Result<Value> {
    construct_pair_list(constructor, id, "while constructing an ordered map").map(Value::OrderedMap)
}

fn construct_yaml_pairs(constructor: &mut Constructor<'_>, id: NodeId) -> Result<Value> {
    construct_pair_list(constructor, id, "while constructing pairs").map(Value::Pairs)
}

fn construct_yaml_set(constructor: &mut Constructor<'_>, id: NodeId) -> Result<Value> {
    let mapping = constructor.construct_mapping(id)?;
    Ok(Value::Set(mapping.into_iter().map(|(key, _)| key).collect::<IndexSet<_>>()))
}
