//! Turns native values into representation graphs.
//!
//! Each [`Value`] variant is represented by a function looked up in a
//! [`RepresenterRegistry`] keyed by [`ValueKind`]. Shared handles are tracked
//! by pointer: the first time a [`SharedValue`](crate::SharedValue) is met its
//! node is built, and every later occurrence reuses that node, so the
//! serializer can write it once with an anchor and alias it afterwards.
//! Plain values are never shared, however often they repeat.
//!
//! ```rust
//! use serde_yamlet::representer::{Representer, RepresenterRegistry};
//! use serde_yamlet::{DumpOptions, SharedValue, Value};
//!
//! let shared = Value::Shared(SharedValue::new(Value::from(vec![1, 2])));
//! let value = Value::Sequence(vec![shared.clone(), shared]);
//!
//! let registry = RepresenterRegistry::new();
//! let document = Representer::new(&registry, &DumpOptions::new())
//!     .represent(&value)
//!     .unwrap();
//! let items = document.root_node().unwrap().as_sequence().unwrap();
//! assert_eq!(items[0], items[1]);
//! ```

use crate::error::{Error, Result};
use crate::nodes::{Document, Node, NodeId, NodeKind};
use crate::options::DumpOptions;
use crate::resolver::{
    BINARY_TAG, BOOL_TAG, FLOAT_TAG, INT_TAG, MAP_TAG, NULL_TAG, OMAP_TAG, PAIRS_TAG, SEQ_TAG,
    SET_TAG, STR_TAG, TIMESTAMP_TAG,
};
use crate::tokens::ScalarStyle;
use crate::value::{compare_keys, Number, Value, ValueKind};
use base64::Engine;
use chrono::SecondsFormat;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Base64 line length used for `!!binary` scalars.
const BINARY_LINE_LENGTH: usize = 76;

/// Builds the node for one value.
pub type RepresentFn = fn(&mut Representer<'_>, &Value) -> Result<Node>;

/// Value kind dispatch table used by [`Representer`].
#[derive(Clone, Debug)]
pub struct RepresenterRegistry {
    representers: HashMap<ValueKind, RepresentFn>,
}

impl Default for RepresenterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RepresenterRegistry {
    /// Creates a registry covering every value kind.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.add_representer(ValueKind::Null, represent_null);
        registry.add_representer(ValueKind::Bool, represent_bool);
        registry.add_representer(ValueKind::Number, represent_number);
        registry.add_representer(ValueKind::BigInt, represent_bigint);
        registry.add_representer(ValueKind::String, represent_str);
        registry.add_representer(ValueKind::Timestamp, represent_timestamp);
        registry.add_representer(ValueKind::Binary, represent_binary);
        registry.add_representer(ValueKind::Sequence, represent_seq);
        registry.add_representer(ValueKind::Mapping, represent_map);
        registry.add_representer(ValueKind::OrderedMap, represent_omap);
        registry.add_representer(ValueKind::Pairs, represent_pairs);
        registry.add_representer(ValueKind::Set, represent_set);
        registry
    }

    #[must_use]
    pub fn empty() -> Self {
        RepresenterRegistry {
            representers: HashMap::new(),
        }
    }

    /// Registers the representer for a value kind, replacing any previous one.
    pub fn add_representer(&mut self, kind: ValueKind, representer: RepresentFn) {
        self.representers.insert(kind, representer);
    }
}

/// Builds the document for one value.
pub struct Representer<'a> {
    registry: &'a RepresenterRegistry,
    document: Document,
    represented: HashMap<*const RefCell<Value>, NodeId>,
    /// Placeholders of shared handles whose content is still being built.
    pending: HashSet<NodeId>,
    default_style: Option<ScalarStyle>,
    default_flow_style: Option<bool>,
    sort_keys: bool,
}

impl<'a> Representer<'a> {
    /// Creates a representer using the style settings of `options`.
    #[must_use]
    pub fn new(registry: &'a RepresenterRegistry, options: &DumpOptions) -> Self {
        Representer {
            registry,
            document: Document::new(),
            represented: HashMap::new(),
            pending: HashSet::new(),
            default_style: options.default_style,
            default_flow_style: options.default_flow_style,
            sort_keys: options.sort_keys,
        }
    }

    /// Represents `value` as a new document.
    ///
    /// # Errors
    ///
    /// Fails with a representer error when a value kind has no registered
    /// representer.
    pub fn represent(&mut self, value: &Value) -> Result<Document> {
        let root = self.represent_data(value);
        self.represented.clear();
        self.pending.clear();
        let mut document = std::mem::take(&mut self.document);
        document.set_root(root?);
        Ok(document)
    }

    /// Represents a value nested in the document being built.
    pub fn represent_data(&mut self, value: &Value) -> Result<NodeId> {
        if let Value::Shared(shared) = value {
            let ptr = shared.as_ptr();
            if let Some(id) = self.represented.get(&ptr) {
                return Ok(*id);
            }
            let id = self.document.add(Node::scalar(NULL_TAG, "", None));
            self.represented.insert(ptr, id);
            self.pending.insert(id);
            let inner = shared.borrow();
            let node = match &*inner {
                Value::Shared(_) => {
                    let target = self.represent_data(&inner)?;
                    if self.pending.contains(&target) {
                        return Err(Error::representer(
                            "cannot represent a shared value that refers only to itself",
                        ));
                    }
                    self.document.node(target).clone()
                }
                other => self.dispatch(other)?,
            };
            self.pending.remove(&id);
            *self.document.node_mut(id) = node;
            return Ok(id);
        }
        let node = self.dispatch(value)?;
        Ok(self.document.add(node))
    }

    fn dispatch(&mut self, value: &Value) -> Result<Node> {
        match self.registry.representers.get(&value.kind()) {
            Some(representer) => representer(self, value),
            None => Err(Error::representer(format!(
                "cannot represent an object: {:?}",
                value
            ))),
        }
    }

    /// Builds a scalar node with the configured default style.
    #[must_use]
    pub fn represent_scalar(&self, tag: &str, value: impl Into<String>) -> Node {
        Node::scalar(tag, value, self.default_style)
    }

    /// Builds a sequence node, choosing flow style for sequences of plain
    /// scalars when no default flow style is set.
    pub fn represent_sequence<'v>(
        &mut self,
        tag: &str,
        items: impl IntoIterator<Item = &'v Value>,
    ) -> Result<Node> {
        let mut ids = Vec::new();
        let mut best_style = true;
        for item in items {
            let id = self.represent_data(item)?;
            best_style &= self.is_plain_scalar(id);
            ids.push(id);
        }
        let flow_style = self.default_flow_style.unwrap_or(best_style);
        Ok(Node::sequence(tag, ids, flow_style))
    }

    /// Builds a mapping node from entries in order, sorting them first when
    /// key sorting is enabled.
    pub fn represent_mapping<'v>(
        &mut self,
        tag: &str,
        entries: impl IntoIterator<Item = (&'v Value, &'v Value)>,
    ) -> Result<Node> {
        let mut entries: Vec<_> = entries.into_iter().collect();
        if self.sort_keys {
            entries.sort_by(|(a, _), (b, _)| compare_keys(a, b));
        }
        let mut pairs = Vec::with_capacity(entries.len());
        let mut best_style = true;
        for (key, value) in entries {
            let key_id = self.represent_data(key)?;
            let value_id = self.represent_data(value)?;
            best_style &= self.is_plain_scalar(key_id) && self.is_plain_scalar(value_id);
            pairs.push((key_id, value_id));
        }
        let flow_style = self.default_flow_style.unwrap_or(best_style);
        Ok(Node::mapping(tag, pairs, flow_style))
    }

    fn is_plain_scalar(&self, id: NodeId) -> bool {
        matches!(
            self.document.node(id).kind,
            NodeKind::Scalar {
                style: None | Some(ScalarStyle::Plain),
                ..
            }
        )
    }
}

fn represent_null(representer: &mut Representer<'_>, _: &Value) -> Result<Node> {
    Ok(representer.represent_scalar(NULL_TAG, "null"))
}

fn represent_bool(representer: &mut Representer<'_>, value: &Value) -> Result<Node> {
    let text = if value.as_bool() == Some(true) { "true" } else { "false" };
    Ok(representer.represent_scalar(BOOL_TAG, text))
}

fn represent_number(representer: &mut Representer<'_>, value: &Value) -> Result<Node> {
    match value {
        Value::Number(number @ Number::Integer(_)) => {
            Ok(representer.represent_scalar(INT_TAG, number.to_string()))
        }
        Value::Number(number) => Ok(representer.represent_scalar(FLOAT_TAG, number.to_string())),
        other => Err(unexpected(other)),
    }
}

fn represent_bigint(representer: &mut Representer<'_>, value: &Value) -> Result<Node> {
    match value {
        Value::BigInt(number) => Ok(representer.represent_scalar(INT_TAG, number.to_string())),
        other => Err(unexpected(other)),
    }
}

fn represent_str(representer: &mut Representer<'_>, value: &Value) -> Result<Node> {
    match value {
        Value::String(text) => Ok(representer.represent_scalar(STR_TAG, text.as_str())),
        other => Err(unexpected(other)),
    }
}

fn represent_timestamp(representer: &mut Representer<'_>, value: &Value) -> Result<Node> {
    match value {
        Value::Timestamp(timestamp) => Ok(representer.represent_scalar(
            TIMESTAMP_TAG,
            timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        )),
        other => Err(unexpected(other)),
    }
}

fn represent_binary(_: &mut Representer<'_>, value: &Value) -> Result<Node> {
    let bytes = match value {
        Value::Binary(bytes) => bytes,
        other => return Err(unexpected(other)),
    };
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    let mut text = String::with_capacity(encoded.len() + encoded.len() / BINARY_LINE_LENGTH + 1);
    for chunk in encoded.as_bytes().chunks(BINARY_LINE_LENGTH) {
        text.push_str(&String::from_utf8_lossy(chunk));
        text.push('\n');
    }
    Ok(Node::scalar(BINARY_TAG, text, Some(ScalarStyle::Literal)))
}

fn represent_seq(representer: &mut Representer<'_>, value: &Value) -> Result<Node> {
    match value {
        Value::Sequence(items) => representer.represent_sequence(SEQ_TAG, items),
        other => Err(unexpected(other)),
    }
}

fn represent_map(representer: &mut Representer<'_>, value: &Value) -> Result<Node> {
    match value {
        Value::Mapping(map) => representer.represent_mapping(MAP_TAG, map.iter()),
        other => Err(unexpected(other)),
    }
}

/// Writes ordered pairs as a sequence of single-pair mappings.
fn represent_pair_list(
    representer: &mut Representer<'_>,
    tag: &str,
    pairs: &[(Value, Value)],
) -> Result<Node> {
    let mut ids = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        let node = representer.represent_mapping(MAP_TAG, std::iter::once((key, value)))?;
        ids.push(representer.document.add(node));
    }
    let flow_style = representer.default_flow_style.unwrap_or(false);
    Ok(Node::sequence(tag, ids, flow_style))
}

fn represent_omap(representer: &mut Representer<'_>, value: &Value) -> Result<Node> {
    match value {
        Value::OrderedMap(pairs) => represent_pair_list(representer, OMAP_TAG, pairs),
        other => Err(unexpected(other)),
    }
}

fn represent_pairs(representer: &mut Representer<'_>, value: &Value) -> Result<Node> {
    match value {
        Value::Pairs(pairs) => represent_pair_list(representer, PAIRS_TAG, pairs),
        other => Err(unexpected(other)),
    }
}

fn represent_set(representer: &mut Representer<'_>, value: &Value) -> Result<Node> {
    let Value::Set(items) = value else {
        return Err(unexpected(value));
    };
    let null = Value::Null;
    representer.represent_mapping(SET_TAG, items.iter().map(|item| (item, &null)))
}

fn unexpected(value: &Value) -> Error {
    Error::representer(format!("unexpected value kind {:?}", value.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SharedValue;

    fn represent(value: &Value) -> Document {
        let registry = RepresenterRegistry::new();
        Representer::new(&registry, &DumpOptions::new())
            .represent(value)
            .unwrap()
    }

    fn root_scalar(value: &Value) -> (String, String) {
        let document = represent(value);
        let root = document.root_node().unwrap();
        (root.tag.clone(), root.as_scalar().unwrap().to_string())
    }

    #[test]
    fn test_scalar_tags() {
        assert_eq!(root_scalar(&Value::Null), (NULL_TAG.to_string(), "null".to_string()));
        assert_eq!(root_scalar(&Value::from(true)).1, "true");
        assert_eq!(root_scalar(&Value::from(-3)).0, INT_TAG);
        assert_eq!(root_scalar(&Value::from(2.0)), (FLOAT_TAG.to_string(), "2.0".to_string()));
        assert_eq!(root_scalar(&Value::from(f64::NAN)).1, ".nan");
        assert_eq!(root_scalar(&Value::from("x")).0, STR_TAG);
    }

    #[test]
    fn test_binary_is_literal_base64() {
        let document = represent(&Value::Binary(vec![0u8; 100]));
        let root = document.root_node().unwrap();
        assert_eq!(root.tag, BINARY_TAG);
        let text = root.as_scalar().unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), BINARY_LINE_LENGTH);
        assert!(matches!(
            root.kind,
            NodeKind::Scalar {
                style: Some(ScalarStyle::Literal),
                ..
            }
        ));
    }

    #[test]
    fn test_repeated_plain_values_are_not_shared() {
        let value = Value::from(vec!["same", "same"]);
        let document = represent(&value);
        let items = document.root_node().unwrap().as_sequence().unwrap();
        assert_ne!(items[0], items[1]);
    }

    #[test]
    fn test_cycle_reuses_node() {
        let shared = SharedValue::new(Value::Null);
        shared.replace(Value::Sequence(vec![Value::Shared(shared.clone())]));
        let document = represent(&Value::Shared(shared));
        let root = document.root().unwrap();
        assert_eq!(document.node(root).as_sequence(), Some(&[root][..]));
    }

    #[test]
    fn test_best_flow_style() {
        let registry = RepresenterRegistry::new();
        let options = DumpOptions::new().with_default_flow_style(None);
        let value = Value::from(vec![Value::from(vec![1, 2]), Value::from("a\nb")]);
        let document = Representer::new(&registry, &options).represent(&value).unwrap();
        let root = document.root_node().unwrap();
        let NodeKind::Sequence { items, flow_style } = &root.kind else {
            panic!("expected a sequence");
        };
        assert!(!flow_style);
        assert!(matches!(
            document.node(items[0]).kind,
            NodeKind::Sequence { flow_style: true, .. }
        ));
    }

    #[test]
    fn test_sorted_keys() {
        let registry = RepresenterRegistry::new();
        let options = DumpOptions::new().with_sort_keys(true);
        let value: Value = crate::Mapping::from_iter([
            (Value::from("b"), Value::from(1)),
            (Value::from("a"), Value::from(2)),
        ])
        .into();
        let document = Representer::new(&registry, &options).represent(&value).unwrap();
        let pairs = document.root_node().unwrap().as_mapping().unwrap();
        assert_eq!(document.node(pairs[0].0).as_scalar(), Some("a"));
    }

    #[test]
    fn test_shared_value_pointing_at_itself() {
        let registry = RepresenterRegistry::new();
        let options = DumpOptions::new();

        let looped = SharedValue::new(Value::Null);
        looped.replace(Value::Shared(looped.clone()));
        let err = Representer::new(&registry, &options)
            .represent(&Value::Shared(looped.clone()))
            .unwrap_err();
        assert!(err.is_representer());
        assert!(err.to_string().contains("refers only to itself"));
        looped.replace(Value::Null);

        let first = SharedValue::new(Value::Null);
        let second = SharedValue::new(Value::Shared(first.clone()));
        first.replace(Value::Shared(second.clone()));
        assert!(Representer::new(&registry, &options)
            .represent(&Value::Shared(first.clone()))
            .is_err());
        first.replace(Value::Null);

        let inner = SharedValue::new(Value::from(vec![1]));
        let outer = SharedValue::new(Value::Shared(inner));
        let document = Representer::new(&registry, &options)
            .represent(&Value::Shared(outer))
            .unwrap();
        assert_eq!(document.root_node().unwrap().as_sequence().map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_missing_representer() {
        let registry = RepresenterRegistry::empty();
        let err = Representer::new(&registry, &DumpOptions::new())
            .represent(&Value::from(1))
            .unwrap_err();
        assert!(err.is_representer());
        assert!(err.to_string().contains("cannot represent an object"));
    }
}
