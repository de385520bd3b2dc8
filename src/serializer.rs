//! Turns representation graphs into events.
//!
//! The serializer walks each document twice. The first pass finds nodes
//! reachable from more than one parent and gives them anchors named
//! `id0001`, `id0002` and so on; the second pass emits events, writing an
//! anchored node once and an alias everywhere it recurs. A tag is marked
//! implicit when the resolver would pick the same tag back on loading.

use crate::emitter::Emitter;
use crate::error::{Error, Result};
use crate::events::{Event, EventKind, ImplicitFlags};
use crate::nodes::{Document, NodeId, NodeKind, NodeType};
use crate::options::DumpOptions;
use crate::resolver::Resolver;
use std::collections::{HashMap, HashSet};

/// Feeds documents to an [`Emitter`] as events.
#[derive(Debug)]
pub struct Serializer {
    emitter: Emitter,
    resolver: Resolver,
    explicit_start: bool,
    explicit_end: bool,
    version: Option<(u32, u32)>,
    tags: Vec<(String, String)>,
    /// `None` before `open`, `Some(false)` while open, `Some(true)` after `close`.
    closed: Option<bool>,
    anchors: HashMap<NodeId, Option<String>>,
    serialized: HashSet<NodeId>,
    last_anchor_id: usize,
}

impl Serializer {
    /// Creates a serializer writing with the settings of `options`.
    #[must_use]
    pub fn new(options: &DumpOptions, resolver: Resolver) -> Self {
        Serializer {
            emitter: Emitter::new(options),
            resolver,
            explicit_start: options.explicit_start,
            explicit_end: options.explicit_end,
            version: options.version,
            tags: options.tags.clone(),
            closed: None,
            anchors: HashMap::new(),
            serialized: HashSet::new(),
            last_anchor_id: 0,
        }
    }

    /// Starts the stream.
    ///
    /// # Errors
    ///
    /// Fails if the stream was already opened or closed.
    pub fn open(&mut self) -> Result<()> {
        match self.closed {
            None => {
                self.emitter.emit(Event::new(EventKind::StreamStart))?;
                self.closed = Some(false);
                Ok(())
            }
            Some(true) => Err(Error::serializer("serializer is closed")),
            Some(false) => Err(Error::serializer("serializer is already opened")),
        }
    }

    /// Ends the stream. Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Fails if the stream was never opened.
    pub fn close(&mut self) -> Result<()> {
        match self.closed {
            None => Err(Error::serializer("serializer is not opened")),
            Some(false) => {
                self.emitter.emit(Event::new(EventKind::StreamEnd))?;
                self.closed = Some(true);
                Ok(())
            }
            Some(true) => Ok(()),
        }
    }

    /// Writes one document.
    ///
    /// # Errors
    ///
    /// Fails if the stream is not open, if the document has no root node, or
    /// if the emitter rejects an event.
    pub fn serialize(&mut self, document: &Document) -> Result<()> {
        match self.closed {
            None => return Err(Error::serializer("serializer is not opened")),
            Some(true) => return Err(Error::serializer("serializer is closed")),
            Some(false) => {}
        }
        let root = document
            .root()
            .ok_or_else(|| Error::serializer("document has no root node"))?;
        self.emitter.emit(Event::new(EventKind::DocumentStart {
            explicit: self.explicit_start,
            version: self.version,
            tags: self.tags.clone(),
        }))?;
        self.anchor_node(document, root);
        tracing::debug!(
            nodes = document.len(),
            anchors = self.anchors.values().filter(|anchor| anchor.is_some()).count(),
            "serializing document"
        );
        let result = self.serialize_node(document, root);
        self.anchors.clear();
        self.serialized.clear();
        self.last_anchor_id = 0;
        result?;
        self.emitter.emit(Event::new(EventKind::DocumentEnd {
            explicit: self.explicit_end,
        }))
    }

    /// Text written so far.
    #[must_use]
    pub fn output(&self) -> &str {
        self.emitter.output()
    }

    #[must_use]
    pub fn into_output(self) -> String {
        self.emitter.into_output()
    }

    fn anchor_node(&mut self, document: &Document, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(anchor) = self.anchors.get_mut(&id) {
                if anchor.is_none() {
                    self.last_anchor_id += 1;
                    *anchor = Some(format!("id{:04}", self.last_anchor_id));
                }
                continue;
            }
            self.anchors.insert(id, None);
            match &document.node(id).kind {
                NodeKind::Scalar { .. } => {}
                NodeKind::Sequence { items, .. } => stack.extend(items.iter().rev()),
                NodeKind::Mapping { pairs, .. } => {
                    for (key, value) in pairs.iter().rev() {
                        stack.push(*value);
                        stack.push(*key);
                    }
                }
            }
        }
    }

    fn serialize_node(&mut self, document: &Document, id: NodeId) -> Result<()> {
        let anchor = self.anchors.get(&id).cloned().flatten();
        if self.serialized.contains(&id) {
            let anchor = anchor.ok_or_else(|| {
                Error::serializer(format!("node {} was serialized without an anchor", id.0))
            })?;
            return self.emitter.emit(Event::new(EventKind::Alias { anchor }));
        }
        self.serialized.insert(id);
        let node = document.node(id);
        match &node.kind {
            NodeKind::Scalar { value, style } => {
                let detected =
                    self.resolver
                        .resolve(NodeType::Scalar, value, ImplicitFlags::new(true, false));
                let default =
                    self.resolver
                        .resolve(NodeType::Scalar, value, ImplicitFlags::new(false, true));
                let implicit = ImplicitFlags::new(node.tag == detected, node.tag == default);
                self.emitter.emit(Event::new(EventKind::Scalar {
                    anchor,
                    tag: Some(node.tag.clone()),
                    implicit,
                    value: value.clone(),
                    style: *style,
                }))
            }
            NodeKind::Sequence { items, flow_style } => {
                let implicit = node.tag
                    == self
                        .resolver
                        .resolve(NodeType::Sequence, "", ImplicitFlags::new(true, false));
                self.emitter.emit(Event::new(EventKind::SequenceStart {
                    anchor,
                    tag: Some(node.tag.clone()),
                    implicit,
                    flow_style: *flow_style,
                }))?;
                for item in items {
                    self.serialize_node(document, *item)?;
                }
                self.emitter.emit(Event::new(EventKind::SequenceEnd))
            }
            NodeKind::Mapping { pairs, flow_style } => {
                let implicit = node.tag
                    == self
                        .resolver
                        .resolve(NodeType::Mapping, "", ImplicitFlags::new(true, false));
                self.emitter.emit(Event::new(EventKind::MappingStart {
                    anchor,
                    tag: Some(node.tag.clone()),
                    implicit,
                    flow_style: *flow_style,
                }))?;
                for (key, value) in pairs {
                    self.serialize_node(document, *key)?;
                    self.serialize_node(document, *value)?;
                }
                self.emitter.emit(Event::new(EventKind::MappingEnd))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::Node;
    use crate::resolver::{INT_TAG, MAP_TAG, SEQ_TAG, STR_TAG};

    fn serialize(document: &Document, options: &DumpOptions) -> Result<String> {
        let mut serializer = Serializer::new(options, Resolver::new());
        serializer.open()?;
        serializer.serialize(document)?;
        serializer.close()?;
        Ok(serializer.into_output())
    }

    #[test]
    fn test_shared_node_gets_anchor() {
        let mut document = Document::new();
        let item = document.add(Node::scalar(STR_TAG, "x", None));
        let inner = document.add(Node::sequence(SEQ_TAG, vec![item], true));
        let root = document.add(Node::sequence(SEQ_TAG, vec![inner, inner], false));
        document.set_root(root);
        let text = serialize(&document, &DumpOptions::new()).unwrap();
        assert_eq!(text, "- &id0001 [x]\n- *id0001\n");
    }

    #[test]
    fn test_self_reference() {
        let mut document = Document::new();
        let root = document.add(Node::sequence(SEQ_TAG, vec![], false));
        if let NodeKind::Sequence { items, .. } = &mut document.node_mut(root).kind {
            items.push(root);
        }
        document.set_root(root);
        let text = serialize(&document, &DumpOptions::new()).unwrap();
        assert_eq!(text, "&id0001\n- *id0001\n");
    }

    #[test]
    fn test_implicit_tags() {
        let mut document = Document::new();
        let key = document.add(Node::scalar(STR_TAG, "n", None));
        let value = document.add(Node::scalar(STR_TAG, "12", None));
        let key2 = document.add(Node::scalar(STR_TAG, "m", None));
        let value2 = document.add(Node::scalar(INT_TAG, "12", None));
        let root = document.add(Node::mapping(
            MAP_TAG,
            vec![(key, value), (key2, value2)],
            false,
        ));
        document.set_root(root);
        let text = serialize(&document, &DumpOptions::new()).unwrap();
        assert_eq!(text, "n: '12'\nm: 12\n");
    }

    #[test]
    fn test_explicit_markers() {
        let mut document = Document::new();
        let root = document.add(Node::scalar(STR_TAG, "a", None));
        document.set_root(root);
        let options = DumpOptions::new()
            .with_explicit_start(true)
            .with_explicit_end(true);
        assert_eq!(serialize(&document, &options).unwrap(), "--- a\n...\n");
    }

    #[test]
    fn test_state_errors() {
        let mut serializer = Serializer::new(&DumpOptions::new(), Resolver::new());
        let document = Document::new();
        assert!(serializer.serialize(&document).unwrap_err().to_string().contains("not opened"));
        assert!(serializer.close().is_err());
        serializer.open().unwrap();
        assert!(serializer.open().unwrap_err().to_string().contains("already opened"));
        let err = serializer.serialize(&document).unwrap_err();
        assert!(err.to_string().contains("no root node"));
        serializer.close().unwrap();
        serializer.close().unwrap();
        assert!(serializer.open().unwrap_err().to_string().contains("is closed"));
    }
}
