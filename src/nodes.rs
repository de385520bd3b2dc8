//! The representation graph.
//!
//! A composed document is a directed graph of tagged nodes. Aliases make a
//! node reachable from several parents, and can make the graph cyclic, so
//! nodes live in an arena owned by the [`Document`] and refer to each other
//! by [`NodeId`]. Node identity is the id: two parents holding the same id
//! share one node.

use crate::mark::Mark;
use crate::tokens::ScalarStyle;

/// Index of a node inside its [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// The three node kinds, without their content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    Scalar,
    Sequence,
    Mapping,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Scalar {
        value: String,
        style: Option<ScalarStyle>,
    },
    Sequence {
        items: Vec<NodeId>,
        flow_style: bool,
    },
    Mapping {
        pairs: Vec<(NodeId, NodeId)>,
        flow_style: bool,
    },
}

/// A tagged node with its source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub tag: String,
    pub kind: NodeKind,
    pub start_mark: Mark,
    pub end_mark: Mark,
}

impl Node {
    #[must_use]
    pub fn scalar(tag: impl Into<String>, value: impl Into<String>, style: Option<ScalarStyle>) -> Self {
        Node {
            tag: tag.into(),
            kind: NodeKind::Scalar {
                value: value.into(),
                style,
            },
            start_mark: Mark::default(),
            end_mark: Mark::default(),
        }
    }

    #[must_use]
    pub fn sequence(tag: impl Into<String>, items: Vec<NodeId>, flow_style: bool) -> Self {
        Node {
            tag: tag.into(),
            kind: NodeKind::Sequence { items, flow_style },
            start_mark: Mark::default(),
            end_mark: Mark::default(),
        }
    }

    #[must_use]
    pub fn mapping(tag: impl Into<String>, pairs: Vec<(NodeId, NodeId)>, flow_style: bool) -> Self {
        Node {
            tag: tag.into(),
            kind: NodeKind::Mapping { pairs, flow_style },
            start_mark: Mark::default(),
            end_mark: Mark::default(),
        }
    }

    #[must_use]
    pub fn with_marks(mut self, start_mark: Mark, end_mark: Mark) -> Self {
        self.start_mark = start_mark;
        self.end_mark = end_mark;
        self
    }

    #[must_use]
    pub const fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Scalar { .. } => NodeType::Scalar,
            NodeKind::Sequence { .. } => NodeType::Sequence,
            NodeKind::Mapping { .. } => NodeType::Mapping,
        }
    }

    /// Returns the scalar text, if this is a scalar node.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_sequence(&self) -> Option<&[NodeId]> {
        match &self.kind {
            NodeKind::Sequence { items, .. } => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_mapping(&self) -> Option<&[(NodeId, NodeId)]> {
        match &self.kind {
            NodeKind::Mapping { pairs, .. } => Some(pairs),
            _ => None,
        }
    }
}

/// Arena holding the nodes of one document.
///
/// # Examples
///
/// ```rust
/// use serde_yamlet::nodes::{Document, Node};
///
/// let mut doc = Document::new();
/// let item = doc.add(Node::scalar("tag:yaml.org,2002:int", "1", None));
/// let root = doc.add(Node::sequence("tag:yaml.org,2002:seq", vec![item, item], true));
/// doc.set_root(root);
/// assert_eq!(doc.root_node().unwrap().as_sequence().unwrap().len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and returns its id.
    pub fn add(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Returns the node for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this document.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[must_use]
    pub fn root_node(&self) -> Option<&Node> {
        self.root.map(|id| self.node(id))
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
