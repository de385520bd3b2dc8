//! Builds representation graphs from events.
//!
//! The composer consumes one document's events at a time and produces a
//! [`Document`] arena. Anchors are tracked per document: an alias refers to a
//! node anchored earlier in the same document, including one whose
//! collection is still open, which is how cycles arise. Tags left implicit by
//! the parser are filled in by the [`Resolver`].

use crate::error::{Error, Result};
use crate::events::EventKind;
use crate::mark::Mark;
use crate::nodes::{Document, Node, NodeId, NodeKind, NodeType};
use crate::parser::Parser;
use crate::resolver::Resolver;
use std::collections::HashMap;

/// Maximum nesting of collections in one document.
pub const MAX_DEPTH: usize = 512;

/// Turns a stream of events into documents.
#[derive(Debug)]
pub struct Composer {
    parser: Parser,
    resolver: Resolver,
    anchors: HashMap<String, (NodeId, Mark)>,
    depth: usize,
    started: bool,
    failed: bool,
}

impl Composer {
    /// Creates a composer over `text` with the default resolver.
    ///
    /// # Errors
    ///
    /// Fails if the text contains characters YAML does not allow.
    pub fn new(text: &str) -> Result<Self> {
        Ok(Self::from_parser(Parser::new(text)?, Resolver::new()))
    }

    #[must_use]
    pub fn from_parser(parser: Parser, resolver: Resolver) -> Self {
        Composer {
            parser,
            resolver,
            anchors: HashMap::new(),
            depth: 0,
            started: false,
            failed: false,
        }
    }

    /// Replaces the resolver used for implicit tags.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    fn skip_stream_start(&mut self) -> Result<()> {
        if !self.started {
            self.started = true;
            if self.parser.check_event(|kind| matches!(kind, EventKind::StreamStart))? {
                self.parser.next_event()?;
            }
        }
        Ok(())
    }

    /// Returns `true` if another document follows.
    pub fn check_document(&mut self) -> Result<bool> {
        self.skip_stream_start()?;
        Ok(!self.parser.check_event(|kind| matches!(kind, EventKind::StreamEnd))?
            && self.parser.peek_event()?.is_some())
    }

    /// Composes the next document, or returns `None` at the end of the stream.
    pub fn next_document(&mut self) -> Result<Option<Document>> {
        if !self.check_document()? {
            return Ok(None);
        }
        self.compose_document().map(Some)
    }

    /// Composes the only document of the stream.
    ///
    /// # Errors
    ///
    /// Fails with a composer error if the stream holds more than one document.
    pub fn single_document(&mut self) -> Result<Option<Document>> {
        let document = self.next_document()?;
        if self.check_document()? {
            let event = self.parser.next_event()?;
            let first_mark = document
                .as_ref()
                .and_then(|doc| doc.root_node())
                .map(|node| node.start_mark.clone());
            return Err(Error::composer(
                Some("expected a single document in the stream"),
                first_mark,
                "but found another document",
                event.start_mark,
            ));
        }
        Ok(document)
    }

    fn compose_document(&mut self) -> Result<Document> {
        // DocumentStart
        self.parser.next_event()?;
        self.depth = 0;
        let mut document = Document::new();
        let root = self.compose_node(&mut document)?;
        document.set_root(root);
        // DocumentEnd
        self.parser.next_event()?;
        tracing::debug!(
            nodes = document.len(),
            anchors = self.anchors.len(),
            "composed document"
        );
        self.anchors.clear();
        Ok(document)
    }

    fn compose_node(&mut self, document: &mut Document) -> Result<NodeId> {
        let event = self.parser.next_event()?;
        if let EventKind::Alias { anchor } = &event.kind {
            return match self.anchors.get(anchor) {
                Some((id, _)) => Ok(*id),
                None => Err(Error::composer(
                    None,
                    None,
                    format!("found undefined alias '{}'", anchor),
                    event.start_mark,
                )),
            };
        }

        if let Some(anchor) = event.kind.anchor() {
            if let Some((_, first_mark)) = self.anchors.get(anchor) {
                return Err(Error::composer(
                    Some(format!("found duplicate anchor '{}'; first occurrence", anchor).as_str()),
                    Some(first_mark.clone()),
                    "second occurrence",
                    event.start_mark,
                ));
            }
        }

        let start_mark = event.start_mark;
        match event.kind {
            EventKind::Scalar {
                anchor,
                tag,
                implicit,
                value,
                style,
            } => {
                let tag = match tag {
                    Some(tag) if tag != "!" => tag,
                    _ => self.resolver.resolve(NodeType::Scalar, &value, implicit),
                };
                let id = document.add(Node {
                    tag,
                    kind: NodeKind::Scalar { value, style },
                    start_mark: start_mark.clone(),
                    end_mark: event.end_mark,
                });
                self.register_anchor(anchor, id, start_mark);
                Ok(id)
            }
            EventKind::SequenceStart {
                anchor,
                tag,
                flow_style,
                ..
            } => {
                let tag = match tag {
                    Some(tag) if tag != "!" => tag,
                    _ => self
                        .resolver
                        .resolve(NodeType::Sequence, "", Default::default()),
                };
                let id = document.add(
                    Node::sequence(tag, Vec::new(), flow_style)
                        .with_marks(start_mark.clone(), event.end_mark),
                );
                self.enter_collection(&start_mark)?;
                self.register_anchor(anchor, id, start_mark);
                let mut children = Vec::new();
                while !self
                    .parser
                    .check_event(|kind| matches!(kind, EventKind::SequenceEnd))?
                {
                    children.push(self.compose_node(document)?);
                }
                self.depth -= 1;
                let end_event = self.parser.next_event()?;
                let node = document.node_mut(id);
                node.end_mark = end_event.end_mark;
                if let NodeKind::Sequence { items, .. } = &mut node.kind {
                    *items = children;
                }
                Ok(id)
            }
            EventKind::MappingStart {
                anchor,
                tag,
                flow_style,
                ..
            } => {
                let tag = match tag {
                    Some(tag) if tag != "!" => tag,
                    _ => self
                        .resolver
                        .resolve(NodeType::Mapping, "", Default::default()),
                };
                let id = document.add(
                    Node::mapping(tag, Vec::new(), flow_style)
                        .with_marks(start_mark.clone(), event.end_mark),
                );
                self.enter_collection(&start_mark)?;
                self.register_anchor(anchor, id, start_mark);
                let mut children = Vec::new();
                while !self
                    .parser
                    .check_event(|kind| matches!(kind, EventKind::MappingEnd))?
                {
                    let key = self.compose_node(document)?;
                    let value = self.compose_node(document)?;
                    children.push((key, value));
                }
                self.depth -= 1;
                let end_event = self.parser.next_event()?;
                let node = document.node_mut(id);
                node.end_mark = end_event.end_mark;
                if let NodeKind::Mapping { pairs, .. } = &mut node.kind {
                    *pairs = children;
                }
                Ok(id)
            }
            other => Err(Error::composer(
                None,
                None,
                format!("expected a node, but found {}", other.name()),
                start_mark,
            )),
        }
    }

    fn enter_collection(&mut self, mark: &Mark) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(Error::composer(
                Some("while composing a node"),
                None,
                format!("exceeded the maximum nesting depth of {}", MAX_DEPTH),
                mark.clone(),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn register_anchor(&mut self, anchor: Option<String>, id: NodeId, mark: Mark) {
        if let Some(anchor) = anchor {
            self.anchors.insert(anchor, (id, mark));
        }
    }
}

impl Iterator for Composer {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.next_document().transpose();
        self.failed = matches!(result, Some(Err(_)));
        result
    }
}
