//! Parsing events.
//!
//! Events are the flat, ordered description of a YAML stream that sits
//! between the parser and the composer on the way in, and between the
//! serializer and the emitter on the way out. A well-formed stream is
//!
//! ```text
//! StreamStart (DocumentStart node DocumentEnd)* StreamEnd
//! ```
//!
//! where a node is an `Alias`, a `Scalar`, or a `SequenceStart`/`MappingStart`
//! followed by its children and the matching end event.

use crate::mark::Mark;
use crate::tokens::ScalarStyle;

/// Whether a scalar's tag may be omitted when written plain or quoted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImplicitFlags {
    /// The tag is implied when the scalar is written in plain style.
    pub plain: bool,
    /// The tag is implied when the scalar is written in any quoted style.
    pub quoted: bool,
}

impl ImplicitFlags {
    #[must_use]
    pub const fn new(plain: bool, quoted: bool) -> Self {
        ImplicitFlags { plain, quoted }
    }

    #[must_use]
    pub const fn any(&self) -> bool {
        self.plain || self.quoted
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub start_mark: Mark,
    pub end_mark: Mark,
}

impl Event {
    /// Creates an event with default marks, for building event streams by
    /// hand.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Event {
            kind,
            start_mark: Mark::default(),
            end_mark: Mark::default(),
        }
    }

    #[must_use]
    pub fn with_marks(kind: EventKind, start_mark: Mark, end_mark: Mark) -> Self {
        Event {
            kind,
            start_mark,
            end_mark,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EventKind {
    StreamStart,
    StreamEnd,
    DocumentStart {
        /// `---` was written (or must be written).
        explicit: bool,
        version: Option<(u32, u32)>,
        /// `%TAG` directives as `(handle, prefix)` pairs.
        tags: Vec<(String, String)>,
    },
    DocumentEnd {
        /// `...` was written (or must be written).
        explicit: bool,
    },
    Alias {
        anchor: String,
    },
    Scalar {
        anchor: Option<String>,
        tag: Option<String>,
        implicit: ImplicitFlags,
        value: String,
        /// `None` lets the emitter choose.
        style: Option<ScalarStyle>,
    },
    SequenceStart {
        anchor: Option<String>,
        tag: Option<String>,
        implicit: bool,
        flow_style: bool,
    },
    SequenceEnd,
    MappingStart {
        anchor: Option<String>,
        tag: Option<String>,
        implicit: bool,
        flow_style: bool,
    },
    MappingEnd,
}

impl EventKind {
    /// Short name used in diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            EventKind::StreamStart => "StreamStartEvent",
            EventKind::StreamEnd => "StreamEndEvent",
            EventKind::DocumentStart { .. } => "DocumentStartEvent",
            EventKind::DocumentEnd { .. } => "DocumentEndEvent",
            EventKind::Alias { .. } => "AliasEvent",
            EventKind::Scalar { .. } => "ScalarEvent",
            EventKind::SequenceStart { .. } => "SequenceStartEvent",
            EventKind::SequenceEnd => "SequenceEndEvent",
            EventKind::MappingStart { .. } => "MappingStartEvent",
            EventKind::MappingEnd => "MappingEndEvent",
        }
    }

    /// Returns the anchor of a node event.
    #[must_use]
    pub fn anchor(&self) -> Option<&str> {
        match self {
            EventKind::Alias { anchor } => Some(anchor),
            EventKind::Scalar { anchor, .. }
            | EventKind::SequenceStart { anchor, .. }
            | EventKind::MappingStart { anchor, .. } => anchor.as_deref(),
            _ => None,
        }
    }

    /// Returns the tag of a node event.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            EventKind::Scalar { tag, .. }
            | EventKind::SequenceStart { tag, .. }
            | EventKind::MappingStart { tag, .. } => tag.as_deref(),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_node(&self) -> bool {
        matches!(
            self,
            EventKind::Alias { .. }
                | EventKind::Scalar { .. }
                | EventKind::SequenceStart { .. }
                | EventKind::MappingStart { .. }
        )
    }

    #[inline]
    #[must_use]
    pub const fn is_collection_start(&self) -> bool {
        matches!(
            self,
            EventKind::SequenceStart { .. } | EventKind::MappingStart { .. }
        )
    }

    #[inline]
    #[must_use]
    pub const fn is_collection_end(&self) -> bool {
        matches!(self, EventKind::SequenceEnd | EventKind::MappingEnd)
    }

    /// A plain untagged scalar, the most common event when building streams
    /// by hand.
    #[must_use]
    pub fn plain_scalar(value: impl Into<String>) -> Self {
        EventKind::Scalar {
            anchor: None,
            tag: None,
            implicit: ImplicitFlags::new(true, false),
            value: value.into(),
            style: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let kind = EventKind::SequenceStart {
            anchor: Some("a".to_string()),
            tag: Some("tag:x".to_string()),
            implicit: false,
            flow_style: true,
        };
        assert_eq!(kind.anchor(), Some("a"));
        assert_eq!(kind.tag(), Some("tag:x"));
        assert!(kind.is_node());
        assert!(kind.is_collection_start());
        assert!(!EventKind::StreamEnd.is_node());
        assert_eq!(
            EventKind::Alias {
                anchor: "b".to_string()
            }
            .anchor(),
            Some("b")
        );
    }

    #[test]
    fn test_plain_scalar() {
        match EventKind::plain_scalar("x") {
            EventKind::Scalar {
                implicit, value, ..
            } => {
                assert!(implicit.plain && !implicit.quoted);
                assert_eq!(value, "x");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
