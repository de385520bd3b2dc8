//! Event parser.
//!
//! The parser is a pushdown automaton over the token stream. Each call to
//! [`Parser::get_event`] runs exactly one state and yields one [`Event`]; the
//! stack of pending states records where to return once a nested node is
//! finished. The grammar it accepts is:
//!
//! ```text
//! stream            ::= STREAM-START implicit_document? explicit_document* STREAM-END
//! implicit_document ::= block_node DOCUMENT-END*
//! explicit_document ::= DIRECTIVE* DOCUMENT-START block_node? DOCUMENT-END*
//! block_node        ::= ALIAS | properties block_content? | block_content
//! flow_node         ::= ALIAS | properties flow_content? | flow_content
//! properties        ::= TAG ANCHOR? | ANCHOR TAG?
//! block_collection  ::= block_sequence | block_mapping
//! block_sequence    ::= BLOCK-SEQUENCE-START (BLOCK-ENTRY block_node?)* BLOCK-END
//! indentless_seq    ::= (BLOCK-ENTRY block_node?)+
//! block_mapping     ::= BLOCK-MAPPING-START ((KEY block_node_or_indentless_sequence?)?
//!                       (VALUE block_node_or_indentless_sequence?)?)* BLOCK-END
//! flow_sequence     ::= FLOW-SEQUENCE-START (flow_sequence_entry FLOW-ENTRY)*
//!                       flow_sequence_entry? FLOW-SEQUENCE-END
//! flow_mapping      ::= FLOW-MAPPING-START (flow_mapping_entry FLOW-ENTRY)*
//!                       flow_mapping_entry? FLOW-MAPPING-END
//! ```
//!
//! Tag handles are expanded here using the `%TAG` directives of the current
//! document plus the defaults `!` and `!!`.
//!
//! ```rust
//! use serde_yamlet::events::EventKind;
//! use serde_yamlet::parse;
//!
//! let events = parse("- a\n").unwrap();
//! assert!(matches!(events[2].kind, EventKind::SequenceStart { flow_style: false, .. }));
//! ```

use crate::error::{Error, Result};
use crate::events::{Event, EventKind, ImplicitFlags};
use crate::mark::Mark;
use crate::scanner::Scanner;
use crate::tokens::TokenKind;
use std::collections::HashMap;

/// Prefix that the `!!` handle expands to.
pub const DEFAULT_TAG_PREFIX: &str = "tag:yaml.org,2002:";

/// The built-in tag handles.
pub const DEFAULT_TAGS: [(&str, &str); 2] = [("!", "!"), ("!!", DEFAULT_TAG_PREFIX)];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    StreamStart,
    ImplicitDocumentStart,
    DocumentStart,
    DocumentEnd,
    DocumentContent,
    BlockNode,
    BlockSequenceFirstEntry,
    BlockSequenceEntry,
    IndentlessSequenceEntry,
    BlockMappingFirstKey,
    BlockMappingKey,
    BlockMappingValue,
    FlowSequenceFirstEntry,
    FlowSequenceEntry,
    FlowSequenceEntryMappingKey,
    FlowSequenceEntryMappingValue,
    FlowSequenceEntryMappingEnd,
    FlowMappingFirstKey,
    FlowMappingKey,
    FlowMappingValue,
    FlowMappingEmptyValue,
    End,
}

/// Produces [`Event`]s from a [`Scanner`].
#[derive(Debug)]
pub struct Parser {
    scanner: Scanner,
    current_event: Option<Event>,
    tag_handles: HashMap<String, String>,
    states: Vec<State>,
    marks: Vec<Mark>,
    state: State,
}

impl Parser {
    /// Creates a parser over `text`.
    ///
    /// # Errors
    ///
    /// Fails if the text contains characters YAML does not allow.
    pub fn new(text: &str) -> Result<Self> {
        Ok(Self::from_scanner(Scanner::new(text)?))
    }

    #[must_use]
    pub fn from_scanner(scanner: Scanner) -> Self {
        Parser {
            scanner,
            current_event: None,
            tag_handles: HashMap::new(),
            states: Vec::new(),
            marks: Vec::new(),
            state: State::StreamStart,
        }
    }

    /// Returns `true` if the next event satisfies `predicate`.
    pub fn check_event(&mut self, predicate: impl FnOnce(&EventKind) -> bool) -> Result<bool> {
        Ok(self.peek_event()?.map_or(false, |event| predicate(&event.kind)))
    }

    /// Returns the next event without consuming it.
    pub fn peek_event(&mut self) -> Result<Option<&Event>> {
        if self.current_event.is_none() && self.state != State::End {
            let event = self.step()?;
            tracing::trace!(event = event.kind.name(), "parsed event");
            self.current_event = Some(event);
        }
        Ok(self.current_event.as_ref())
    }

    /// Consumes and returns the next event.
    pub fn get_event(&mut self) -> Result<Option<Event>> {
        self.peek_event()?;
        Ok(self.current_event.take())
    }

    /// Like [`get_event`](Self::get_event), but running out of events is an
    /// error.
    pub(crate) fn next_event(&mut self) -> Result<Event> {
        match self.get_event()? {
            Some(event) => Ok(event),
            None => Err(Error::parser(
                None,
                None,
                "unexpected end of the event stream",
                self.scanner.mark(),
            )),
        }
    }

    fn step(&mut self) -> Result<Event> {
        match self.state {
            State::StreamStart => self.parse_stream_start(),
            State::ImplicitDocumentStart => self.parse_implicit_document_start(),
            State::DocumentStart => self.parse_document_start(),
            State::DocumentEnd => self.parse_document_end(),
            State::DocumentContent => self.parse_document_content(),
            State::BlockNode => self.parse_node(true, false),
            State::BlockSequenceFirstEntry => {
                let token = self.scanner.next_token()?;
                self.marks.push(token.start_mark);
                self.parse_block_sequence_entry()
            }
            State::BlockSequenceEntry => self.parse_block_sequence_entry(),
            State::IndentlessSequenceEntry => self.parse_indentless_sequence_entry(),
            State::BlockMappingFirstKey => {
                let token = self.scanner.next_token()?;
                self.marks.push(token.start_mark);
                self.parse_block_mapping_key()
            }
            State::BlockMappingKey => self.parse_block_mapping_key(),
            State::BlockMappingValue => self.parse_block_mapping_value(),
            State::FlowSequenceFirstEntry => {
                let token = self.scanner.next_token()?;
                self.marks.push(token.start_mark);
                self.parse_flow_sequence_entry(true)
            }
            State::FlowSequenceEntry => self.parse_flow_sequence_entry(false),
            State::FlowSequenceEntryMappingKey => self.parse_flow_sequence_entry_mapping_key(),
            State::FlowSequenceEntryMappingValue => {
                self.parse_flow_sequence_entry_mapping_value()
            }
            State::FlowSequenceEntryMappingEnd => self.parse_flow_sequence_entry_mapping_end(),
            State::FlowMappingFirstKey => {
                let token = self.scanner.next_token()?;
                self.marks.push(token.start_mark);
                self.parse_flow_mapping_key(true)
            }
            State::FlowMappingKey => self.parse_flow_mapping_key(false),
            State::FlowMappingValue => self.parse_flow_mapping_value(),
            State::FlowMappingEmptyValue => {
                self.state = State::FlowMappingKey;
                let mark = self.peek_start_mark()?;
                Ok(Self::empty_scalar(mark))
            }
            State::End => Err(Error::parser(
                None,
                None,
                "no more events",
                self.scanner.mark(),
            )),
        }
    }

    // Token helpers.

    fn check(&mut self, predicate: impl FnOnce(&TokenKind) -> bool) -> Result<bool> {
        self.scanner.check_token(predicate)
    }

    fn peek_start_mark(&mut self) -> Result<Mark> {
        Ok(self.scanner.peek()?.start_mark.clone())
    }

    fn pop_state(&mut self) -> State {
        self.states.pop().unwrap_or(State::End)
    }

    /// Builds a parser error whose problem mentions the upcoming token.
    fn unexpected(
        &mut self,
        context: Option<&str>,
        context_mark: Option<Mark>,
        problem: impl FnOnce(&TokenKind) -> String,
    ) -> Error {
        match self.scanner.peek() {
            Ok(token) => Error::parser(
                context,
                context_mark,
                problem(&token.kind),
                token.start_mark.clone(),
            ),
            Err(e) => e,
        }
    }

    fn empty_scalar(mark: Mark) -> Event {
        Event::with_marks(
            EventKind::Scalar {
                anchor: None,
                tag: None,
                implicit: ImplicitFlags::new(true, false),
                value: String::new(),
                style: None,
            },
            mark.clone(),
            mark,
        )
    }

    // Stream and documents.

    fn parse_stream_start(&mut self) -> Result<Event> {
        let token = self.scanner.next_token()?;
        self.state = State::ImplicitDocumentStart;
        Ok(Event::with_marks(
            EventKind::StreamStart,
            token.start_mark,
            token.end_mark,
        ))
    }

    fn parse_implicit_document_start(&mut self) -> Result<Event> {
        let explicit = self.check(|kind| {
            matches!(
                kind,
                TokenKind::VersionDirective { .. }
                    | TokenKind::TagDirective { .. }
                    | TokenKind::ReservedDirective { .. }
                    | TokenKind::DocumentStart
                    | TokenKind::StreamEnd
            )
        })?;
        if explicit {
            return self.parse_document_start();
        }
        self.reset_tag_handles();
        let mark = self.peek_start_mark()?;
        self.states.push(State::DocumentEnd);
        self.state = State::BlockNode;
        Ok(Event::with_marks(
            EventKind::DocumentStart {
                explicit: false,
                version: None,
                tags: Vec::new(),
            },
            mark.clone(),
            mark,
        ))
    }

    fn parse_document_start(&mut self) -> Result<Event> {
        while self.check(|kind| matches!(kind, TokenKind::DocumentEnd))? {
            self.scanner.next_token()?;
        }
        if self.check(|kind| matches!(kind, TokenKind::StreamEnd))? {
            let token = self.scanner.next_token()?;
            self.state = State::End;
            return Ok(Event::with_marks(
                EventKind::StreamEnd,
                token.start_mark,
                token.end_mark,
            ));
        }
        let start_mark = self.peek_start_mark()?;
        let (version, tags) = self.process_directives()?;
        if !self.check(|kind| matches!(kind, TokenKind::DocumentStart))? {
            return Err(self.unexpected(None, None, |kind| {
                format!("expected '<document start>', but found {}", kind)
            }));
        }
        let token = self.scanner.next_token()?;
        self.states.push(State::DocumentEnd);
        self.state = State::DocumentContent;
        Ok(Event::with_marks(
            EventKind::DocumentStart {
                explicit: true,
                version,
                tags,
            },
            start_mark,
            token.end_mark,
        ))
    }

    fn parse_document_end(&mut self) -> Result<Event> {
        let start_mark = self.peek_start_mark()?;
        let mut end_mark = start_mark.clone();
        let explicit = self.check(|kind| matches!(kind, TokenKind::DocumentEnd))?;
        if explicit {
            end_mark = self.scanner.next_token()?.end_mark;
        }
        self.state = State::DocumentStart;
        Ok(Event::with_marks(
            EventKind::DocumentEnd { explicit },
            start_mark,
            end_mark,
        ))
    }

    fn parse_document_content(&mut self) -> Result<Event> {
        let empty = self.check(|kind| {
            matches!(
                kind,
                TokenKind::VersionDirective { .. }
                    | TokenKind::TagDirective { .. }
                    | TokenKind::ReservedDirective { .. }
                    | TokenKind::DocumentStart
                    | TokenKind::DocumentEnd
                    | TokenKind::StreamEnd
            )
        })?;
        if empty {
            let mark = self.peek_start_mark()?;
            self.state = self.pop_state();
            Ok(Self::empty_scalar(mark))
        } else {
            self.parse_node(true, false)
        }
    }

    fn reset_tag_handles(&mut self) {
        self.tag_handles = DEFAULT_TAGS
            .iter()
            .map(|(handle, prefix)| (handle.to_string(), prefix.to_string()))
            .collect();
    }

    #[allow(clippy::type_complexity)]
    fn process_directives(&mut self) -> Result<(Option<(u32, u32)>, Vec<(String, String)>)> {
        let mut version = None;
        let mut tags: Vec<(String, String)> = Vec::new();
        loop {
            let is_directive = self.check(|kind| {
                matches!(
                    kind,
                    TokenKind::VersionDirective { .. }
                        | TokenKind::TagDirective { .. }
                        | TokenKind::ReservedDirective { .. }
                )
            })?;
            if !is_directive {
                break;
            }
            let token = self.scanner.next_token()?;
            match token.kind {
                TokenKind::VersionDirective { major, minor } => {
                    if version.is_some() {
                        return Err(Error::parser(
                            None,
                            None,
                            "found duplicate YAML directive",
                            token.start_mark,
                        ));
                    }
                    if major != 1 {
                        return Err(Error::parser(
                            None,
                            None,
                            "found incompatible YAML document (version 1.* is required)",
                            token.start_mark,
                        ));
                    }
                    version = Some((major, minor));
                }
                TokenKind::TagDirective { handle, prefix } => {
                    if tags.iter().any(|(existing, _)| *existing == handle) {
                        return Err(Error::parser(
                            None,
                            None,
                            format!("duplicate tag handle '{}'", handle),
                            token.start_mark,
                        ));
                    }
                    tags.push((handle, prefix));
                }
                _ => {}
            }
        }
        self.reset_tag_handles();
        for (handle, prefix) in &tags {
            self.tag_handles.insert(handle.clone(), prefix.clone());
        }
        Ok((version, tags))
    }

    // Nodes.

    fn parse_node(&mut self, block: bool, indentless_sequence: bool) -> Result<Event> {
        if self.check(|kind| matches!(kind, TokenKind::Alias(_)))? {
            let token = self.scanner.next_token()?;
            self.state = self.pop_state();
            let anchor = match token.kind {
                TokenKind::Alias(anchor) => anchor,
                _ => String::new(),
            };
            return Ok(Event::with_marks(
                EventKind::Alias { anchor },
                token.start_mark,
                token.end_mark,
            ));
        }

        let mut anchor = None;
        let mut tag_token = None;
        let mut start_mark = None;
        let mut end_mark = None;
        let mut tag_mark = None;
        for _ in 0..2 {
            let token = self.scanner.peek()?;
            match &token.kind {
                TokenKind::Anchor(_) if anchor.is_none() => {}
                TokenKind::Tag { .. } if tag_token.is_none() => {}
                _ => break,
            }
            let token = self.scanner.next_token()?;
            if start_mark.is_none() {
                start_mark = Some(token.start_mark.clone());
            }
            end_mark = Some(token.end_mark.clone());
            match token.kind {
                TokenKind::Anchor(name) => anchor = Some(name),
                TokenKind::Tag { handle, suffix } => {
                    tag_mark = Some(token.start_mark);
                    tag_token = Some((handle, suffix));
                }
                _ => {}
            }
        }

        let tag = match tag_token {
            Some((Some(handle), suffix)) => match self.tag_handles.get(&handle) {
                Some(prefix) => Some(format!("{}{}", prefix, suffix)),
                None => {
                    return Err(Error::parser(
                        Some("while parsing a node"),
                        start_mark,
                        format!("found undefined tag handle '{}'", handle),
                        tag_mark.unwrap_or_default(),
                    ));
                }
            },
            Some((None, suffix)) => Some(suffix),
            None => None,
        };

        let (start_mark, mut end_mark) = match (start_mark, end_mark) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                let mark = self.peek_start_mark()?;
                (mark.clone(), mark)
            }
        };
        let implicit = tag.as_deref().map_or(true, |tag| tag == "!");

        if indentless_sequence && self.check(|kind| matches!(kind, TokenKind::BlockEntry))? {
            end_mark = self.scanner.peek()?.end_mark.clone();
            self.state = State::IndentlessSequenceEntry;
            return Ok(Event::with_marks(
                EventKind::SequenceStart {
                    anchor,
                    tag,
                    implicit,
                    flow_style: false,
                },
                start_mark,
                end_mark,
            ));
        }

        let next = self.scanner.peek()?;
        let (next_start, next_end) = (next.start_mark.clone(), next.end_mark.clone());
        match &next.kind {
            TokenKind::Scalar { .. } => {
                let token = self.scanner.next_token()?;
                let (value, plain, style) = match token.kind {
                    TokenKind::Scalar {
                        value,
                        plain,
                        style,
                    } => (value, plain, style),
                    _ => (String::new(), true, crate::tokens::ScalarStyle::Plain),
                };
                let implicit = if (plain && tag.is_none()) || tag.as_deref() == Some("!") {
                    ImplicitFlags::new(true, false)
                } else if tag.is_none() {
                    ImplicitFlags::new(false, true)
                } else {
                    ImplicitFlags::new(false, false)
                };
                self.state = self.pop_state();
                Ok(Event::with_marks(
                    EventKind::Scalar {
                        anchor,
                        tag,
                        implicit,
                        value,
                        style: if plain { None } else { Some(style) },
                    },
                    start_mark,
                    token.end_mark,
                ))
            }
            TokenKind::FlowSequenceStart => {
                self.state = State::FlowSequenceFirstEntry;
                Ok(Event::with_marks(
                    EventKind::SequenceStart {
                        anchor,
                        tag,
                        implicit,
                        flow_style: true,
                    },
                    start_mark,
                    next_end,
                ))
            }
            TokenKind::FlowMappingStart => {
                self.state = State::FlowMappingFirstKey;
                Ok(Event::with_marks(
                    EventKind::MappingStart {
                        anchor,
                        tag,
                        implicit,
                        flow_style: true,
                    },
                    start_mark,
                    next_end,
                ))
            }
            TokenKind::BlockSequenceStart if block => {
                self.state = State::BlockSequenceFirstEntry;
                Ok(Event::with_marks(
                    EventKind::SequenceStart {
                        anchor,
                        tag,
                        implicit,
                        flow_style: false,
                    },
                    start_mark,
                    next_start,
                ))
            }
            TokenKind::BlockMappingStart if block => {
                self.state = State::BlockMappingFirstKey;
                Ok(Event::with_marks(
                    EventKind::MappingStart {
                        anchor,
                        tag,
                        implicit,
                        flow_style: false,
                    },
                    start_mark,
                    next_start,
                ))
            }
            _ if anchor.is_some() || tag.is_some() => {
                // Properties without content: an empty scalar.
                self.state = self.pop_state();
                Ok(Event::with_marks(
                    EventKind::Scalar {
                        anchor,
                        tag,
                        implicit: ImplicitFlags::new(implicit, false),
                        value: String::new(),
                        style: None,
                    },
                    start_mark,
                    end_mark,
                ))
            }
            kind => {
                let context = if block {
                    "while parsing a block node"
                } else {
                    "while parsing a flow node"
                };
                Err(Error::parser(
                    Some(context),
                    Some(start_mark),
                    format!("expected the node content, but found {}", kind),
                    next_start,
                ))
            }
        }
    }

    // Block collections.

    fn parse_block_sequence_entry(&mut self) -> Result<Event> {
        if self.check(|kind| matches!(kind, TokenKind::BlockEntry))? {
            let token = self.scanner.next_token()?;
            if !self.check(|kind| matches!(kind, TokenKind::BlockEntry | TokenKind::BlockEnd))? {
                self.states.push(State::BlockSequenceEntry);
                return self.parse_node(true, false);
            }
            self.state = State::BlockSequenceEntry;
            return Ok(Self::empty_scalar(token.end_mark));
        }
        if !self.check(|kind| matches!(kind, TokenKind::BlockEnd))? {
            let context_mark = self.marks.last().cloned();
            return Err(self.unexpected(
                Some("while parsing a block collection"),
                context_mark,
                |kind| format!("expected <block end>, but found {}", kind),
            ));
        }
        let token = self.scanner.next_token()?;
        self.state = self.pop_state();
        self.marks.pop();
        Ok(Event::with_marks(
            EventKind::SequenceEnd,
            token.start_mark,
            token.end_mark,
        ))
    }

    fn parse_indentless_sequence_entry(&mut self) -> Result<Event> {
        if self.check(|kind| matches!(kind, TokenKind::BlockEntry))? {
            let token = self.scanner.next_token()?;
            let empty = self.check(|kind| {
                matches!(
                    kind,
                    TokenKind::BlockEntry | TokenKind::Key | TokenKind::Value | TokenKind::BlockEnd
                )
            })?;
            if !empty {
                self.states.push(State::IndentlessSequenceEntry);
                return self.parse_node(true, false);
            }
            self.state = State::IndentlessSequenceEntry;
            return Ok(Self::empty_scalar(token.end_mark));
        }
        let mark = self.peek_start_mark()?;
        self.state = self.pop_state();
        Ok(Event::with_marks(EventKind::SequenceEnd, mark.clone(), mark))
    }

    fn parse_block_mapping_key(&mut self) -> Result<Event> {
        if self.check(|kind| matches!(kind, TokenKind::Key))? {
            let token = self.scanner.next_token()?;
            let empty = self.check(|kind| {
                matches!(
                    kind,
                    TokenKind::Key | TokenKind::Value | TokenKind::BlockEnd
                )
            })?;
            if !empty {
                self.states.push(State::BlockMappingValue);
                return self.parse_node(true, true);
            }
            self.state = State::BlockMappingValue;
            return Ok(Self::empty_scalar(token.end_mark));
        }
        if !self.check(|kind| matches!(kind, TokenKind::BlockEnd))? {
            let context_mark = self.marks.last().cloned();
            return Err(self.unexpected(
                Some("while parsing a block mapping"),
                context_mark,
                |kind| format!("expected <block end>, but found {}", kind),
            ));
        }
        let token = self.scanner.next_token()?;
        self.state = self.pop_state();
        self.marks.pop();
        Ok(Event::with_marks(
            EventKind::MappingEnd,
            token.start_mark,
            token.end_mark,
        ))
    }

    fn parse_block_mapping_value(&mut self) -> Result<Event> {
        if self.check(|kind| matches!(kind, TokenKind::Value))? {
            let token = self.scanner.next_token()?;
            let empty = self.check(|kind| {
                matches!(
                    kind,
                    TokenKind::Key | TokenKind::Value | TokenKind::BlockEnd
                )
            })?;
            if !empty {
                self.states.push(State::BlockMappingKey);
                return self.parse_node(true, true);
            }
            self.state = State::BlockMappingKey;
            return Ok(Self::empty_scalar(token.end_mark));
        }
        self.state = State::BlockMappingKey;
        let mark = self.peek_start_mark()?;
        Ok(Self::empty_scalar(mark))
    }

    // Flow collections.

    fn parse_flow_sequence_entry(&mut self, first: bool) -> Result<Event> {
        if !self.check(|kind| matches!(kind, TokenKind::FlowSequenceEnd))? {
            if !first {
                if self.check(|kind| matches!(kind, TokenKind::FlowEntry))? {
                    self.scanner.next_token()?;
                } else {
                    let context_mark = self.marks.last().cloned();
                    return Err(self.unexpected(
                        Some("while parsing a flow sequence"),
                        context_mark,
                        |kind| format!("expected ',' or ']', but got {}", kind),
                    ));
                }
            }
            if self.check(|kind| matches!(kind, TokenKind::Key))? {
                let token = self.scanner.peek()?;
                let (start_mark, end_mark) = (token.start_mark.clone(), token.end_mark.clone());
                self.state = State::FlowSequenceEntryMappingKey;
                return Ok(Event::with_marks(
                    EventKind::MappingStart {
                        anchor: None,
                        tag: None,
                        implicit: true,
                        flow_style: true,
                    },
                    start_mark,
                    end_mark,
                ));
            }
            if !self.check(|kind| matches!(kind, TokenKind::FlowSequenceEnd))? {
                self.states.push(State::FlowSequenceEntry);
                return self.parse_node(false, false);
            }
        }
        let token = self.scanner.next_token()?;
        self.state = self.pop_state();
        self.marks.pop();
        Ok(Event::with_marks(
            EventKind::SequenceEnd,
            token.start_mark,
            token.end_mark,
        ))
    }

    fn parse_flow_sequence_entry_mapping_key(&mut self) -> Result<Event> {
        let token = self.scanner.next_token()?;
        let empty = self.check(|kind| {
            matches!(
                kind,
                TokenKind::Value | TokenKind::FlowEntry | TokenKind::FlowSequenceEnd
            )
        })?;
        if !empty {
            self.states.push(State::FlowSequenceEntryMappingValue);
            return self.parse_node(false, false);
        }
        self.state = State::FlowSequenceEntryMappingValue;
        Ok(Self::empty_scalar(token.end_mark))
    }

    fn parse_flow_sequence_entry_mapping_value(&mut self) -> Result<Event> {
        if self.check(|kind| matches!(kind, TokenKind::Value))? {
            let token = self.scanner.next_token()?;
            let empty = self.check(|kind| {
                matches!(kind, TokenKind::FlowEntry | TokenKind::FlowSequenceEnd)
            })?;
            if !empty {
                self.states.push(State::FlowSequenceEntryMappingEnd);
                return self.parse_node(false, false);
            }
            self.state = State::FlowSequenceEntryMappingEnd;
            return Ok(Self::empty_scalar(token.end_mark));
        }
        self.state = State::FlowSequenceEntryMappingEnd;
        let mark = self.peek_start_mark()?;
        Ok(Self::empty_scalar(mark))
    }

    fn parse_flow_sequence_entry_mapping_end(&mut self) -> Result<Event> {
        self.state = State::FlowSequenceEntry;
        let mark = self.peek_start_mark()?;
        Ok(Event::with_marks(EventKind::MappingEnd, mark.clone(), mark))
    }

    fn parse_flow_mapping_key(&mut self, first: bool) -> Result<Event> {
        if !self.check(|kind| matches!(kind, TokenKind::FlowMappingEnd))? {
            if !first {
                if self.check(|kind| matches!(kind, TokenKind::FlowEntry))? {
                    self.scanner.next_token()?;
                } else {
                    let context_mark = self.marks.last().cloned();
                    return Err(self.unexpected(
                        Some("while parsing a flow mapping"),
                        context_mark,
                        |kind| format!("expected ',' or '}}', but got {}", kind),
                    ));
                }
            }
            if self.check(|kind| matches!(kind, TokenKind::Key))? {
                let token = self.scanner.next_token()?;
                let empty = self.check(|kind| {
                    matches!(
                        kind,
                        TokenKind::Value | TokenKind::FlowEntry | TokenKind::FlowMappingEnd
                    )
                })?;
                if !empty {
                    self.states.push(State::FlowMappingValue);
                    return self.parse_node(false, false);
                }
                self.state = State::FlowMappingValue;
                return Ok(Self::empty_scalar(token.end_mark));
            }
            if !self.check(|kind| matches!(kind, TokenKind::FlowMappingEnd))? {
                self.states.push(State::FlowMappingEmptyValue);
                return self.parse_node(false, false);
            }
        }
        let token = self.scanner.next_token()?;
        self.state = self.pop_state();
        self.marks.pop();
        Ok(Event::with_marks(
            EventKind::MappingEnd,
            token.start_mark,
            token.end_mark,
        ))
    }

    fn parse_flow_mapping_value(&mut self) -> Result<Event> {
        if self.check(|kind| matches!(kind, TokenKind::Value))? {
            let token = self.scanner.next_token()?;
            let empty = self.check(|kind| {
                matches!(kind, TokenKind::FlowEntry | TokenKind::FlowMappingEnd)
            })?;
            if !empty {
                self.states.push(State::FlowMappingKey);
                return self.parse_node(false, false);
            }
            self.state = State::FlowMappingKey;
            return Ok(Self::empty_scalar(token.end_mark));
        }
        self.state = State::FlowMappingKey;
        let mark = self.peek_start_mark()?;
        Ok(Self::empty_scalar(mark))
    }
}

impl Iterator for Parser {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.get_event() {
            Ok(event) => event.map(Ok),
            Err(e) => {
                self.state = State::End;
                self.current_event = None;
                Some(Err(e))
            }
        }
    }
}
