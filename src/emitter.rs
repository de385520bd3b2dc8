//! Writes events as YAML text.
//!
//! The emitter is a state machine driven one event at a time. It buffers a
//! few events ahead where the layout depends on what follows: whether a
//! collection is empty, and whether a mapping key is short enough to be
//! written as a simple key. Scalar styles are chosen per scalar from an
//! analysis of its characters, so a requested style is honoured only when
//! the text can be written that way and read back unchanged.
//!
//! ```rust
//! use serde_yamlet::emitter::Emitter;
//! use serde_yamlet::events::{Event, EventKind};
//! use serde_yamlet::DumpOptions;
//!
//! let mut emitter = Emitter::new(&DumpOptions::new());
//! for kind in [
//!     EventKind::StreamStart,
//!     EventKind::DocumentStart { explicit: false, version: None, tags: Vec::new() },
//!     EventKind::SequenceStart { anchor: None, tag: None, implicit: true, flow_style: false },
//!     EventKind::plain_scalar("a"),
//!     EventKind::plain_scalar("b"),
//!     EventKind::SequenceEnd,
//!     EventKind::DocumentEnd { explicit: false },
//!     EventKind::StreamEnd,
//! ] {
//!     emitter.emit(Event::new(kind)).unwrap();
//! }
//! assert_eq!(emitter.into_output(), "- a\n- b\n");
//! ```

use crate::error::{Error, Result};
use crate::events::{Event, EventKind, ImplicitFlags};
use crate::options::DumpOptions;
use crate::tokens::ScalarStyle;
use std::collections::VecDeque;

/// Longest key, in characters, written without the `?` indicator.
const MAX_SIMPLE_KEY_LENGTH: usize = 128;

const DEFAULT_TAG_PREFIXES: [(&str, &str); 2] = [("!", "!"), ("tag:yaml.org,2002:", "!!")];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    StreamStart,
    FirstDocumentStart,
    DocumentStart,
    DocumentEnd,
    DocumentRoot,
    Nothing,
    FirstFlowSequenceItem,
    FlowSequenceItem,
    FirstFlowMappingKey,
    FlowMappingKey,
    FlowMappingSimpleValue,
    FlowMappingValue,
    FirstBlockSequenceItem,
    BlockSequenceItem,
    FirstBlockMappingKey,
    BlockMappingKey,
    BlockMappingSimpleValue,
    BlockMappingValue,
}

/// Which styles can represent a scalar faithfully.
#[derive(Clone, Debug)]
struct ScalarAnalysis {
    scalar: String,
    empty: bool,
    multiline: bool,
    allow_flow_plain: bool,
    allow_block_plain: bool,
    allow_single_quoted: bool,
    allow_block: bool,
}

#[inline]
fn is_break(ch: char) -> bool {
    matches!(ch, '\n' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

#[inline]
fn is_space_or_break(ch: char) -> bool {
    matches!(ch, '\0' | ' ' | '\t' | '\r') || is_break(ch)
}

fn is_printable_unicode(ch: char) -> bool {
    matches!(ch, '\u{A0}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFE}')
}

fn is_anchor_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn is_uri_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || "-;/?:@&=+$,_.~*'()[]".contains(ch)
}

fn percent_encode(ch: char, chunks: &mut String) {
    let mut buf = [0u8; 4];
    for byte in ch.encode_utf8(&mut buf).bytes() {
        chunks.push_str(&format!("%{:02X}", byte));
    }
}

/// Turns events into text.
#[derive(Debug)]
pub struct Emitter {
    output: String,
    states: Vec<State>,
    state: State,
    events: VecDeque<Event>,
    event: Option<Event>,
    indents: Vec<Option<usize>>,
    indent: Option<usize>,
    flow_level: usize,
    root_context: bool,
    mapping_context: bool,
    simple_key_context: bool,
    line: usize,
    column: usize,
    whitespace: bool,
    indention: bool,
    open_ended: bool,
    canonical: bool,
    allow_unicode: bool,
    best_indent: usize,
    best_width: usize,
    best_line_break: &'static str,
    /// `(prefix, handle)` pairs in effect for the current document.
    tag_prefixes: Vec<(String, String)>,
    prepared_anchor: Option<String>,
    prepared_tag: Option<String>,
    analysis: Option<ScalarAnalysis>,
    style: Option<ScalarStyle>,
}

impl Emitter {
    /// Creates an emitter with the layout settings of `options`.
    #[must_use]
    pub fn new(options: &DumpOptions) -> Self {
        let best_indent = if options.indent > 1 && options.indent < 10 {
            options.indent
        } else {
            2
        };
        let best_width = if options.width > best_indent * 2 {
            options.width
        } else {
            80
        };
        Emitter {
            output: String::new(),
            states: Vec::new(),
            state: State::StreamStart,
            events: VecDeque::new(),
            event: None,
            indents: Vec::new(),
            indent: None,
            flow_level: 0,
            root_context: false,
            mapping_context: false,
            simple_key_context: false,
            line: 0,
            column: 0,
            whitespace: true,
            indention: true,
            open_ended: false,
            canonical: options.canonical,
            allow_unicode: options.allow_unicode,
            best_indent,
            best_width,
            best_line_break: options.line_break.as_str(),
            tag_prefixes: Vec::new(),
            prepared_anchor: None,
            prepared_tag: None,
            analysis: None,
            style: None,
        }
    }

    /// Text written so far.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    #[must_use]
    pub fn into_output(self) -> String {
        self.output
    }

    /// Number of lines written so far.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Feeds one event. Output may lag behind until enough events are
    /// buffered to decide the layout.
    ///
    /// # Errors
    ///
    /// Fails with an emitter error when the event is out of order or cannot
    /// be written (an invalid anchor, tag, or directive).
    pub fn emit(&mut self, event: Event) -> Result<()> {
        self.events.push_back(event);
        while !self.need_more_events() {
            self.event = self.events.pop_front();
            self.run_state()?;
            self.event = None;
        }
        Ok(())
    }

    fn need_more_events(&self) -> bool {
        let Some(first) = self.events.front() else {
            return true;
        };
        match first.kind {
            EventKind::DocumentStart { .. } => self.need_events(1),
            EventKind::SequenceStart { .. } => self.need_events(2),
            EventKind::MappingStart { .. } => self.need_events(3),
            _ => false,
        }
    }

    fn need_events(&self, count: usize) -> bool {
        let mut level: i64 = 0;
        for event in self.events.iter().skip(1) {
            match event.kind {
                EventKind::DocumentStart { .. }
                | EventKind::SequenceStart { .. }
                | EventKind::MappingStart { .. } => level += 1,
                EventKind::DocumentEnd { .. } | EventKind::SequenceEnd | EventKind::MappingEnd => {
                    level -= 1
                }
                EventKind::StreamEnd => level = -1,
                _ => {}
            }
            if level < 0 {
                return false;
            }
        }
        self.events.len() < count + 1
    }

    fn increase_indent(&mut self, flow: bool, indentless: bool) {
        self.indents.push(self.indent);
        match self.indent {
            None => self.indent = Some(if flow { self.best_indent } else { 0 }),
            Some(indent) if !indentless => self.indent = Some(indent + self.best_indent),
            Some(_) => {}
        }
    }

    fn pop_indent(&mut self) {
        self.indent = self.indents.pop().flatten();
    }

    fn pop_state(&mut self) -> Result<()> {
        self.state = self
            .states
            .pop()
            .ok_or_else(|| Error::emitter("unbalanced collection end"))?;
        Ok(())
    }

    fn kind(&self) -> Option<&EventKind> {
        self.event.as_ref().map(|event| &event.kind)
    }

    fn event_name(&self) -> &'static str {
        self.kind().map_or("nothing", EventKind::name)
    }

    fn run_state(&mut self) -> Result<()> {
        match self.state {
            State::StreamStart => self.expect_stream_start(),
            State::FirstDocumentStart => self.expect_document_start(true),
            State::DocumentStart => self.expect_document_start(false),
            State::DocumentEnd => self.expect_document_end(),
            State::DocumentRoot => self.expect_document_root(),
            State::Nothing => Err(Error::emitter(format!(
                "expected nothing, but got {}",
                self.event_name()
            ))),
            State::FirstFlowSequenceItem => self.expect_flow_sequence_item(true),
            State::FlowSequenceItem => self.expect_flow_sequence_item(false),
            State::FirstFlowMappingKey => self.expect_flow_mapping_key(true),
            State::FlowMappingKey => self.expect_flow_mapping_key(false),
            State::FlowMappingSimpleValue => self.expect_flow_mapping_simple_value(),
            State::FlowMappingValue => self.expect_flow_mapping_value(),
            State::FirstBlockSequenceItem => self.expect_block_sequence_item(true),
            State::BlockSequenceItem => self.expect_block_sequence_item(false),
            State::FirstBlockMappingKey => self.expect_block_mapping_key(true),
            State::BlockMappingKey => self.expect_block_mapping_key(false),
            State::BlockMappingSimpleValue => self.expect_block_mapping_simple_value(),
            State::BlockMappingValue => self.expect_block_mapping_value(),
        }
    }

    fn expect_stream_start(&mut self) -> Result<()> {
        if !matches!(self.kind(), Some(EventKind::StreamStart)) {
            return Err(Error::emitter(format!(
                "expected StreamStartEvent, but got {}",
                self.event_name()
            )));
        }
        self.state = State::FirstDocumentStart;
        Ok(())
    }

    fn expect_document_start(&mut self, first: bool) -> Result<()> {
        let (explicit, version, tags) = match self.kind() {
            Some(EventKind::DocumentStart {
                explicit,
                version,
                tags,
            }) => (*explicit, *version, tags.clone()),
            Some(EventKind::StreamEnd) => {
                if self.open_ended {
                    self.write_indicator("...", true, false, false);
                    self.write_indent();
                }
                self.state = State::Nothing;
                return Ok(());
            }
            _ => {
                return Err(Error::emitter(format!(
                    "expected DocumentStartEvent, but got {}",
                    self.event_name()
                )))
            }
        };

        let has_tags = !tags.is_empty();
        if (version.is_some() || has_tags) && self.open_ended {
            self.write_indicator("...", true, false, false);
            self.write_indent();
        }
        if let Some(version) = version {
            let text = prepare_version(version)?;
            self.write_directive(&format!("%YAML {}", text));
        }
        self.tag_prefixes = DEFAULT_TAG_PREFIXES
            .iter()
            .map(|(prefix, handle)| (prefix.to_string(), handle.to_string()))
            .collect();
        if !tags.is_empty() {
            let mut tags = tags;
            tags.sort();
            for (handle, prefix) in tags {
                let handle_text = prepare_tag_handle(&handle)?;
                let prefix_text = prepare_tag_prefix(&prefix)?;
                self.tag_prefixes.retain(|(existing, _)| *existing != prefix);
                self.tag_prefixes.push((prefix, handle));
                self.write_directive(&format!("%TAG {} {}", handle_text, prefix_text));
            }
        }
        let implicit = first
            && !explicit
            && !self.canonical
            && version.is_none()
            && !has_tags
            && !self.check_empty_document();
        if !implicit {
            self.write_indent();
            self.write_indicator("---", true, false, false);
            if self.canonical {
                self.write_indent();
            }
        }
        self.state = State::DocumentRoot;
        Ok(())
    }

    fn expect_document_end(&mut self) -> Result<()> {
        let explicit = match self.kind() {
            Some(EventKind::DocumentEnd { explicit }) => *explicit,
            _ => {
                return Err(Error::emitter(format!(
                    "expected DocumentEndEvent, but got {}",
                    self.event_name()
                )))
            }
        };
        self.write_indent();
        if explicit {
            self.write_indicator("...", true, false, false);
            self.write_indent();
        }
        self.state = State::DocumentStart;
        Ok(())
    }

    fn expect_document_root(&mut self) -> Result<()> {
        self.states.push(State::DocumentEnd);
        self.expect_node(true, false, false)
    }

    fn expect_node(&mut self, root: bool, mapping: bool, simple_key: bool) -> Result<()> {
        self.root_context = root;
        self.mapping_context = mapping;
        self.simple_key_context = simple_key;

        enum NodeEvent {
            Alias,
            Scalar,
            Sequence(bool),
            Mapping(bool),
        }
        let node = match self.kind() {
            Some(EventKind::Alias { .. }) => NodeEvent::Alias,
            Some(EventKind::Scalar { .. }) => NodeEvent::Scalar,
            Some(EventKind::SequenceStart { flow_style, .. }) => NodeEvent::Sequence(*flow_style),
            Some(EventKind::MappingStart { flow_style, .. }) => NodeEvent::Mapping(*flow_style),
            _ => {
                return Err(Error::emitter(format!(
                    "expected NodeEvent, but got {}",
                    self.event_name()
                )))
            }
        };

        match node {
            NodeEvent::Alias => self.expect_alias(),
            NodeEvent::Scalar => {
                self.process_anchor("&")?;
                self.process_tag()?;
                self.expect_scalar()
            }
            NodeEvent::Sequence(flow_style) => {
                self.process_anchor("&")?;
                self.process_tag()?;
                if self.flow_level > 0 || self.canonical || flow_style || self.check_empty_sequence() {
                    self.expect_flow_sequence();
                } else {
                    self.expect_block_sequence();
                }
                Ok(())
            }
            NodeEvent::Mapping(flow_style) => {
                self.process_anchor("&")?;
                self.process_tag()?;
                if self.flow_level > 0 || self.canonical || flow_style || self.check_empty_mapping() {
                    self.expect_flow_mapping();
                } else {
                    self.expect_block_mapping();
                }
                Ok(())
            }
        }
    }

    fn expect_alias(&mut self) -> Result<()> {
        self.process_anchor("*")?;
        self.pop_state()
    }

    fn expect_scalar(&mut self) -> Result<()> {
        self.increase_indent(true, false);
        self.process_scalar()?;
        self.pop_indent();
        self.pop_state()
    }

    fn expect_flow_sequence(&mut self) {
        self.write_indicator("[", true, true, false);
        self.flow_level += 1;
        self.increase_indent(true, false);
        self.state = State::FirstFlowSequenceItem;
    }

    fn expect_flow_sequence_item(&mut self, first: bool) -> Result<()> {
        if matches!(self.kind(), Some(EventKind::SequenceEnd)) {
            self.pop_indent();
            self.flow_level -= 1;
            if self.canonical && !first {
                self.write_indicator(",", false, false, false);
                self.write_indent();
            }
            self.write_indicator("]", false, false, false);
            return self.pop_state();
        }
        if !first {
            self.write_indicator(",", false, false, false);
        }
        if self.canonical || self.column > self.best_width {
            self.write_indent();
        }
        self.states.push(State::FlowSequenceItem);
        self.expect_node(false, false, false)
    }

    fn expect_flow_mapping(&mut self) {
        self.write_indicator("{", true, true, false);
        self.flow_level += 1;
        self.increase_indent(true, false);
        self.state = State::FirstFlowMappingKey;
    }

    fn expect_flow_mapping_key(&mut self, first: bool) -> Result<()> {
        if matches!(self.kind(), Some(EventKind::MappingEnd)) {
            self.pop_indent();
            self.flow_level -= 1;
            if self.canonical && !first {
                self.write_indicator(",", false, false, false);
                self.write_indent();
            }
            self.write_indicator("}", false, false, false);
            return self.pop_state();
        }
        if !first {
            self.write_indicator(",", false, false, false);
        }
        if self.canonical || self.column > self.best_width {
            self.write_indent();
        }
        if !self.canonical && self.check_simple_key()? {
            self.states.push(State::FlowMappingSimpleValue);
            self.expect_node(false, true, true)
        } else {
            self.write_indicator("?", true, false, false);
            self.states.push(State::FlowMappingValue);
            self.expect_node(false, true, false)
        }
    }

    fn expect_flow_mapping_simple_value(&mut self) -> Result<()> {
        self.write_indicator(":", false, false, false);
        self.states.push(State::FlowMappingKey);
        self.expect_node(false, true, false)
    }

    fn expect_flow_mapping_value(&mut self) -> Result<()> {
        if self.canonical || self.column > self.best_width {
            self.write_indent();
        }
        self.write_indicator(":", true, false, false);
        self.states.push(State::FlowMappingKey);
        self.expect_node(false, true, false)
    }

    fn expect_block_sequence(&mut self) {
        let indentless = self.mapping_context && !self.indention;
        self.increase_indent(false, indentless);
        self.state = State::FirstBlockSequenceItem;
    }

    fn expect_block_sequence_item(&mut self, first: bool) -> Result<()> {
        if !first && matches!(self.kind(), Some(EventKind::SequenceEnd)) {
            self.pop_indent();
            return self.pop_state();
        }
        self.write_indent();
        self.write_indicator("-", true, false, true);
        self.states.push(State::BlockSequenceItem);
        self.expect_node(false, false, false)
    }

    fn expect_block_mapping(&mut self) {
        self.increase_indent(false, false);
        self.state = State::FirstBlockMappingKey;
    }

    fn expect_block_mapping_key(&mut self, first: bool) -> Result<()> {
        if !first && matches!(self.kind(), Some(EventKind::MappingEnd)) {
            self.pop_indent();
            return self.pop_state();
        }
        self.write_indent();
        if self.check_simple_key()? {
            self.states.push(State::BlockMappingSimpleValue);
            self.expect_node(false, true, true)
        } else {
            self.write_indicator("?", true, false, true);
            self.states.push(State::BlockMappingValue);
            self.expect_node(false, true, false)
        }
    }

    fn expect_block_mapping_simple_value(&mut self) -> Result<()> {
        self.write_indicator(":", false, false, false);
        self.states.push(State::BlockMappingKey);
        self.expect_node(false, true, false)
    }

    fn expect_block_mapping_value(&mut self) -> Result<()> {
        self.write_indent();
        self.write_indicator(":", true, false, true);
        self.states.push(State::BlockMappingKey);
        self.expect_node(false, true, false)
    }

    fn check_empty_sequence(&self) -> bool {
        matches!(self.kind(), Some(EventKind::SequenceStart { .. }))
            && matches!(self.events.front().map(|e| &e.kind), Some(EventKind::SequenceEnd))
    }

    fn check_empty_mapping(&self) -> bool {
        matches!(self.kind(), Some(EventKind::MappingStart { .. }))
            && matches!(self.events.front().map(|e| &e.kind), Some(EventKind::MappingEnd))
    }

    fn check_empty_document(&self) -> bool {
        if !matches!(self.kind(), Some(EventKind::DocumentStart { .. })) {
            return false;
        }
        matches!(
            self.events.front().map(|e| &e.kind),
            Some(EventKind::Scalar { anchor: None, tag: None, implicit, value, .. })
                if implicit.any() && value.is_empty()
        )
    }

    fn check_simple_key(&mut self) -> Result<bool> {
        let (anchor, tag, scalar, is_alias) = match self.kind() {
            Some(EventKind::Alias { anchor }) => (Some(anchor.clone()), None, None, true),
            Some(EventKind::Scalar {
                anchor, tag, value, ..
            }) => (anchor.clone(), tag.clone(), Some(value.clone()), false),
            Some(EventKind::SequenceStart { anchor, tag, .. })
            | Some(EventKind::MappingStart { anchor, tag, .. }) => {
                (anchor.clone(), tag.clone(), None, false)
            }
            _ => (None, None, None, false),
        };

        let mut length = 0;
        if let Some(anchor) = anchor {
            if self.prepared_anchor.is_none() {
                self.prepared_anchor = Some(prepare_anchor(&anchor)?);
            }
            length += self.prepared_anchor.as_deref().map_or(0, |a| a.chars().count());
        }
        if let Some(tag) = tag {
            if self.prepared_tag.is_none() {
                self.prepared_tag = Some(self.prepare_tag(&tag)?);
            }
            length += self.prepared_tag.as_deref().map_or(0, |t| t.chars().count());
        }
        let mut plain_scalar_key = false;
        if let Some(scalar) = scalar {
            if self.analysis.is_none() {
                self.analysis = Some(self.analyze_scalar(&scalar));
            }
            if let Some(analysis) = &self.analysis {
                length += analysis.scalar.chars().count();
                plain_scalar_key = !analysis.empty && !analysis.multiline;
            }
        }
        Ok(length < MAX_SIMPLE_KEY_LENGTH
            && (is_alias
                || plain_scalar_key
                || self.check_empty_sequence()
                || self.check_empty_mapping()))
    }

    fn process_anchor(&mut self, indicator: &str) -> Result<()> {
        let anchor = match self.kind().and_then(EventKind::anchor) {
            Some(anchor) => anchor.to_string(),
            None => {
                self.prepared_anchor = None;
                return Ok(());
            }
        };
        let prepared = match self.prepared_anchor.take() {
            Some(prepared) => prepared,
            None => prepare_anchor(&anchor)?,
        };
        self.write_indicator(&format!("{}{}", indicator, prepared), true, false, false);
        Ok(())
    }

    fn process_tag(&mut self) -> Result<()> {
        let mut tag = self.kind().and_then(EventKind::tag).map(str::to_string);
        match self.kind() {
            Some(EventKind::Scalar { implicit, .. }) => {
                let implicit: ImplicitFlags = *implicit;
                if self.style.is_none() {
                    self.style = Some(self.choose_scalar_style());
                }
                let plain = self.style == Some(ScalarStyle::Plain);
                if (!self.canonical || tag.is_none())
                    && ((plain && implicit.plain) || (!plain && implicit.quoted))
                {
                    self.prepared_tag = None;
                    return Ok(());
                }
                if implicit.plain && tag.is_none() {
                    tag = Some("!".to_string());
                    self.prepared_tag = None;
                }
            }
            Some(EventKind::SequenceStart { implicit, .. })
            | Some(EventKind::MappingStart { implicit, .. }) => {
                if (!self.canonical || tag.is_none()) && *implicit {
                    self.prepared_tag = None;
                    return Ok(());
                }
            }
            _ => {}
        }
        let tag = tag.ok_or_else(|| Error::emitter("tag is not specified"))?;
        let prepared = match self.prepared_tag.take() {
            Some(prepared) => prepared,
            None => self.prepare_tag(&tag)?,
        };
        if !prepared.is_empty() {
            self.write_indicator(&prepared, true, false, false);
        }
        Ok(())
    }

    fn choose_scalar_style(&mut self) -> ScalarStyle {
        let (requested, implicit, value) = match self.kind() {
            Some(EventKind::Scalar {
                style,
                implicit,
                value,
                ..
            }) => (*style, *implicit, value.clone()),
            _ => return ScalarStyle::DoubleQuoted,
        };
        if self.analysis.is_none() {
            self.analysis = Some(self.analyze_scalar(&value));
        }
        let Some(analysis) = &self.analysis else {
            return ScalarStyle::DoubleQuoted;
        };

        if requested == Some(ScalarStyle::DoubleQuoted) || self.canonical {
            return ScalarStyle::DoubleQuoted;
        }
        let unstyled = matches!(requested, None | Some(ScalarStyle::Plain));
        if unstyled
            && implicit.plain
            && !(self.simple_key_context && (analysis.empty || analysis.multiline))
            && ((self.flow_level > 0 && analysis.allow_flow_plain)
                || (self.flow_level == 0 && analysis.allow_block_plain))
        {
            return ScalarStyle::Plain;
        }
        if let Some(style) = requested.filter(ScalarStyle::is_block) {
            if self.flow_level == 0 && !self.simple_key_context && analysis.allow_block {
                return style;
            }
        }
        if (unstyled || requested == Some(ScalarStyle::SingleQuoted))
            && analysis.allow_single_quoted
            && !(self.simple_key_context && analysis.multiline)
        {
            return ScalarStyle::SingleQuoted;
        }
        ScalarStyle::DoubleQuoted
    }

    fn process_scalar(&mut self) -> Result<()> {
        if self.analysis.is_none() {
            let value = match self.kind() {
                Some(EventKind::Scalar { value, .. }) => value.clone(),
                _ => return Err(Error::emitter("expected ScalarEvent")),
            };
            self.analysis = Some(self.analyze_scalar(&value));
        }
        if self.style.is_none() {
            self.style = Some(self.choose_scalar_style());
        }
        let text: Vec<char> = self
            .analysis
            .take()
            .map(|analysis| analysis.scalar.chars().collect())
            .unwrap_or_default();
        let split = !self.simple_key_context;
        match self.style.take().unwrap_or(ScalarStyle::DoubleQuoted) {
            ScalarStyle::DoubleQuoted => self.write_double_quoted(&text, split),
            ScalarStyle::SingleQuoted => self.write_single_quoted(&text, split),
            ScalarStyle::Folded => self.write_folded(&text),
            ScalarStyle::Literal => self.write_literal(&text),
            ScalarStyle::Plain => self.write_plain(&text, split),
        }
        Ok(())
    }

    fn prepare_tag(&self, tag: &str) -> Result<String> {
        if tag.is_empty() {
            return Err(Error::emitter("tag must not be empty"));
        }
        if tag == "!" {
            return Ok(tag.to_string());
        }
        let mut handle: Option<&str> = None;
        let mut suffix = tag;
        let mut prefixes: Vec<&(String, String)> = self.tag_prefixes.iter().collect();
        prefixes.sort();
        for (prefix, prefix_handle) in prefixes {
            if tag.starts_with(prefix.as_str()) && (prefix == "!" || prefix.len() < tag.len()) {
                handle = Some(prefix_handle);
                suffix = &tag[prefix.len()..];
            }
        }
        let mut suffix_text = String::new();
        for ch in suffix.chars() {
            if is_uri_char(ch) || (ch == '!' && handle != Some("!")) {
                suffix_text.push(ch);
            } else {
                percent_encode(ch, &mut suffix_text);
            }
        }
        Ok(match handle {
            Some(handle) => format!("{}{}", handle, suffix_text),
            None => format!("!<{}>", suffix_text),
        })
    }

    fn analyze_scalar(&self, scalar: &str) -> ScalarAnalysis {
        if scalar.is_empty() {
            return ScalarAnalysis {
                scalar: String::new(),
                empty: true,
                multiline: false,
                allow_flow_plain: false,
                allow_block_plain: true,
                allow_single_quoted: true,
                allow_block: false,
            };
        }
        let chars: Vec<char> = scalar.chars().collect();

        let mut block_indicators = false;
        let mut flow_indicators = false;
        let mut line_breaks = false;
        let mut special_characters = false;

        let mut leading_space = false;
        let mut leading_break = false;
        let mut trailing_space = false;
        let mut trailing_break = false;
        let mut break_space = false;
        let mut space_break = false;

        if scalar.starts_with("---") || scalar.starts_with("...") {
            block_indicators = true;
            flow_indicators = true;
        }

        let mut preceded_by_whitespace = true;
        let mut followed_by_whitespace = chars.len() == 1 || is_space_or_break(chars[1]);
        let mut previous_space = false;
        let mut previous_break = false;

        for (index, &ch) in chars.iter().enumerate() {
            if index == 0 {
                if "#,[]{}&*!|>'\"%@`".contains(ch) {
                    flow_indicators = true;
                    block_indicators = true;
                }
                if ch == '?' || ch == ':' {
                    flow_indicators = true;
                    if followed_by_whitespace {
                        block_indicators = true;
                    }
                }
                if ch == '-' && followed_by_whitespace {
                    flow_indicators = true;
                    block_indicators = true;
                }
            } else {
                if ",?[]{}".contains(ch) {
                    flow_indicators = true;
                }
                if ch == ':' {
                    flow_indicators = true;
                    if followed_by_whitespace {
                        block_indicators = true;
                    }
                }
                if ch == '#' && preceded_by_whitespace {
                    flow_indicators = true;
                    block_indicators = true;
                }
            }

            if is_break(ch) {
                line_breaks = true;
            }
            if !(ch == '\n' || ('\x20'..='\x7E').contains(&ch)) {
                // Breaks other than LF survive only as double-quoted escapes.
                if is_break(ch) {
                    special_characters = true;
                } else if is_printable_unicode(ch) && ch != '\u{FEFF}' {
                    if !self.allow_unicode {
                        special_characters = true;
                    }
                } else {
                    special_characters = true;
                }
            }

            if ch == ' ' {
                if index == 0 {
                    leading_space = true;
                }
                if index == chars.len() - 1 {
                    trailing_space = true;
                }
                if previous_break {
                    break_space = true;
                }
                previous_space = true;
                previous_break = false;
            } else if is_break(ch) {
                if index == 0 {
                    leading_break = true;
                }
                if index == chars.len() - 1 {
                    trailing_break = true;
                }
                if previous_space {
                    space_break = true;
                }
                previous_space = false;
                previous_break = true;
            } else {
                previous_space = false;
                previous_break = false;
            }

            preceded_by_whitespace = is_space_or_break(ch);
            followed_by_whitespace =
                index + 2 >= chars.len() || is_space_or_break(chars[index + 2]);
        }

        let mut allow_flow_plain = true;
        let mut allow_block_plain = true;
        let mut allow_single_quoted = true;
        let mut allow_block = true;

        if leading_space || leading_break || trailing_space || trailing_break {
            allow_flow_plain = false;
            allow_block_plain = false;
        }
        if trailing_space {
            allow_block = false;
        }
        if break_space {
            allow_flow_plain = false;
            allow_block_plain = false;
            allow_single_quoted = false;
        }
        if space_break || special_characters {
            allow_flow_plain = false;
            allow_block_plain = false;
            allow_single_quoted = false;
            allow_block = false;
        }
        // Plain scalars are never written over several lines.
        if line_breaks {
            allow_flow_plain = false;
            allow_block_plain = false;
        }
        if flow_indicators {
            allow_flow_plain = false;
        }
        if block_indicators {
            allow_block_plain = false;
        }

        ScalarAnalysis {
            scalar: scalar.to_string(),
            empty: false,
            multiline: line_breaks,
            allow_flow_plain,
            allow_block_plain,
            allow_single_quoted,
            allow_block,
        }
    }

    fn write(&mut self, data: &str) {
        self.output.push_str(data);
    }

    fn write_chars(&mut self, data: &[char]) {
        self.column += data.len();
        self.output.extend(data.iter());
    }

    fn write_indicator(&mut self, indicator: &str, need_whitespace: bool, whitespace: bool, indention: bool) {
        if !self.whitespace && need_whitespace {
            self.output.push(' ');
            self.column += 1;
        }
        self.whitespace = whitespace;
        self.indention = self.indention && indention;
        self.column += indicator.chars().count();
        self.open_ended = false;
        self.output.push_str(indicator);
    }

    fn write_indent(&mut self) {
        let indent = self.indent.unwrap_or(0);
        if !self.indention || self.column > indent || (self.column == indent && !self.whitespace) {
            self.write_line_break(None);
        }
        if self.column < indent {
            self.whitespace = true;
            for _ in self.column..indent {
                self.output.push(' ');
            }
            self.column = indent;
        }
    }

    fn write_line_break(&mut self, data: Option<char>) {
        self.whitespace = true;
        self.indention = true;
        self.line += 1;
        self.column = 0;
        match data {
            Some(ch) => self.output.push(ch),
            None => self.output.push_str(self.best_line_break),
        }
    }

    fn write_breaks(&mut self, breaks: &[char]) {
        for &br in breaks {
            if br == '\n' {
                self.write_line_break(None);
            } else {
                self.write_line_break(Some(br));
            }
        }
    }

    fn write_directive(&mut self, text: &str) {
        self.write(text);
        self.write_line_break(None);
    }

    fn write_single_quoted(&mut self, text: &[char], split: bool) {
        self.write_indicator("'", true, false, false);
        let mut spaces = false;
        let mut breaks = false;
        let mut start = 0;
        let mut end = 0;
        while end <= text.len() {
            let ch = text.get(end).copied();
            if spaces {
                if ch != Some(' ') {
                    if start + 1 == end
                        && self.column > self.best_width
                        && split
                        && start != 0
                        && end != text.len()
                    {
                        self.write_indent();
                    } else {
                        self.write_chars(&text[start..end]);
                    }
                    start = end;
                }
            } else if breaks {
                if ch.map_or(true, |c| !is_break(c)) {
                    if text[start] == '\n' {
                        self.write_line_break(None);
                    }
                    self.write_breaks(&text[start..end]);
                    self.write_indent();
                    start = end;
                }
            } else if ch.map_or(true, |c| c == ' ' || c == '\'' || is_break(c)) && start < end {
                self.write_chars(&text[start..end]);
                start = end;
            }
            if ch == Some('\'') {
                self.write("''");
                self.column += 2;
                start = end + 1;
            }
            if let Some(c) = ch {
                spaces = c == ' ';
                breaks = is_break(c);
            }
            end += 1;
        }
        self.write_indicator("'", false, false, false);
    }

    fn escape(ch: char) -> String {
        let short = match ch {
            '\0' => Some('0'),
            '\x07' => Some('a'),
            '\x08' => Some('b'),
            '\t' => Some('t'),
            '\n' => Some('n'),
            '\x0B' => Some('v'),
            '\x0C' => Some('f'),
            '\r' => Some('r'),
            '\x1B' => Some('e'),
            '"' => Some('"'),
            '\\' => Some('\\'),
            '\u{85}' => Some('N'),
            '\u{A0}' => Some('_'),
            '\u{2028}' => Some('L'),
            '\u{2029}' => Some('P'),
            _ => None,
        };
        match short {
            Some(code) => format!("\\{}", code),
            None if (ch as u32) <= 0xFF => format!("\\x{:02X}", ch as u32),
            None if (ch as u32) <= 0xFFFF => format!("\\u{:04X}", ch as u32),
            None => format!("\\U{:08X}", ch as u32),
        }
    }

    fn write_double_quoted(&mut self, text: &[char], split: bool) {
        self.write_indicator("\"", true, false, false);
        let mut start = 0;
        let mut end = 0;
        while end <= text.len() {
            let ch = text.get(end).copied();
            let needs_escape = ch.map_or(true, |c| {
                matches!(c, '"' | '\\' | '\u{85}' | '\u{2028}' | '\u{2029}' | '\u{FEFF}')
                    || !(('\x20'..='\x7E').contains(&c)
                        || (self.allow_unicode && is_printable_unicode(c)))
            });
            if needs_escape {
                if start < end {
                    self.write_chars(&text[start..end]);
                    start = end;
                }
                if let Some(c) = ch {
                    let data = Self::escape(c);
                    self.column += data.chars().count();
                    self.write(&data);
                    start = end + 1;
                }
            }
            if end > 0
                && end + 1 < text.len()
                && (ch == Some(' ') || start >= end)
                && self.column + end.saturating_sub(start) > self.best_width
                && split
            {
                if start < end {
                    self.write_chars(&text[start..end]);
                    start = end;
                }
                self.write("\\");
                self.column += 1;
                self.write_indent();
                self.whitespace = false;
                self.indention = false;
                if text.get(start) == Some(&' ') {
                    self.write("\\");
                    self.column += 1;
                }
            }
            end += 1;
        }
        self.write_indicator("\"", false, false, false);
    }

    fn determine_block_hints(&self, text: &[char]) -> String {
        let mut hints = String::new();
        if let (Some(&first), Some(&last)) = (text.first(), text.last()) {
            if first == ' ' || is_break(first) {
                hints.push_str(&self.best_indent.to_string());
            }
            if !is_break(last) {
                hints.push('-');
            } else if text.len() == 1 || is_break(text[text.len() - 2]) {
                hints.push('+');
            }
        }
        hints
    }

    fn write_folded(&mut self, text: &[char]) {
        let hints = self.determine_block_hints(text);
        self.write_indicator(&format!(">{}", hints), true, false, false);
        if hints.ends_with('+') {
            self.open_ended = true;
        }
        self.write_line_break(None);
        let mut leading_space = true;
        let mut spaces = false;
        let mut breaks = true;
        let mut start = 0;
        let mut end = 0;
        while end <= text.len() {
            let ch = text.get(end).copied();
            if breaks {
                if ch.map_or(true, |c| !is_break(c)) {
                    if !leading_space && ch.map_or(false, |c| c != ' ') && text[start] == '\n' {
                        self.write_line_break(None);
                    }
                    leading_space = ch == Some(' ');
                    self.write_breaks(&text[start..end]);
                    if ch.is_some() {
                        self.write_indent();
                    }
                    start = end;
                }
            } else if spaces {
                if ch != Some(' ') {
                    if start + 1 == end && self.column > self.best_width {
                        self.write_indent();
                    } else {
                        self.write_chars(&text[start..end]);
                    }
                    start = end;
                }
            } else if ch.map_or(true, |c| c == ' ' || is_break(c)) {
                self.write_chars(&text[start..end]);
                if ch.is_none() {
                    self.write_line_break(None);
                }
                start = end;
            }
            if let Some(c) = ch {
                breaks = is_break(c);
                spaces = c == ' ';
            }
            end += 1;
        }
    }

    fn write_literal(&mut self, text: &[char]) {
        let hints = self.determine_block_hints(text);
        self.write_indicator(&format!("|{}", hints), true, false, false);
        if hints.ends_with('+') {
            self.open_ended = true;
        }
        self.write_line_break(None);
        let mut breaks = true;
        let mut start = 0;
        let mut end = 0;
        while end <= text.len() {
            let ch = text.get(end).copied();
            if breaks {
                if ch.map_or(true, |c| !is_break(c)) {
                    self.write_breaks(&text[start..end]);
                    if ch.is_some() {
                        self.write_indent();
                    }
                    start = end;
                }
            } else if ch.map_or(true, is_break) {
                self.write_chars(&text[start..end]);
                if ch.is_none() {
                    self.write_line_break(None);
                }
                start = end;
            }
            if let Some(c) = ch {
                breaks = is_break(c);
            }
            end += 1;
        }
    }

    fn write_plain(&mut self, text: &[char], split: bool) {
        if self.root_context {
            self.open_ended = true;
        }
        if text.is_empty() {
            return;
        }
        if !self.whitespace {
            self.write(" ");
            self.column += 1;
        }
        self.whitespace = false;
        self.indention = false;
        let mut spaces = false;
        let mut breaks = false;
        let mut start = 0;
        let mut end = 0;
        while end <= text.len() {
            let ch = text.get(end).copied();
            if spaces {
                if ch != Some(' ') {
                    if start + 1 == end && self.column > self.best_width && split {
                        self.write_indent();
                        self.whitespace = false;
                        self.indention = false;
                    } else {
                        self.write_chars(&text[start..end]);
                    }
                    start = end;
                }
            } else if breaks {
                if ch.map_or(true, |c| !is_break(c)) {
                    if text[start] == '\n' {
                        self.write_line_break(None);
                    }
                    self.write_breaks(&text[start..end]);
                    self.write_indent();
                    self.whitespace = false;
                    self.indention = false;
                    start = end;
                }
            } else if ch.map_or(true, |c| c == ' ' || is_break(c)) {
                self.write_chars(&text[start..end]);
                start = end;
            }
            if let Some(c) = ch {
                spaces = c == ' ';
                breaks = is_break(c);
            }
            end += 1;
        }
    }
}

fn prepare_version((major, minor): (u32, u32)) -> Result<String> {
    if major != 1 {
        return Err(Error::emitter(format!(
            "unsupported YAML version: {}.{}",
            major, minor
        )));
    }
    Ok(format!("{}.{}", major, minor))
}

fn prepare_tag_handle(handle: &str) -> Result<String> {
    if handle.is_empty() {
        return Err(Error::emitter("tag handle must not be empty"));
    }
    if !handle.starts_with('!') || !handle.ends_with('!') {
        return Err(Error::emitter(format!(
            "tag handle must start and end with '!': '{}'",
            handle
        )));
    }
    let inner = if handle.len() > 1 { &handle[1..handle.len() - 1] } else { "" };
    if let Some(ch) = inner.chars().find(|ch| !is_anchor_char(*ch)) {
        return Err(Error::emitter(format!(
            "invalid character '{}' in the tag handle: '{}'",
            ch, handle
        )));
    }
    Ok(handle.to_string())
}

fn prepare_tag_prefix(prefix: &str) -> Result<String> {
    if prefix.is_empty() {
        return Err(Error::emitter("tag prefix must not be empty"));
    }
    let mut text = String::new();
    for (index, ch) in prefix.chars().enumerate() {
        if (index == 0 && ch == '!') || is_uri_char(ch) || ch == '!' {
            text.push(ch);
        } else {
            percent_encode(ch, &mut text);
        }
    }
    Ok(text)
}

fn prepare_anchor(anchor: &str) -> Result<String> {
    if anchor.is_empty() {
        return Err(Error::emitter("anchor must not be empty"));
    }
    if let Some(ch) = anchor.chars().find(|ch| !is_anchor_char(*ch)) {
        return Err(Error::emitter(format!(
            "invalid character '{}' in the anchor: '{}'",
            ch, anchor
        )));
    }
    Ok(anchor.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit_with(kinds: Vec<EventKind>, options: &DumpOptions) -> Result<String> {
        let mut emitter = Emitter::new(options);
        for kind in kinds {
            emitter.emit(Event::new(kind))?;
        }
        Ok(emitter.into_output())
    }

    fn document(body: Vec<EventKind>) -> Vec<EventKind> {
        let mut kinds = vec![
            EventKind::StreamStart,
            EventKind::DocumentStart {
                explicit: false,
                version: None,
                tags: Vec::new(),
            },
        ];
        kinds.extend(body);
        kinds.push(EventKind::DocumentEnd { explicit: false });
        kinds.push(EventKind::StreamEnd);
        kinds
    }

    fn emit(body: Vec<EventKind>) -> String {
        emit_with(document(body), &DumpOptions::new()).unwrap()
    }

    fn scalar(value: &str, style: Option<ScalarStyle>) -> EventKind {
        EventKind::Scalar {
            anchor: None,
            tag: None,
            implicit: ImplicitFlags::new(true, true),
            value: value.to_string(),
            style,
        }
    }

    fn mapping_start(flow_style: bool) -> EventKind {
        EventKind::MappingStart {
            anchor: None,
            tag: None,
            implicit: true,
            flow_style,
        }
    }

    fn sequence_start(flow_style: bool) -> EventKind {
        EventKind::SequenceStart {
            anchor: None,
            tag: None,
            implicit: true,
            flow_style,
        }
    }

    #[test]
    fn test_block_mapping_with_nested_sequence() {
        let text = emit(vec![
            mapping_start(false),
            scalar("key", None),
            sequence_start(false),
            scalar("a", None),
            scalar("b", None),
            EventKind::SequenceEnd,
            EventKind::MappingEnd,
        ]);
        assert_eq!(text, "key:\n- a\n- b\n");
    }

    #[test]
    fn test_flow_collections() {
        let text = emit(vec![
            mapping_start(true),
            scalar("a", None),
            sequence_start(true),
            scalar("1", None),
            scalar("2", None),
            EventKind::SequenceEnd,
            EventKind::MappingEnd,
        ]);
        assert_eq!(text, "{a: [1, 2]}\n");
    }

    #[test]
    fn test_empty_collections_are_flow() {
        let text = emit(vec![
            mapping_start(false),
            scalar("a", None),
            sequence_start(false),
            EventKind::SequenceEnd,
            scalar("b", None),
            mapping_start(false),
            EventKind::MappingEnd,
            EventKind::MappingEnd,
        ]);
        assert_eq!(text, "a: []\nb: {}\n");
    }

    #[test]
    fn test_open_ended_plain_root() {
        assert_eq!(emit(vec![scalar("hello", None)]), "hello\n...\n");
    }

    #[test]
    fn test_scalar_style_selection() {
        let empty_string = EventKind::Scalar {
            anchor: None,
            tag: None,
            implicit: ImplicitFlags::new(false, true),
            value: String::new(),
            style: None,
        };
        assert_eq!(emit(vec![empty_string]), "''\n");
        assert_eq!(emit(vec![scalar("", None)]), "...\n");
        assert_eq!(emit(vec![scalar(" padded", None)]), "' padded'\n");
        assert_eq!(emit(vec![scalar("tab\there", None)]), "\"tab\\there\"\n");
        assert_eq!(emit(vec![scalar("- item", None)]), "'- item'\n");
        assert_eq!(emit(vec![scalar("it's", Some(ScalarStyle::SingleQuoted))]), "'it''s'\n");
        assert_eq!(
            emit(vec![scalar("line\n", Some(ScalarStyle::Literal))]),
            "|\n  line\n"
        );
        assert_eq!(
            emit(vec![scalar("a\nb", Some(ScalarStyle::Literal))]),
            "|-\n  a\n  b\n"
        );
        assert_eq!(emit(vec![scalar("a\u{85}b", None)]), "\"a\\Nb\"\n");
        assert_eq!(
            emit(vec![scalar("x\u{2028}", Some(ScalarStyle::Literal))]),
            "\"x\\L\"\n"
        );
    }

    #[test]
    fn test_multiline_key_uses_complex_form() {
        let text = emit(vec![
            mapping_start(false),
            scalar("a\nb", None),
            scalar("v", None),
            EventKind::MappingEnd,
        ]);
        assert_eq!(text, "? 'a\n\n  b'\n: v\n");
    }

    #[test]
    fn test_anchor_and_alias() {
        let text = emit(vec![
            sequence_start(false),
            EventKind::SequenceStart {
                anchor: Some("id0001".to_string()),
                tag: None,
                implicit: true,
                flow_style: true,
            },
            scalar("x", None),
            EventKind::SequenceEnd,
            EventKind::Alias {
                anchor: "id0001".to_string(),
            },
            EventKind::SequenceEnd,
        ]);
        assert_eq!(text, "- &id0001 [x]\n- *id0001\n");
    }

    #[test]
    fn test_tags_and_directives() {
        let kinds = vec![
            EventKind::StreamStart,
            EventKind::DocumentStart {
                explicit: false,
                version: Some((1, 1)),
                tags: vec![("!e!".to_string(), "tag:example.com,2000:".to_string())],
            },
            EventKind::Scalar {
                anchor: None,
                tag: Some("tag:example.com,2000:point".to_string()),
                implicit: ImplicitFlags::new(false, false),
                value: "x".to_string(),
                style: None,
            },
            EventKind::DocumentEnd { explicit: false },
            EventKind::StreamEnd,
        ];
        let text = emit_with(kinds, &DumpOptions::new()).unwrap();
        assert_eq!(
            text,
            "%YAML 1.1\n%TAG !e! tag:example.com,2000:\n--- !e!point 'x'\n"
        );
    }

    #[test]
    fn test_verbatim_tag() {
        let text = emit(vec![EventKind::Scalar {
            anchor: None,
            tag: Some("urn:custom".to_string()),
            implicit: ImplicitFlags::new(false, false),
            value: "x".to_string(),
            style: None,
        }]);
        assert_eq!(text, "!<urn:custom> 'x'\n");
    }

    #[test]
    fn test_indent_setting() {
        let options = DumpOptions::new().with_indent(4);
        let text = emit_with(
            document(vec![
                mapping_start(false),
                scalar("a", None),
                mapping_start(false),
                scalar("b", None),
                scalar("c", None),
                EventKind::MappingEnd,
                EventKind::MappingEnd,
            ]),
            &options,
        )
        .unwrap();
        assert_eq!(text, "a:\n    b: c\n");
    }

    #[test]
    fn test_long_plain_scalar_wraps() {
        let words = vec!["word"; 30].join(" ");
        let text = emit_with(
            document(vec![scalar(&words, None)]),
            &DumpOptions::new().with_width(20),
        )
        .unwrap();
        assert!(text.lines().count() > 3);
        assert!(text.lines().all(|line| line.chars().count() <= 25));
    }

    #[test]
    fn test_out_of_order_events() {
        let err = emit_with(vec![EventKind::StreamEnd], &DumpOptions::new()).unwrap_err();
        assert!(err.is_emitter());
        assert!(err
            .to_string()
            .contains("expected StreamStartEvent, but got StreamEndEvent"));

        let err = emit_with(
            document(vec![EventKind::Alias {
                anchor: "bad anchor".to_string(),
            }]),
            &DumpOptions::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid character ' ' in the anchor"));
    }

    #[test]
    fn test_unsupported_version() {
        let kinds = vec![
            EventKind::StreamStart,
            EventKind::DocumentStart {
                explicit: true,
                version: Some((2, 0)),
                tags: Vec::new(),
            },
            scalar("x", None),
            EventKind::DocumentEnd { explicit: false },
            EventKind::StreamEnd,
        ];
        let err = emit_with(kinds, &DumpOptions::new()).unwrap_err();
        assert!(err.to_string().contains("unsupported YAML version: 2.0"));
    }

    #[test]
    fn test_crlf_line_breaks() {
        let text = emit_with(
            document(vec![
                sequence_start(false),
                scalar("a", None),
                scalar("b", None),
                EventKind::SequenceEnd,
            ]),
            &DumpOptions::new().with_line_break(crate::LineBreak::CrLf),
        )
        .unwrap();
        assert_eq!(text, "- a\r\n- b\r\n");
    }
}
