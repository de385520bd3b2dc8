//! Indentation-aware tokenizer.
//!
//! The scanner turns the character stream into [`Token`]s, one at a time and
//! only as far ahead as needed. Block structure is implicit in YAML, so the
//! scanner synthesizes `BlockSequenceStart`, `BlockMappingStart` and
//! `BlockEnd` tokens from the indentation it observes.
//!
//! ## Simple keys
//!
//! A plain or quoted scalar (or an alias, anchor, tag or flow collection)
//! may turn out to be a mapping key once a `:` follows it. The scanner keeps
//! at most one candidate per flow level. A candidate goes stale when the line
//! ends or more than 1024 characters pass; a stale candidate that was
//! *required* (it sits at the indentation of a block mapping) is an error.
//! When a `:` resolves a candidate, a `Key` token, and possibly a
//! `BlockMappingStart`, is inserted at the position the candidate was
//! recorded.
//!
//! ```rust
//! use serde_yamlet::scan;
//! use serde_yamlet::tokens::TokenKind;
//!
//! let kinds: Vec<_> = scan("a: 1\n").unwrap().into_iter().map(|t| t.kind).collect();
//! assert_eq!(kinds[1], TokenKind::BlockMappingStart);
//! assert_eq!(kinds[2], TokenKind::Key);
//! ```

use crate::error::{Error, Result};
use crate::mark::Mark;
use crate::reader::{is_blank_or_break, is_break, is_break_or_nul, is_whitespace_or_break, Reader};
use crate::tokens::{ScalarStyle, Token, TokenKind};
use std::collections::{BTreeMap, VecDeque};

/// Distance after which a simple key candidate is discarded.
const MAX_SIMPLE_KEY_LENGTH: usize = 1024;

#[derive(Debug, Clone)]
struct SimpleKey {
    token_number: usize,
    required: bool,
    index: usize,
    line: usize,
    column: usize,
    mark: Mark,
}

#[inline]
fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

#[inline]
fn is_uri_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || "-;/?:@&=+$,_.!~*'()[]%".contains(ch)
}

fn escape_replacement(ch: char) -> Option<char> {
    Some(match ch {
        '0' => '\0',
        'a' => '\x07',
        'b' => '\x08',
        't' | '\t' => '\x09',
        'n' => '\x0A',
        'v' => '\x0B',
        'f' => '\x0C',
        'r' => '\x0D',
        'e' => '\x1B',
        ' ' => '\x20',
        '"' => '"',
        '\\' => '\\',
        '/' => '/',
        'N' => '\u{85}',
        '_' => '\u{A0}',
        'L' => '\u{2028}',
        'P' => '\u{2029}',
        _ => return None,
    })
}

fn escape_code_length(ch: char) -> Option<usize> {
    match ch {
        'x' => Some(2),
        'u' => Some(4),
        'U' => Some(8),
        _ => None,
    }
}

/// Lazily produces tokens from a [`Reader`].
#[derive(Debug)]
pub struct Scanner {
    reader: Reader,
    done: bool,
    flow_level: usize,
    tokens: VecDeque<Token>,
    tokens_taken: usize,
    indent: isize,
    indents: Vec<isize>,
    allow_simple_key: bool,
    possible_simple_keys: BTreeMap<usize, SimpleKey>,
}

impl Scanner {
    /// Creates a scanner over `text`.
    ///
    /// # Errors
    ///
    /// Fails if the text contains characters YAML does not allow.
    pub fn new(text: &str) -> Result<Self> {
        Ok(Self::from_reader(Reader::new(text)?))
    }

    /// Creates a scanner over an existing reader.
    #[must_use]
    pub fn from_reader(reader: Reader) -> Self {
        let mut scanner = Scanner {
            reader,
            done: false,
            flow_level: 0,
            tokens: VecDeque::new(),
            tokens_taken: 0,
            indent: -1,
            indents: Vec::new(),
            allow_simple_key: true,
            possible_simple_keys: BTreeMap::new(),
        };
        scanner.fetch_stream_start();
        scanner
    }

    /// Returns `true` if the next token satisfies `predicate`.
    pub fn check_token(&mut self, predicate: impl FnOnce(&TokenKind) -> bool) -> Result<bool> {
        self.fill()?;
        Ok(self.tokens.front().map_or(false, |token| predicate(&token.kind)))
    }

    /// Returns the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<Option<&Token>> {
        self.fill()?;
        Ok(self.tokens.front())
    }

    /// Consumes and returns the next token.
    pub fn get_token(&mut self) -> Result<Option<Token>> {
        self.fill()?;
        let token = self.tokens.pop_front();
        if let Some(token) = &token {
            self.tokens_taken += 1;
            tracing::trace!(token = token.kind.id(), "scanned token");
        }
        Ok(token)
    }

    /// Like [`peek_token`](Self::peek_token), but running out of tokens is an
    /// error.
    pub(crate) fn peek(&mut self) -> Result<&Token> {
        self.fill()?;
        match self.tokens.front() {
            Some(token) => Ok(token),
            None => Err(Error::scanner(
                None,
                None,
                "unexpected end of the token stream",
                self.reader.get_mark(),
            )),
        }
    }

    /// Like [`get_token`](Self::get_token), but running out of tokens is an
    /// error.
    pub(crate) fn next_token(&mut self) -> Result<Token> {
        match self.get_token()? {
            Some(token) => Ok(token),
            None => Err(Error::scanner(
                None,
                None,
                "unexpected end of the token stream",
                self.reader.get_mark(),
            )),
        }
    }

    pub(crate) fn mark(&self) -> Mark {
        self.reader.get_mark()
    }

    fn fill(&mut self) -> Result<()> {
        while self.need_more_tokens()? {
            self.fetch_more_tokens()?;
        }
        Ok(())
    }

    fn need_more_tokens(&mut self) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        if self.tokens.is_empty() {
            return Ok(true);
        }
        self.stale_possible_simple_keys()?;
        Ok(self.next_possible_simple_key() == Some(self.tokens_taken))
    }

    fn fetch_more_tokens(&mut self) -> Result<()> {
        self.scan_to_next_token();
        self.stale_possible_simple_keys()?;
        self.unwind_indent(self.reader.column() as isize);

        let ch = self.reader.peek(0);
        match ch {
            '\0' => return self.fetch_stream_end(),
            '%' if self.check_directive() => return self.fetch_directive(),
            '-' if self.check_document_indicator("---") => {
                return self.fetch_document_indicator(TokenKind::DocumentStart)
            }
            '.' if self.check_document_indicator("...") => {
                return self.fetch_document_indicator(TokenKind::DocumentEnd)
            }
            '[' => return self.fetch_flow_collection_start(TokenKind::FlowSequenceStart),
            '{' => return self.fetch_flow_collection_start(TokenKind::FlowMappingStart),
            ']' => return self.fetch_flow_collection_end(TokenKind::FlowSequenceEnd),
            '}' => return self.fetch_flow_collection_end(TokenKind::FlowMappingEnd),
            ',' => return self.fetch_flow_entry(),
            '-' if self.check_block_entry() => return self.fetch_block_entry(),
            '?' if self.check_key() => return self.fetch_key(),
            ':' if self.check_value() => return self.fetch_value(),
            '*' => return self.fetch_alias(),
            '&' => return self.fetch_anchor(),
            '!' => return self.fetch_tag(),
            '|' if self.flow_level == 0 => return self.fetch_block_scalar(ScalarStyle::Literal),
            '>' if self.flow_level == 0 => return self.fetch_block_scalar(ScalarStyle::Folded),
            '\'' => return self.fetch_flow_scalar(ScalarStyle::SingleQuoted),
            '"' => return self.fetch_flow_scalar(ScalarStyle::DoubleQuoted),
            _ => {}
        }
        if self.check_plain() {
            return self.fetch_plain();
        }
        Err(Error::scanner(
            Some("while scanning for the next token"),
            None,
            format!("found character {:?} that cannot start any token", ch),
            self.reader.get_mark(),
        ))
    }

    // Simple keys.

    fn next_possible_simple_key(&self) -> Option<usize> {
        self.possible_simple_keys
            .values()
            .map(|key| key.token_number)
            .min()
    }

    fn stale_possible_simple_keys(&mut self) -> Result<()> {
        let line = self.reader.line();
        let index = self.reader.index();
        let mut stale = Vec::new();
        for (level, key) in &self.possible_simple_keys {
            if key.line != line || index - key.index > MAX_SIMPLE_KEY_LENGTH {
                if key.required {
                    return Err(Error::scanner(
                        Some("while scanning a simple key"),
                        Some(key.mark.clone()),
                        "could not find expected ':'",
                        self.reader.get_mark(),
                    ));
                }
                stale.push(*level);
            }
        }
        for level in stale {
            self.possible_simple_keys.remove(&level);
        }
        Ok(())
    }

    fn save_possible_simple_key(&mut self) -> Result<()> {
        let required = self.flow_level == 0 && self.indent == self.reader.column() as isize;
        if self.allow_simple_key {
            self.remove_possible_simple_key()?;
            let key = SimpleKey {
                token_number: self.tokens_taken + self.tokens.len(),
                required,
                index: self.reader.index(),
                line: self.reader.line(),
                column: self.reader.column(),
                mark: self.reader.get_mark(),
            };
            self.possible_simple_keys.insert(self.flow_level, key);
        }
        Ok(())
    }

    fn remove_possible_simple_key(&mut self) -> Result<()> {
        if let Some(key) = self.possible_simple_keys.remove(&self.flow_level) {
            if key.required {
                return Err(Error::scanner(
                    Some("while scanning a simple key"),
                    Some(key.mark),
                    "could not find expected ':'",
                    self.reader.get_mark(),
                ));
            }
        }
        Ok(())
    }

    // Indentation.

    fn unwind_indent(&mut self, column: isize) {
        if self.flow_level > 0 {
            return;
        }
        while self.indent > column {
            let mark = self.reader.get_mark();
            self.indent = self.indents.pop().unwrap_or(-1);
            self.tokens
                .push_back(Token::new(TokenKind::BlockEnd, mark.clone(), mark));
        }
    }

    fn add_indent(&mut self, column: isize) -> bool {
        if self.indent < column {
            self.indents.push(self.indent);
            self.indent = column;
            true
        } else {
            false
        }
    }

    // Fetchers.

    fn push_simple(&mut self, kind: TokenKind, length: usize) {
        let start_mark = self.reader.get_mark();
        self.reader.forward(length);
        let end_mark = self.reader.get_mark();
        self.tokens.push_back(Token::new(kind, start_mark, end_mark));
    }

    fn fetch_stream_start(&mut self) {
        let mark = self.reader.get_mark();
        self.tokens
            .push_back(Token::new(TokenKind::StreamStart, mark.clone(), mark));
    }

    fn fetch_stream_end(&mut self) -> Result<()> {
        self.unwind_indent(-1);
        self.remove_possible_simple_key()?;
        self.allow_simple_key = false;
        self.possible_simple_keys.clear();
        let mark = self.reader.get_mark();
        self.tokens
            .push_back(Token::new(TokenKind::StreamEnd, mark.clone(), mark));
        self.done = true;
        Ok(())
    }

    fn fetch_directive(&mut self) -> Result<()> {
        self.unwind_indent(-1);
        self.remove_possible_simple_key()?;
        self.allow_simple_key = false;
        let token = self.scan_directive()?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_document_indicator(&mut self, kind: TokenKind) -> Result<()> {
        self.unwind_indent(-1);
        self.remove_possible_simple_key()?;
        self.allow_simple_key = false;
        self.push_simple(kind, 3);
        Ok(())
    }

    fn fetch_flow_collection_start(&mut self, kind: TokenKind) -> Result<()> {
        self.save_possible_simple_key()?;
        self.flow_level += 1;
        self.allow_simple_key = true;
        self.push_simple(kind, 1);
        Ok(())
    }

    fn fetch_flow_collection_end(&mut self, kind: TokenKind) -> Result<()> {
        self.remove_possible_simple_key()?;
        self.flow_level = self.flow_level.saturating_sub(1);
        self.allow_simple_key = false;
        self.push_simple(kind, 1);
        Ok(())
    }

    fn fetch_flow_entry(&mut self) -> Result<()> {
        self.allow_simple_key = true;
        self.remove_possible_simple_key()?;
        self.push_simple(TokenKind::FlowEntry, 1);
        Ok(())
    }

    fn fetch_block_entry(&mut self) -> Result<()> {
        if self.flow_level == 0 {
            if !self.allow_simple_key {
                return Err(Error::scanner(
                    None,
                    None,
                    "sequence entries are not allowed here",
                    self.reader.get_mark(),
                ));
            }
            if self.add_indent(self.reader.column() as isize) {
                let mark = self.reader.get_mark();
                self.tokens
                    .push_back(Token::new(TokenKind::BlockSequenceStart, mark.clone(), mark));
            }
        }
        self.allow_simple_key = true;
        self.remove_possible_simple_key()?;
        self.push_simple(TokenKind::BlockEntry, 1);
        Ok(())
    }

    fn fetch_key(&mut self) -> Result<()> {
        if self.flow_level == 0 {
            if !self.allow_simple_key {
                return Err(Error::scanner(
                    None,
                    None,
                    "mapping keys are not allowed here",
                    self.reader.get_mark(),
                ));
            }
            if self.add_indent(self.reader.column() as isize) {
                let mark = self.reader.get_mark();
                self.tokens
                    .push_back(Token::new(TokenKind::BlockMappingStart, mark.clone(), mark));
            }
        }
        self.allow_simple_key = self.flow_level == 0;
        self.remove_possible_simple_key()?;
        self.push_simple(TokenKind::Key, 1);
        Ok(())
    }

    fn fetch_value(&mut self) -> Result<()> {
        if let Some(key) = self.possible_simple_keys.remove(&self.flow_level) {
            let position = key.token_number - self.tokens_taken;
            self.tokens.insert(
                position,
                Token::new(TokenKind::Key, key.mark.clone(), key.mark.clone()),
            );
            if self.flow_level == 0 && self.add_indent(key.column as isize) {
                self.tokens.insert(
                    position,
                    Token::new(TokenKind::BlockMappingStart, key.mark.clone(), key.mark),
                );
            }
            self.allow_simple_key = false;
        } else {
            if self.flow_level == 0 {
                if !self.allow_simple_key {
                    return Err(Error::scanner(
                        None,
                        None,
                        "mapping values are not allowed here",
                        self.reader.get_mark(),
                    ));
                }
                if self.add_indent(self.reader.column() as isize) {
                    let mark = self.reader.get_mark();
                    self.tokens
                        .push_back(Token::new(TokenKind::BlockMappingStart, mark.clone(), mark));
                }
            }
            self.allow_simple_key = self.flow_level == 0;
            self.remove_possible_simple_key()?;
        }
        self.push_simple(TokenKind::Value, 1);
        Ok(())
    }

    fn fetch_alias(&mut self) -> Result<()> {
        self.save_possible_simple_key()?;
        self.allow_simple_key = false;
        let token = self.scan_anchor(true)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_anchor(&mut self) -> Result<()> {
        self.save_possible_simple_key()?;
        self.allow_simple_key = false;
        let token = self.scan_anchor(false)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_tag(&mut self) -> Result<()> {
        self.save_possible_simple_key()?;
        self.allow_simple_key = false;
        let token = self.scan_tag()?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_block_scalar(&mut self, style: ScalarStyle) -> Result<()> {
        self.allow_simple_key = true;
        self.remove_possible_simple_key()?;
        let token = self.scan_block_scalar(style)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_flow_scalar(&mut self, style: ScalarStyle) -> Result<()> {
        self.save_possible_simple_key()?;
        self.allow_simple_key = false;
        let token = self.scan_flow_scalar(style)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_plain(&mut self) -> Result<()> {
        self.save_possible_simple_key()?;
        self.allow_simple_key = false;
        let token = self.scan_plain();
        self.tokens.push_back(token);
        Ok(())
    }

    // Checkers.

    fn check_directive(&self) -> bool {
        self.reader.column() == 0
    }

    fn check_document_indicator(&self, indicator: &str) -> bool {
        self.reader.column() == 0
            && self.reader.prefix(3) == indicator
            && is_whitespace_or_break(self.reader.peek(3))
    }

    fn check_block_entry(&self) -> bool {
        is_whitespace_or_break(self.reader.peek(1))
    }

    fn check_key(&self) -> bool {
        self.flow_level > 0 || is_whitespace_or_break(self.reader.peek(1))
    }

    fn check_value(&self) -> bool {
        self.flow_level > 0 || is_whitespace_or_break(self.reader.peek(1))
    }

    fn check_plain(&self) -> bool {
        let ch = self.reader.peek(0);
        let indicator = is_whitespace_or_break(ch) || "-?:,[]{}#&*!|>'\"%@`".contains(ch);
        !indicator
            || (!is_whitespace_or_break(self.reader.peek(1))
                && (ch == '-' || (self.flow_level == 0 && matches!(ch, '?' | ':'))))
    }

    fn at_document_separator(&self) -> bool {
        let prefix = self.reader.prefix(3);
        (prefix == "---" || prefix == "...") && is_whitespace_or_break(self.reader.peek(3))
    }

    // Scanners.

    fn scan_to_next_token(&mut self) {
        if self.reader.index() == 0 && self.reader.peek(0) == '\u{FEFF}' {
            self.reader.forward(1);
        }
        loop {
            loop {
                let ch = self.reader.peek(0);
                let tab_allowed = self.flow_level > 0 || !self.allow_simple_key;
                if ch == ' ' || (tab_allowed && ch == '\t') {
                    self.reader.forward(1);
                } else {
                    break;
                }
            }
            if self.reader.peek(0) == '#' {
                while !is_break_or_nul(self.reader.peek(0)) {
                    self.reader.forward(1);
                }
            }
            if self.scan_line_break().is_some() {
                if self.flow_level == 0 {
                    self.allow_simple_key = true;
                }
            } else {
                break;
            }
        }
    }

    fn scan_directive(&mut self) -> Result<Token> {
        let start_mark = self.reader.get_mark();
        self.reader.forward(1);
        let name = self.scan_directive_name(&start_mark)?;
        let kind = match name.as_str() {
            "YAML" => {
                let (major, minor) = self.scan_yaml_directive_value(&start_mark)?;
                TokenKind::VersionDirective { major, minor }
            }
            "TAG" => {
                let (handle, prefix) = self.scan_tag_directive_value(&start_mark)?;
                TokenKind::TagDirective { handle, prefix }
            }
            _ => TokenKind::ReservedDirective { name },
        };
        let end_mark = self.reader.get_mark();
        if matches!(kind, TokenKind::ReservedDirective { .. }) {
            while !is_break_or_nul(self.reader.peek(0)) {
                self.reader.forward(1);
            }
        }
        self.scan_directive_ignored_line(&start_mark)?;
        Ok(Token::new(kind, start_mark, end_mark))
    }

    fn directive_error(&self, start_mark: &Mark, problem: String) -> Error {
        Error::scanner(
            Some("while scanning a directive"),
            Some(start_mark.clone()),
            problem,
            self.reader.get_mark(),
        )
    }

    fn scan_directive_name(&mut self, start_mark: &Mark) -> Result<String> {
        let mut length = 0;
        while is_word_char(self.reader.peek(length)) {
            length += 1;
        }
        if length == 0 {
            let ch = self.reader.peek(0);
            return Err(self.directive_error(
                start_mark,
                format!("expected alphabetic or numeric character, but found {:?}", ch),
            ));
        }
        let value = self.reader.prefix(length);
        self.reader.forward(length);
        let ch = self.reader.peek(0);
        if !is_blank_or_break(ch) {
            return Err(self.directive_error(
                start_mark,
                format!("expected alphabetic or numeric character, but found {:?}", ch),
            ));
        }
        Ok(value)
    }

    fn scan_yaml_directive_value(&mut self, start_mark: &Mark) -> Result<(u32, u32)> {
        while self.reader.peek(0) == ' ' {
            self.reader.forward(1);
        }
        let major = self.scan_yaml_directive_number(start_mark)?;
        if self.reader.peek(0) != '.' {
            let ch = self.reader.peek(0);
            return Err(self.directive_error(
                start_mark,
                format!("expected a digit or '.', but found {:?}", ch),
            ));
        }
        self.reader.forward(1);
        let minor = self.scan_yaml_directive_number(start_mark)?;
        let ch = self.reader.peek(0);
        if !is_blank_or_break(ch) {
            return Err(self.directive_error(
                start_mark,
                format!("expected a digit or ' ', but found {:?}", ch),
            ));
        }
        Ok((major, minor))
    }

    fn scan_yaml_directive_number(&mut self, start_mark: &Mark) -> Result<u32> {
        let ch = self.reader.peek(0);
        if !ch.is_ascii_digit() {
            return Err(
                self.directive_error(start_mark, format!("expected a digit, but found {:?}", ch))
            );
        }
        let mut length = 0;
        while self.reader.peek(length).is_ascii_digit() {
            length += 1;
        }
        let digits = self.reader.prefix(length);
        let value = digits.parse::<u32>().map_err(|_| {
            self.directive_error(start_mark, format!("version number {} is too large", digits))
        })?;
        self.reader.forward(length);
        Ok(value)
    }

    fn scan_tag_directive_value(&mut self, start_mark: &Mark) -> Result<(String, String)> {
        while self.reader.peek(0) == ' ' {
            self.reader.forward(1);
        }
        let handle = self.scan_tag_handle("directive", start_mark)?;
        if self.reader.peek(0) != ' ' {
            let ch = self.reader.peek(0);
            return Err(self.directive_error(start_mark, format!("expected ' ', but found {:?}", ch)));
        }
        while self.reader.peek(0) == ' ' {
            self.reader.forward(1);
        }
        let prefix = self.scan_tag_uri("directive", start_mark)?;
        let ch = self.reader.peek(0);
        if !is_blank_or_break(ch) {
            return Err(self.directive_error(start_mark, format!("expected ' ', but found {:?}", ch)));
        }
        Ok((handle, prefix))
    }

    fn scan_directive_ignored_line(&mut self, start_mark: &Mark) -> Result<()> {
        while self.reader.peek(0) == ' ' {
            self.reader.forward(1);
        }
        if self.reader.peek(0) == '#' {
            while !is_break_or_nul(self.reader.peek(0)) {
                self.reader.forward(1);
            }
        }
        let ch = self.reader.peek(0);
        if !is_break_or_nul(ch) {
            return Err(self.directive_error(
                start_mark,
                format!("expected a comment or a line break, but found {:?}", ch),
            ));
        }
        self.scan_line_break();
        Ok(())
    }

    fn scan_anchor(&mut self, alias: bool) -> Result<Token> {
        let start_mark = self.reader.get_mark();
        let context = if alias {
            "while scanning an alias"
        } else {
            "while scanning an anchor"
        };
        self.reader.forward(1);
        let mut length = 0;
        while is_word_char(self.reader.peek(length)) {
            length += 1;
        }
        let invalid = |scanner: &Self, ch: char| {
            Error::scanner(
                Some(context),
                Some(start_mark.clone()),
                format!("expected alphabetic or numeric character, but found {:?}", ch),
                scanner.reader.get_mark(),
            )
        };
        if length == 0 {
            return Err(invalid(self, self.reader.peek(0)));
        }
        let value = self.reader.prefix(length);
        self.reader.forward(length);
        let ch = self.reader.peek(0);
        if !(is_whitespace_or_break(ch) || "?:,]}%@`".contains(ch)) {
            return Err(invalid(self, ch));
        }
        let end_mark = self.reader.get_mark();
        let kind = if alias {
            TokenKind::Alias(value)
        } else {
            TokenKind::Anchor(value)
        };
        Ok(Token::new(kind, start_mark, end_mark))
    }

    fn scan_tag(&mut self) -> Result<Token> {
        let start_mark = self.reader.get_mark();
        let next = self.reader.peek(1);
        let (handle, suffix) = if next == '<' {
            self.reader.forward(2);
            let suffix = self.scan_tag_uri("tag", &start_mark)?;
            if self.reader.peek(0) != '>' {
                return Err(Error::scanner(
                    Some("while parsing a tag"),
                    Some(start_mark),
                    format!("expected '>', but found {:?}", self.reader.peek(0)),
                    self.reader.get_mark(),
                ));
            }
            self.reader.forward(1);
            (None, suffix)
        } else if is_whitespace_or_break(next) {
            self.reader.forward(1);
            (None, "!".to_string())
        } else {
            let mut length = 1;
            let mut use_handle = false;
            let mut ch = next;
            while !is_blank_or_break(ch) {
                if ch == '!' {
                    use_handle = true;
                    break;
                }
                length += 1;
                ch = self.reader.peek(length);
            }
            let handle = if use_handle {
                self.scan_tag_handle("tag", &start_mark)?
            } else {
                self.reader.forward(1);
                "!".to_string()
            };
            let suffix = self.scan_tag_uri("tag", &start_mark)?;
            (Some(handle), suffix)
        };
        let ch = self.reader.peek(0);
        if !is_blank_or_break(ch) {
            return Err(Error::scanner(
                Some("while scanning a tag"),
                Some(start_mark),
                format!("expected ' ', but found {:?}", ch),
                self.reader.get_mark(),
            ));
        }
        let end_mark = self.reader.get_mark();
        Ok(Token::new(TokenKind::Tag { handle, suffix }, start_mark, end_mark))
    }

    fn scan_block_scalar(&mut self, style: ScalarStyle) -> Result<Token> {
        let folded = style == ScalarStyle::Folded;
        let mut chunks = String::new();
        let start_mark = self.reader.get_mark();
        self.reader.forward(1);
        let (chomping, increment) = self.scan_block_scalar_indicators(&start_mark)?;
        self.scan_block_scalar_ignored_line(&start_mark)?;

        let min_indent = (self.indent + 1).max(1) as usize;
        let (mut breaks, indent, mut end_mark) = match increment {
            None => {
                let (breaks, max_indent, end_mark) = self.scan_block_scalar_indentation();
                (breaks, min_indent.max(max_indent), end_mark)
            }
            Some(increment) => {
                let indent = min_indent + increment - 1;
                let (breaks, end_mark) = self.scan_block_scalar_breaks(indent);
                (breaks, indent, end_mark)
            }
        };

        let mut line_break = String::new();
        while self.reader.column() == indent && self.reader.peek(0) != '\0' {
            chunks.push_str(&breaks);
            let leading_non_space = !matches!(self.reader.peek(0), ' ' | '\t');
            let mut length = 0;
            while !is_break_or_nul(self.reader.peek(length)) {
                length += 1;
            }
            chunks.push_str(&self.reader.prefix(length));
            self.reader.forward(length);
            line_break = self.scan_line_break().map(String::from).unwrap_or_default();
            let (next_breaks, next_end_mark) = self.scan_block_scalar_breaks(indent);
            breaks = next_breaks;
            end_mark = next_end_mark;
            if self.reader.column() == indent && self.reader.peek(0) != '\0' {
                if folded
                    && line_break == "\n"
                    && leading_non_space
                    && !matches!(self.reader.peek(0), ' ' | '\t')
                {
                    if breaks.is_empty() {
                        chunks.push(' ');
                    }
                } else {
                    chunks.push_str(&line_break);
                }
            } else {
                break;
            }
        }

        // Chomping: clip keeps the final break, strip drops it, keep retains
        // every trailing break.
        if chomping != Some(false) {
            chunks.push_str(&line_break);
        }
        if chomping == Some(true) {
            chunks.push_str(&breaks);
        }

        Ok(Token::new(
            TokenKind::Scalar {
                value: chunks,
                plain: false,
                style,
            },
            start_mark,
            end_mark,
        ))
    }

    fn block_scalar_error(&self, start_mark: &Mark, problem: String) -> Error {
        Error::scanner(
            Some("while scanning a block scalar"),
            Some(start_mark.clone()),
            problem,
            self.reader.get_mark(),
        )
    }

    fn scan_block_scalar_indicators(
        &mut self,
        start_mark: &Mark,
    ) -> Result<(Option<bool>, Option<usize>)> {
        let mut chomping = None;
        let mut increment = None;
        let mut ch = self.reader.peek(0);
        if ch == '+' || ch == '-' {
            chomping = Some(ch == '+');
            self.reader.forward(1);
            ch = self.reader.peek(0);
            if let Some(digit) = ch.to_digit(10) {
                if digit == 0 {
                    return Err(self.block_scalar_error(
                        start_mark,
                        "expected indentation indicator in the range 1-9, but found 0".to_string(),
                    ));
                }
                increment = Some(digit as usize);
                self.reader.forward(1);
            }
        } else if let Some(digit) = ch.to_digit(10) {
            if digit == 0 {
                return Err(self.block_scalar_error(
                    start_mark,
                    "expected indentation indicator in the range 1-9, but found 0".to_string(),
                ));
            }
            increment = Some(digit as usize);
            self.reader.forward(1);
            ch = self.reader.peek(0);
            if ch == '+' || ch == '-' {
                chomping = Some(ch == '+');
                self.reader.forward(1);
            }
        }
        let ch = self.reader.peek(0);
        if !is_blank_or_break(ch) {
            return Err(self.block_scalar_error(
                start_mark,
                format!("expected chomping or indentation indicators, but found {:?}", ch),
            ));
        }
        Ok((chomping, increment))
    }

    fn scan_block_scalar_ignored_line(&mut self, start_mark: &Mark) -> Result<()> {
        while self.reader.peek(0) == ' ' {
            self.reader.forward(1);
        }
        if self.reader.peek(0) == '#' {
            while !is_break_or_nul(self.reader.peek(0)) {
                self.reader.forward(1);
            }
        }
        let ch = self.reader.peek(0);
        if !is_break_or_nul(ch) {
            return Err(self.block_scalar_error(
                start_mark,
                format!("expected a comment or a line break, but found {:?}", ch),
            ));
        }
        self.scan_line_break();
        Ok(())
    }

    fn scan_block_scalar_indentation(&mut self) -> (String, usize, Mark) {
        let mut chunks = String::new();
        let mut max_indent = 0;
        let mut end_mark = self.reader.get_mark();
        loop {
            let ch = self.reader.peek(0);
            if ch == ' ' {
                self.reader.forward(1);
                max_indent = max_indent.max(self.reader.column());
            } else if is_break(ch) {
                if let Some(line_break) = self.scan_line_break() {
                    chunks.push(line_break);
                }
                end_mark = self.reader.get_mark();
            } else {
                break;
            }
        }
        (chunks, max_indent, end_mark)
    }

    fn scan_block_scalar_breaks(&mut self, indent: usize) -> (String, Mark) {
        let mut chunks = String::new();
        let mut end_mark = self.reader.get_mark();
        while self.reader.column() < indent && self.reader.peek(0) == ' ' {
            self.reader.forward(1);
        }
        while is_break(self.reader.peek(0)) {
            if let Some(line_break) = self.scan_line_break() {
                chunks.push(line_break);
            }
            end_mark = self.reader.get_mark();
            while self.reader.column() < indent && self.reader.peek(0) == ' ' {
                self.reader.forward(1);
            }
        }
        (chunks, end_mark)
    }

    fn scan_flow_scalar(&mut self, style: ScalarStyle) -> Result<Token> {
        let double = style == ScalarStyle::DoubleQuoted;
        let mut chunks = String::new();
        let start_mark = self.reader.get_mark();
        let quote = self.reader.peek(0);
        self.reader.forward(1);
        self.scan_flow_scalar_non_spaces(double, &start_mark, &mut chunks)?;
        while self.reader.peek(0) != quote {
            self.scan_flow_scalar_spaces(double, &start_mark, &mut chunks)?;
            self.scan_flow_scalar_non_spaces(double, &start_mark, &mut chunks)?;
        }
        self.reader.forward(1);
        let end_mark = self.reader.get_mark();
        Ok(Token::new(
            TokenKind::Scalar {
                value: chunks,
                plain: false,
                style,
            },
            start_mark,
            end_mark,
        ))
    }

    fn scan_flow_scalar_non_spaces(
        &mut self,
        double: bool,
        start_mark: &Mark,
        chunks: &mut String,
    ) -> Result<()> {
        loop {
            let mut length = 0;
            loop {
                let ch = self.reader.peek(length);
                if matches!(ch, '\'' | '"' | '\\') || is_whitespace_or_break(ch) {
                    break;
                }
                length += 1;
            }
            if length > 0 {
                chunks.push_str(&self.reader.prefix(length));
                self.reader.forward(length);
            }
            let ch = self.reader.peek(0);
            if !double && ch == '\'' && self.reader.peek(1) == '\'' {
                chunks.push('\'');
                self.reader.forward(2);
            } else if (double && ch == '\'') || (!double && matches!(ch, '"' | '\\')) {
                chunks.push(ch);
                self.reader.forward(1);
            } else if double && ch == '\\' {
                self.reader.forward(1);
                let ch = self.reader.peek(0);
                if let Some(replacement) = escape_replacement(ch) {
                    chunks.push(replacement);
                    self.reader.forward(1);
                } else if let Some(length) = escape_code_length(ch) {
                    self.reader.forward(1);
                    for k in 0..length {
                        if !self.reader.peek(k).is_ascii_hexdigit() {
                            return Err(Error::scanner(
                                Some("while scanning a double-quoted scalar"),
                                Some(start_mark.clone()),
                                format!(
                                    "expected escape sequence of {} hexadecimal numbers, but found {:?}",
                                    length,
                                    self.reader.peek(k)
                                ),
                                self.reader.get_mark(),
                            ));
                        }
                    }
                    let digits = self.reader.prefix(length);
                    let decoded = u32::from_str_radix(&digits, 16)
                        .ok()
                        .and_then(char::from_u32)
                        .ok_or_else(|| {
                            Error::scanner(
                                Some("while scanning a double-quoted scalar"),
                                Some(start_mark.clone()),
                                format!("found invalid Unicode character escape code #x{}", digits),
                                self.reader.get_mark(),
                            )
                        })?;
                    chunks.push(decoded);
                    self.reader.forward(length);
                } else if is_break(ch) {
                    self.scan_line_break();
                    self.scan_flow_scalar_breaks(start_mark, chunks)?;
                } else {
                    return Err(Error::scanner(
                        Some("while scanning a double-quoted scalar"),
                        Some(start_mark.clone()),
                        format!("found unknown escape character {:?}", ch),
                        self.reader.get_mark(),
                    ));
                }
            } else {
                return Ok(());
            }
        }
    }

    fn scan_flow_scalar_spaces(
        &mut self,
        _double: bool,
        start_mark: &Mark,
        chunks: &mut String,
    ) -> Result<()> {
        let mut length = 0;
        while matches!(self.reader.peek(length), ' ' | '\t') {
            length += 1;
        }
        let whitespaces = self.reader.prefix(length);
        self.reader.forward(length);
        let ch = self.reader.peek(0);
        if ch == '\0' {
            return Err(Error::scanner(
                Some("while scanning a quoted scalar"),
                Some(start_mark.clone()),
                "found unexpected end of stream",
                self.reader.get_mark(),
            ));
        }
        if is_break(ch) {
            let line_break = self.scan_line_break();
            let mut breaks = String::new();
            self.scan_flow_scalar_breaks(start_mark, &mut breaks)?;
            match line_break {
                Some('\n') => {
                    if breaks.is_empty() {
                        chunks.push(' ');
                    }
                }
                Some(other) => chunks.push(other),
                None => {}
            }
            chunks.push_str(&breaks);
        } else {
            chunks.push_str(&whitespaces);
        }
        Ok(())
    }

    fn scan_flow_scalar_breaks(&mut self, start_mark: &Mark, chunks: &mut String) -> Result<()> {
        loop {
            if self.at_document_separator() {
                return Err(Error::scanner(
                    Some("while scanning a quoted scalar"),
                    Some(start_mark.clone()),
                    "found unexpected document separator",
                    self.reader.get_mark(),
                ));
            }
            while matches!(self.reader.peek(0), ' ' | '\t') {
                self.reader.forward(1);
            }
            if is_break(self.reader.peek(0)) {
                if let Some(line_break) = self.scan_line_break() {
                    chunks.push(line_break);
                }
            } else {
                return Ok(());
            }
        }
    }

    fn scan_plain(&mut self) -> Token {
        let mut chunks = String::new();
        let start_mark = self.reader.get_mark();
        let mut end_mark = start_mark.clone();
        let indent = self.indent + 1;
        let mut spaces = String::new();
        loop {
            if self.reader.peek(0) == '#' {
                break;
            }
            let mut length = 0;
            loop {
                let ch = self.reader.peek(length);
                let ends_at_colon = ch == ':' && {
                    let next = self.reader.peek(length + 1);
                    is_whitespace_or_break(next)
                        || (self.flow_level > 0 && matches!(next, ',' | '[' | ']' | '{' | '}'))
                };
                if is_whitespace_or_break(ch)
                    || ends_at_colon
                    || (self.flow_level > 0 && matches!(ch, ',' | '?' | '[' | ']' | '{' | '}'))
                {
                    break;
                }
                length += 1;
            }
            if length == 0 {
                break;
            }
            self.allow_simple_key = false;
            chunks.push_str(&spaces);
            chunks.push_str(&self.reader.prefix(length));
            self.reader.forward(length);
            end_mark = self.reader.get_mark();
            spaces = self.scan_plain_spaces();
            if spaces.is_empty()
                || self.reader.peek(0) == '#'
                || (self.flow_level == 0 && (self.reader.column() as isize) < indent)
            {
                break;
            }
        }
        Token::new(
            TokenKind::Scalar {
                value: chunks,
                plain: true,
                style: ScalarStyle::Plain,
            },
            start_mark,
            end_mark,
        )
    }

    fn scan_plain_spaces(&mut self) -> String {
        let mut chunks = String::new();
        let mut length = 0;
        while self.reader.peek(length) == ' ' {
            length += 1;
        }
        let whitespaces = self.reader.prefix(length);
        self.reader.forward(length);
        if is_break(self.reader.peek(0)) {
            let line_break = self.scan_line_break();
            self.allow_simple_key = true;
            if self.at_document_separator() {
                return String::new();
            }
            let mut breaks = String::new();
            loop {
                let ch = self.reader.peek(0);
                if ch == ' ' {
                    self.reader.forward(1);
                } else if is_break(ch) {
                    if let Some(line_break) = self.scan_line_break() {
                        breaks.push(line_break);
                    }
                    if self.at_document_separator() {
                        return String::new();
                    }
                } else {
                    break;
                }
            }
            match line_break {
                Some('\n') => {
                    if breaks.is_empty() {
                        chunks.push(' ');
                    }
                }
                Some(other) => chunks.push(other),
                None => {}
            }
            chunks.push_str(&breaks);
        } else {
            chunks.push_str(&whitespaces);
        }
        chunks
    }

    fn scan_tag_handle(&mut self, name: &str, start_mark: &Mark) -> Result<String> {
        let context = format!("while scanning a {}", name);
        let ch = self.reader.peek(0);
        if ch != '!' {
            return Err(Error::scanner(
                Some(context.as_str()),
                Some(start_mark.clone()),
                format!("expected '!', but found {:?}", ch),
                self.reader.get_mark(),
            ));
        }
        let mut length = 1;
        let mut ch = self.reader.peek(length);
        if ch != ' ' {
            while is_word_char(ch) {
                length += 1;
                ch = self.reader.peek(length);
            }
            if ch != '!' {
                self.reader.forward(length);
                return Err(Error::scanner(
                    Some(context.as_str()),
                    Some(start_mark.clone()),
                    format!("expected '!', but found {:?}", ch),
                    self.reader.get_mark(),
                ));
            }
            length += 1;
        }
        let value = self.reader.prefix(length);
        self.reader.forward(length);
        Ok(value)
    }

    fn scan_tag_uri(&mut self, name: &str, start_mark: &Mark) -> Result<String> {
        let mut chunks = String::new();
        let mut length = 0;
        let mut ch = self.reader.peek(length);
        while is_uri_char(ch) {
            if ch == '%' {
                chunks.push_str(&self.reader.prefix(length));
                self.reader.forward(length);
                length = 0;
                let decoded = self.scan_uri_escapes(name, start_mark)?;
                chunks.push_str(&decoded);
            } else {
                length += 1;
            }
            ch = self.reader.peek(length);
        }
        if length > 0 {
            chunks.push_str(&self.reader.prefix(length));
            self.reader.forward(length);
        }
        if chunks.is_empty() {
            return Err(Error::scanner(
                Some(format!("while parsing a {}", name).as_str()),
                Some(start_mark.clone()),
                format!("expected URI, but found {:?}", ch),
                self.reader.get_mark(),
            ));
        }
        Ok(chunks)
    }

    fn scan_uri_escapes(&mut self, name: &str, start_mark: &Mark) -> Result<String> {
        let context = format!("while scanning a {}", name);
        let mut bytes = Vec::new();
        let mark = self.reader.get_mark();
        while self.reader.peek(0) == '%' {
            self.reader.forward(1);
            for k in 0..2 {
                if !self.reader.peek(k).is_ascii_hexdigit() {
                    return Err(Error::scanner(
                        Some(context.as_str()),
                        Some(start_mark.clone()),
                        format!(
                            "expected URI escape sequence of 2 hexadecimal numbers, but found {:?}",
                            self.reader.peek(k)
                        ),
                        self.reader.get_mark(),
                    ));
                }
            }
            let byte = u8::from_str_radix(&self.reader.prefix(2), 16).map_err(|e| {
                Error::scanner(Some(context.as_str()), Some(start_mark.clone()), e.to_string(), mark.clone())
            })?;
            bytes.push(byte);
            self.reader.forward(2);
        }
        String::from_utf8(bytes).map_err(|e| {
            Error::scanner(Some(context.as_str()), Some(start_mark.clone()), e.to_string(), mark)
        })
    }

    /// Consumes one line break, normalizing `\r\n`, `\r` and `\x85` to `\n`.
    fn scan_line_break(&mut self) -> Option<char> {
        match self.reader.peek(0) {
            '\r' | '\n' | '\u{85}' => {
                if self.reader.prefix(2) == "\r\n" {
                    self.reader.forward(2);
                } else {
                    self.reader.forward(1);
                }
                Some('\n')
            }
            ch @ ('\u{2028}' | '\u{2029}') => {
                self.reader.forward(1);
                Some(ch)
            }
            _ => None,
        }
    }
}

impl Iterator for Scanner {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.get_token() {
            Ok(token) => token.map(Ok),
            Err(e) => {
                self.done = true;
                self.tokens.clear();
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        Scanner::new(text)
            .unwrap()
            .map(|token| token.unwrap().kind)
            .collect()
    }

    fn scalar(value: &str, style: ScalarStyle) -> TokenKind {
        TokenKind::Scalar {
            value: value.to_string(),
            plain: style == ScalarStyle::Plain,
            style,
        }
    }

    fn first_scalar(text: &str) -> String {
        kinds(text)
            .into_iter()
            .find_map(|kind| match kind {
                TokenKind::Scalar { value, .. } => Some(value),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_block_mapping_tokens() {
        assert_eq!(
            kinds("a: 1\n"),
            vec![
                TokenKind::StreamStart,
                TokenKind::BlockMappingStart,
                TokenKind::Key,
                scalar("a", ScalarStyle::Plain),
                TokenKind::Value,
                scalar("1", ScalarStyle::Plain),
                TokenKind::BlockEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn test_nested_block_sequence() {
        assert_eq!(
            kinds("a:\n  - 1\n  - 2\n"),
            vec![
                TokenKind::StreamStart,
                TokenKind::BlockMappingStart,
                TokenKind::Key,
                scalar("a", ScalarStyle::Plain),
                TokenKind::Value,
                TokenKind::BlockSequenceStart,
                TokenKind::BlockEntry,
                scalar("1", ScalarStyle::Plain),
                TokenKind::BlockEntry,
                scalar("2", ScalarStyle::Plain),
                TokenKind::BlockEnd,
                TokenKind::BlockEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn test_flow_collections() {
        assert_eq!(
            kinds("[a, {b: c}]"),
            vec![
                TokenKind::StreamStart,
                TokenKind::FlowSequenceStart,
                scalar("a", ScalarStyle::Plain),
                TokenKind::FlowEntry,
                TokenKind::FlowMappingStart,
                TokenKind::Key,
                scalar("b", ScalarStyle::Plain),
                TokenKind::Value,
                scalar("c", ScalarStyle::Plain),
                TokenKind::FlowMappingEnd,
                TokenKind::FlowSequenceEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn test_directives_and_document_markers() {
        let tokens = kinds("%YAML 1.1\n%TAG !e! tag:example.com,2000:\n--- x\n...\n");
        assert_eq!(tokens[1], TokenKind::VersionDirective { major: 1, minor: 1 });
        assert_eq!(
            tokens[2],
            TokenKind::TagDirective {
                handle: "!e!".to_string(),
                prefix: "tag:example.com,2000:".to_string(),
            }
        );
        assert_eq!(tokens[3], TokenKind::DocumentStart);
        assert_eq!(tokens[5], TokenKind::DocumentEnd);
    }

    #[test]
    fn test_anchor_alias_and_tags() {
        let tokens = kinds("- &a !!str x\n- *a\n- !<tag:x> y\n- ! z\n");
        assert!(tokens.contains(&TokenKind::Anchor("a".to_string())));
        assert!(tokens.contains(&TokenKind::Alias("a".to_string())));
        assert!(tokens.contains(&TokenKind::Tag {
            handle: Some("!!".to_string()),
            suffix: "str".to_string(),
        }));
        assert!(tokens.contains(&TokenKind::Tag {
            handle: None,
            suffix: "tag:x".to_string(),
        }));
        assert!(tokens.contains(&TokenKind::Tag {
            handle: None,
            suffix: "!".to_string(),
        }));
    }

    #[test]
    fn test_double_quoted_escapes() {
        assert_eq!(
            first_scalar(r#""a\tb\x41\u00e9\U0001F600\N\\""#),
            "a\tbA\u{e9}\u{1F600}\u{85}\\"
        );
    }

    #[test]
    fn test_double_quoted_line_folding() {
        assert_eq!(first_scalar("\"one\n  two\n\n  three\""), "one two\nthree");
        assert_eq!(first_scalar("\"esc\\\n  aped\""), "escaped");
    }

    #[test]
    fn test_single_quoted() {
        assert_eq!(first_scalar("'it''s'"), "it's");
        assert_eq!(first_scalar("'a\\b'"), "a\\b");
    }

    #[test]
    fn test_literal_chomping() {
        assert_eq!(first_scalar("|\n  a\n  b\n\n"), "a\nb\n");
        assert_eq!(first_scalar("|-\n  a\n  b\n\n"), "a\nb");
        assert_eq!(first_scalar("|+\n  a\n  b\n\n"), "a\nb\n\n");
    }

    #[test]
    fn test_folded_scalar() {
        assert_eq!(first_scalar(">\n  one\n  two\n\n  three\n"), "one two\nthree\n");
        assert_eq!(first_scalar(">\n  one\n    more\n  two\n"), "one\n  more\ntwo\n");
    }

    #[test]
    fn test_explicit_indentation_indicator() {
        assert_eq!(first_scalar("|2\n   lead\n  b\n"), " lead\nb\n");
    }

    #[test]
    fn test_plain_multiline() {
        assert_eq!(first_scalar("a\n  b\n\n  c"), "a b\nc");
        assert_eq!(first_scalar("a # comment"), "a");
    }

    #[test]
    fn test_plain_url_in_flow() {
        assert_eq!(first_scalar("[http://x.y/z]"), "http://x.y/z");
    }

    #[test]
    fn test_tab_between_tokens() {
        assert_eq!(
            kinds("a:\tb\n")[5],
            scalar("b", ScalarStyle::Plain)
        );
    }

    #[test]
    fn test_unknown_escape() {
        let err = Scanner::new("\"\\q\"")
            .unwrap()
            .find_map(|token| token.err())
            .unwrap();
        assert!(err.is_scanner());
        assert!(err.to_string().contains("found unknown escape character 'q'"));
    }

    #[test]
    fn test_invalid_start_character() {
        let err = Scanner::new("a: `b`")
            .unwrap()
            .find_map(|token| token.err())
            .unwrap();
        assert!(err
            .to_string()
            .contains("found character '`' that cannot start any token"));
    }

    #[test]
    fn test_required_simple_key_goes_stale() {
        let text = format!("a: 1\n{}\nb: 2\n", "x");
        let err = Scanner::new(&text)
            .unwrap()
            .find_map(|token| token.err())
            .unwrap();
        assert!(err.to_string().contains("could not find expected ':'"));
    }

    #[test]
    fn test_long_simple_key_is_rejected() {
        let text = format!("? {}: v\n", "x".repeat(1100));
        let err = Scanner::new(&text)
            .unwrap()
            .find_map(|token| token.err())
            .unwrap();
        assert!(err.is_scanner());
        assert!(err.to_string().contains("mapping values are not allowed here"));
    }

    #[test]
    fn test_bom_is_skipped() {
        assert_eq!(first_scalar("\u{FEFF}value"), "value");
    }

    #[test]
    fn test_stops_after_error() {
        let mut scanner = Scanner::new("\"\\q\"").unwrap();
        let results: Vec<_> = scanner.by_ref().collect();
        assert!(results.last().unwrap().is_err());
        assert!(scanner.next().is_none());
    }
}
