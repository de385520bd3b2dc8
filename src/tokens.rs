//! Lexical tokens produced by the [`Scanner`](crate::scanner::Scanner).

use crate::mark::Mark;
use std::fmt;

/// The presentation style of a scalar.
///
/// Plain scalars are written bare; the other styles correspond to the
/// `'`, `"`, `|` and `>` indicators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

impl ScalarStyle {
    /// Returns the indicator character that introduces this style.
    #[must_use]
    pub const fn indicator(&self) -> &'static str {
        match self {
            ScalarStyle::Plain => "",
            ScalarStyle::SingleQuoted => "'",
            ScalarStyle::DoubleQuoted => "\"",
            ScalarStyle::Literal => "|",
            ScalarStyle::Folded => ">",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_block(&self) -> bool {
        matches!(self, ScalarStyle::Literal | ScalarStyle::Folded)
    }
}

/// A token with its source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start_mark: Mark,
    pub end_mark: Mark,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, start_mark: Mark, end_mark: Mark) -> Self {
        Token {
            kind,
            start_mark,
            end_mark,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    StreamStart,
    StreamEnd,
    /// `%YAML major.minor`
    VersionDirective {
        major: u32,
        minor: u32,
    },
    /// `%TAG handle prefix`
    TagDirective {
        handle: String,
        prefix: String,
    },
    /// Any other directive; its parameters are skipped.
    ReservedDirective {
        name: String,
    },
    DocumentStart,
    DocumentEnd,
    BlockSequenceStart,
    BlockMappingStart,
    BlockEnd,
    FlowSequenceStart,
    FlowSequenceEnd,
    FlowMappingStart,
    FlowMappingEnd,
    Key,
    Value,
    BlockEntry,
    FlowEntry,
    Alias(String),
    Anchor(String),
    /// A tag as written; `handle` is `None` for verbatim `!<...>` tags and
    /// the lone `!`.
    Tag {
        handle: Option<String>,
        suffix: String,
    },
    Scalar {
        value: String,
        plain: bool,
        style: ScalarStyle,
    },
}

impl TokenKind {
    /// The short name used in diagnostics.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            TokenKind::StreamStart => "<stream start>",
            TokenKind::StreamEnd => "<stream end>",
            TokenKind::VersionDirective { .. }
            | TokenKind::TagDirective { .. }
            | TokenKind::ReservedDirective { .. } => "<directive>",
            TokenKind::DocumentStart => "<document start>",
            TokenKind::DocumentEnd => "<document end>",
            TokenKind::BlockSequenceStart => "<block sequence start>",
            TokenKind::BlockMappingStart => "<block mapping start>",
            TokenKind::BlockEnd => "<block end>",
            TokenKind::FlowSequenceStart => "[",
            TokenKind::FlowSequenceEnd => "]",
            TokenKind::FlowMappingStart => "{",
            TokenKind::FlowMappingEnd => "}",
            TokenKind::Key => "?",
            TokenKind::Value => ":",
            TokenKind::BlockEntry => "-",
            TokenKind::FlowEntry => ",",
            TokenKind::Alias(_) => "<alias>",
            TokenKind::Anchor(_) => "<anchor>",
            TokenKind::Tag { .. } => "<tag>",
            TokenKind::Scalar { .. } => "<scalar>",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_ids_render_quoted() {
        assert_eq!(TokenKind::BlockEnd.to_string(), "'<block end>'");
        assert_eq!(TokenKind::FlowEntry.to_string(), "','");
    }

    #[test]
    fn test_style_indicators() {
        assert_eq!(ScalarStyle::Literal.indicator(), "|");
        assert!(ScalarStyle::Folded.is_block());
        assert!(!ScalarStyle::DoubleQuoted.is_block());
    }
}
