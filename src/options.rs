//! Configuration options for dumping YAML.
//!
//! This module provides types to customize the emitted text:
//!
//! - [`DumpOptions`]: Main configuration struct
//! - [`LineBreak`]: Line break sequence written between lines
//!
//! Loading is not configurable beyond the resolver and constructor registry
//! passed to a [`Loader`](crate::Loader).
//!
//! ## Examples
//!
//! ```rust
//! use serde_yamlet::{dump, yaml, DumpOptions};
//!
//! let value = yaml!({"name": "yamlet", "tags": ["a", "b"]});
//!
//! // Block style (the default)
//! let text = dump(&value, &DumpOptions::new()).unwrap();
//! assert_eq!(text, "name: yamlet\ntags:\n- a\n- b\n");
//!
//! // Let the dumper pick flow style for collections of scalars
//! let options = DumpOptions::new().with_default_flow_style(None);
//! let text = dump(&value, &options).unwrap();
//! assert_eq!(text, "name: yamlet\ntags: [a, b]\n");
//! ```

use crate::tokens::ScalarStyle;

/// Line break written by the emitter.
///
/// # Examples
///
/// ```rust
/// use serde_yamlet::LineBreak;
///
/// assert_eq!(LineBreak::Lf.as_str(), "\n");
/// assert_eq!(LineBreak::CrLf.as_str(), "\r\n");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LineBreak {
    #[default]
    Lf,
    Cr,
    CrLf,
}

impl LineBreak {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LineBreak::Lf => "\n",
            LineBreak::Cr => "\r",
            LineBreak::CrLf => "\r\n",
        }
    }
}

/// Configuration options for dumping.
///
/// Controls the representer (scalar and collection styles, key order), the
/// serializer (document markers and directives) and the emitter (layout).
///
/// # Examples
///
/// ```rust
/// use serde_yamlet::{DumpOptions, LineBreak};
///
/// let options = DumpOptions::new()
///     .with_indent(4)
///     .with_width(60)
///     .with_line_break(LineBreak::CrLf)
///     .with_explicit_start(true)
///     .with_sort_keys(true);
/// assert_eq!(options.indent, 4);
/// assert!(options.explicit_start);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DumpOptions {
    /// Write every node with explicit tags and double-quoted scalars.
    pub canonical: bool,
    /// Spaces per nesting level; values outside `2..=9` fall back to 2.
    pub indent: usize,
    /// Preferred line width; ignored unless greater than twice the indent.
    pub width: usize,
    /// Write printable non-ASCII characters as-is instead of escaping them.
    pub allow_unicode: bool,
    pub line_break: LineBreak,
    /// Always write `---` before each document.
    pub explicit_start: bool,
    /// Always write `...` after each document.
    pub explicit_end: bool,
    /// `%YAML` directive to write before each document.
    pub version: Option<(u32, u32)>,
    /// `%TAG` directives as `(handle, prefix)` pairs.
    pub tags: Vec<(String, String)>,
    /// Style requested for every scalar; `None` lets the emitter choose.
    pub default_style: Option<ScalarStyle>,
    /// `Some(true)` forces flow collections, `Some(false)` block collections,
    /// and `None` uses flow only for collections of plain scalars.
    pub default_flow_style: Option<bool>,
    /// Write mapping keys in sorted order instead of insertion order.
    pub sort_keys: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        DumpOptions {
            canonical: false,
            indent: 2,
            width: 80,
            allow_unicode: true,
            line_break: LineBreak::Lf,
            explicit_start: false,
            explicit_end: false,
            version: None,
            tags: Vec::new(),
            default_style: None,
            default_flow_style: Some(false),
            sort_keys: false,
        }
    }
}

impl DumpOptions {
    /// Creates default options (block style, 2-space indent, width 80).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for canonical output.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_yamlet::{dump, DumpOptions, Value};
    ///
    /// let text = dump(&Value::from(vec![1]), &DumpOptions::canonical()).unwrap();
    /// assert_eq!(text, "---\n!!seq [\n  !!int \"1\",\n]\n");
    /// ```
    #[must_use]
    pub fn canonical() -> Self {
        DumpOptions {
            canonical: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_canonical(mut self, canonical: bool) -> Self {
        self.canonical = canonical;
        self
    }

    /// Sets the number of spaces per nesting level.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the preferred line width.
    #[must_use]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn with_allow_unicode(mut self, allow_unicode: bool) -> Self {
        self.allow_unicode = allow_unicode;
        self
    }

    #[must_use]
    pub fn with_line_break(mut self, line_break: LineBreak) -> Self {
        self.line_break = line_break;
        self
    }

    #[must_use]
    pub fn with_explicit_start(mut self, explicit_start: bool) -> Self {
        self.explicit_start = explicit_start;
        self
    }

    #[must_use]
    pub fn with_explicit_end(mut self, explicit_end: bool) -> Self {
        self.explicit_end = explicit_end;
        self
    }

    /// Sets the `%YAML` directive, for example `Some((1, 1))`.
    #[must_use]
    pub fn with_version(mut self, version: Option<(u32, u32)>) -> Self {
        self.version = version;
        self
    }

    /// Adds a `%TAG` directive.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_yamlet::DumpOptions;
    ///
    /// let options = DumpOptions::new().with_tag("!e!", "tag:example.com,2000:");
    /// assert_eq!(options.tags.len(), 1);
    /// ```
    #[must_use]
    pub fn with_tag(mut self, handle: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.tags.push((handle.into(), prefix.into()));
        self
    }

    #[must_use]
    pub fn with_default_style(mut self, style: Option<ScalarStyle>) -> Self {
        self.default_style = style;
        self
    }

    #[must_use]
    pub fn with_default_flow_style(mut self, flow_style: Option<bool>) -> Self {
        self.default_flow_style = flow_style;
        self
    }

    #[must_use]
    pub fn with_sort_keys(mut self, sort_keys: bool) -> Self {
        self.sort_keys = sort_keys;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = DumpOptions::default();
        assert_eq!(options.indent, 2);
        assert_eq!(options.width, 80);
        assert!(options.allow_unicode);
        assert_eq!(options.default_flow_style, Some(false));
        assert!(!options.canonical);
    }

    #[test]
    fn test_builder_chain() {
        let options = DumpOptions::new()
            .with_version(Some((1, 1)))
            .with_default_style(Some(ScalarStyle::SingleQuoted))
            .with_line_break(LineBreak::Cr);
        assert_eq!(options.version, Some((1, 1)));
        assert_eq!(options.default_style, Some(ScalarStyle::SingleQuoted));
        assert_eq!(options.line_break.as_str(), "\r");
    }

    #[test]
    fn test_canonical_preset() {
        let options = DumpOptions::canonical();
        assert!(options.canonical);
        assert_eq!(options.indent, 2);
    }
}
