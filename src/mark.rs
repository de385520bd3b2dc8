//! Source positions attached to tokens, events, nodes and errors.
//!
//! A [`Mark`] records where something starts or ends in the input text. Marks
//! produced by the [`Reader`](crate::reader::Reader) keep a shared reference to
//! the decoded buffer so that error messages can quote the offending line:
//!
//! ```text
//! while parsing a flow sequence
//!   on line 1, column 4:
//!     a: [1, 2
//!        ^
//! ```
//!
//! Marks are immutable values. Lines and columns are stored zero-based and
//! printed one-based.

use std::fmt;
use std::sync::Arc;

/// Characters that end a line when rendering a snippet.
const SNIPPET_BREAKS: &[char] = &['\0', '\r', '\n', '\u{85}', '\u{2028}', '\u{2029}'];

/// A position in the input stream.
///
/// # Examples
///
/// ```rust
/// use serde_yamlet::Mark;
///
/// let mark = Mark::new(2, 4, 17);
/// assert_eq!(mark.line, 2);
/// assert_eq!(mark.to_string(), "  on line 3, column 5");
/// ```
#[derive(Clone, Default)]
pub struct Mark {
    /// Zero-based line number.
    pub line: usize,
    /// Zero-based column, counted in characters.
    pub column: usize,
    /// Zero-based absolute character offset.
    pub index: usize,
    buffer: Option<Arc<[char]>>,
}

impl Mark {
    /// Creates a mark that carries no source buffer.
    #[must_use]
    pub const fn new(line: usize, column: usize, index: usize) -> Self {
        Mark {
            line,
            column,
            index,
            buffer: None,
        }
    }

    pub(crate) fn with_buffer(
        line: usize,
        column: usize,
        index: usize,
        buffer: Arc<[char]>,
    ) -> Self {
        Mark {
            line,
            column,
            index,
            buffer: Some(buffer),
        }
    }

    /// Renders the source line around this mark with a caret under the
    /// marked column.
    ///
    /// Returns `None` when the mark was not produced by a reader.
    #[must_use]
    pub fn snippet(&self, indent: usize, max_length: usize) -> Option<String> {
        let buffer = self.buffer.as_ref()?;
        let half = (max_length / 2).saturating_sub(1);

        let mut head = "";
        let mut start = self.index.min(buffer.len());
        while start > 0 && !SNIPPET_BREAKS.contains(&buffer[start - 1]) {
            start -= 1;
            if self.index - start > half {
                head = " ... ";
                start += 5;
                break;
            }
        }

        let mut tail = "";
        let mut end = self.index.min(buffer.len());
        while end < buffer.len() && !SNIPPET_BREAKS.contains(&buffer[end]) {
            end += 1;
            if end - self.index > half {
                tail = " ... ";
                end -= 5;
                break;
            }
        }

        let line: String = buffer[start..end].iter().collect();
        let caret_column = indent + self.index - start + head.len();
        Some(format!(
            "{}{}{}{}\n{}^",
            " ".repeat(indent),
            head,
            line,
            tail,
            " ".repeat(caret_column)
        ))
    }
}

impl PartialEq for Mark {
    fn eq(&self, other: &Self) -> bool {
        self.line == other.line && self.column == other.column && self.index == other.index
    }
}

impl Eq for Mark {}

impl fmt::Debug for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mark")
            .field("line", &self.line)
            .field("column", &self.column)
            .field("index", &self.index)
            .finish()
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  on line {}, column {}", self.line + 1, self.column + 1)?;
        if let Some(snippet) = self.snippet(4, 75) {
            write!(f, ":\n{}", snippet)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> Arc<[char]> {
        text.chars().chain(std::iter::once('\0')).collect()
    }

    #[test]
    fn test_display_without_buffer() {
        let mark = Mark::new(0, 0, 0);
        assert_eq!(mark.to_string(), "  on line 1, column 1");
    }

    #[test]
    fn test_snippet_points_at_column() {
        let mark = Mark::with_buffer(1, 3, 10, buffer("key: 1\nabcdef\n"));
        let snippet = mark.snippet(4, 75).unwrap();
        assert_eq!(snippet, "    abcdef\n       ^");
    }

    #[test]
    fn test_snippet_truncates_long_lines() {
        let text = "x".repeat(200);
        let mark = Mark::with_buffer(0, 100, 100, buffer(&text));
        let snippet = mark.snippet(4, 75).unwrap();
        let first = snippet.lines().next().unwrap();
        assert!(first.starts_with("     ... "));
        assert!(first.ends_with(" ... "));
    }

    #[test]
    fn test_equality_ignores_buffer() {
        let a = Mark::new(1, 2, 3);
        let b = Mark::with_buffer(1, 2, 3, buffer("abc"));
        assert_eq!(a, b);
    }
}
