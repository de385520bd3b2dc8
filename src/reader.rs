//! Character reader feeding the scanner.
//!
//! The reader owns the decoded input as a buffer of `char`s followed by a
//! `'\0'` sentinel, and tracks the current line, column and offset. The whole
//! buffer is checked once at construction, so every later stage can rely on
//! the input containing only characters YAML allows.
//!
//! ```rust
//! use serde_yamlet::reader::Reader;
//!
//! let mut reader = Reader::new("a\r\nb").unwrap();
//! assert_eq!(reader.peek(0), 'a');
//! reader.forward(3);
//! let mark = reader.get_mark();
//! assert_eq!((mark.line, mark.column), (1, 0));
//! ```

use crate::error::{Error, Result};
use crate::mark::Mark;
use std::sync::Arc;

/// Returns `true` for characters YAML accepts in a stream.
#[inline]
pub(crate) fn is_printable(ch: char) -> bool {
    matches!(ch,
        '\t' | '\n' | '\r'
        | '\x20'..='\x7E'
        | '\u{85}'
        | '\u{A0}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Returns `true` for the characters that count as a line break.
#[inline]
pub(crate) fn is_break(ch: char) -> bool {
    matches!(ch, '\r' | '\n' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

/// Returns `true` for a line break or the end-of-stream sentinel.
#[inline]
pub(crate) fn is_break_or_nul(ch: char) -> bool {
    ch == '\0' || is_break(ch)
}

/// Returns `true` for a space, a line break or the end-of-stream sentinel.
#[inline]
pub(crate) fn is_blank_or_break(ch: char) -> bool {
    ch == ' ' || is_break_or_nul(ch)
}

/// Returns `true` for whitespace (space or tab), a line break or the sentinel.
#[inline]
pub(crate) fn is_whitespace_or_break(ch: char) -> bool {
    ch == ' ' || ch == '\t' || is_break_or_nul(ch)
}

/// Positioned access to a validated character buffer.
#[derive(Debug, Clone)]
pub struct Reader {
    buffer: Arc<[char]>,
    pointer: usize,
    line: usize,
    column: usize,
}

impl Reader {
    /// Creates a reader over `text`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Reader`] citing the first disallowed character.
    pub fn new(text: &str) -> Result<Self> {
        let mut buffer = Vec::with_capacity(text.len() + 1);
        for (offset, ch) in text.chars().enumerate() {
            if !is_printable(ch) {
                return Err(Error::Reader {
                    offset,
                    code: ch as u32,
                    reason: "special characters are not allowed".to_string(),
                });
            }
            buffer.push(ch);
        }
        buffer.push('\0');
        Ok(Reader {
            buffer: buffer.into(),
            pointer: 0,
            line: 0,
            column: 0,
        })
    }

    /// Creates a reader over raw bytes.
    ///
    /// The encoding is UTF-16 (little or big endian) when the bytes start
    /// with the matching byte order mark, and UTF-8 otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for malformed input in the detected
    /// encoding and [`Error::Reader`] for disallowed characters.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        match bytes {
            [0xFF, 0xFE, rest @ ..] => Self::new(&decode_utf16(rest, "utf-16-le", 2, u16::from_le_bytes)?),
            [0xFE, 0xFF, rest @ ..] => Self::new(&decode_utf16(rest, "utf-16-be", 2, u16::from_be_bytes)?),
            _ => match std::str::from_utf8(bytes) {
                Ok(text) => Self::new(text),
                Err(e) => {
                    let offset = e.valid_up_to();
                    Err(Error::Decode {
                        encoding: "utf-8",
                        offset,
                        byte: bytes.get(offset).copied().unwrap_or(0),
                        reason: "invalid utf-8 sequence".to_string(),
                    })
                }
            },
        }
    }

    /// Returns the character `offset` positions ahead, or `'\0'` past the end.
    #[inline]
    #[must_use]
    pub fn peek(&self, offset: usize) -> char {
        self.buffer
            .get(self.pointer + offset)
            .copied()
            .unwrap_or('\0')
    }

    /// Returns the next `length` characters without consuming them.
    #[must_use]
    pub fn prefix(&self, length: usize) -> String {
        let end = (self.pointer + length).min(self.buffer.len());
        self.buffer[self.pointer..end]
            .iter()
            .take_while(|&&ch| ch != '\0')
            .collect()
    }

    /// Advances by `length` characters, updating the line and column.
    ///
    /// `\r\n` counts as a single line break; a BOM does not advance the column.
    pub fn forward(&mut self, length: usize) {
        for _ in 0..length {
            let Some(&ch) = self.buffer.get(self.pointer) else {
                return;
            };
            self.pointer += 1;
            if matches!(ch, '\n' | '\u{85}' | '\u{2028}' | '\u{2029}')
                || (ch == '\r' && self.peek(0) != '\n')
            {
                self.line += 1;
                self.column = 0;
            } else if ch != '\u{FEFF}' {
                self.column += 1;
            }
        }
    }

    /// Returns a mark for the current position.
    #[must_use]
    pub fn get_mark(&self) -> Mark {
        Mark::with_buffer(self.line, self.column, self.pointer, Arc::clone(&self.buffer))
    }

    /// Absolute character offset of the current position.
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.pointer
    }

    #[inline]
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    #[inline]
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }
}

fn decode_utf16(
    bytes: &[u8],
    encoding: &'static str,
    bom_length: usize,
    unit: fn([u8; 2]) -> u16,
) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Error::Decode {
            encoding,
            offset: bom_length + bytes.len() - 1,
            byte: bytes[bytes.len() - 1],
            reason: "truncated data".to_string(),
        });
    }
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    let mut text = String::with_capacity(bytes.len() / 2);
    let mut position = 0;
    for decoded in char::decode_utf16(units) {
        match decoded {
            Ok(ch) => {
                text.push(ch);
                position += ch.len_utf16();
            }
            Err(e) => {
                let offset = bom_length + position * 2;
                return Err(Error::Decode {
                    encoding,
                    offset,
                    byte: bytes[offset - bom_length],
                    reason: format!("malformed surrogate #x{:04x}", e.unpaired_surrogate()),
                });
            }
        }
    }
    Ok(text)
}
