//! Error types for loading and dumping YAML.
//!
//! Every stage of the pipeline fails fast with a variant of [`Error`]. The
//! input-side stages (scanner, parser, composer, constructor) carry a
//! [`MarkedError`] that points back into the source text. The output-side
//! stages (representer, serializer, emitter) have no source position and carry
//! a plain message.
//!
//! ## Error Categories
//!
//! - **Reader**: the input contains a character YAML does not allow, or is not
//!   valid UTF-8/UTF-16
//! - **Scanner / Parser**: malformed tokens or grammar
//! - **Composer**: undefined aliases, duplicate anchors, multiple documents
//!   where one was expected
//! - **Constructor**: a node cannot become a native value
//! - **Representer / Serializer / Emitter**: a value or event stream cannot be
//!   written out
//!
//! ## Examples
//!
//! ```rust
//! use serde_yamlet::{load, Error};
//!
//! let err = load("a: [1, 2\n").unwrap_err();
//! assert!(err.is_parser());
//!
//! let rendered = err.to_string();
//! assert!(rendered.contains("while parsing a flow sequence"));
//! assert!(rendered.contains("expected ',' or ']'"));
//! ```

use crate::mark::Mark;
use std::fmt;
use thiserror::Error;

/// A diagnostic anchored to positions in the source text.
///
/// Rendered as the context line, its mark (skipped when it coincides with
/// the problem mark), the problem line, its mark and an optional note.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarkedError {
    pub context: Option<String>,
    pub context_mark: Option<Mark>,
    pub problem: Option<String>,
    pub problem_mark: Option<Mark>,
    pub note: Option<String>,
}

impl MarkedError {
    /// Creates a marked error from its four parts.
    #[must_use]
    pub fn new(
        context: Option<&str>,
        context_mark: Option<Mark>,
        problem: impl Into<String>,
        problem_mark: Mark,
    ) -> Self {
        MarkedError {
            context: context.map(str::to_string),
            context_mark,
            problem: Some(problem.into()),
            problem_mark: Some(problem_mark),
            note: None,
        }
    }

    /// Attaches a trailing note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

impl fmt::Display for MarkedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = Vec::new();
        if let Some(context) = &self.context {
            lines.push(context.clone());
        }
        if let Some(context_mark) = &self.context_mark {
            let same_place = match (&self.problem, &self.problem_mark) {
                (Some(_), Some(problem_mark)) => context_mark == problem_mark,
                _ => false,
            };
            if !same_place {
                lines.push(context_mark.to_string());
            }
        }
        if let Some(problem) = &self.problem {
            lines.push(problem.clone());
        }
        if let Some(problem_mark) = &self.problem_mark {
            lines.push(problem_mark.to_string());
        }
        if let Some(note) = &self.note {
            lines.push(note.clone());
        }
        f.write_str(&lines.join("\n"))
    }
}

/// Represents all possible errors raised while loading or dumping YAML.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A disallowed character was found in the input.
    #[error("unacceptable character #x{code:04x}: {reason}\n  at position {offset}")]
    Reader {
        offset: usize,
        code: u32,
        reason: String,
    },

    /// The input bytes are not valid in the detected encoding.
    #[error("'{encoding}' codec can't decode byte #x{byte:02x}: {reason}\n  at position {offset}")]
    Decode {
        encoding: &'static str,
        offset: usize,
        byte: u8,
        reason: String,
    },

    #[error("{0}")]
    Scanner(MarkedError),

    #[error("{0}")]
    Parser(MarkedError),

    #[error("{0}")]
    Composer(MarkedError),

    #[error("{0}")]
    Constructor(MarkedError),

    #[error("{0}")]
    Representer(String),

    #[error("{0}")]
    Serializer(String),

    #[error("{0}")]
    Emitter(String),

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Custom error raised through the serde bridge
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Creates a scanner error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_yamlet::{Error, Mark};
    ///
    /// let err = Error::scanner(
    ///     Some("while scanning a simple key"),
    ///     Some(Mark::new(0, 0, 0)),
    ///     "could not find expected ':'",
    ///     Mark::new(1, 0, 10),
    /// );
    /// assert!(err.to_string().contains("could not find expected ':'"));
    /// ```
    pub fn scanner(
        context: Option<&str>,
        context_mark: Option<Mark>,
        problem: impl Into<String>,
        problem_mark: Mark,
    ) -> Self {
        Error::Scanner(MarkedError::new(context, context_mark, problem, problem_mark))
    }

    /// Creates a parser error.
    pub fn parser(
        context: Option<&str>,
        context_mark: Option<Mark>,
        problem: impl Into<String>,
        problem_mark: Mark,
    ) -> Self {
        Error::Parser(MarkedError::new(context, context_mark, problem, problem_mark))
    }

    /// Creates a composer error.
    pub fn composer(
        context: Option<&str>,
        context_mark: Option<Mark>,
        problem: impl Into<String>,
        problem_mark: Mark,
    ) -> Self {
        Error::Composer(MarkedError::new(context, context_mark, problem, problem_mark))
    }

    /// Creates a constructor error.
    pub fn constructor(
        context: Option<&str>,
        context_mark: Option<Mark>,
        problem: impl Into<String>,
        problem_mark: Mark,
    ) -> Self {
        Error::Constructor(MarkedError::new(context, context_mark, problem, problem_mark))
    }

    pub fn representer<T: fmt::Display>(msg: T) -> Self {
        Error::Representer(msg.to_string())
    }

    pub fn serializer<T: fmt::Display>(msg: T) -> Self {
        Error::Serializer(msg.to_string())
    }

    pub fn emitter<T: fmt::Display>(msg: T) -> Self {
        Error::Emitter(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_yamlet::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the positioned diagnostic for input-side errors.
    #[must_use]
    pub fn marked(&self) -> Option<&MarkedError> {
        match self {
            Error::Scanner(e) | Error::Parser(e) | Error::Composer(e) | Error::Constructor(e) => {
                Some(e)
            }
            _ => None,
        }
    }

    /// Returns the mark of the problem, if the error has one.
    #[must_use]
    pub fn problem_mark(&self) -> Option<&Mark> {
        self.marked().and_then(|e| e.problem_mark.as_ref())
    }

    #[inline]
    #[must_use]
    pub const fn is_reader(&self) -> bool {
        matches!(self, Error::Reader { .. } | Error::Decode { .. })
    }

    #[inline]
    #[must_use]
    pub const fn is_scanner(&self) -> bool {
        matches!(self, Error::Scanner(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_parser(&self) -> bool {
        matches!(self, Error::Parser(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_composer(&self) -> bool {
        matches!(self, Error::Composer(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_constructor(&self) -> bool {
        matches!(self, Error::Constructor(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_representer(&self) -> bool {
        matches!(self, Error::Representer(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_serializer(&self) -> bool {
        matches!(self, Error::Serializer(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_emitter(&self) -> bool {
        matches!(self, Error::Emitter(_))
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
