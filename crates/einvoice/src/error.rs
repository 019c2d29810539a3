//! Error types for einvoice

use std::fmt;
use thiserror::Error;

/// Position in the source document
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Range in the source document
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    pub const fn at(pos: Pos) -> Self {
        Self::new(pos, pos)
    }

    pub const fn empty() -> Self {
        Self::at(Pos::new(0, 0, 0))
    }

    const fn is_empty(&self) -> bool {
        self.start.offset == 0 && self.start.line == 0
    }
}

/// Error categories raised by the library
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input ended inside markup
    UnexpectedEof,
    /// Byte sequence that is not valid XML at this point
    InvalidToken,
    /// Closing tag does not match the open element
    MismatchedTag { open: String, close: String },
    /// Attribute repeated on the same element
    DuplicateAttribute { name: String },
    /// Unknown or malformed character entity
    InvalidEntity,
    /// Document is not valid UTF-8
    InvalidUtf8,
    /// Element cannot be interpreted as an invoice structure
    /// (wrong shape or mixed text/element content)
    MalformedInput,
    /// The expected envelope element is absent from the document
    EnvelopeNotFound { tag: String },
    /// Failure reported by a document source
    Source,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::InvalidToken => write!(f, "invalid token"),
            Self::MismatchedTag { open, close } => {
                write!(f, "mismatched closing tag: expected </{open}>, found </{close}>")
            }
            Self::DuplicateAttribute { name } => write!(f, "duplicate attribute: {name}"),
            Self::InvalidEntity => write!(f, "invalid character entity"),
            Self::InvalidUtf8 => write!(f, "input is not valid utf-8"),
            Self::MalformedInput => write!(f, "malformed invoice element"),
            Self::EnvelopeNotFound { tag } => write!(f, "envelope element <{tag}> not found"),
            Self::Source => write!(f, "document source error"),
        }
    }
}

/// Main error type for einvoice
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            span,
            message,
        }
    }

    pub fn with_message(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    /// Error at a specific document position
    pub fn at(kind: ErrorKind, pos: Pos) -> Self {
        Self::new(kind, Span::at(pos))
    }

    /// The element is well-formed XML but cannot be converted to a mapping
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::MalformedInput, Span::empty(), message)
    }

    /// The locator could not find the envelope element
    pub fn envelope_not_found(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self::new(ErrorKind::EnvelopeNotFound { tag }, Span::empty())
    }

    /// Failure surfaced by a [`DocumentSource`](crate::source::DocumentSource)
    pub fn source(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::Source, Span::empty(), message)
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "error at {}: {}", self.span.start, self.message)
        }
    }
}

/// Result type alias for einvoice
pub type Result<T> = std::result::Result<T, Error>;
