//! Error types for cfxml

use std::fmt;
use std::io;
use thiserror::Error;

/// Position in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Span representing a range in source text
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
        Self {
            start: pos,
            end: pos,
        }
    }

    pub const fn empty() -> Self {
        Self {
            start: Pos::new(0, 0, 0),
            end: Pos::new(0, 0, 0),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.start.line == 0 && self.end.line == 0
    }
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Referenced file, element or property is absent
    NotFound { what: String },
    /// Entity to be created already exists
    Conflict { what: String },
    /// Caller-supplied value failed a closed-set check
    Validation,
    /// Filesystem failure other than a missing path
    Io { kind: io::ErrorKind },
    UnexpectedToken,
    MismatchedTag { expected: String, found: String },
    Unterminated { what: &'static str },
    InvalidEntity,
    DuplicateAttribute { name: String },
    InvalidUtf8,
    UnexpectedRoot { expected: String, found: String },
    MaxDepthExceeded { max: u16 },
    MaxSizeExceeded { max: usize },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { what } => write!(f, "not found: {what}"),
            Self::Conflict { what } => write!(f, "already exists: {what}"),
            Self::Validation => write!(f, "invalid value"),
            Self::Io { kind } => write!(f, "io error: {kind}"),
            Self::UnexpectedToken => write!(f, "unexpected token"),
            Self::MismatchedTag { expected, found } => {
                write!(f, "mismatched closing tag: expected </{expected}>, found </{found}>")
            }
            Self::Unterminated { what } => write!(f, "unterminated {what}"),
            Self::InvalidEntity => write!(f, "invalid xml entity"),
            Self::DuplicateAttribute { name } => write!(f, "duplicate attribute: {name}"),
            Self::InvalidUtf8 => write!(f, "invalid utf-8"),
            Self::UnexpectedRoot { expected, found } => {
                write!(f, "expected <{expected}> root element, got <{found}>")
            }
            Self::MaxDepthExceeded { max } => write!(f, "max depth exceeded: {max}"),
            Self::MaxSizeExceeded { max } => write!(f, "max size exceeded: {max}"),
        }
    }
}

/// Main error type for cfxml
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

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create error at specific position
    pub fn at(kind: ErrorKind, pos: Pos) -> Self {
        Self::new(kind, Span::at(pos))
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound { what: what.into() }, Span::empty())
    }

    pub fn conflict(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict { what: what.into() }, Span::empty())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::Validation, Span::empty(), message)
    }

    pub fn io(err: &io::Error, path: &std::path::Path) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            return Self::not_found(path.display().to_string());
        }
        Self::with_message(
            ErrorKind::Io { kind: err.kind() },
            Span::empty(),
            format!("{}: {err}", path.display()),
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self.kind, ErrorKind::Conflict { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation)
    }

    /// Malformed input, or input that does not have the expected root/section shape
    pub fn is_parse(&self) -> bool {
        !matches!(
            self.kind,
            ErrorKind::NotFound { .. }
                | ErrorKind::Conflict { .. }
                | ErrorKind::Validation
                | ErrorKind::Io { .. }
        )
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

/// Result type alias for cfxml
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_display() {
        let pos = Pos::new(42, 10, 5);
        assert_eq!(pos.to_string(), "10:5");
    }

    #[test]
    fn test_parse_error_display() {
        let err = Error::at(ErrorKind::InvalidEntity, Pos::new(10, 2, 5));
        let display = err.to_string();
        assert!(display.contains("error at 2:5"));
        assert!(display.contains("invalid xml entity"));
        assert!(err.is_parse());
    }

    #[test]
    fn test_categories() {
        assert!(Error::not_found("Form.xml").is_not_found());
        assert!(Error::conflict("Form A").is_conflict());
        assert!(Error::validation("bad purpose").is_validation());
        assert!(!Error::validation("bad purpose").is_parse());
        assert_eq!(Error::validation("bad purpose").to_string(), "bad purpose");
    }

    #[test]
    fn test_missing_file_maps_to_not_found() {
        let err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let mapped = Error::io(&err, std::path::Path::new("a.xml"));
        assert_eq!(
            mapped.kind(),
            &ErrorKind::NotFound {
                what: "a.xml".to_string()
            }
        );
    }
}
