//! # Errors
//!
//! A single error type threads every stage of the pipeline: lexing,
//! parsing, and transpilation. Compilation is all-or-nothing — the first
//! error encountered aborts the run, so there is no diagnostic list to
//! accumulate across stages the way a recovering compiler would.

use thiserror::Error;

/// A source location, carried by every token and AST node for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: usize,
}

impl Span {
    pub fn new(line: usize) -> Self {
        Self { line }
    }
}

/// The closed set of ways a compilation can fail.
///
/// Lexical, syntactic, and semantic errors each carry the offending span;
/// I/O failures wrap the underlying `std::io::Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // Lex errors
    IllegalCharacter,
    UnterminatedString,
    InvalidEscape,
    ReservedCommentSyntax,

    // Parse errors
    UnexpectedToken,
    MissingSemicolon,
    MissingClosingParen,
    ExpectedIdentifier,
    ExpectedAssign,
    NoPrefixParseFn,

    // Semantic errors
    Redeclaration,
    UndeclaredAssignment,
    TypeMismatch,
    UnsupportedOperand,
    BreakOutsideLoop,
    ContinueOutsideLoop,
    CallToNonBuiltin,
    UnknownIdentifier,
    UnsupportedLogArgument,
}

/// The crate-wide error type.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("error (line {line}): {message}", line = span.line)]
    Lex {
        kind: ErrorKind,
        message: String,
        span: Span,
    },

    #[error("error (line {line}): {message}", line = span.line)]
    Parse {
        kind: ErrorKind,
        message: String,
        span: Span,
    },

    #[error("error (line {line}): {message}", line = span.line)]
    Semantic {
        kind: ErrorKind,
        message: String,
        span: Span,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn lex(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self::Lex {
            kind,
            message: message.into(),
            span,
        }
    }

    pub fn parse(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self::Parse {
            kind,
            message: message.into(),
            span,
        }
    }

    pub fn semantic(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self::Semantic {
            kind,
            message: message.into(),
            span,
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Lex { kind, .. } | Self::Parse { kind, .. } | Self::Semantic { kind, .. } => {
                Some(*kind)
            }
            Self::Io(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display() {
        let err = CompileError::lex(ErrorKind::IllegalCharacter, "unexpected '@'", Span::new(3));
        assert_eq!(err.to_string(), "error (line 3): unexpected '@'");
    }

    #[test]
    fn semantic_error_display() {
        let err =
            CompileError::semantic(ErrorKind::Redeclaration, "'x' already declared", Span::new(1));
        assert_eq!(err.to_string(), "error (line 1): 'x' already declared");
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CompileError = io_err.into();
        assert!(matches!(err, CompileError::Io(_)));
    }

    #[test]
    fn kind_roundtrips_through_constructor() {
        let err = CompileError::parse(ErrorKind::MissingSemicolon, "expected ';'", Span::new(2));
        assert_eq!(err.kind(), Some(ErrorKind::MissingSemicolon));
    }
}
