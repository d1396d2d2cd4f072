//! Error surface shared by every parse operation.
//!
//! Errors fall into three classes. *Parser errors* carry a stable positive
//! [`code`](Error::code) and mean the input was rejected: bit-level invalid
//! JSON, numbers outside parser capability, nesting past the depth limit.
//! *Engine-internal errors* ([`Error::Internal`]) report checks that should
//! never fire; their code is `-1`. The third class, the fast-path *soft
//! miss*, is not an error at all: operators that cannot answer a query shape
//! return `Ok(None)`, and callers that need a numeric spelling use
//! [`SOFT_MISS`]. The three never overlap.

use thiserror::Error;

use crate::MAX_DEPTH;

/// Numeric code reserved for the fast-path soft miss.
///
/// A soft miss means "this fast path cannot answer the query shape; re-run
/// through the full flatten-and-evaluate pipeline". It is surfaced as
/// `Ok(None)` by the query operators and must never be treated as a parser
/// error or shown to end users.
pub const SOFT_MISS: i32 = -2;

/// Alias for `Result` with this crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Any failure reported by a parse operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A structural byte was wrong or missing.
    #[error("syntax error at byte {at}")]
    Syntax { at: usize },

    /// The tape parser rejected the document.
    #[error(transparent)]
    Tape(#[from] simd_json::Error),

    /// A string contained invalid UTF-8.
    #[error("invalid utf-8 in string at byte {at}")]
    Utf8 { at: usize },

    /// A string literal was unterminated, contained an unescaped control
    /// character, or carried a malformed escape sequence.
    #[error("invalid string literal at byte {at}")]
    InvalidString { at: usize },

    /// A number token violated the JSON grammar or overflowed the double
    /// range.
    #[error("invalid number at byte {at}")]
    InvalidNumber { at: usize },

    /// Containers nested deeper than [`MAX_DEPTH`](crate::MAX_DEPTH).
    #[error("nesting exceeds {MAX_DEPTH} levels")]
    DepthLimit,

    /// The buffer held no JSON content.
    #[error("input is empty")]
    EmptyInput,

    /// Bytes other than whitespace followed the document.
    #[error("trailing content at byte {at}")]
    TrailingContent { at: usize },

    /// A requested top-level field was absent.
    #[error("field not found: {0:?}")]
    FieldNotFound(String),

    /// A field held a value of a different type than requested.
    #[error("incorrect type: expected {expected}")]
    IncorrectType { expected: &'static str },

    /// An internal consistency check caught an engine bug; never caused by
    /// input.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl Error {
    /// Stable numeric code for this error.
    ///
    /// Positive codes identify parser errors; `-1` is an engine-internal
    /// failure. `0` (success) and [`SOFT_MISS`] never appear here.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Error::Syntax { .. } | Error::Tape(_) => 1,
            Error::Utf8 { .. } => 2,
            Error::InvalidString { .. } => 3,
            Error::InvalidNumber { .. } => 4,
            Error::DepthLimit => 5,
            Error::EmptyInput => 6,
            Error::TrailingContent { .. } => 7,
            Error::FieldNotFound(_) => 8,
            Error::IncorrectType { .. } => 9,
            Error::Internal(_) => -1,
        }
    }
}
