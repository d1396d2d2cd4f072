//! A JSON ingestion engine for buffered documents.
//!
//! `jsonflat` turns raw JSON bytes into two kinds of output for a downstream
//! evaluator:
//!
//! - a flat, self-delimiting **binary token stream** that losslessly encodes
//!   an arbitrary document, including the raw source text of every number
//!   (so `75.80` round-trips as `75.80`, not `75.8`), and
//! - a family of **fast-path extractors** (nested field lookup, raw-slice
//!   return, `length`, `keys`, `has`, `type`, and array-map variants) that
//!   parse once and answer narrow queries without materializing tokens.
//!
//! Input buffers follow a padded-buffer contract: the JSON content must be
//! followed by at least [`PADDING`] readable zero bytes. [`pad_buffer`]
//! produces a conforming copy of an arbitrary slice.
//!
//! # Examples
//!
//! ```rust
//! use jsonflat::{pad_buffer, Parser, Token, TokenReader};
//!
//! let json = br#"{"a":1}"#;
//! let buf = pad_buffer(json);
//! let mut parser = Parser::new();
//! let stream = parser.flatten(&buf, json.len()).unwrap();
//!
//! let tokens: Vec<_> = TokenReader::new(&stream).map(|t| t.unwrap()).collect();
//! assert_eq!(
//!     tokens,
//!     vec![
//!         Token::ObjectStart(1),
//!         Token::String("a"),
//!         Token::Int(1),
//!         Token::ObjectEnd,
//!     ]
//! );
//! ```

mod error;
mod flatten;
mod ndjson;
mod ondemand;
mod padding;
mod parser;
mod query;
mod serialize;
mod token;

pub use error::{Error, Result, SOFT_MISS};
pub use flatten::flatten;
pub use ndjson::{is_ndjson, split_batches};
pub use padding::{pad_buffer, PADDING};
pub use parser::{Document, JsonType, Parser};
pub use query::{find_field_raw, find_fields_raw, MapFraming, MapOp};
pub use serialize::minify;
pub use token::{
    Token, TokenReader, TAG_ARRAY_END, TAG_ARRAY_START, TAG_BOOL, TAG_DOUBLE, TAG_INT, TAG_NULL,
    TAG_OBJECT_END, TAG_OBJECT_START, TAG_STRING,
};

/// Maximum container nesting depth accepted by every parse operation.
///
/// Documents nested deeper fail with a depth error and produce no output.
pub const MAX_DEPTH: usize = 1024;

#[cfg(test)]
mod tests;
