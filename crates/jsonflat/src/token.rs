//! The binary token-stream grammar.
//!
//! A token stream is a sequence of little-endian records, one tag byte
//! followed by a payload:
//!
//! | tag | name        | payload                                          |
//! |-----|-------------|--------------------------------------------------|
//! | 0   | Null        | none                                             |
//! | 1   | Bool        | `u8` ∈ {0, 1}                                    |
//! | 2   | Int         | `i64`                                            |
//! | 3   | Double      | `f64`, `u32` raw length, raw source bytes        |
//! | 4   | String      | `u32` length, unescaped UTF-8                    |
//! | 5   | ArrayStart  | `u32` element count                              |
//! | 6   | ArrayEnd    | none                                             |
//! | 7   | ObjectStart | `u32` pair count                                 |
//! | 8   | ObjectEnd   | none                                             |
//!
//! Object bodies interleave a `String` record (the key) with the value record
//! for each pair, in source order. A `Double`'s raw bytes are the number's
//! original source text trimmed to the longest prefix of `[0-9+\-.eE]`; a raw
//! length of zero means no source text was available. The stream is
//! self-delimiting: every `ArrayStart`/`ObjectStart` is matched by exactly one
//! `ArrayEnd`/`ObjectEnd` at the same nesting level.

use crate::error::{Error, Result};

pub const TAG_NULL: u8 = 0;
pub const TAG_BOOL: u8 = 1;
pub const TAG_INT: u8 = 2;
pub const TAG_DOUBLE: u8 = 3;
pub const TAG_STRING: u8 = 4;
pub const TAG_ARRAY_START: u8 = 5;
pub const TAG_ARRAY_END: u8 = 6;
pub const TAG_OBJECT_START: u8 = 7;
pub const TAG_OBJECT_END: u8 = 8;

/// Is `b` a byte that may appear in a JSON number token?
#[inline]
pub(crate) fn is_number_byte(b: u8) -> bool {
    b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E')
}

/// Trim a raw number token to the longest prefix of valid number bytes.
///
/// Source slices taken by the lazy parser may include trailing punctuation.
pub(crate) fn trim_raw_number(raw: &str) -> &str {
    let end = raw
        .bytes()
        .position(|b| !is_number_byte(b))
        .unwrap_or(raw.len());
    &raw[..end]
}

/// Forward-only writer for the token grammar.
///
/// Container counts can be emitted directly when known up front, or reserved
/// with the `*_deferred` variants and rewritten via [`patch_u32`] on close.
/// The output is written strictly forward; patching rewrites the reserved
/// four bytes in place without re-reading anything.
///
/// [`patch_u32`]: TokenWriter::patch_u32
#[derive(Debug, Default)]
pub(crate) struct TokenWriter {
    out: Vec<u8>,
}

impl TokenWriter {
    pub(crate) fn with_capacity(cap: usize) -> Self {
        Self {
            out: Vec::with_capacity(cap),
        }
    }

    pub(crate) fn into_vec(self) -> Vec<u8> {
        self.out
    }

    #[inline]
    fn put_u32(&mut self, v: u32) {
        self.out.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn null(&mut self) {
        self.out.push(TAG_NULL);
    }

    pub(crate) fn bool(&mut self, v: bool) {
        self.out.push(TAG_BOOL);
        self.out.push(u8::from(v));
    }

    pub(crate) fn int(&mut self, v: i64) {
        self.out.push(TAG_INT);
        self.out.extend_from_slice(&v.to_le_bytes());
    }

    /// Emit a `Double` record carrying the trimmed raw source text.
    pub(crate) fn double_raw(&mut self, v: f64, raw: &str) {
        let raw = trim_raw_number(raw);
        self.out.push(TAG_DOUBLE);
        self.out.extend_from_slice(&v.to_le_bytes());
        self.put_u32(raw.len() as u32);
        self.out.extend_from_slice(raw.as_bytes());
    }

    pub(crate) fn string(&mut self, s: &str) {
        self.out.push(TAG_STRING);
        self.put_u32(s.len() as u32);
        self.out.extend_from_slice(s.as_bytes());
    }

    pub(crate) fn array_start(&mut self, count: u32) {
        self.out.push(TAG_ARRAY_START);
        self.put_u32(count);
    }

    /// Emit `ArrayStart` with a placeholder count; returns the patch position.
    pub(crate) fn array_start_deferred(&mut self) -> usize {
        self.out.push(TAG_ARRAY_START);
        let pos = self.out.len();
        self.put_u32(0);
        pos
    }

    pub(crate) fn array_end(&mut self) {
        self.out.push(TAG_ARRAY_END);
    }

    pub(crate) fn object_start(&mut self, count: u32) {
        self.out.push(TAG_OBJECT_START);
        self.put_u32(count);
    }

    /// Emit `ObjectStart` with a placeholder count; returns the patch position.
    pub(crate) fn object_start_deferred(&mut self) -> usize {
        self.out.push(TAG_OBJECT_START);
        let pos = self.out.len();
        self.put_u32(0);
        pos
    }

    pub(crate) fn object_end(&mut self) {
        self.out.push(TAG_OBJECT_END);
    }

    pub(crate) fn patch_u32(&mut self, pos: usize, v: u32) {
        self.out[pos..pos + 4].copy_from_slice(&v.to_le_bytes());
    }
}

/// One decoded token-stream record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'a> {
    Null,
    Bool(bool),
    Int(i64),
    /// Double value plus its raw source text; `raw` is empty when the source
    /// text was unavailable.
    Double { value: f64, raw: &'a str },
    String(&'a str),
    ArrayStart(u32),
    ArrayEnd,
    ObjectStart(u32),
    ObjectEnd,
}

/// Checked decoder for token streams.
///
/// Consumers reconstruct documents from the stream without trusting the
/// producer's memory: truncated payloads, unknown tags, and non-UTF-8 string
/// bytes are reported instead of read out of bounds.
///
/// # Examples
///
/// ```rust
/// use jsonflat::{flatten, pad_buffer, Token, TokenReader};
///
/// let buf = pad_buffer(b"[true]");
/// let stream = flatten(&buf, 6).unwrap();
/// let tokens: Vec<_> = TokenReader::new(&stream).map(|t| t.unwrap()).collect();
/// assert_eq!(
///     tokens,
///     vec![Token::ArrayStart(1), Token::Bool(true), Token::ArrayEnd]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct TokenReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> TokenReader<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Whether the reader has consumed the whole stream.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or(Error::Internal("truncated token stream"))?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes(b.try_into().expect("4-byte slice")))
    }

    fn take_str(&mut self) -> Result<&'a str> {
        let len = self.take_u32()? as usize;
        let bytes = self.take(len)?;
        core::str::from_utf8(bytes).map_err(|_| Error::Internal("non-utf8 bytes in token stream"))
    }

    /// Decode the next record.
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        let tag = self.take(1)?[0];
        match tag {
            TAG_NULL => Ok(Token::Null),
            TAG_BOOL => Ok(Token::Bool(self.take(1)?[0] != 0)),
            TAG_INT => {
                let b = self.take(8)?;
                Ok(Token::Int(i64::from_le_bytes(b.try_into().expect("8-byte slice"))))
            }
            TAG_DOUBLE => {
                let b = self.take(8)?;
                let value = f64::from_le_bytes(b.try_into().expect("8-byte slice"));
                let raw = self.take_str()?;
                Ok(Token::Double { value, raw })
            }
            TAG_STRING => Ok(Token::String(self.take_str()?)),
            TAG_ARRAY_START => Ok(Token::ArrayStart(self.take_u32()?)),
            TAG_ARRAY_END => Ok(Token::ArrayEnd),
            TAG_OBJECT_START => Ok(Token::ObjectStart(self.take_u32()?)),
            TAG_OBJECT_END => Ok(Token::ObjectEnd),
            _ => Err(Error::Internal("unknown token tag")),
        }
    }
}

impl<'a> Iterator for TokenReader<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.at_end() {
            return None;
        }
        let token = self.next_token();
        if token.is_err() {
            // A corrupt record leaves the position unusable; end iteration
            // after reporting it once.
            self.pos = self.buf.len();
        }
        Some(token)
    }
}
