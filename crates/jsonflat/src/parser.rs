//! The parser handle and tape-backed documents.
//!
//! [`Parser`] bundles the SIMD tape parser with a reusable scratch buffer.
//! Tape parsing unescapes strings in place, so the handle copies the input
//! into its scratch first; the caller's buffer stays pristine, which is what
//! lets the flattener walk a byte cursor over the original source in lockstep
//! with the tape.
//!
//! A [`Document`] borrows the handle mutably. That borrow is the lifecycle
//! rule from the module docs made concrete: slices handed out by a document
//! point into the handle's scratch, and the borrow checker refuses the next
//! `parse` call while any of them are alive. Two handles on two threads need
//! no coordination; one handle is single-file.

use simd_json::value::tape::{Node, Tape};
use simd_json::StaticNode;

use crate::error::{Error, Result};
use crate::padding::assert_padded;

/// Reusable parse handle.
///
/// Create once, feed many documents. Dropping it releases the scratch.
///
/// # Examples
///
/// ```rust
/// use jsonflat::{pad_buffer, JsonType, Parser};
///
/// let json = br#"{"name": "alice", "age": 30}"#;
/// let buf = pad_buffer(json);
/// let mut parser = Parser::new();
/// let doc = parser.parse(&buf, json.len()).unwrap();
/// assert_eq!(doc.json_type(), JsonType::Object);
/// assert_eq!(doc.find_field_str("name").unwrap(), "alice");
/// ```
#[derive(Debug, Default)]
pub struct Parser {
    scratch: Vec<u8>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scratch: Vec::new(),
        }
    }

    /// Run the tape parser over a scratch copy of `buf[..json_len]`.
    pub(crate) fn tape<'a>(&'a mut self, buf: &[u8], json_len: usize) -> Result<Tape<'a>> {
        self.scratch.clear();
        self.scratch.extend_from_slice(&buf[..json_len]);
        Ok(simd_json::to_tape(self.scratch.as_mut_slice())?)
    }

    /// Parse a document with the tape flavor.
    ///
    /// The returned [`Document`] borrows this handle; it must be dropped
    /// before the next parse. `buf` must obey the padded-buffer contract for
    /// `json_len`.
    pub fn parse<'a>(&'a mut self, buf: &[u8], json_len: usize) -> Result<Document<'a>> {
        assert_padded(buf, json_len);
        let tape = self.tape(buf, json_len)?;
        Ok(Document { tape })
    }
}

/// JSON value types as reported by the parse front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    Array,
    Object,
    Number,
    String,
    Boolean,
    Null,
}

/// A parsed document: an indexed tape with strings already unescaped.
///
/// Field lookups are resolved against the tape without re-parsing. Returned
/// string slices stay valid for as long as the document (and therefore the
/// handle borrow) lives.
pub struct Document<'a> {
    tape: Tape<'a>,
}

impl<'a> Document<'a> {
    pub(crate) fn nodes(&self) -> &[Node<'a>] {
        &self.tape.0
    }

    /// Type of the document root.
    #[must_use]
    pub fn json_type(&self) -> JsonType {
        match self.nodes().first() {
            Some(Node::Object { .. }) => JsonType::Object,
            Some(Node::Array { .. }) => JsonType::Array,
            Some(Node::String(_)) => JsonType::String,
            Some(Node::Static(StaticNode::Bool(_))) => JsonType::Boolean,
            Some(Node::Static(StaticNode::Null)) | None => JsonType::Null,
            Some(Node::Static(_)) => JsonType::Number,
        }
    }

    fn field_node(&self, key: &str) -> Result<&Node<'a>> {
        match self.nodes().first() {
            Some(Node::Object { .. }) => {}
            _ => {
                return Err(Error::IncorrectType {
                    expected: "object",
                })
            }
        }
        let idx = find_key(self.nodes(), 0, key)
            .ok_or_else(|| Error::FieldNotFound(key.to_string()))?;
        self.nodes()
            .get(idx)
            .ok_or(Error::Internal("field index out of tape bounds"))
    }

    /// Unescaped string value of a top-level field.
    pub fn find_field_str(&self, key: &str) -> Result<&'a str> {
        match self.field_node(key)? {
            Node::String(s) => Ok(*s),
            _ => Err(Error::IncorrectType { expected: "string" }),
        }
    }

    /// Signed 64-bit value of a top-level field.
    pub fn find_field_i64(&self, key: &str) -> Result<i64> {
        match self.field_node(key)? {
            Node::Static(StaticNode::I64(v)) => Ok(*v),
            Node::Static(StaticNode::U64(u)) => i64::try_from(*u).map_err(|_| {
                Error::IncorrectType {
                    expected: "signed integer",
                }
            }),
            _ => Err(Error::IncorrectType {
                expected: "integer",
            }),
        }
    }

    /// Double value of a top-level field; integers widen losslessly where
    /// they can.
    #[allow(clippy::cast_precision_loss)]
    pub fn find_field_f64(&self, key: &str) -> Result<f64> {
        match self.field_node(key)? {
            Node::Static(StaticNode::F64(v)) => Ok(*v),
            Node::Static(StaticNode::I64(v)) => Ok(*v as f64),
            Node::Static(StaticNode::U64(u)) => Ok(*u as f64),
            _ => Err(Error::IncorrectType { expected: "number" }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tape navigation
// ---------------------------------------------------------------------------

/// Index one past the subtree rooted at `idx`.
///
/// Iterative on purpose: the tape parser accepts documents nested deeper than
/// the walkers do, and sibling-skipping must not recurse into them.
pub(crate) fn skip_node(nodes: &[Node], idx: usize) -> usize {
    let mut i = idx;
    let mut remaining = 1usize;
    while remaining > 0 && i < nodes.len() {
        remaining -= 1;
        match &nodes[i] {
            // Each pair contributes a key node and a value subtree.
            Node::Object { len, .. } => remaining += 2 * len,
            Node::Array { len, .. } => remaining += len,
            _ => {}
        }
        i += 1;
    }
    i
}

/// Find `key` in the object node at `obj_idx`; returns the value's index.
pub(crate) fn find_key(nodes: &[Node], obj_idx: usize, key: &str) -> Option<usize> {
    let len = match nodes.get(obj_idx)? {
        Node::Object { len, .. } => *len,
        _ => return None,
    };
    let mut i = obj_idx + 1;
    for _ in 0..len {
        let k = match nodes.get(i)? {
            Node::String(s) => *s,
            _ => return None,
        };
        i += 1;
        if k == key {
            return Some(i);
        }
        i = skip_node(nodes, i);
    }
    None
}

/// Walk a field chain from `idx`; `None` is the soft miss (non-object on the
/// way, or a missing key).
pub(crate) fn navigate_from(nodes: &[Node], idx: usize, chain: &[&str]) -> Option<usize> {
    let mut i = idx;
    for key in chain {
        i = find_key(nodes, i, key)?;
    }
    Some(i)
}

/// Walk a field chain from the document root.
pub(crate) fn navigate(nodes: &[Node], chain: &[&str]) -> Option<usize> {
    navigate_from(nodes, 0, chain)
}
