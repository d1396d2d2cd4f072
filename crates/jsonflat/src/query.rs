//! Fast-path query operators.
//!
//! Materializing a full token stream for a 200 MB document only to read
//! three fields is wasteful. When a query is a bounded-shape navigation (a
//! field chain plus one of the operators here), the engine answers straight
//! from a single parse and returns an owned serialized fragment.
//!
//! Navigation is uniform: starting at the root, every chain element requires
//! the current node to be an object and descends into the named key. A
//! non-object or a missing key is a **soft miss**; each operator documents
//! how it spells one. Operators that cannot answer a shape at all return
//! `Ok(None)`; the caller must re-run the query through the full
//! flatten-and-evaluate pipeline, never surface it as an error.
//!
//! [`find_field_raw`] and [`find_fields_raw`] use the lazy parser because
//! they must preserve the source bytes (number spellings included). The
//! remaining operators work off the validated tape.

use simd_json::value::tape::Node;
use simd_json::StaticNode;

use crate::error::{Error, Result};
use crate::ondemand::Cursor;
use crate::padding::assert_padded;
use crate::parser::{find_key, navigate, navigate_from, skip_node, Parser};
use crate::serialize::{write_escaped_str, write_tape_value, write_usize};

/// Output framing for the array-map operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapFraming {
    /// Wrap results in a JSON array: `[v1,v2,…]`.
    Array,
    /// One result per line, newline-separated.
    Lines,
}

/// Builtin applied per element by [`Parser::array_map_builtin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapOp<'a> {
    /// Container size, string byte length; a null element prints `null`.
    Length,
    /// Object keys or array indices as a JSON array.
    Keys {
        /// Byte-wise lexical sort instead of insertion order.
        sorted: bool,
    },
    /// The element's JSON type name as a JSON string.
    Type,
    /// Whether an object element contains the given key.
    Has(&'a str),
}

/// Return the raw JSON text of the subtree addressed by `chain`.
///
/// The source bytes come back untouched: number formatting, key order, and
/// inner whitespace survive (trailing whitespace and commas are trimmed). A
/// soft miss returns the literal four bytes `null`.
///
/// # Examples
///
/// ```rust
/// use jsonflat::{find_field_raw, pad_buffer};
///
/// let json = br#"{"x":{"y":42}}"#;
/// let buf = pad_buffer(json);
/// assert_eq!(find_field_raw(&buf, json.len(), &["x", "y"]).unwrap(), b"42");
/// assert_eq!(find_field_raw(&buf, json.len(), &["gone"]).unwrap(), b"null");
/// ```
pub fn find_field_raw(buf: &[u8], json_len: usize, chain: &[&str]) -> Result<Vec<u8>> {
    assert_padded(buf, json_len);
    let mut cur = Cursor::new(buf, json_len);
    cur.skip_ws();
    if cur.at_end() {
        return Err(Error::EmptyInput);
    }
    for key in chain {
        if !cur.descend(key)? {
            return Ok(b"null".to_vec());
        }
    }
    let (start, end) = cur.skip_value()?;
    Ok(trim_raw_fragment(&buf[start..end]).to_vec())
}

/// Batch form of [`find_field_raw`]: one result per chain, in order.
///
/// Misses come back as `null` fragments; a parse error fails the whole call.
pub fn find_fields_raw(buf: &[u8], json_len: usize, chains: &[&[&str]]) -> Result<Vec<Vec<u8>>> {
    chains
        .iter()
        .map(|chain| find_field_raw(buf, json_len, chain))
        .collect()
}

/// Trim trailing whitespace and commas from a raw value slice.
fn trim_raw_fragment(mut raw: &[u8]) -> &[u8] {
    while let [rest @ .., last] = raw {
        if matches!(*last, b' ' | b'\t' | b'\n' | b'\r' | b',') {
            raw = rest;
        } else {
            break;
        }
    }
    raw
}

impl Parser {
    /// Length of the addressed node as a decimal-ASCII fragment.
    ///
    /// Objects count pairs, arrays count elements, strings count unescaped
    /// bytes, and null counts zero. A chain soft miss also answers `0`.
    /// Other scalars cannot answer and return `Ok(None)`.
    pub fn field_length(
        &mut self,
        buf: &[u8],
        json_len: usize,
        chain: &[&str],
    ) -> Result<Option<Vec<u8>>> {
        let doc = self.parse(buf, json_len)?;
        let nodes = doc.nodes();
        let Some(idx) = navigate(nodes, chain) else {
            return Ok(Some(b"0".to_vec()));
        };
        let n = match nodes.get(idx) {
            Some(Node::Object { len, .. }) | Some(Node::Array { len, .. }) => *len,
            Some(Node::String(s)) => s.len(),
            Some(Node::Static(StaticNode::Null)) => 0,
            _ => return Ok(None),
        };
        let mut out = Vec::new();
        write_usize(n, &mut out);
        Ok(Some(out))
    }

    /// Keys of the addressed node as a JSON array fragment.
    ///
    /// Objects yield their key strings (insertion order, or byte-wise sorted
    /// when `sorted` is set); arrays yield `[0,1,…,n-1]`. Anything else,
    /// null and chain soft misses included, returns `Ok(None)`.
    pub fn field_keys(
        &mut self,
        buf: &[u8],
        json_len: usize,
        chain: &[&str],
        sorted: bool,
    ) -> Result<Option<Vec<u8>>> {
        let doc = self.parse(buf, json_len)?;
        let nodes = doc.nodes();
        let Some(idx) = navigate(nodes, chain) else {
            return Ok(None);
        };
        let mut out = Vec::new();
        match nodes.get(idx) {
            Some(Node::Object { len, .. }) => {
                write_object_keys(nodes, idx, *len, sorted, &mut out);
            }
            Some(Node::Array { len, .. }) => write_index_array(*len, &mut out),
            _ => return Ok(None),
        }
        Ok(Some(out))
    }

    /// Whether the addressed node is an object containing `key`.
    ///
    /// Non-objects and chain soft misses return `Ok(None)`.
    pub fn field_has(
        &mut self,
        buf: &[u8],
        json_len: usize,
        chain: &[&str],
        key: &str,
    ) -> Result<Option<bool>> {
        let doc = self.parse(buf, json_len)?;
        let nodes = doc.nodes();
        let Some(idx) = navigate(nodes, chain) else {
            return Ok(None);
        };
        match nodes.get(idx) {
            Some(Node::Object { .. }) => Ok(Some(find_key(nodes, idx, key).is_some())),
            _ => Ok(None),
        }
    }

    /// For each element of the array addressed by `prefix`, serialize the
    /// subtree addressed by `chain` within that element.
    ///
    /// Null elements print `null`; a missing chain key prints `null`. An
    /// element that is neither null nor an object makes the whole call
    /// return `Ok(None)`; those shapes need the full evaluator.
    pub fn array_map_field(
        &mut self,
        buf: &[u8],
        json_len: usize,
        prefix: &[&str],
        chain: &[&str],
        framing: MapFraming,
    ) -> Result<Option<Vec<u8>>> {
        let doc = self.parse(buf, json_len)?;
        let nodes = doc.nodes();
        let Some((arr_idx, len)) = navigate_to_array(nodes, prefix) else {
            return Ok(None);
        };
        let mut out = Vec::with_capacity(json_len / 4 + 2);
        open(framing, &mut out);
        let mut i = arr_idx + 1;
        for k in 0..len {
            if k > 0 {
                separate(framing, &mut out);
            }
            let next = skip_node(nodes, i);
            match nodes.get(i) {
                Some(Node::Static(StaticNode::Null)) => out.extend_from_slice(b"null"),
                Some(Node::Object { .. }) => match navigate_from(nodes, i, chain) {
                    Some(v) => {
                        write_tape_value(nodes, v, 0, &mut out)?;
                    }
                    None => out.extend_from_slice(b"null"),
                },
                _ => return Ok(None),
            }
            i = next;
        }
        close(framing, &mut out);
        Ok(Some(out))
    }

    /// Like [`array_map_field`](Parser::array_map_field), but extracts
    /// several chains per element and emits one object per element.
    ///
    /// `keys` are emitted verbatim and must arrive pre-encoded (quoted and
    /// escaped), which spares re-escaping them once per element. Null
    /// elements produce an object with every value `null`.
    ///
    /// # Panics
    ///
    /// Panics if `keys` and `chains` differ in length.
    pub fn array_map_fields_obj(
        &mut self,
        buf: &[u8],
        json_len: usize,
        prefix: &[&str],
        keys: &[&str],
        chains: &[&[&str]],
        framing: MapFraming,
    ) -> Result<Option<Vec<u8>>> {
        assert_eq!(
            keys.len(),
            chains.len(),
            "one pre-encoded key per extraction chain"
        );
        let doc = self.parse(buf, json_len)?;
        let nodes = doc.nodes();
        let Some((arr_idx, len)) = navigate_to_array(nodes, prefix) else {
            return Ok(None);
        };
        let mut out = Vec::with_capacity(json_len / 4 + 2);
        open(framing, &mut out);
        let mut i = arr_idx + 1;
        for k in 0..len {
            if k > 0 {
                separate(framing, &mut out);
            }
            let next = skip_node(nodes, i);
            let is_null = matches!(nodes.get(i), Some(Node::Static(StaticNode::Null)));
            if !is_null && !matches!(nodes.get(i), Some(Node::Object { .. })) {
                return Ok(None);
            }
            out.push(b'{');
            for (f, (key, chain)) in keys.iter().zip(chains).enumerate() {
                if f > 0 {
                    out.push(b',');
                }
                out.extend_from_slice(key.as_bytes());
                out.push(b':');
                if is_null {
                    out.extend_from_slice(b"null");
                    continue;
                }
                match navigate_from(nodes, i, chain) {
                    Some(v) => {
                        write_tape_value(nodes, v, 0, &mut out)?;
                    }
                    None => out.extend_from_slice(b"null"),
                }
            }
            out.push(b'}');
            i = next;
        }
        close(framing, &mut out);
        Ok(Some(out))
    }

    /// Apply a builtin to each element of the array addressed by `prefix`.
    ///
    /// Per-element rules follow the scalar operators: shapes an operator
    /// cannot answer soft-miss the whole call with `Ok(None)`. `Type` answers
    /// every element.
    pub fn array_map_builtin(
        &mut self,
        buf: &[u8],
        json_len: usize,
        prefix: &[&str],
        op: MapOp<'_>,
        framing: MapFraming,
    ) -> Result<Option<Vec<u8>>> {
        let doc = self.parse(buf, json_len)?;
        let nodes = doc.nodes();
        let Some((arr_idx, len)) = navigate_to_array(nodes, prefix) else {
            return Ok(None);
        };
        let mut out = Vec::with_capacity(json_len / 8 + 2);
        open(framing, &mut out);
        let mut i = arr_idx + 1;
        for k in 0..len {
            if k > 0 {
                separate(framing, &mut out);
            }
            let next = skip_node(nodes, i);
            match op {
                MapOp::Length => match nodes.get(i) {
                    Some(Node::Object { len, .. }) | Some(Node::Array { len, .. }) => {
                        write_usize(*len, &mut out);
                    }
                    Some(Node::String(s)) => write_usize(s.len(), &mut out),
                    Some(Node::Static(StaticNode::Null)) => out.extend_from_slice(b"null"),
                    _ => return Ok(None),
                },
                MapOp::Keys { sorted } => match nodes.get(i) {
                    Some(Node::Object { len, .. }) => {
                        write_object_keys(nodes, i, *len, sorted, &mut out);
                    }
                    Some(Node::Array { len, .. }) => write_index_array(*len, &mut out),
                    _ => return Ok(None),
                },
                MapOp::Type => match nodes.get(i) {
                    Some(node) => out.extend_from_slice(type_name(node)),
                    None => return Err(Error::Internal("array walk ran past the node list")),
                },
                MapOp::Has(key) => match nodes.get(i) {
                    Some(Node::Object { .. }) => {
                        out.extend_from_slice(if find_key(nodes, i, key).is_some() {
                            b"true".as_slice()
                        } else {
                            b"false".as_slice()
                        });
                    }
                    _ => return Ok(None),
                },
            }
            i = next;
        }
        close(framing, &mut out);
        Ok(Some(out))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn navigate_to_array(nodes: &[Node], prefix: &[&str]) -> Option<(usize, usize)> {
    let idx = navigate(nodes, prefix)?;
    match nodes.get(idx)? {
        Node::Array { len, .. } => Some((idx, *len)),
        _ => None,
    }
}

fn open(framing: MapFraming, out: &mut Vec<u8>) {
    if framing == MapFraming::Array {
        out.push(b'[');
    }
}

fn separate(framing: MapFraming, out: &mut Vec<u8>) {
    out.push(match framing {
        MapFraming::Array => b',',
        MapFraming::Lines => b'\n',
    });
}

fn close(framing: MapFraming, out: &mut Vec<u8>) {
    if framing == MapFraming::Array {
        out.push(b']');
    }
}

/// Collect and emit an object's keys as a JSON array.
fn write_object_keys(nodes: &[Node], obj_idx: usize, len: usize, sorted: bool, out: &mut Vec<u8>) {
    let mut keys = Vec::with_capacity(len);
    let mut i = obj_idx + 1;
    for _ in 0..len {
        if let Some(Node::String(k)) = nodes.get(i) {
            keys.push(*k);
        }
        i = skip_node(nodes, i + 1);
    }
    if sorted {
        keys.sort_unstable();
    }
    out.push(b'[');
    for (k, key) in keys.iter().enumerate() {
        if k > 0 {
            out.push(b',');
        }
        write_escaped_str(key, out);
    }
    out.push(b']');
}

/// Emit `[0,1,…,n-1]`.
fn write_index_array(len: usize, out: &mut Vec<u8>) {
    out.push(b'[');
    for i in 0..len {
        if i > 0 {
            out.push(b',');
        }
        write_usize(i, out);
    }
    out.push(b']');
}

fn type_name(node: &Node) -> &'static [u8] {
    match node {
        Node::Object { .. } => b"\"object\"",
        Node::Array { .. } => b"\"array\"",
        Node::String(_) => b"\"string\"",
        Node::Static(StaticNode::Bool(_)) => b"\"boolean\"",
        Node::Static(StaticNode::Null) => b"\"null\"",
        Node::Static(_) => b"\"number\"",
    }
}
