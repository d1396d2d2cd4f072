//! Compact JSON fragment serialization.
//!
//! The fast paths hand back owned JSON fragments. Values re-serialized from
//! the tape lose their source formatting: strings are re-escaped with the
//! minimal escape set, integers print through `itoa`, and doubles print
//! through `ryu` (shortest round-trip form). Queries that must preserve the
//! source spelling of numbers go through the lazy raw-slice path instead.

use memchr::memchr2;
use simd_json::value::tape::Node;
use simd_json::StaticNode;

use crate::error::{Error, Result};
use crate::padding::assert_padded;
use crate::parser::skip_node;
use crate::MAX_DEPTH;

/// Append `s` as a quoted JSON string literal.
pub(crate) fn write_escaped_str(s: &str, out: &mut Vec<u8>) {
    out.push(b'"');
    for &b in s.as_bytes() {
        match b {
            b'"' => out.extend_from_slice(b"\\\""),
            b'\\' => out.extend_from_slice(b"\\\\"),
            0x08 => out.extend_from_slice(b"\\b"),
            0x0C => out.extend_from_slice(b"\\f"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\t' => out.extend_from_slice(b"\\t"),
            b if b < 0x20 => {
                const HEX: &[u8; 16] = b"0123456789abcdef";
                out.extend_from_slice(b"\\u00");
                out.push(HEX[usize::from(b >> 4)]);
                out.push(HEX[usize::from(b & 0x0F)]);
            }
            b => out.push(b),
        }
    }
    out.push(b'"');
}

pub(crate) fn write_usize(n: usize, out: &mut Vec<u8>) {
    let mut buf = itoa::Buffer::new();
    out.extend_from_slice(buf.format(n).as_bytes());
}

/// Serialize the tape subtree at `idx` as compact JSON; returns the next
/// index.
pub(crate) fn write_tape_value(
    nodes: &[Node],
    idx: usize,
    depth: usize,
    out: &mut Vec<u8>,
) -> Result<usize> {
    if depth > MAX_DEPTH {
        return Err(Error::DepthLimit);
    }
    let node = nodes
        .get(idx)
        .ok_or(Error::Internal("serialize ran past the node list"))?;
    match node {
        Node::Static(StaticNode::Null) => out.extend_from_slice(b"null"),
        Node::Static(StaticNode::Bool(true)) => out.extend_from_slice(b"true"),
        Node::Static(StaticNode::Bool(false)) => out.extend_from_slice(b"false"),
        Node::Static(StaticNode::I64(v)) => {
            let mut buf = itoa::Buffer::new();
            out.extend_from_slice(buf.format(*v).as_bytes());
        }
        Node::Static(StaticNode::U64(u)) => {
            let mut buf = itoa::Buffer::new();
            out.extend_from_slice(buf.format(*u).as_bytes());
        }
        Node::Static(StaticNode::F64(v)) => {
            let mut buf = ryu::Buffer::new();
            out.extend_from_slice(buf.format_finite(*v).as_bytes());
        }
        #[allow(unreachable_patterns)]
        Node::Static(_) => return Err(Error::Internal("unsupported static node on tape")),
        Node::String(s) => write_escaped_str(s, out),
        Node::Array { len, .. } => {
            out.push(b'[');
            let mut i = idx + 1;
            for k in 0..*len {
                if k > 0 {
                    out.push(b',');
                }
                i = write_tape_value(nodes, i, depth + 1, out)?;
            }
            out.push(b']');
            return Ok(i);
        }
        Node::Object { len, .. } => {
            out.push(b'{');
            let mut i = idx + 1;
            for k in 0..*len {
                if k > 0 {
                    out.push(b',');
                }
                match nodes.get(i) {
                    Some(Node::String(key)) => write_escaped_str(key, out),
                    _ => return Err(Error::Internal("object key is not a string node")),
                }
                out.push(b':');
                i = write_tape_value(nodes, i + 1, depth + 1, out)?;
            }
            out.push(b'}');
            return Ok(i);
        }
    }
    Ok(skip_node(nodes, idx))
}

/// Compact a JSON buffer by dropping insignificant whitespace.
///
/// Runs without building any tree: string literals are copied verbatim
/// (escapes and all) and everything between them is filtered. Validation is
/// limited to string termination; garbage input produces compacted garbage,
/// the same as it went in.
///
/// # Examples
///
/// ```rust
/// use jsonflat::{minify, pad_buffer};
///
/// let json = br#"{ "a" : 1 , "b" : [2, 3] }"#;
/// let buf = pad_buffer(json);
/// let out = minify(&buf, json.len()).unwrap();
/// assert_eq!(out, br#"{"a":1,"b":[2,3]}"#);
/// ```
pub fn minify(buf: &[u8], json_len: usize) -> Result<Vec<u8>> {
    assert_padded(buf, json_len);
    let mut out = Vec::with_capacity(json_len);
    let mut pos = 0;
    while pos < json_len {
        match buf[pos] {
            b' ' | b'\t' | b'\n' | b'\r' => pos += 1,
            b'"' => {
                let start = pos;
                pos += 1;
                loop {
                    match memchr2(b'"', b'\\', &buf[pos..json_len]) {
                        None => return Err(Error::InvalidString { at: json_len }),
                        Some(i) => {
                            if buf[pos + i] == b'"' {
                                pos += i + 1;
                                break;
                            }
                            pos += i + 2;
                            if pos > json_len {
                                return Err(Error::InvalidString { at: json_len });
                            }
                        }
                    }
                }
                out.extend_from_slice(&buf[start..pos]);
            }
            b => {
                out.push(b);
                pos += 1;
            }
        }
    }
    Ok(out)
}
