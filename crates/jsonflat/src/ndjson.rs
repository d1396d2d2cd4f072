//! Newline-delimited JSON streaming.
//!
//! The streamer iterates a padded NDJSON buffer in newline-aligned batches
//! and answers two aggregate queries: how many documents parse, and the total
//! unescaped byte length of one top-level string field across documents.
//!
//! Robustness rule: a malformed document must never abort the stream; it is
//! skipped silently and does not count. Counting needs nothing beyond
//! structural boundaries, so it runs on the lazy cursor; field extraction
//! descends into values, so each document goes through the tape parser,
//! which validates the whole document before anything is touched (adversarial
//! single-field objects like `{z}` must be rejected up front, not midway).

use memchr::{memchr, memchr_iter};

use crate::ondemand::Cursor;
use crate::padding::assert_padded;
use crate::parser::{find_key, Parser};

use simd_json::value::tape::Node;

/// Heuristic: does this buffer look like NDJSON?
///
/// True when the first line is a complete container (`{…}` or `[…]`) and at
/// least one more line opens another one.
#[must_use]
pub fn is_ndjson(buf: &[u8]) -> bool {
    let Some(first_nl) = memchr(b'\n', buf) else {
        return false;
    };
    let first_line = &buf[..first_nl];

    let Some(&first_byte) = first_line
        .iter()
        .find(|&&b| !matches!(b, b' ' | b'\t' | b'\r'))
    else {
        return false;
    };
    if first_byte != b'{' && first_byte != b'[' {
        return false;
    }

    let Some(&last_byte) = first_line
        .iter()
        .rfind(|&&b| !matches!(b, b' ' | b'\t' | b'\r'))
    else {
        return false;
    };
    if last_byte != b'}' && last_byte != b']' {
        return false;
    }

    for &b in &buf[first_nl + 1..] {
        match b {
            b' ' | b'\t' | b'\r' | b'\n' => continue,
            b'{' | b'[' => return true,
            _ => return false,
        }
    }
    false
}

/// Split a buffer into batches of approximately `target_size` bytes, always
/// breaking at newline boundaries.
#[must_use]
pub fn split_batches(buf: &[u8], target_size: usize) -> Vec<&[u8]> {
    if buf.is_empty() {
        return vec![];
    }

    let mut batches = Vec::new();
    let mut start = 0;

    while start < buf.len() {
        if start + target_size >= buf.len() {
            batches.push(&buf[start..]);
            break;
        }
        match memchr(b'\n', &buf[start + target_size..]) {
            Some(offset) => {
                let end = start + target_size + offset + 1;
                batches.push(&buf[start..end]);
                start = end;
            }
            None => {
                batches.push(&buf[start..]);
                break;
            }
        }
    }

    batches
}

impl Parser {
    /// Count the documents in a padded NDJSON buffer.
    ///
    /// Malformed lines are skipped and do not count; empty lines are ignored.
    #[must_use]
    pub fn count_documents(&mut self, buf: &[u8], json_len: usize, batch_size: usize) -> u64 {
        assert_padded(buf, json_len);
        let mut count = 0u64;
        for_each_line(buf, json_len, batch_size, |line_start, line_len| {
            // The cursor window ends at the line; everything after it,
            // including the next line, is out of reach.
            let mut cur = Cursor::new(&buf[line_start..], line_len);
            cur.skip_ws();
            if cur.at_end() {
                return;
            }
            if cur.skip_value().is_ok() {
                cur.skip_ws();
                if cur.at_end() {
                    count += 1;
                }
            }
        });
        count
    }

    /// Sum the unescaped byte length of a top-level string `field` across the
    /// documents of a padded NDJSON buffer.
    ///
    /// Documents that fail to parse, are not objects, miss the field, or hold
    /// a non-string value there contribute nothing.
    #[must_use]
    pub fn extract_field_total(
        &mut self,
        buf: &[u8],
        json_len: usize,
        batch_size: usize,
        field: &str,
    ) -> u64 {
        assert_padded(buf, json_len);
        let mut total = 0u64;
        let mut lines: Vec<(usize, usize)> = Vec::new();
        for_each_line(buf, json_len, batch_size, |start, len| {
            lines.push((start, len));
        });
        for (start, len) in lines {
            let Ok(tape) = self.tape(&buf[start..], len) else {
                continue;
            };
            let nodes: &[Node] = &tape.0;
            if let Some(idx) = find_key(nodes, 0, field) {
                if let Some(Node::String(s)) = nodes.get(idx) {
                    total += s.len() as u64;
                }
            }
        }
        total
    }
}

/// Invoke `f(line_start, trimmed_len)` for every line, batch by batch.
///
/// Line offsets are absolute within `buf`; the trimmed length excludes
/// trailing whitespace so that a `\r\n` stream behaves like a `\n` one.
fn for_each_line<F: FnMut(usize, usize)>(buf: &[u8], json_len: usize, batch_size: usize, mut f: F) {
    let data = &buf[..json_len];
    for batch in split_batches(data, batch_size) {
        let batch_start = batch.as_ptr() as usize - data.as_ptr() as usize;
        let mut start = 0;
        for nl in memchr_iter(b'\n', batch) {
            emit_line(batch, batch_start, start, nl, &mut f);
            start = nl + 1;
        }
        if start < batch.len() {
            emit_line(batch, batch_start, start, batch.len(), &mut f);
        }
    }
}

fn emit_line<F: FnMut(usize, usize)>(
    batch: &[u8],
    batch_start: usize,
    start: usize,
    end: usize,
    f: &mut F,
) {
    let line = &batch[start..end];
    let trimmed = line
        .iter()
        .rposition(|&b| !matches!(b, b' ' | b'\t' | b'\r'))
        .map_or(0, |p| p + 1);
    if trimmed > 0 {
        f(batch_start + start, trimmed);
    }
}
