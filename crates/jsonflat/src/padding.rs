//! The padded-buffer contract.
//!
//! Every parse operation in this crate reads from a buffer whose JSON content
//! of length `json_len` is followed by at least [`PADDING`] readable zero
//! bytes. The padding lets the scanners read a bounded distance past the
//! content without bounds arithmetic on every byte: literal tails, escape
//! digits, and number runs all terminate cleanly on the zero fill.
//!
//! Operations `assert!` the length part of the contract. The zero fill itself
//! is not checked; handing over a buffer with a live tail is a programming
//! error and may misparse near the content boundary.

/// Number of readable zero bytes required after the JSON content.
pub const PADDING: usize = 64;

/// Create a padded copy of an in-memory slice.
///
/// The returned buffer holds `data` followed by [`PADDING`] zero bytes and
/// satisfies the contract for `json_len == data.len()`.
///
/// # Examples
///
/// ```rust
/// use jsonflat::{pad_buffer, PADDING};
///
/// let buf = pad_buffer(b"[1,2,3]");
/// assert_eq!(buf.len(), 7 + PADDING);
/// assert!(buf[7..].iter().all(|&b| b == 0));
/// ```
#[must_use]
pub fn pad_buffer(data: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(data.len() + PADDING);
    buf.extend_from_slice(data);
    buf.resize(data.len() + PADDING, 0);
    buf
}

pub(crate) fn assert_padded(buf: &[u8], json_len: usize) {
    assert!(
        buf.len() >= json_len + PADDING,
        "buffer must include PADDING extra zeroed bytes"
    );
}
