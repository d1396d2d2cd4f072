#![no_main]

use jsonflat::{pad_buffer, Parser};
use libfuzzer_sys::fuzz_target;

// Malformed documents inside a stream are skipped, never fatal; the count
// must also be independent of the batch size.
fuzz_target!(|data: &[u8]| {
    let buf = pad_buffer(data);
    let mut parser = Parser::new();
    let a = parser.count_documents(&buf, data.len(), 16);
    let b = parser.count_documents(&buf, data.len(), 1 << 20);
    assert_eq!(a, b);
    let _ = parser.extract_field_total(&buf, data.len(), 1 << 20, "name");
});
