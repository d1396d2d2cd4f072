#![no_main]

use jsonflat::{find_field_raw, minify, pad_buffer, MapFraming, MapOp, Parser};
use libfuzzer_sys::fuzz_target;

// Adversarial whitespace, escaped strings, scientific-notation numbers, and
// nested empty containers must not desynchronize any query walker.
fuzz_target!(|data: &[u8]| {
    let buf = pad_buffer(data);
    let len = data.len();
    let mut parser = Parser::new();

    let _ = find_field_raw(&buf, len, &["a", "b"]);
    let _ = parser.field_length(&buf, len, &["a"]);
    let _ = parser.field_keys(&buf, len, &[], true);
    let _ = parser.field_has(&buf, len, &[], "k");
    let _ = parser.array_map_field(&buf, len, &[], &["x"], MapFraming::Array);
    let _ = parser.array_map_builtin(&buf, len, &[], MapOp::Type, MapFraming::Lines);
    let _ = minify(&buf, len);
});
