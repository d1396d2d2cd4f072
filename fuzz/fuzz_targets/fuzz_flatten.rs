#![no_main]

use jsonflat::{pad_buffer, Parser, TokenReader};
use libfuzzer_sys::fuzz_target;

// Flattening arbitrary bytes must never panic, and every accepted stream
// must decode cleanly end to end.
fuzz_target!(|data: &[u8]| {
    let buf = pad_buffer(data);
    let mut parser = Parser::new();
    if let Ok(stream) = parser.flatten(&buf, data.len()) {
        for token in TokenReader::new(&stream) {
            token.expect("engine produced an undecodable stream");
        }
    }
});
