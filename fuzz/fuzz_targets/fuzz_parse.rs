#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        // Loading a unit should never panic on any input.
        let _ = shaderlift_ast::Unit::from_json(text);
    }
});
