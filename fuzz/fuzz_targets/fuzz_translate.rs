#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(unit) = shaderlift_ast::Unit::from_json(text) {
        // Dangling ids must surface as errors, not panics.
        let _ = shaderlift_translate::translate(&unit, &Default::default());
    }
});
