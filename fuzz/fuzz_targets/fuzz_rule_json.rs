#![no_main]

use libfuzzer_sys::fuzz_target;
use smart_underwrite::rules;

// Malformed rule documents must surface as a `ValidationResult` full of
// errors, never a panic (spec §4.2: "JSON parse failures surface as
// errors, not exceptions").
fuzz_target!(|data: &[u8]| {
    if let Ok(json) = std::str::from_utf8(data) {
        let _ = rules::validate_rule_json(json);
    }
});
