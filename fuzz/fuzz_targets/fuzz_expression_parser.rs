#![no_main]

use libfuzzer_sys::fuzz_target;
use smart_underwrite::expr;

// The compiler must never panic on arbitrary input, only ever return
// `Ok` or a `SmartUnderwriteError::InvalidExpression`.
fuzz_target!(|data: &[u8]| {
    if let Ok(source) = std::str::from_utf8(data) {
        let _ = expr::compile(source);
        let _ = expr::validate(source);
    }
});
