//! Fuzz target for the notation parser entry point
//!
//! Feeds arbitrary byte strings to the parser; it must never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if input.len() > 1000 {
            return;
        }

        if let Ok(token) = ferro_resolve::parse_notation(input) {
            // Whatever parses must render to text that parses back identically
            let rendered = token.to_string();
            let reparsed = ferro_resolve::parse_notation(&rendered)
                .unwrap_or_else(|e| panic!("{:?} rendered as {:?}: {}", input, rendered, e));
            assert_eq!(reparsed, token);
        }
    }
});
