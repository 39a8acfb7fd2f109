// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the `Backport:` footer parser
//!
//! Arbitrary commit messages must never panic the parser, and every entry it
//! returns must be non-empty and free of surrounding whitespace.

#![no_main]

use libfuzzer_sys::fuzz_target;

use upsync_backport::{FooterEntry, parse_message};

fuzz_target!(|data: &[u8]| {
    if let Ok(body) = std::str::from_utf8(data) {
        for entry in parse_message(body) {
            if let FooterEntry::Single { reference } = entry {
                assert!(!reference.is_empty());
                assert_eq!(reference.trim(), reference);
            }
        }
    }
});
