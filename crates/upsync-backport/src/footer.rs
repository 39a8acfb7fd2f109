// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! `Backport:` footer grammar
//!
//! ```text
//! footer := "Backport:" entry ("," entry)*
//! entry  := ref | ref "..." ref
//! ```
//!
//! Entries are trimmed and empty ones are dropped, so trailing commas and
//! extra spacing are tolerated. There is no escaping. A range is split on the
//! first `...` only. Parsing is total: any input yields a (possibly empty)
//! list of entries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal, case-sensitive prefix of a footer line
pub const FOOTER_PREFIX: &str = "Backport:";

/// Range separator inside an entry
const RANGE_SEPARATOR: &str = "...";

/// One comma-separated entry of a footer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FooterEntry {
    /// A single commit reference
    Single {
        /// Reference as written
        reference: String,
    },
    /// An inclusive range of commits
    Range {
        /// Older endpoint
        old: String,
        /// Newer endpoint
        new: String,
    },
}

impl FooterEntry {
    /// Parse one already-trimmed, non-empty entry
    #[must_use]
    pub fn parse(entry: &str) -> Self {
        match entry.split_once(RANGE_SEPARATOR) {
            Some((old, new)) => Self::Range {
                old: old.trim().to_string(),
                new: new.trim().to_string(),
            },
            None => Self::Single {
                reference: entry.to_string(),
            },
        }
    }
}

impl fmt::Display for FooterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single { reference } => f.write_str(reference),
            Self::Range { old, new } => write!(f, "{old}{RANGE_SEPARATOR}{new}"),
        }
    }
}

/// Parse a single line, returning `None` if it is not a footer
#[must_use]
pub fn parse_footer_line(line: &str) -> Option<Vec<FooterEntry>> {
    let rest = line.strip_prefix(FOOTER_PREFIX)?;
    Some(
        rest.trim()
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(FooterEntry::parse)
            .collect(),
    )
}

/// Collect the entries of every footer line in a commit message, in order
#[must_use]
pub fn parse_message(body: &str) -> Vec<FooterEntry> {
    body.lines().filter_map(parse_footer_line).flatten().collect()
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn reference() -> impl Strategy<Value = String> {
        "[0-9a-f]{4,40}"
    }

    proptest! {
        /// Property: arbitrary text never panics the parser
        #[test]
        fn prop_parse_message_total(body in "(?s).{0,400}") {
            let _ = parse_message(&body);
        }

        /// Property: lines without the prefix contribute nothing
        #[test]
        fn prop_non_footer_lines_ignored(lines in proptest::collection::vec("[a-zA-Z ,.]{0,40}", 0..10)) {
            let body = lines
                .iter()
                .filter(|l| !l.starts_with(FOOTER_PREFIX))
                .cloned()
                .collect::<Vec<_>>()
                .join("\n");
            prop_assert!(parse_message(&body).is_empty());
        }

        /// Property: no parsed entry is ever empty or padded
        #[test]
        fn prop_entries_trimmed_and_non_empty(rest in "[0-9a-f ,]{0,80}") {
            let line = format!("{FOOTER_PREFIX}{rest}");
            for entry in parse_footer_line(&line).unwrap_or_default() {
                match entry {
                    FooterEntry::Single { reference } => {
                        prop_assert!(!reference.is_empty());
                        prop_assert_eq!(reference.trim(), reference.as_str());
                    }
                    FooterEntry::Range { .. } => prop_assert!(false, "no dots in input"),
                }
            }
        }

        /// Property: a footer of N clean references yields exactly those N entries
        #[test]
        fn prop_clean_references_preserved(refs in proptest::collection::vec(reference(), 1..8)) {
            let line = format!("{} {}", FOOTER_PREFIX, refs.join(", "));
            let parsed = parse_footer_line(&line).unwrap_or_default();
            let expected: Vec<FooterEntry> = refs
                .iter()
                .map(|r| FooterEntry::Single { reference: r.clone() })
                .collect();
            prop_assert_eq!(parsed, expected);
        }

        /// Property: ranges keep both endpoints
        #[test]
        fn prop_range_endpoints(old in reference(), new in reference()) {
            let line = format!("{FOOTER_PREFIX} {old}...{new},");
            prop_assert_eq!(
                parse_footer_line(&line),
                Some(vec![FooterEntry::Range { old, new }])
            );
        }
    }
}
