//! Commit metadata records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound, in bytes, on [`CommitInfo::diff`]
pub const MAX_DIFF_BYTES: usize = 50_000;

/// Full metadata for a single commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Canonical commit SHA (40 hex characters)
    pub sha: String,
    /// Shortest unambiguous abbreviation of the SHA
    pub short_sha: String,
    /// First line of the commit message
    pub summary: String,
    /// Full commit message, never truncated
    pub message: String,
    /// Author name
    pub author: String,
    /// Author email
    pub author_email: String,
    /// Author timestamp
    pub timestamp: DateTime<Utc>,
    /// Paths touched by the commit, in diff order
    pub files_changed: Vec<String>,
    /// Human-readable diffstat
    pub diff_stat: String,
    /// Message followed by the patch, cut at [`MAX_DIFF_BYTES`]
    pub diff: String,
}

impl CommitInfo {
    /// Author rendered as `Name <email>`
    #[must_use]
    pub fn author_line(&self) -> String {
        if self.author_email.is_empty() {
            self.author.clone()
        } else {
            format!("{} <{}>", self.author, self.author_email)
        }
    }
}

/// Validate that a SHA is a valid 40-character hex string
#[must_use]
pub fn is_valid_sha(sha: &str) -> bool {
    sha.len() == 40 && sha.chars().all(|c| c.is_ascii_hexdigit())
}

/// Cut `text` to at most `max` bytes.
///
/// The cut is not line-aware; it only steps back far enough to land on a
/// UTF-8 character boundary.
#[must_use]
pub fn truncate_bytes(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use similar_asserts::assert_eq;

    fn sample_commit() -> CommitInfo {
        CommitInfo {
            sha: "1945ab9c752534e733c38ba0109dc3b741f0a6eb".to_string(),
            short_sha: "1945ab9".to_string(),
            summary: "fix(session): resume after reconnect".to_string(),
            message: "fix(session): resume after reconnect\n\nKeeps the socket alive.\n"
                .to_string(),
            author: "Test Author".to_string(),
            author_email: "test@example.com".to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 17, 2, 33, 6).unwrap(),
            files_changed: vec!["src/session.rs".to_string()],
            diff_stat: " src/session.rs | 4 ++--\n 1 file changed".to_string(),
            diff: String::new(),
        }
    }

    #[test]
    fn test_commit_json_format() {
        let commit = sample_commit();
        let json = serde_json::to_string_pretty(&commit).expect("serialize");
        assert!(json.contains("\"sha\":"));
        assert!(json.contains("\"files_changed\":"));
        assert!(json.contains("2026-01-17"));
    }

    #[test]
    fn test_author_line() {
        let commit = sample_commit();
        assert_eq!(commit.author_line().as_str(), "Test Author <test@example.com>");
    }

    #[test]
    fn test_author_line_without_email() {
        let mut commit = sample_commit();
        commit.author_email = String::new();
        assert_eq!(commit.author_line().as_str(), "Test Author");
    }

    #[test]
    fn test_is_valid_sha() {
        assert!(is_valid_sha("1945ab9c752534e733c38ba0109dc3b741f0a6eb"));
        assert!(is_valid_sha("ABCDEF1234567890abcdef1234567890abcdef12"));
        assert!(!is_valid_sha("1945ab9"));
        assert!(!is_valid_sha("1945ab9c752534e733c38ba0109dc3b741f0a6eg"));
        assert!(!is_valid_sha(""));
    }

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_bytes("hello", 10), "hello");
        assert_eq!(truncate_bytes("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_cuts_mid_line() {
        assert_eq!(truncate_bytes("line one\nline two", 11), "line one\nli");
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        // 'é' is two bytes; cutting at 2 would split it
        assert_eq!(truncate_bytes("aé", 2), "a");
        assert_eq!(truncate_bytes("aé", 3), "aé");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: truncation never exceeds the limit and always yields a prefix
        #[test]
        fn prop_truncate_is_bounded_prefix(text in ".{0,200}", max in 0usize..300) {
            let cut = truncate_bytes(&text, max);
            prop_assert!(cut.len() <= max);
            prop_assert!(text.starts_with(cut));
        }

        /// Property: truncation loses at most three bytes beyond the limit
        #[test]
        fn prop_truncate_is_tight(text in ".{0,200}", max in 0usize..300) {
            let cut = truncate_bytes(&text, max);
            if text.len() > max {
                prop_assert!(max - cut.len() < 4);
            } else {
                prop_assert_eq!(cut, text.as_str());
            }
        }

        /// Property: is_valid_sha accepts any 40-char hex string
        #[test]
        fn prop_valid_sha_format(sha in "[0-9a-f]{40}") {
            prop_assert!(is_valid_sha(&sha));
        }
    }
}
