//! `@username` mention extraction.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// `@` followed by one or more ASCII word characters.
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([A-Za-z0-9_]+)").expect("valid regex"));

/// Extract the distinct usernames referenced as `@username` in `text`.
///
/// The token stops at the first character that is not alphanumeric or `_`,
/// so `"@alice,"` and `"(@alice)"` both yield `alice`. Names are returned
/// exactly as written (case-sensitive) without the leading `@`. Whether a
/// name belongs to a real user is decided later by the caller.
pub fn extract_mentions(text: &str) -> BTreeSet<String> {
    MENTION_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
