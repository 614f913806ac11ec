//! Field key codec: sanitizing, validating and generating keys.
//!
//! A key is both the label shown in the designer and the data-binding path
//! used at stamping time, so it must stay within a conservative grammar:
//! `^[A-Za-z_][A-Za-z0-9_.-]*$`. Dots separate nested path segments.

use crate::error::KeyError;
use fieldstamp_types::FieldKey;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::Hash;

static KEY_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("key grammar is a valid regex")
});

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

fn is_edge_char(c: char) -> bool {
    matches!(c, '-' | '_' | '.')
}

/// Turns arbitrary user or import text into key characters.
///
/// Whitespace runs become `_`, characters outside `[A-Za-z0-9_.-]` are
/// dropped, and `-`, `_`, `.` are trimmed from both ends. A result starting
/// with a digit is prefixed with `_` so that every non-empty result is a
/// valid key. The result may be empty; callers must treat that as invalid.
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_whitespace = false;
    for c in raw.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if is_key_char(c) {
            out.push(c);
        }
    }

    let trimmed = out.trim_matches(is_edge_char);
    match trimmed.chars().next() {
        Some(first) if first.is_ascii_digit() => format!("_{}", trimmed),
        _ => trimmed.to_string(),
    }
}

/// True iff `key` is non-empty and matches the key grammar.
pub fn is_valid(key: &str) -> bool {
    KEY_GRAMMAR.is_match(key)
}

/// Validates `raw` as a key without altering it.
pub fn parse_key(raw: &str) -> Result<FieldKey, KeyError> {
    if is_valid(raw) {
        Ok(FieldKey::from(raw))
    } else {
        Err(KeyError::InvalidKey(raw.to_string()))
    }
}

/// The editing-boundary check for a user-typed key: it must be valid and
/// not already present in `existing`.
pub fn check_available<K>(raw: &str, existing: &HashSet<K>) -> Result<FieldKey, KeyError>
where
    K: Borrow<str> + Eq + Hash,
{
    let key = parse_key(raw)?;
    if existing.contains(raw) {
        return Err(KeyError::DuplicateKey(raw.to_string()));
    }
    Ok(key)
}

/// Returns `{prefix}_{n}` where `n` is one more than the largest numeric
/// suffix already used with that prefix (0 if none).
///
/// Deterministic and side-effect free: inserting the result into the key
/// set is the caller's job.
pub fn generate_unique<K>(prefix: &str, existing: &HashSet<K>) -> FieldKey
where
    K: Borrow<str> + Eq + Hash,
{
    let marker = format!("{}_", prefix);
    let max = existing
        .iter()
        .filter_map(|key| {
            let suffix = Borrow::<str>::borrow(key).strip_prefix(marker.as_str())?;
            if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            suffix.parse::<u64>().ok()
        })
        .max()
        .unwrap_or(0);

    let mut next = max.saturating_add(1);
    let mut candidate = format!("{}{}", marker, next);
    // Only reachable when suffixes overflow u64.
    while existing.contains(candidate.as_str()) {
        next = next.wrapping_add(1);
        candidate = format!("{}{}", marker, next);
    }
    FieldKey::from(candidate)
}

/// The dotted parent path of a key, if it has one.
pub fn parent_key(key: &str) -> Option<&str> {
    key.rsplit_once('.').map(|(parent, _)| parent)
}

/// True if `key` lies strictly below `parent` in the dotted namespace.
pub fn is_descendant(key: &str, parent: &str) -> bool {
    key.len() > parent.len() + 1
        && key.starts_with(parent)
        && key.as_bytes()[parent.len()] == b'.'
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn keys(list: &[&str]) -> HashSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sanitize_whitespace_and_symbols() {
        assert_eq!(sanitize("first name"), "first_name");
        assert_eq!(sanitize("first \t\n name"), "first_name");
        assert_eq!(sanitize("amount ($)"), "amount");
        assert_eq!(sanitize("personal.firstName"), "personal.firstName");
        assert_eq!(sanitize("Größe"), "Gre");
    }

    #[test]
    fn test_sanitize_trims_edge_punctuation() {
        assert_eq!(sanitize("  _-.key.-_  "), "key");
        assert_eq!(sanitize("...."), "");
        assert_eq!(sanitize("   "), "");
        assert_eq!(sanitize("€€€"), "");
    }

    #[test]
    fn test_sanitize_digit_start_is_made_valid() {
        assert_eq!(sanitize("1st place"), "_1st_place");
        assert!(is_valid(&sanitize("42")));
    }

    #[test]
    fn test_sanitized_output_is_valid_when_non_empty() {
        let samples = [
            "hello world",
            "  leading",
            "trailing  ",
            "9lives",
            "a-b.c_d",
            "😀 emoji key",
            "-._",
            "x",
            "tab\tseparated\tkey",
            "mixed!@#$%^&*()chars",
            "-5",
        ];
        for raw in samples {
            let sanitized = sanitize(raw);
            if !sanitized.is_empty() {
                assert!(is_valid(&sanitized), "{:?} -> {:?}", raw, sanitized);
            }
        }
    }

    proptest! {
        #[test]
        fn prop_sanitized_output_is_valid(raw in any::<String>()) {
            let sanitized = sanitize(&raw);
            prop_assert!(sanitized.is_empty() || is_valid(&sanitized), "{:?} -> {:?}", raw, sanitized);
        }

        #[test]
        fn prop_sanitized_keyish_output_is_valid(raw in "[ -~\\t\\n]{0,32}") {
            let sanitized = sanitize(&raw);
            prop_assert!(sanitized.is_empty() || is_valid(&sanitized), "{:?} -> {:?}", raw, sanitized);
        }

        #[test]
        fn prop_generated_key_is_fresh(suffixes in proptest::collection::vec(0u64..1000, 0..20)) {
            let existing: HashSet<String> = suffixes.iter().map(|n| format!("text_{}", n)).collect();
            let generated = generate_unique("text", &existing);
            prop_assert!(is_valid(generated.as_str()));
            prop_assert!(!existing.contains(generated.as_str()));
        }
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid("text_1"));
        assert!(is_valid("_private"));
        assert!(is_valid("personal.first-name"));
        assert!(!is_valid(""));
        assert!(!is_valid("1abc"));
        assert!(!is_valid("-abc"));
        assert!(!is_valid("has space"));
        assert!(!is_valid("ümlaut"));
    }

    #[test]
    fn test_generate_unique_empty_set() {
        let existing: HashSet<String> = HashSet::new();
        assert_eq!(generate_unique("text", &existing).as_str(), "text_1");
    }

    #[test]
    fn test_generate_unique_takes_max_suffix() {
        let existing = keys(&["text_1", "text_7", "text_3", "checkbox_20", "text_x", "text_"]);
        assert_eq!(generate_unique("text", &existing).as_str(), "text_8");
        assert_eq!(generate_unique("checkbox", &existing).as_str(), "checkbox_21");
    }

    #[test]
    fn test_generate_unique_ignores_other_prefixes() {
        let existing = keys(&["textarea_9", "my_text_4", "text_2.child"]);
        assert_eq!(generate_unique("text", &existing).as_str(), "text_1");
    }

    #[test]
    fn test_generate_unique_never_returns_existing() {
        let existing = keys(&["text_1", "text_01", "text_2", "text_99999999999999999999999"]);
        let generated = generate_unique("text", &existing);
        assert!(!existing.contains(generated.as_str()));
        assert_eq!(generated.as_str(), "text_3");
    }

    #[test]
    fn test_generate_unique_is_deterministic() {
        let existing = keys(&["radio_4"]);
        assert_eq!(
            generate_unique("radio", &existing),
            generate_unique("radio", &existing)
        );
        assert_eq!(existing.len(), 1);
    }

    #[test]
    fn test_check_available() {
        let existing = keys(&["name"]);
        assert_eq!(
            check_available("name", &existing),
            Err(KeyError::DuplicateKey("name".into()))
        );
        assert_eq!(
            check_available("bad key", &existing),
            Err(KeyError::InvalidKey("bad key".into()))
        );
        assert_eq!(check_available("email", &existing).unwrap().as_str(), "email");
    }

    #[test]
    fn test_dotted_path_helpers() {
        assert_eq!(parent_key("a.b.c"), Some("a.b"));
        assert_eq!(parent_key("a"), None);
        assert!(is_descendant("a.b", "a"));
        assert!(is_descendant("a.b.c", "a"));
        assert!(!is_descendant("ab", "a"));
        assert!(!is_descendant("a", "a"));
    }
}
