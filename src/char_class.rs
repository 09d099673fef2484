//! Regex spellings of SRL character classes.

pub const DIGIT: &str = r"\d";
pub const NOT_DIGIT: &str = r"\D";
/// Any alphabetic character: a word character that is neither a digit nor `_`.
pub const LETTER: &str = r"[^\W\d_]";
pub const NOT_LETTER: &str = r"[\W\d_]";
pub const WHITESPACE: &str = r"\s";
pub const NOT_WHITESPACE: &str = r"\S";

/// Matches nothing at all.
pub const NEVER: &str = "(?!)";
/// Matches any single character, newlines included.
pub const ANY: &str = r"[\s\S]";

/// Render `chars` as a bracket expression, `[^...]` when `negated`.
///
/// An empty set has no bracket spelling: it matches nothing, and its
/// negation matches any character.
pub fn bracket(chars: &str, negated: bool) -> String {
    if chars.is_empty() {
        return if negated { ANY } else { NEVER }.to_string();
    }
    let mut out = String::with_capacity(chars.len() + 3);
    out.push('[');
    if negated {
        out.push('^');
    }
    for ch in chars.chars() {
        if needs_escape(ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push(']');
    out
}

/// Characters with a meaning inside `[...]`.
fn needs_escape(ch: char) -> bool {
    matches!(ch, '\\' | ']' | '[' | '^' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn matches(pattern: &str, text: &str) -> bool {
        Regex::new(&format!("^(?:{pattern})$"))
            .expect("class should be valid regex")
            .is_match(text)
    }

    #[test]
    fn plain_set() {
        assert_eq!(bracket("abc", false), "[abc]");
        assert_eq!(bracket("abc", true), "[^abc]");
    }

    #[test]
    fn special_chars_are_escaped() {
        let set = bracket(r"a-]^\", false);
        assert_eq!(set, r"[a\-\]\^\\]");
        for ch in ["a", "-", "]", "^", "\\"] {
            assert!(matches(&set, ch), "expected member: {ch}");
        }
        assert!(!matches(&set, "b"));
    }

    #[test]
    fn empty_set() {
        assert_eq!(bracket("", false), NEVER);
        assert!(matches(&bracket("", true), "\n"));
    }

    #[test]
    fn letter_matches_unicode_letters() {
        assert!(matches(LETTER, "a"));
        assert!(matches(LETTER, "Z"));
        assert!(matches(LETTER, "é"));
        assert!(!matches(LETTER, "5"));
        assert!(!matches(LETTER, "_"));
        assert!(!matches(LETTER, " "));
    }

    #[test]
    fn not_letter_is_complement() {
        for ch in ["a", "é", "5", "_", " ", "-"] {
            assert_ne!(matches(LETTER, ch), matches(NOT_LETTER, ch), "{ch:?}");
        }
    }

    #[test]
    fn digit_and_whitespace() {
        assert!(matches(DIGIT, "7"));
        assert!(!matches(DIGIT, "x"));
        assert!(matches(NOT_DIGIT, "x"));
        assert!(matches(WHITESPACE, "\t"));
        assert!(matches(NOT_WHITESPACE, "x"));
        assert!(!matches(NOT_WHITESPACE, " "));
    }
}
