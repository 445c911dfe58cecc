//! Quote-aware splitting of query lines and conditions.

use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

use fastex_core::error::{Error, Result};

/// A condition token split into its parts, before any field resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCondition {
    pub negated: bool,
    /// `None` for a bare term.
    pub field: Option<String>,
    pub value: String,
}

fn quoted_run() -> &'static Regex {
    static QUOTED: OnceLock<Regex> = OnceLock::new();
    // Lazy: `"a" b "c"` holds two runs, not one.
    QUOTED.get_or_init(|| Regex::new(r#"".+?""#).expect("valid quoted-run pattern"))
}

/// Splits `text` on `delimiter`, except inside double-quoted runs.
///
/// With `trim_quotes`, a piece that starts and ends with `"` loses both.
pub fn smart_split(text: &str, delimiter: char, trim_quotes: bool) -> Vec<String> {
    let protected: Vec<Range<usize>> = quoted_run().find_iter(text).map(|m| m.range()).collect();
    let is_protected = |at: usize| protected.iter().any(|r| r.contains(&at));

    let mut parts = Vec::new();
    let mut start = 0;
    for (at, ch) in text.char_indices() {
        if ch == delimiter && !is_protected(at) {
            parts.push(&text[start..at]);
            start = at + ch.len_utf8();
        }
    }
    parts.push(&text[start..]);

    parts
        .into_iter()
        .map(|p| if trim_quotes { trim_quote_pair(p) } else { p })
        .map(str::to_string)
        .collect()
}

fn trim_quote_pair(piece: &str) -> &str {
    if piece.starts_with('"') && piece.ends_with('"') {
        if piece.len() == 1 { "" } else { &piece[1..piece.len() - 1] }
    } else {
        piece
    }
}

/// Breaks a query line into condition tokens. Runs of spaces produce no
/// empty tokens, so a blank line has no conditions.
pub fn split_conditions(line: &str) -> Vec<String> {
    smart_split(line, ' ', false).into_iter().filter(|t| !t.is_empty()).collect()
}

/// Parses one condition token: `[!][field:]value`.
pub fn parse_condition(token: &str) -> Result<RawCondition> {
    let (negated, rest) = match token.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let mut parts = smart_split(rest, ':', true);
    match parts.len() {
        1 => Ok(RawCondition { negated, field: None, value: parts.remove(0) }),
        2 => {
            let value = parts.remove(1);
            let field = parts.remove(0);
            Ok(RawCondition { negated, field: Some(field), value })
        }
        _ => Err(Error::MalformedQuery { condition: token.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_unquoted_spaces_only() {
        assert_eq!(smart_split(r#"a "b c" d"#, ' ', false), ["a", r#""b c""#, "d"]);
        assert_eq!(smart_split(r#"name:"john smith" !archived:*"#, ' ', false), [r#"name:"john smith""#, "!archived:*"]);
    }

    #[test]
    fn trims_quote_pairs_when_asked() {
        assert_eq!(smart_split(r#""a b":value"#, ':', true), ["a b", "value"]);
        assert_eq!(smart_split(r#"url:"http://x""#, ':', true), ["url", "http://x"]);
        assert_eq!(smart_split(r#"""#, ':', true), [""]);
    }

    #[test]
    fn unmatched_quote_protects_nothing() {
        assert_eq!(smart_split(r#"a:"b:c"#, ':', true), ["a", "\"b", "c"]);
    }

    #[test]
    fn empty_quotes_need_a_character_before_closing() {
        // `"".+?"` runs to the next quote, so `"" a"` is one protected run.
        assert_eq!(smart_split(r#""" a" b"#, ' ', false), [r#""" a""#, "b"]);
    }

    #[test]
    fn blank_tokens_are_dropped() {
        assert!(split_conditions("").is_empty());
        assert!(split_conditions("   ").is_empty());
        assert_eq!(split_conditions("  x   y "), ["x", "y"]);
    }

    #[test]
    fn parses_bare_qualified_and_negated() {
        assert_eq!(
            parse_condition("alice").unwrap(),
            RawCondition { negated: false, field: None, value: "alice".into() }
        );
        assert_eq!(
            parse_condition("!archived:*").unwrap(),
            RawCondition { negated: true, field: Some("archived".into()), value: "*".into() }
        );
        assert_eq!(
            parse_condition(r#""a b":"c:d""#).unwrap(),
            RawCondition { negated: false, field: Some("a b".into()), value: "c:d".into() }
        );
    }

    #[test]
    fn two_colons_is_malformed() {
        let err = parse_condition("a:b:c").unwrap_err();
        assert!(matches!(err, Error::MalformedQuery { ref condition } if condition == "a:b:c"));
    }
}
