//! Match functions deciding when collected digits form a usable pattern.
//!
//! A match function inspects the digits collected so far and returns the
//! (possibly rewritten) digit string together with a [`MatchResult`]. The
//! rewrite is what callers see in [`super::PlayResult::dtmf`]; stripping a
//! terminator is the typical use.

use super::result::MatchResult;
use std::sync::Arc;

/// Pluggable digit-match function.
///
/// Must be pure and fast: it is applied under the session lock on every
/// digit signal.
pub type MatchFn = Arc<dyn Fn(&str) -> (String, MatchResult) + Send + Sync>;

/// Any single digit completes the pattern.
pub fn match_any() -> MatchFn {
    Arc::new(|pattern: &str| {
        if pattern.is_empty() {
            (String::new(), MatchResult::Incomplete)
        } else {
            (pattern.to_string(), MatchResult::Complete)
        }
    })
}

/// Digits complete once `terminator` arrives; the terminator itself is
/// stripped from the result.
pub fn match_terminator(terminator: char) -> MatchFn {
    Arc::new(move |pattern: &str| match pattern.find(terminator) {
        Some(idx) => (pattern[..idx].to_string(), MatchResult::Complete),
        None => (pattern.to_string(), MatchResult::Incomplete),
    })
}

/// `#`-terminated collection, the common prompt idiom.
pub fn match_hash() -> MatchFn {
    match_terminator('#')
}

/// Exactly `len` digits complete the pattern.
pub fn match_len(len: usize) -> MatchFn {
    Arc::new(move |pattern: &str| {
        if pattern.len() >= len {
            (pattern.to_string(), MatchResult::Complete)
        } else {
            (pattern.to_string(), MatchResult::Incomplete)
        }
    })
}

/// Complete on `len` digits or on `terminator`, whichever comes first.
/// The length check wins when both apply at once.
pub fn match_len_or_terminator(len: usize, terminator: char) -> MatchFn {
    Arc::new(move |pattern: &str| {
        if pattern.len() >= len {
            return (pattern.to_string(), MatchResult::Complete);
        }
        match pattern.find(terminator) {
            Some(idx) => (pattern[..idx].to_string(), MatchResult::Complete),
            None => (pattern.to_string(), MatchResult::Incomplete),
        }
    })
}

/// Complete when the digits equal one of `candidates`; invalid once the
/// digits are already longer than the longest candidate.
pub fn match_discrete<I, S>(candidates: I) -> MatchFn
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let candidates: Vec<String> = candidates.into_iter().map(Into::into).collect();
    let longest = candidates.iter().map(|c| c.len()).max().unwrap_or(0);
    Arc::new(move |pattern: &str| {
        if candidates.iter().any(|c| c == pattern) {
            (pattern.to_string(), MatchResult::Complete)
        } else if pattern.len() > longest {
            (pattern.to_string(), MatchResult::Invalid)
        } else {
            (pattern.to_string(), MatchResult::Incomplete)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_any() {
        let f = match_any();
        assert_eq!(f(""), (String::new(), MatchResult::Incomplete));
        assert_eq!(f("5"), ("5".to_string(), MatchResult::Complete));
        assert_eq!(f("51"), ("51".to_string(), MatchResult::Complete));
    }

    #[test]
    fn test_match_hash_strips_terminator() {
        let f = match_hash();
        assert_eq!(f("2314"), ("2314".to_string(), MatchResult::Incomplete));
        assert_eq!(f("2314#"), ("2314".to_string(), MatchResult::Complete));
        assert_eq!(f("#"), (String::new(), MatchResult::Complete));
    }

    #[test]
    fn test_match_terminator_keeps_prefix_only() {
        let f = match_terminator('*');
        assert_eq!(f("12*34"), ("12".to_string(), MatchResult::Complete));
    }

    #[test]
    fn test_match_len() {
        let f = match_len(3);
        assert_eq!(f("23"), ("23".to_string(), MatchResult::Incomplete));
        assert_eq!(f("231"), ("231".to_string(), MatchResult::Complete));
        assert_eq!(f("2314"), ("2314".to_string(), MatchResult::Complete));
    }

    #[test]
    fn test_match_len_or_terminator_prefers_length() {
        let f = match_len_or_terminator(3, '#');
        assert_eq!(f("12"), ("12".to_string(), MatchResult::Incomplete));
        // Below the length, the terminator completes and is stripped.
        assert_eq!(f("1#"), ("1".to_string(), MatchResult::Complete));
        // Three digits where the third is the terminator: length wins and
        // the terminator stays in the pattern.
        assert_eq!(f("45#"), ("45#".to_string(), MatchResult::Complete));
        assert_eq!(f("456"), ("456".to_string(), MatchResult::Complete));
    }

    #[test]
    fn test_match_discrete() {
        let f = match_discrete(["42", "101"]);
        assert_eq!(f("4"), ("4".to_string(), MatchResult::Incomplete));
        assert_eq!(f("42"), ("42".to_string(), MatchResult::Complete));
        assert_eq!(f("10"), ("10".to_string(), MatchResult::Incomplete));
        assert_eq!(f("999"), ("999".to_string(), MatchResult::Incomplete));
        assert_eq!(f("9999"), ("9999".to_string(), MatchResult::Invalid));
    }
}
