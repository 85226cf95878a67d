//! Fuzzy similarity between two cell values.
//!
//! Uses the normalized Indel similarity from `rapidfuzz` as the base ratio
//! and picks one of three strategies from the shape of the inputs:
//!
//! - strings of two characters or fewer use the best-window partial ratio
//! - hyphenated or multi-word strings use the token-set ratio
//! - everything else uses the plain ratio
//!
//! Every score is rounded to a whole percent, so results live on the
//! `0.00..=1.00` grid.

use std::collections::BTreeSet;

use rapidfuzz::distance::indel;

/// Comparison strategy chosen for a pair of normalized strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Best-matching contiguous window of the longer string.
    Partial,
    /// Order- and duplicate-insensitive token overlap.
    TokenSet,
    /// Plain normalized edit similarity.
    Plain,
}

impl Strategy {
    /// Picks the strategy for two already trimmed and lower-cased strings.
    pub fn select(a: &str, b: &str) -> Self {
        if a.chars().count() <= 2 || b.chars().count() <= 2 {
            Self::Partial
        } else if is_multi_token(a) || is_multi_token(b) {
            Self::TokenSet
        } else {
            Self::Plain
        }
    }

    /// Scores two normalized, non-empty strings with this strategy.
    pub fn score(self, a: &str, b: &str) -> f64 {
        let raw = match self {
            Self::Partial => partial_ratio(a, b),
            Self::TokenSet => token_set_ratio(a, b),
            Self::Plain => ratio(a, b),
        };
        round_percent(raw)
    }
}

/// Similarity of two values in `[0, 1]`.
///
/// Inputs are trimmed and lower-cased first. A blank side scores `0`.
pub fn similarity(a: &str, b: &str) -> f64 {
    score_normalized(&normalize(a), &normalize(b))
}

/// [`similarity`] for values already passed through [`normalize`].
pub fn score_normalized(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    Strategy::select(a, b).score(a, b)
}

/// Trims and lower-cases a value for comparison.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn is_multi_token(value: &str) -> bool {
    value.contains(['-', ' '])
}

fn round_percent(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Plain normalized Indel similarity. Blank input scores `0`.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    indel::normalized_similarity(a.chars(), b.chars())
}

/// Best ratio of the shorter string against every same-length window of
/// the longer one.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() || b_chars.is_empty() {
        return 0.0;
    }
    let (shorter, longer) = if a_chars.len() <= b_chars.len() {
        (&a_chars, &b_chars)
    } else {
        (&b_chars, &a_chars)
    };
    if shorter.len() == longer.len() {
        return ratio(a, b);
    }

    let mut best = 0.0f64;
    for window in longer.windows(shorter.len()) {
        let score = indel::normalized_similarity(shorter.iter().copied(), window.iter().copied());
        best = best.max(score);
        if best >= 1.0 {
            break;
        }
    }
    best
}

/// Set-based token comparison.
///
/// Tokens are split on any character that is not alphanumeric or `_`.
/// The sorted intersection is compared with each side's intersection plus
/// remainder, and the two remainders with each other; the best wins.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a = tokens(a);
    let tokens_b = tokens(b);
    match (tokens_a.is_empty(), tokens_b.is_empty()) {
        // Punctuation-only on both sides: fall back to the raw strings.
        (true, true) => return ratio(a, b),
        (true, false) | (false, true) => return 0.0,
        (false, false) => {}
    }

    let intersection = join(tokens_a.intersection(&tokens_b));
    let only_a = join(tokens_a.difference(&tokens_b));
    let only_b = join(tokens_b.difference(&tokens_a));
    let combined_a = format!("{intersection} {only_a}").trim().to_string();
    let combined_b = format!("{intersection} {only_b}").trim().to_string();

    ratio(&intersection, &combined_a)
        .max(ratio(&intersection, &combined_b))
        .max(ratio(&combined_a, &combined_b))
}

fn tokens(value: &str) -> BTreeSet<&str> {
    value
        .split(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
        .filter(|token| !token.is_empty())
        .collect()
}

fn join<'a>(tokens: impl Iterator<Item = &'a &'a str>) -> String {
    tokens.copied().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_side_scores_zero() {
        assert_eq!(similarity("", "anything"), 0.0);
        assert_eq!(similarity("   ", "anything"), 0.0);
        assert_eq!(similarity("anything", ""), 0.0);
    }

    #[test]
    fn normalized_scoring_matches_raw_scoring() {
        for (a, b) in [("Jon Smith", " john SMITH"), ("KS", "ks city"), ("Jon", "JOHN")] {
            assert_eq!(score_normalized(&normalize(a), &normalize(b)), similarity(a, b));
        }
        assert_eq!(score_normalized("", "ann"), 0.0);
    }

    #[test]
    fn identical_values_score_one() {
        assert_eq!(similarity("Kansas", "  kansas "), 1.0);
        assert_eq!(similarity("KS", "ks"), 1.0);
        assert_eq!(similarity("Mary-Kate Olsen", "mary-kate olsen"), 1.0);
    }

    #[test]
    fn selects_strategy_from_shape() {
        assert_eq!(Strategy::select("ks", "kansas"), Strategy::Partial);
        assert_eq!(Strategy::select("jon smith", "john"), Strategy::TokenSet);
        assert_eq!(Strategy::select("smith-jones", "smith"), Strategy::TokenSet);
        assert_eq!(Strategy::select("jon", "john"), Strategy::Plain);
    }

    #[test]
    fn short_tokens_use_partial_matching() {
        // "ks" is a window of "ks city"
        assert_eq!(similarity("KS", "ks city"), 1.0);
        assert_eq!(similarity("J", "John"), 1.0);
    }

    #[test]
    fn plain_ratio_for_single_tokens() {
        // 2 * 3 / 7
        assert_eq!(similarity("Jon", "John"), 0.86);
    }

    #[test]
    fn token_set_ignores_order_and_duplicates() {
        assert_eq!(similarity("Smith John", "john smith"), 1.0);
        assert_eq!(similarity("john john smith", "smith john"), 1.0);
        assert_eq!(similarity("Smith-Jones", "jones smith"), 1.0);
    }

    #[test]
    fn token_set_scores_partial_overlap() {
        // "smith jon" vs "smith john": 18 / 19
        assert_eq!(similarity("Jon Smith", "John Smith"), 0.95);
    }

    #[test]
    fn punctuation_only_tokens() {
        assert_eq!(token_set_ratio("- -", "- -"), 1.0);
        assert_eq!(token_set_ratio("- -", "a b"), 0.0);
    }

    #[test]
    fn scores_are_rounded_to_percent() {
        let score = similarity("Jonathan", "Johnathan");
        assert_eq!(score, (score * 100.0).round() / 100.0);
    }
}
