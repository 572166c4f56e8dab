//! Fuzzy key resolution.
//!
//! Similarity is the character-level diff ratio `2 * M / T`, where `M` is the
//! number of matched characters and `T` the combined length of both strings,
//! computed on normalized text.
//!
//! # Invariants
//! - A candidate matches only when its score is >= `FUZZY_MATCH_CUTOFF`.
//! - Exactly one key is ever returned. Ties on the best score resolve to the
//!   lexicographically smallest key, so the result never depends on the
//!   order candidates are supplied in.

use crate::matching::normalize::normalize_key;
use similar::TextDiff;

/// Minimum similarity (0.0..=1.0) for a fuzzy hit.
pub const FUZZY_MATCH_CUTOFF: f32 = 0.8;

/// Best-scoring candidate for a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyMatch<'a> {
    /// Candidate key as supplied (original casing).
    pub key: &'a str,
    /// Similarity in `0.0..=1.0`.
    pub score: f32,
}

/// Similarity of two strings after normalization.
pub fn similarity(left: &str, right: &str) -> f32 {
    normalized_similarity(&normalize_key(left), &normalize_key(right))
}

fn normalized_similarity(left: &str, right: &str) -> f32 {
    TextDiff::from_chars(left, right).ratio()
}

/// Returns the single best candidate at or above the cutoff, with its score.
pub fn find_closest_match<'a, I>(query: &str, candidates: I) -> Option<KeyMatch<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized_query = normalize_key(query);
    if normalized_query.is_empty() {
        return None;
    }

    let mut best: Option<KeyMatch<'a>> = None;
    for key in candidates {
        let score = normalized_similarity(&normalized_query, &normalize_key(key));
        if score < FUZZY_MATCH_CUTOFF {
            continue;
        }
        let replaces = match best {
            None => true,
            Some(current) => score > current.score || (score == current.score && key < current.key),
        };
        if replaces {
            best = Some(KeyMatch { key, score });
        }
    }
    best
}

/// Returns the single best candidate key at or above the cutoff.
pub fn find_closest_key<'a, I>(query: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    find_closest_match(query, candidates).map(|found| found.key)
}

/// Fast path for additive operations: exact match on normalized text.
///
/// A verbatim match wins over a case/whitespace-only match; among several
/// normalized matches the lexicographically smallest key is returned.
pub fn find_exact_key<'a, I>(query: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized_query = normalize_key(query);
    if normalized_query.is_empty() {
        return None;
    }

    let mut best: Option<&'a str> = None;
    for key in candidates {
        if key == query {
            return Some(key);
        }
        if normalize_key(key) == normalized_query && best.map_or(true, |current| key < current) {
            best = Some(key);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::{find_closest_key, find_closest_match, find_exact_key, similarity};

    #[test]
    fn score_at_cutoff_matches() {
        // 4 shared chars over 10 total: exactly 0.8.
        assert_eq!(similarity("apply", "apple"), 0.8);
        assert_eq!(find_closest_key("apply", ["apple"]), Some("apple"));
    }

    #[test]
    fn score_just_below_cutoff_misses() {
        // 3 shared chars over 8 total: 0.75.
        assert_eq!(similarity("mink", "milk"), 0.75);
        assert_eq!(find_closest_key("mink", ["milk"]), None);
    }

    #[test]
    fn comparison_is_case_and_whitespace_insensitive() {
        let found = find_closest_match("  Peanut BUTTER ", ["peanut butter", "butter"])
            .expect("normalized match");
        assert_eq!(found.key, "peanut butter");
        assert_eq!(found.score, 1.0);
    }

    #[test]
    fn highest_score_wins() {
        assert_eq!(
            find_closest_key("batteries", ["battery", "batteries aa", "batteries"]),
            Some("batteries")
        );
    }

    #[test]
    fn ties_resolve_to_smallest_key_regardless_of_order() {
        let forward = find_closest_key("plate", ["plata", "plato"]);
        let backward = find_closest_key("plate", ["plato", "plata"]);
        assert_eq!(forward, Some("plata"));
        assert_eq!(backward, Some("plata"));
    }

    #[test]
    fn empty_inputs_never_match() {
        assert_eq!(find_closest_key("", ["milk"]), None);
        assert_eq!(find_closest_key("milk", Vec::<&str>::new()), None);
    }

    #[test]
    fn exact_lookup_prefers_verbatim_key() {
        assert_eq!(find_exact_key("Milk", ["milk", "Milk"]), Some("Milk"));
        assert_eq!(find_exact_key("MILK ", ["Milk", "milk"]), Some("Milk"));
        assert_eq!(find_exact_key("milks", ["milk"]), None);
    }
}
