//! Name/city matching used to decide whether two search hits are the same place.

use std::collections::HashSet;

use crate::models::RestaurantRecord;

/// Name similarity must be strictly above this for two records to match
pub const DUPLICATE_SIMILARITY_THRESHOLD: f64 = 0.7;

/// Jaccard similarity of the lower-cased, whitespace-split word sets of two names
///
/// Returns 0.0 when either name has no words. Punctuation is kept, so
/// "Nobu," and "Nobu" are different words.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();

    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();

    intersection as f64 / union as f64
}

/// True when both records name the same place: similar names in the same city
pub fn is_same_place(a: &RestaurantRecord, b: &RestaurantRecord) -> bool {
    similarity(&a.name, &b.name) > DUPLICATE_SIMILARITY_THRESHOLD
        && a.city.to_lowercase() == b.city.to_lowercase()
}

/// True when `candidate` matches any single record in `existing`
pub fn is_duplicate(candidate: &RestaurantRecord, existing: &[RestaurantRecord]) -> bool {
    existing.iter().any(|record| is_same_place(candidate, record))
}
