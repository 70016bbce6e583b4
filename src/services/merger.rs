//! Priority-tier merge of per-provider restaurant results.
//!
//! The first tier is taken as-is. Records from each later tier are dropped when
//! they duplicate something already admitted, and otherwise admitted only if
//! they carry a real image or the output is still short. The result is
//! truncated once, at the end, so earlier tiers always keep their slots.

use crate::models::RestaurantRecord;

use super::similarity::is_duplicate;

/// Maximum number of restaurants returned from a search
pub const MAX_RESULTS: usize = 5;

/// Below this many admitted records, supplementary records are admitted without images
pub const MIN_RESULTS_WITHOUT_IMAGES: usize = 3;

/// File name that marks a generated, non-real image URL
pub const PLACEHOLDER_IMAGE: &str = "placeholder.jpg";

/// Merges a primary and a secondary tier
pub fn merge_results(
    primary: Vec<RestaurantRecord>,
    secondary: Vec<RestaurantRecord>,
) -> Vec<RestaurantRecord> {
    merge_tiers(vec![primary, secondary])
}

/// Merges any number of tiers, highest priority first
///
/// Records inside the seeding tier are never deduplicated against each other.
pub fn merge_tiers(tiers: Vec<Vec<RestaurantRecord>>) -> Vec<RestaurantRecord> {
    let mut tiers = tiers.into_iter();
    let mut merged = tiers.next().unwrap_or_default();

    for tier in tiers {
        admit_supplementary(&mut merged, tier);
    }

    merged.truncate(MAX_RESULTS);
    merged
}

/// Appends the candidates that pass the duplicate check and the inclusion rule
///
/// The "fewer than three so far" condition is evaluated against the output as
/// it grows, so admission depends on candidate order.
fn admit_supplementary(merged: &mut Vec<RestaurantRecord>, candidates: Vec<RestaurantRecord>) {
    for candidate in candidates {
        if is_duplicate(&candidate, merged) {
            tracing::debug!(
                name = %candidate.name,
                city = %candidate.city,
                "Dropping duplicate restaurant"
            );
            continue;
        }

        if has_real_image(&candidate) || merged.len() < MIN_RESULTS_WITHOUT_IMAGES {
            merged.push(candidate);
        } else {
            tracing::debug!(
                name = %candidate.name,
                admitted = merged.len(),
                "Dropping supplementary restaurant without real images"
            );
        }
    }
}

/// True when the record has at least one non-empty, non-placeholder image URL
///
/// URLs are compared as given; whitespace is not trimmed.
pub fn has_real_image(record: &RestaurantRecord) -> bool {
    record.images.iter().any(|url| is_real_image_url(url))
}

fn is_real_image_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    let path = url.split(|c| c == '?' || c == '#').next().unwrap_or(url);
    !path.ends_with(PLACEHOLDER_IMAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, city: &str) -> RestaurantRecord {
        RestaurantRecord::new(name, city)
    }

    fn names(records: &[RestaurantRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_duplicate_filtered_and_real_image_admitted() {
        let primary = vec![record("Nobu", "Dubai"), record("Zuma", "Dubai")];
        let secondary = vec![
            record("nobu", "dubai"),
            record("Cafe X", "Dubai").with_images(["http://x/real.jpg"]),
        ];

        let merged = merge_results(primary, secondary);
        assert_eq!(names(&merged), vec!["Nobu", "Zuma", "Cafe X"]);
    }

    #[test]
    fn test_imageless_secondary_capped_at_three() {
        let secondary: Vec<_> = ["Alpha", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot"]
            .iter()
            .map(|name| record(name, "Dubai"))
            .collect();

        let merged = merge_results(Vec::new(), secondary);
        assert_eq!(names(&merged), vec!["Alpha", "Bravo", "Charlie"]);
    }

    #[test]
    fn test_placeholder_image_does_not_count() {
        let primary = vec![
            record("Nobu", "Dubai"),
            record("Zuma", "Dubai"),
            record("Coya", "Dubai"),
        ];
        let secondary =
            vec![record("Cafe X", "Dubai")
                .with_images(["https://cafex.com/images/gallery1/placeholder.jpg"])];

        let merged = merge_results(primary, secondary);
        assert_eq!(names(&merged), vec!["Nobu", "Zuma", "Coya"]);
    }

    #[test]
    fn test_output_never_exceeds_five() {
        let primary: Vec<_> = (0..4).map(|i| record(&format!("Primary {i}"), "Dubai")).collect();
        let secondary: Vec<_> = (0..4)
            .map(|i| {
                record(&format!("Other {i}"), "Dubai")
                    .with_images([format!("https://img.example/{i}.jpg")])
            })
            .collect();

        let merged = merge_results(primary, secondary);
        assert_eq!(merged.len(), MAX_RESULTS);
        assert_eq!(
            names(&merged),
            vec!["Primary 0", "Primary 1", "Primary 2", "Primary 3", "Other 0"]
        );
    }

    #[test]
    fn test_primary_records_win_all_slots() {
        let primary: Vec<_> = (0..7).map(|i| record(&format!("Primary {i}"), "Dubai")).collect();
        let secondary = vec![record("Cafe X", "Dubai").with_images(["https://x/real.jpg"])];

        let merged = merge_results(primary, secondary);
        assert_eq!(
            names(&merged),
            vec!["Primary 0", "Primary 1", "Primary 2", "Primary 3", "Primary 4"]
        );
    }

    #[test]
    fn test_primary_duplicates_pass_through() {
        let primary = vec![record("Nobu", "Dubai"), record("Nobu", "Dubai")];

        let merged = merge_results(primary, Vec::new());
        assert_eq!(names(&merged), vec!["Nobu", "Nobu"]);
    }

    #[test]
    fn test_secondary_dedups_against_admitted_secondary() {
        let secondary = vec![record("Nobu", "Dubai"), record("NOBU", "dubai")];

        let merged = merge_results(Vec::new(), secondary);
        assert_eq!(names(&merged), vec!["Nobu"]);
    }

    #[test]
    fn test_imageless_secondary_admitted_regardless_of_city() {
        let primary = vec![record("Nobu", "Dubai")];
        let secondary = vec![record("Hakkasan", "Abu Dhabi")];

        let merged = merge_results(primary, secondary);
        assert_eq!(names(&merged), vec!["Nobu", "Hakkasan"]);
    }

    #[test]
    fn test_same_name_other_city_is_not_duplicate() {
        let primary = vec![record("Nobu", "Dubai")];
        let secondary = vec![record("Nobu", "London")];

        let merged = merge_results(primary, secondary);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].city, "London");
    }

    #[test]
    fn test_empty_tiers() {
        assert!(merge_results(Vec::new(), Vec::new()).is_empty());
        assert!(merge_tiers(Vec::new()).is_empty());
    }

    #[test]
    fn test_single_tier_is_truncated() {
        let only: Vec<_> = (0..8).map(|i| record(&format!("R {i}"), "Dubai")).collect();
        assert_eq!(merge_tiers(vec![only]).len(), MAX_RESULTS);
    }

    #[test]
    fn test_three_tiers_apply_rule_in_priority_order() {
        let first = vec![record("Nobu", "Dubai")];
        let second = vec![record("Zuma", "Dubai"), record("nobu", "Dubai")];
        let third = vec![
            record("zuma", "dubai").with_images(["https://x/zuma.jpg"]),
            record("Coya", "Dubai"),
            record("Tresind", "Dubai"),
        ];

        let merged = merge_tiers(vec![first, second, third]);
        assert_eq!(names(&merged), vec!["Nobu", "Zuma", "Coya"]);
    }

    #[test]
    fn test_has_real_image() {
        assert!(!has_real_image(&record("A", "B")));
        assert!(!has_real_image(&record("A", "B").with_images(["", ""])));
        assert!(has_real_image(&record("A", "B").with_images(["  "])));
        assert!(has_real_image(
            &record("A", "B").with_images(["https://a.com/placeholder.jpg "])
        ));
        assert!(!has_real_image(
            &record("A", "B").with_images(["https://a.com/placeholder.jpg?w=500"])
        ));
        assert!(has_real_image(&record("A", "B").with_images([
            "https://a.com/placeholder.jpg",
            "https://a.com/terrace.jpg"
        ])));
        assert!(has_real_image(
            &record("A", "B").with_images(["https://a.com/placeholder.jpg.webp"])
        ));
    }
}
