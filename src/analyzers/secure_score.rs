//! Secure-score normalization: fraction parsing, per-record status,
//! category and product aggregation, and the top-actions ranking.

use crate::config::{LimitsConfig, VocabularyConfig};
use crate::core::ranking::top_n;
use crate::core::{
    CategoryAggregate, Dataset, ProductDeployment, ScoreEntry, ScoreStatus, SecureScoreReport,
};
use crate::errors::EngineError;

/// Columns this analyzer reads from the secure-score export.
pub const REQUIRED_COLUMNS: &[&str] =
    &["Points achieved", "Category", "Recommended action", "Product"];

/// Parse an "achieved/possible" points string into a numeric pair.
///
/// Stray quotes and spaces are stripped. Empty, absent, or malformed
/// input (wrong token count, non-numeric halves, zero denominator)
/// yields `(0.0, 0.0)`. Failure is absorbed here, never propagated;
/// downstream aggregation treats the zero pair like any other.
pub fn parse_points(raw: Option<&str>) -> (f64, f64) {
    let cleaned = match raw {
        Some(s) => s.trim().replace(['"', ' '], ""),
        None => return (0.0, 0.0),
    };
    if cleaned.is_empty() {
        return (0.0, 0.0);
    }

    let mut halves = cleaned.split('/');
    match (halves.next(), halves.next(), halves.next()) {
        (Some(num), Some(den), None) => match (num.parse::<f64>(), den.parse::<f64>()) {
            (Ok(achieved), Ok(possible)) if possible != 0.0 => (achieved, possible),
            _ => (0.0, 0.0),
        },
        _ => (0.0, 0.0),
    }
}

/// Build one `ScoreEntry` per record.
///
/// Status is `Completed` iff `achieved == possible` exactly, no
/// epsilon. A record whose fraction failed to parse carries 0/0 and is
/// therefore `Completed`; that degenerate case is intentional.
pub fn build_entries(dataset: &Dataset) -> Vec<ScoreEntry> {
    dataset
        .rows
        .iter()
        .map(|row| {
            let (achieved, possible) = parse_points(row.str_field("Points achieved"));
            let status = if achieved == possible {
                ScoreStatus::Completed
            } else {
                ScoreStatus::ToAddress
            };
            ScoreEntry {
                recommended_action: row.trimmed_field("Recommended action").unwrap_or("").to_string(),
                category: row.trimmed_field("Category").unwrap_or("").to_string(),
                product: row.trimmed_field("Product").unwrap_or("").to_string(),
                achieved,
                possible,
                status,
                difference: possible - achieved,
            }
        })
        .collect()
}

/// Percentage of `achieved` over `possible`.
///
/// Zero-denominator policy: an aggregate whose possible sum is 0 has no
/// meaningful completion ratio; both its percentages are reported as
/// 0.0 rather than NaN or a failure. Pinned by tests.
fn percentage(achieved: f64, possible: f64) -> f64 {
    if possible == 0.0 {
        0.0
    } else {
        achieved / possible * 100.0
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Sum achieved/possible per group key, preserving first-seen group
/// order.
fn sum_by_key<F>(entries: &[ScoreEntry], key: F) -> Vec<(String, f64, f64)>
where
    F: Fn(&ScoreEntry) -> &str,
{
    let mut order: Vec<String> = Vec::new();
    let mut sums: std::collections::HashMap<String, (f64, f64)> = std::collections::HashMap::new();
    for entry in entries {
        let group = key(entry).to_string();
        let slot = sums.entry(group.clone()).or_insert_with(|| {
            order.push(group.clone());
            (0.0, 0.0)
        });
        slot.0 += entry.achieved;
        slot.1 += entry.possible;
    }
    order
        .into_iter()
        .map(|group| {
            let (achieved, possible) = sums[&group];
            (group, achieved, possible)
        })
        .collect()
}

/// Aggregate entries by category, ordered by the configured fixed
/// category order; categories outside it sort alphabetically after the
/// fixed list.
pub fn aggregate_categories(
    entries: &[ScoreEntry],
    vocabulary: &VocabularyConfig,
) -> Vec<CategoryAggregate> {
    let mut aggregates: Vec<CategoryAggregate> = sum_by_key(entries, |e| &e.category)
        .into_iter()
        .map(|(category, achieved_sum, possible_sum)| {
            let completed_pct = percentage(achieved_sum, possible_sum);
            let to_address_pct = if possible_sum == 0.0 {
                0.0
            } else {
                100.0 - completed_pct
            };
            CategoryAggregate {
                category,
                achieved_sum,
                possible_sum,
                completed_pct,
                to_address_pct,
            }
        })
        .collect();

    let fixed = &vocabulary.category_order;
    aggregates.sort_by(|a, b| {
        let rank = |category: &str| {
            fixed
                .iter()
                .position(|c| c == category)
                .unwrap_or(fixed.len())
        };
        rank(&a.category)
            .cmp(&rank(&b.category))
            .then_with(|| a.category.cmp(&b.category))
    });
    aggregates
}

/// Analyze the secure-score dataset into its report section.
pub fn analyze(
    dataset: &Dataset,
    vocabulary: &VocabularyConfig,
    limits: &LimitsConfig,
) -> Result<SecureScoreReport, EngineError> {
    dataset.require_columns(REQUIRED_COLUMNS)?;

    let entries = build_entries(dataset);
    let categories = aggregate_categories(&entries, vocabulary);

    // Overall completion is the ratio of total sums, not an average of
    // the category percentages.
    let total_achieved: f64 = entries.iter().map(|e| e.achieved).sum();
    let total_possible: f64 = entries.iter().map(|e| e.possible).sum();
    let overall_completed_pct = round1(percentage(total_achieved, total_possible));
    let overall_to_address_pct = if total_possible == 0.0 {
        0.0
    } else {
        round1(100.0 - overall_completed_pct)
    };

    let top_actions = top_n(&entries, |e| e.difference, limits.top_score_actions);

    log::debug!(
        "secure score: {} entries, {} categories, overall {:.1}% complete",
        entries.len(),
        categories.len(),
        overall_completed_pct
    );

    Ok(SecureScoreReport {
        overall_completed_pct,
        overall_to_address_pct,
        categories,
        top_actions,
    })
}

/// Group the same score dataset by product into deployment percentages.
/// Group order is first-seen; no fixed ordering applies to products.
pub fn product_deployment(dataset: &Dataset) -> Result<Vec<ProductDeployment>, EngineError> {
    dataset.require_columns(REQUIRED_COLUMNS)?;

    let entries = build_entries(dataset);
    Ok(sum_by_key(&entries, |e| &e.product)
        .into_iter()
        .map(|(product, achieved_sum, possible_sum)| ProductDeployment {
            product,
            achieved_sum,
            possible_sum,
            deployment_pct: percentage(achieved_sum, possible_sum),
        })
        .collect())
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn parsed_fractions_never_invert(num in 0.0..1000.0f64, den in 0.1..1000.0f64) {
            // Well-formed export fractions always satisfy achieved <= possible.
            let raw = format!("{}/{}", num.min(den), den);
            let (achieved, possible) = parse_points(Some(&raw));
            prop_assert!(achieved <= possible);
        }

        #[test]
        fn parse_points_zero_denominator_always_zeroes_both(raw in ".*") {
            let (achieved, possible) = parse_points(Some(&raw));
            if possible == 0.0 {
                prop_assert_eq!(achieved, 0.0);
            }
        }

        #[test]
        fn percentage_is_bounded_for_valid_fractions(achieved in 0.0..100.0f64, possible in 0.1..100.0f64) {
            let pct = percentage(achieved.min(possible), possible);
            prop_assert!((0.0..=100.0).contains(&pct));
        }
    }
}
