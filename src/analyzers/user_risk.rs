//! At-risk user selection, detection classification, and per-user
//! aggregation.
//!
//! Selection requires BOTH predicates: `Risk state == "At risk"` and
//! `Risk level == "High"`. Detection types outside the configured
//! vocabulary are excluded from the important-detections view but
//! still count toward each user's incident total.

use crate::config::{LimitsConfig, VocabularyConfig};
use crate::core::ranking::top_n;
use crate::core::{Dataset, ImportantDetection, Record, RiskUser, UserRiskReport};
use crate::errors::EngineError;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Columns this analyzer reads from the user-detections export.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "Risk state",
    "Risk level",
    "Detection type",
    "User",
    "UPN",
    "Location",
];

fn is_at_risk_high(row: &Record) -> bool {
    row.str_field("Risk state") == Some("At risk") && row.str_field("Risk level") == Some("High")
}

/// Most frequent detection type among a user's rows. Ties are broken
/// by lexical minimum so the result is reproducible across runs.
fn most_prominent_detection(detections: &[&str]) -> Option<String> {
    let mut frequency: BTreeMap<&str, usize> = BTreeMap::new();
    for detection in detections {
        *frequency.entry(*detection).or_insert(0) += 1;
    }
    // BTreeMap iterates keys ascending; strictly-greater keeps the
    // lexically smallest of the equally-most-frequent types.
    frequency
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (key, count)| {
            match best {
                Some((_, best_count)) if count <= best_count => best,
                _ => Some((key, count)),
            }
        })
        .map(|(key, _)| key.to_string())
}

/// Analyze the user-detections dataset into its report section.
pub fn analyze(
    dataset: &Dataset,
    vocabulary: &VocabularyConfig,
    limits: &LimitsConfig,
) -> Result<UserRiskReport, EngineError> {
    dataset.require_columns(REQUIRED_COLUMNS)?;

    let at_risk: Vec<&Record> = dataset.rows.iter().filter(|r| is_at_risk_high(r)).collect();

    let important: HashSet<&str> = vocabulary
        .important_detections
        .iter()
        .map(String::as_str)
        .collect();
    let important_detections: Vec<ImportantDetection> = at_risk
        .iter()
        .filter_map(|row| {
            let detection_type = row.trimmed_field("Detection type")?;
            important.contains(detection_type).then(|| ImportantDetection {
                user: row.trimmed_field("User").unwrap_or("").to_string(),
                detection_type: detection_type.to_string(),
            })
        })
        .collect();

    // Group by UPN in first-seen order; rows without a UPN cannot be
    // aggregated and are skipped.
    let mut order: Vec<&str> = Vec::new();
    let mut grouped: HashMap<&str, Vec<&Record>> = HashMap::new();
    for row in &at_risk {
        let Some(upn) = row.trimmed_field("UPN") else {
            continue;
        };
        grouped
            .entry(upn)
            .or_insert_with(|| {
                order.push(upn);
                Vec::new()
            })
            .push(*row);
    }

    let users: Vec<RiskUser> = order
        .iter()
        .filter_map(|upn| {
            let rows = grouped.get(upn)?;
            let first = rows.first()?;
            let detections: Vec<&str> = rows
                .iter()
                .filter_map(|r| r.trimmed_field("Detection type"))
                .collect();
            Some(RiskUser {
                user: first.trimmed_field("User").unwrap_or("").to_string(),
                upn: upn.to_string(),
                risk_level: first.trimmed_field("Risk level").unwrap_or("").to_string(),
                location: first.trimmed_field("Location").map(str::to_string),
                detection_types: detections.iter().map(|d| d.to_string()).collect::<BTreeSet<_>>(),
                incident_count: rows.len(),
                most_prominent_detection: most_prominent_detection(&detections),
            })
        })
        .collect();

    let top_users = top_n(&users, |u| u.incident_count as f64, limits.top_risk_users);

    log::debug!(
        "user risk: {} at-risk detections across {} users, {} important",
        at_risk.len(),
        users.len(),
        important_detections.len()
    );

    Ok(UserRiskReport {
        total_at_risk_detections: at_risk.len(),
        important_detections,
        users,
        top_users,
    })
}
