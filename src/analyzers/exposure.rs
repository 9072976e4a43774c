//! Vulnerability-management recommendations: activity counts, mean
//! exposure-score impact, and the top-impact ranking.

use crate::config::LimitsConfig;
use crate::core::ranking::top_n;
use crate::core::{Dataset, ExposureRecommendation, ExposureReport, Record};
use crate::errors::EngineError;

/// Columns this analyzer reads from the vulnerability export.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "Status",
    "Exposure Score impact",
    "Security recommendation",
    "Exposed Machines",
    "Total Machines",
];

fn build_recommendation(row: &Record) -> ExposureRecommendation {
    ExposureRecommendation {
        recommendation: row
            .trimmed_field("Security recommendation")
            .unwrap_or("")
            .to_string(),
        impact: row.num_field("Exposure Score impact"),
        exposed_machines: row.num_field("Exposed Machines"),
        total_machines: row.num_field("Total Machines"),
    }
}

/// Analyze the vulnerability/exposure dataset into its report section.
///
/// The mean impact is taken over rows that carry the value; an export
/// with none reports 0.0, matching the engine's zero-denominator
/// policy. Only `Status == "Active"` rows are ranked; rows without an
/// impact value rank below every row that has one.
pub fn analyze(dataset: &Dataset, limits: &LimitsConfig) -> Result<ExposureReport, EngineError> {
    dataset.require_columns(REQUIRED_COLUMNS)?;

    let impacts: Vec<f64> = dataset
        .rows
        .iter()
        .filter_map(|row| row.num_field("Exposure Score impact"))
        .collect();
    let exposure_score_avg = if impacts.is_empty() {
        0.0
    } else {
        let avg = impacts.iter().sum::<f64>() / impacts.len() as f64;
        (avg * 100.0).round() / 100.0
    };

    let active: Vec<ExposureRecommendation> = dataset
        .rows
        .iter()
        .filter(|row| row.str_field("Status") == Some("Active"))
        .map(build_recommendation)
        .collect();

    let top_recommendations = top_n(
        &active,
        |r| r.impact.unwrap_or(f64::NEG_INFINITY),
        limits.top_exposure_recommendations,
    );

    log::debug!(
        "exposure: {} recommendations, {} active, avg impact {:.2}",
        dataset.len(),
        active.len(),
        exposure_score_avg
    );

    Ok(ExposureReport {
        total_recommendations: dataset.len(),
        active_recommendations: active.len(),
        exposure_score_avg,
        top_recommendations,
    })
}
