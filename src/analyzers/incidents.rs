//! Incident queue ingestion: summary head, per-severity counts.
//!
//! Severity strings are counted literally: `"high"` and `"High"` are
//! different severities here, because the incident export and the
//! risk-level vocabulary come from different upstream tools.

use crate::config::LimitsConfig;
use crate::core::ranking::head;
use crate::core::{Dataset, Incident};
use crate::correlation::extract_assets;
use crate::errors::EngineError;
use std::collections::BTreeMap;

/// Columns this analyzer reads from the incident queue export.
pub const REQUIRED_COLUMNS: &[&str] = &["Incident name", "Severity", "Impacted assets", "Tags"];

/// Build one `Incident` per row, with identities extracted from the
/// impacted-assets free text.
pub fn build_incidents(dataset: &Dataset) -> Result<Vec<Incident>, EngineError> {
    dataset.require_columns(REQUIRED_COLUMNS)?;

    Ok(dataset
        .rows
        .iter()
        .map(|row| {
            let impacted_assets = row.str_field("Impacted assets").unwrap_or("").to_string();
            let (extracted_upns, extracted_users) = extract_assets(&impacted_assets);
            Incident {
                name: row.trimmed_field("Incident name").unwrap_or("").to_string(),
                severity: row.trimmed_field("Severity").unwrap_or("").to_string(),
                impacted_assets,
                tags: row.trimmed_field("Tags").map(str::to_string),
                extracted_upns,
                extracted_users,
            }
        })
        .collect())
}

/// First N incidents in queue order.
pub fn summary(incidents: &[Incident], limits: &LimitsConfig) -> Vec<Incident> {
    head(incidents, limits.incident_summary_head)
}

/// Count incidents per literal severity string. No case normalization.
pub fn severity_counts(incidents: &[Incident]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for incident in incidents {
        *counts.entry(incident.severity.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Record, Value};
    use pretty_assertions::assert_eq;

    fn incident_dataset(rows: Vec<Record>) -> Dataset {
        Dataset::new(
            "incidents",
            REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        )
    }

    fn incident_row(name: &str, severity: &str, assets: &str) -> Record {
        Record::from([
            ("Incident name", Value::Str(name.to_string())),
            ("Severity", Value::Str(severity.to_string())),
            ("Impacted assets", Value::Str(assets.to_string())),
            ("Tags", Value::Null),
        ])
    }

    #[test]
    fn build_extracts_identities_per_incident() {
        let dataset = incident_dataset(vec![incident_row(
            "inc-1",
            "high",
            "Accounts: a@x, b@x",
        )]);
        let incidents = build_incidents(&dataset).unwrap();
        assert_eq!(incidents[0].extracted_upns, vec!["a@x", "b@x"]);
        assert_eq!(incidents[0].extracted_users, vec!["a@x", "b@x"]);
    }

    #[test]
    fn severity_counts_are_case_sensitive() {
        let dataset = incident_dataset(vec![
            incident_row("1", "high", ""),
            incident_row("2", "High", ""),
            incident_row("3", "high", ""),
        ]);
        let incidents = build_incidents(&dataset).unwrap();
        let counts = severity_counts(&incidents);
        assert_eq!(counts["high"], 2);
        assert_eq!(counts["High"], 1);
    }

    #[test]
    fn summary_is_a_positional_head() {
        let rows: Vec<Record> = (0..15)
            .map(|i| incident_row(&format!("inc-{i}"), "low", ""))
            .collect();
        let dataset = incident_dataset(rows);
        let incidents = build_incidents(&dataset).unwrap();
        let first = summary(&incidents, &LimitsConfig::default());
        assert_eq!(first.len(), 10);
        assert_eq!(first[0].name, "inc-0");
        assert_eq!(first[9].name, "inc-9");
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let dataset = Dataset::new("incidents", vec!["Severity".to_string()], vec![]);
        let err = build_incidents(&dataset).unwrap_err();
        assert_eq!(err, EngineError::schema("incidents", "Incident name"));
    }
}
