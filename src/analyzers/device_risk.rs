//! Device inventory groupings and high-risk device selection.
//!
//! The two surfaced device lists are filtered in inventory order and
//! head-truncated; they are never ranked by risk magnitude.

use crate::config::LimitsConfig;
use crate::core::ranking::head;
use crate::core::{Dataset, DeviceRiskReport, Record, RiskDevice};
use crate::errors::EngineError;
use std::collections::BTreeMap;

/// Columns this analyzer reads from the device inventory export.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "Device ID",
    "OS Platform",
    "Domain",
    "OS Version",
    "Risk Level",
    "Health Status",
    "Exposure Level",
    "Device Name",
];

/// Count rows per non-null key, counting only rows whose value column
/// is also present (the export's inventory-count semantics).
fn grouped_count(rows: &[Record], key_column: &str, value_column: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        let Some(key) = row.trimmed_field(key_column) else {
            continue;
        };
        if row.get(value_column).is_null() {
            continue;
        }
        *counts.entry(key.to_string()).or_insert(0) += 1;
    }
    counts
}

fn build_device(row: &Record) -> RiskDevice {
    RiskDevice {
        device_name: row.trimmed_field("Device Name").unwrap_or("").to_string(),
        risk_level: row.trimmed_field("Risk Level").unwrap_or("").to_string(),
        exposure_level: row.trimmed_field("Exposure Level").map(str::to_string),
        health_status: row.trimmed_field("Health Status").map(str::to_string),
        os_platform: row.trimmed_field("OS Platform").map(str::to_string),
        domain: row.trimmed_field("Domain").map(str::to_string),
    }
}

fn health_count(rows: &[Record], status: &str) -> usize {
    rows.iter()
        .filter(|r| r.str_field("Health Status") == Some(status))
        .count()
}

/// Analyze the device inventory into its report section.
pub fn analyze(dataset: &Dataset, limits: &LimitsConfig) -> Result<DeviceRiskReport, EngineError> {
    dataset.require_columns(REQUIRED_COLUMNS)?;
    let rows = &dataset.rows;

    let os_summary = grouped_count(rows, "OS Platform", "Device ID");
    // Non-null OS Version cells per domain: a patch inventory count.
    let patch_summary = grouped_count(rows, "Domain", "OS Version");
    let risk_summary = grouped_count(rows, "Risk Level", "Device ID");

    let high_risk: Vec<RiskDevice> = rows
        .iter()
        .filter(|r| r.str_field("Risk Level") == Some("High"))
        .map(build_device)
        .collect();

    let high_risk_active: Vec<RiskDevice> = high_risk
        .iter()
        .filter(|d| d.health_status.as_deref() == Some("Active"))
        .cloned()
        .collect();

    let high_risk_high_exposure: Vec<RiskDevice> = high_risk
        .iter()
        .filter(|d| d.exposure_level.as_deref() == Some("High"))
        .cloned()
        .collect();

    log::debug!(
        "device risk: {} devices, {} high risk ({} active)",
        rows.len(),
        high_risk.len(),
        high_risk_active.len()
    );

    Ok(DeviceRiskReport {
        os_summary,
        patch_summary,
        risk_summary,
        active_count: health_count(rows, "Active"),
        inactive_count: health_count(rows, "Inactive"),
        high_risk_active_count: high_risk_active.len(),
        high_risk,
        high_risk_active: head(&high_risk_active, limits.high_risk_device_head),
        high_risk_high_exposure: head(
            &high_risk_high_exposure,
            limits.high_exposure_device_head,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use pretty_assertions::assert_eq;

    fn devices_dataset(rows: Vec<Record>) -> Dataset {
        Dataset::new(
            "devices",
            REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        )
    }

    fn device_row(
        name: &str,
        platform: &str,
        domain: &str,
        os_version: Option<&str>,
        risk: &str,
        health: &str,
        exposure: &str,
    ) -> Record {
        Record::from([
            ("Device ID", Value::Str(format!("id-{name}"))),
            ("Device Name", Value::Str(name.to_string())),
            ("OS Platform", Value::Str(platform.to_string())),
            ("Domain", Value::Str(domain.to_string())),
            (
                "OS Version",
                os_version.map_or(Value::Null, |v| Value::Str(v.to_string())),
            ),
            ("Risk Level", Value::Str(risk.to_string())),
            ("Health Status", Value::Str(health.to_string())),
            ("Exposure Level", Value::Str(exposure.to_string())),
        ])
    }

    #[test]
    fn summaries_group_and_count() {
        let dataset = devices_dataset(vec![
            device_row("d1", "Windows 11", "corp", Some("10.0.1"), "High", "Active", "Low"),
            device_row("d2", "Windows 11", "corp", None, "Low", "Active", "Low"),
            device_row("d3", "Linux", "dmz", Some("6.1"), "Medium", "Inactive", "Low"),
        ]);
        let report = analyze(&dataset, &LimitsConfig::default()).unwrap();

        assert_eq!(report.os_summary["Windows 11"], 2);
        assert_eq!(report.os_summary["Linux"], 1);
        // d2 has no OS Version cell, so corp counts one patch entry.
        assert_eq!(report.patch_summary["corp"], 1);
        assert_eq!(report.patch_summary["dmz"], 1);
        assert_eq!(report.risk_summary["High"], 1);
        assert_eq!(report.active_count, 2);
        assert_eq!(report.inactive_count, 1);
    }

    #[test]
    fn high_risk_active_is_filtered_then_truncated_not_ranked() {
        let mut rows = Vec::new();
        for i in 0..20 {
            rows.push(device_row(
                &format!("d{i}"),
                "Windows 11",
                "corp",
                Some("10.0"),
                "High",
                "Active",
                "Low",
            ));
        }
        rows.push(device_row("inactive", "Windows 11", "corp", None, "High", "Inactive", "Low"));
        let dataset = devices_dataset(rows);
        let report = analyze(&dataset, &LimitsConfig::default()).unwrap();

        assert_eq!(report.high_risk_active_count, 20);
        assert_eq!(report.high_risk_active.len(), 15);
        // Inventory order preserved: a plain head, not a ranking.
        assert_eq!(report.high_risk_active[0].device_name, "d0");
        assert_eq!(report.high_risk_active[14].device_name, "d14");
        // The full high-risk set still carries the inactive device.
        assert_eq!(report.high_risk.len(), 21);
    }

    #[test]
    fn high_exposure_list_requires_both_high_values() {
        let dataset = devices_dataset(vec![
            device_row("d1", "W", "corp", None, "High", "Active", "High"),
            device_row("d2", "W", "corp", None, "High", "Active", "Medium"),
            device_row("d3", "W", "corp", None, "Low", "Active", "High"),
        ]);
        let report = analyze(&dataset, &LimitsConfig::default()).unwrap();
        assert_eq!(report.high_risk_high_exposure.len(), 1);
        assert_eq!(report.high_risk_high_exposure[0].device_name, "d1");
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let dataset = Dataset::new("devices", vec!["Device ID".to_string()], vec![]);
        let err = analyze(&dataset, &LimitsConfig::default()).unwrap_err();
        assert_eq!(err, EngineError::schema("devices", "OS Platform"));
    }
}
