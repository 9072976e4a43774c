//! End-to-end tests driving the whole engine through `analyze_posture`.

use pretty_assertions::assert_eq;
use riskmap::analyzers::{device_risk, exposure, incidents, secure_score, user_risk};
use riskmap::config::{LimitsConfig, RiskmapConfig};
use riskmap::{analyze_posture, CorrelationEdge, Dataset, EngineError, Record, TableSet, Value};

fn dataset(name: &str, columns: &[&str], rows: Vec<Record>) -> Dataset {
    Dataset::new(name, columns.iter().map(|c| c.to_string()).collect(), rows)
}

fn score_row(action: &str, category: &str, product: &str, points: &str) -> Record {
    Record::from([
        ("Recommended action", Value::Str(action.to_string())),
        ("Category", Value::Str(category.to_string())),
        ("Product", Value::Str(product.to_string())),
        ("Points achieved", Value::Str(points.to_string())),
    ])
}

fn detection_row(user: &str, upn: &str, detection: &str) -> Record {
    Record::from([
        ("User", Value::Str(user.to_string())),
        ("UPN", Value::Str(upn.to_string())),
        ("Risk state", Value::Str("At risk".to_string())),
        ("Risk level", Value::Str("High".to_string())),
        ("Detection type", Value::Str(detection.to_string())),
        ("Location", Value::Str("NL".to_string())),
    ])
}

fn device_row(name: &str, risk: &str, health: &str, exposure: &str) -> Record {
    Record::from([
        ("Device ID", Value::Str(format!("id-{name}"))),
        ("Device Name", Value::Str(name.to_string())),
        ("OS Platform", Value::Str("Windows 11".to_string())),
        ("Domain", Value::Str("corp".to_string())),
        ("OS Version", Value::Str("10.0".to_string())),
        ("Risk Level", Value::Str(risk.to_string())),
        ("Health Status", Value::Str(health.to_string())),
        ("Exposure Level", Value::Str(exposure.to_string())),
    ])
}

fn incident_row(name: &str, severity: &str, assets: &str) -> Record {
    Record::from([
        ("Incident name", Value::Str(name.to_string())),
        ("Severity", Value::Str(severity.to_string())),
        ("Impacted assets", Value::Str(assets.to_string())),
        ("Tags", Value::Null),
    ])
}

fn full_tables() -> TableSet {
    TableSet {
        secure_score: Some(dataset(
            "secure_score",
            secure_score::REQUIRED_COLUMNS,
            vec![
                score_row("Enable MFA", "Identity", "Entra", "5/10"),
                score_row("Block legacy auth", "Identity", "Entra", "10/10"),
            ],
        )),
        exposure: Some(dataset(
            "exposure",
            exposure::REQUIRED_COLUMNS,
            vec![Record::from([
                ("Status", Value::Str("Active".to_string())),
                ("Exposure Score impact", Value::Num(4.2)),
                (
                    "Security recommendation",
                    Value::Str("Update Chrome".to_string()),
                ),
                ("Exposed Machines", Value::Num(12.0)),
                ("Total Machines", Value::Num(40.0)),
            ])],
        )),
        user_detections: Some(dataset(
            "user_detections",
            user_risk::REQUIRED_COLUMNS,
            vec![
                detection_row("User One", "u1", "Password spray"),
                detection_row("User One", "u1", "Impossible travel"),
            ],
        )),
        devices: Some(dataset(
            "devices",
            device_risk::REQUIRED_COLUMNS,
            vec![
                device_row("host-1", "High", "Active", "High"),
                device_row("host-2", "Low", "Active", "Low"),
            ],
        )),
        incidents: Some(dataset(
            "incidents",
            incidents::REQUIRED_COLUMNS,
            vec![
                incident_row("inc-1", "high", "Accounts: u1, u2"),
                incident_row("inc-2", "medium", "Accounts: u1"),
            ],
        )),
    }
}

#[test]
fn identity_category_aggregates_to_seventy_five_percent() {
    let report = analyze_posture(&full_tables(), &RiskmapConfig::default()).unwrap();

    let identity = report
        .secure_score
        .categories
        .iter()
        .find(|c| c.category == "Identity")
        .expect("identity category present");
    assert_eq!(identity.achieved_sum, 15.0);
    assert_eq!(identity.possible_sum, 20.0);
    assert_eq!(identity.completed_pct, 75.0);
    assert_eq!(report.secure_score.overall_completed_pct, 75.0);
}

#[test]
fn high_severity_incident_correlates_against_flagged_user_only() {
    let report = analyze_posture(&full_tables(), &RiskmapConfig::default()).unwrap();

    // u1 is independently high-risk; u2 is not; inc-2 is not "high".
    let user_edges: Vec<_> = report
        .incidents
        .edges
        .iter()
        .filter(|e| matches!(e, CorrelationEdge::User { .. }))
        .collect();
    assert_eq!(user_edges.len(), 1);
    assert_eq!(
        user_edges[0],
        &CorrelationEdge::User {
            incident_name: "inc-1".to_string(),
            identity: "u1".to_string(),
            risk_level: "High".to_string(),
        }
    );
}

#[test]
fn severity_counts_keep_literal_strings() {
    let report = analyze_posture(&full_tables(), &RiskmapConfig::default()).unwrap();
    assert_eq!(report.incidents.severity_counts["high"], 1);
    assert_eq!(report.incidents.severity_counts["medium"], 1);
}

#[test]
fn user_risk_flows_into_the_report() {
    let report = analyze_posture(&full_tables(), &RiskmapConfig::default()).unwrap();

    assert_eq!(report.user_risk.users.len(), 1);
    let user = &report.user_risk.users[0];
    assert_eq!(user.upn, "u1");
    assert_eq!(user.incident_count, 2);
    // Both detections occur once; the lexically smaller type wins.
    assert_eq!(
        user.most_prominent_detection.as_deref(),
        Some("Impossible travel")
    );
    assert_eq!(report.user_risk.important_detections.len(), 2);
}

#[test]
fn device_risk_flows_into_the_report() {
    let report = analyze_posture(&full_tables(), &RiskmapConfig::default()).unwrap();

    assert_eq!(report.device_risk.high_risk.len(), 1);
    assert_eq!(report.device_risk.high_risk_active_count, 1);
    assert_eq!(report.device_risk.high_risk_high_exposure.len(), 1);
    assert_eq!(report.device_risk.active_count, 2);
    assert_eq!(report.exposure.active_recommendations, 1);
    assert_eq!(report.exposure.exposure_score_avg, 4.2);
}

#[test]
fn missing_datasets_fail_fast_listing_all_of_them() {
    let mut tables = full_tables();
    tables.devices = None;
    tables.incidents = None;

    let err = analyze_posture(&tables, &RiskmapConfig::default()).unwrap_err();
    assert_eq!(
        err,
        EngineError::MissingInput {
            datasets: vec!["devices".to_string(), "incidents".to_string()],
        }
    );
}

#[test]
fn schema_violation_aborts_before_any_analysis() {
    let mut tables = full_tables();
    tables.user_detections = Some(dataset("user_detections", &["User", "UPN"], vec![]));

    let err = analyze_posture(&tables, &RiskmapConfig::default()).unwrap_err();
    assert_eq!(err, EngineError::schema("user_detections", "Risk state"));
}

#[test]
fn limits_config_overrides_top_n_sizes() {
    let mut tables = full_tables();
    let rows: Vec<Record> = (0..8)
        .map(|i| score_row(&format!("action-{i}"), "Apps", "P", "0/5"))
        .collect();
    tables.secure_score = Some(dataset("secure_score", secure_score::REQUIRED_COLUMNS, rows));

    let config = RiskmapConfig {
        limits: Some(LimitsConfig {
            top_score_actions: 3,
            ..LimitsConfig::default()
        }),
        ..RiskmapConfig::default()
    };

    let report = analyze_posture(&tables, &config).unwrap();
    assert_eq!(report.secure_score.top_actions.len(), 3);
    assert_eq!(
        report.secure_score.top_actions[0].recommended_action,
        "action-0"
    );
}

#[test]
fn user_device_identity_intersection_is_reported() {
    let mut tables = full_tables();
    // A user whose UPN doubles as a high-risk device name.
    tables.user_detections = Some(dataset(
        "user_detections",
        user_risk::REQUIRED_COLUMNS,
        vec![detection_row("Shared Host", "host-1", "Password spray")],
    ));

    let report = analyze_posture(&tables, &RiskmapConfig::default()).unwrap();
    assert_eq!(report.incidents.user_device_matches.len(), 1);
    let matched = &report.incidents.user_device_matches[0];
    assert_eq!(matched.upn, "host-1");
    assert_eq!(matched.device_name, "host-1");
}
