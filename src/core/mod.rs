pub mod ranking;
pub mod table;

pub use table::{Dataset, Record, TableSet, ValidatedTables, Value};

use chrono::{DateTime, Utc};
use im::Vector;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Completion state of a single secure-score recommendation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScoreStatus {
    Completed,
    ToAddress,
}

impl std::fmt::Display for ScoreStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreStatus::Completed => write!(f, "Completed"),
            ScoreStatus::ToAddress => write!(f, "To Address"),
        }
    }
}

/// One secure-score recommendation with its parsed point fraction.
///
/// `achieved <= possible` holds whenever the fraction parsed; on parse
/// failure both are 0.0 and the status is `Completed` (0 == 0), a
/// degenerate case that is kept, not fixed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScoreEntry {
    pub recommended_action: String,
    pub category: String,
    pub product: String,
    pub achieved: f64,
    pub possible: f64,
    pub status: ScoreStatus,
    pub difference: f64,
}

/// Point sums and completion percentages for one category.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CategoryAggregate {
    pub category: String,
    pub achieved_sum: f64,
    pub possible_sum: f64,
    pub completed_pct: f64,
    pub to_address_pct: f64,
}

/// Secure-score section of the report.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SecureScoreReport {
    pub overall_completed_pct: f64,
    pub overall_to_address_pct: f64,
    pub categories: Vec<CategoryAggregate>,
    pub top_actions: Vec<ScoreEntry>,
}

/// Point sums grouped by product rather than category.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProductDeployment {
    pub product: String,
    pub achieved_sum: f64,
    pub possible_sum: f64,
    pub deployment_pct: f64,
}

/// One vulnerability-management recommendation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExposureRecommendation {
    pub recommendation: String,
    pub impact: Option<f64>,
    pub exposed_machines: Option<f64>,
    pub total_machines: Option<f64>,
}

/// Vulnerability/exposure section of the report.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExposureReport {
    pub total_recommendations: usize,
    pub active_recommendations: usize,
    pub exposure_score_avg: f64,
    pub top_recommendations: Vec<ExposureRecommendation>,
}

/// A detection row whose type is in the important-detection vocabulary.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ImportantDetection {
    pub user: String,
    pub detection_type: String,
}

/// A user flagged at-risk/high, aggregated across their detection rows.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RiskUser {
    pub user: String,
    pub upn: String,
    pub risk_level: String,
    pub location: Option<String>,
    pub detection_types: BTreeSet<String>,
    pub incident_count: usize,
    pub most_prominent_detection: Option<String>,
}

/// User-risk section of the report. `users` is the full high-risk set
/// the correlator joins against; `top_users` is its top 10 by
/// incident count.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRiskReport {
    pub total_at_risk_detections: usize,
    pub important_detections: Vec<ImportantDetection>,
    pub users: Vec<RiskUser>,
    pub top_users: Vec<RiskUser>,
}

/// One device from the inventory export.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RiskDevice {
    pub device_name: String,
    pub risk_level: String,
    pub exposure_level: Option<String>,
    pub health_status: Option<String>,
    pub os_platform: Option<String>,
    pub domain: Option<String>,
}

/// Device-risk section of the report. `high_risk` is the full
/// high-risk set the correlator joins against; the two head-truncated
/// lists are filtered in inventory order, never ranked.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeviceRiskReport {
    pub os_summary: BTreeMap<String, usize>,
    pub patch_summary: BTreeMap<String, usize>,
    pub risk_summary: BTreeMap<String, usize>,
    pub active_count: usize,
    pub inactive_count: usize,
    pub high_risk_active_count: usize,
    pub high_risk: Vec<RiskDevice>,
    pub high_risk_active: Vec<RiskDevice>,
    pub high_risk_high_exposure: Vec<RiskDevice>,
}

/// One incident from the queue, with the identities extracted from its
/// impacted-assets free text.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Incident {
    pub name: String,
    pub severity: String,
    pub impacted_assets: String,
    pub tags: Option<String>,
    pub extracted_upns: Vec<String>,
    pub extracted_users: Vec<String>,
}

/// A link between an incident and an independently-flagged high-risk
/// counterparty. Produced only when the counterparty appears in the
/// high-risk set; absence of a match is silent.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum CorrelationEdge {
    User {
        incident_name: String,
        identity: String,
        risk_level: String,
    },
    Device {
        incident_name: String,
        device_name: String,
        risk_level: String,
    },
}

/// A high-risk user whose UPN is also a high-risk device name.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserDeviceMatch {
    pub user: String,
    pub upn: String,
    pub device_name: String,
}

/// Incident section of the report, including the correlation results.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IncidentReport {
    pub summary: Vec<Incident>,
    pub severity_counts: BTreeMap<String, usize>,
    pub edges: Vector<CorrelationEdge>,
    pub user_device_matches: Vector<UserDeviceMatch>,
}

/// The assembled result of one engine run. Field names are the
/// presentation contract with the reporting layer; keep them stable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PostureReport {
    pub generated_at: DateTime<Utc>,
    pub secure_score: SecureScoreReport,
    pub product_deployment: Vec<ProductDeployment>,
    pub exposure: ExposureReport,
    pub user_risk: UserRiskReport,
    pub device_risk: DeviceRiskReport,
    pub incidents: IncidentReport,
}
