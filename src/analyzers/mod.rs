//! The analyzer suite and the engine entry point.
//!
//! Each analyzer is a pure function from a raw `Dataset` (plus the
//! fixed configuration) to a freshly-allocated report section; nothing
//! is shared or mutated across analyzer boundaries. `analyze_posture`
//! validates inputs up front, fans out to the analyzers, and packages
//! the result; a single run either yields a complete report or one
//! descriptive error, never a partial report.

pub mod device_risk;
pub mod exposure;
pub mod incidents;
pub mod secure_score;
pub mod user_risk;

use crate::config::RiskmapConfig;
use crate::core::{IncidentReport, PostureReport, TableSet};
use crate::correlation;
use crate::errors::EngineError;
use chrono::Utc;

/// Run the whole engine over one set of input tables.
///
/// Fails fast before any analysis: first on absent datasets (listing
/// every one), then on the first schema violation.
pub fn analyze_posture(
    tables: &TableSet,
    config: &RiskmapConfig,
) -> Result<PostureReport, EngineError> {
    let tables = tables.validate()?;

    tables
        .secure_score
        .require_columns(secure_score::REQUIRED_COLUMNS)?;
    tables.exposure.require_columns(exposure::REQUIRED_COLUMNS)?;
    tables
        .user_detections
        .require_columns(user_risk::REQUIRED_COLUMNS)?;
    tables.devices.require_columns(device_risk::REQUIRED_COLUMNS)?;
    tables.incidents.require_columns(incidents::REQUIRED_COLUMNS)?;

    let vocabulary = config.vocabulary();
    let limits = config.limits();

    let secure_score = secure_score::analyze(tables.secure_score, &vocabulary, &limits)?;
    let product_deployment = secure_score::product_deployment(tables.secure_score)?;
    let exposure = exposure::analyze(tables.exposure, &limits)?;
    let user_risk = user_risk::analyze(tables.user_detections, &vocabulary, &limits)?;
    let device_risk = device_risk::analyze(tables.devices, &limits)?;

    let incident_list = incidents::build_incidents(tables.incidents)?;
    let outcome =
        correlation::correlate(&incident_list, &user_risk.users, &device_risk.high_risk);

    let incidents = IncidentReport {
        summary: incidents::summary(&incident_list, &limits),
        severity_counts: incidents::severity_counts(&incident_list),
        edges: outcome.edges,
        user_device_matches: outcome.user_device_matches,
    };

    log::info!(
        "posture analysis complete: {} correlation edges across {} incidents",
        incidents.edges.len(),
        incident_list.len()
    );

    Ok(PostureReport {
        generated_at: Utc::now(),
        secure_score,
        product_deployment,
        exposure,
        user_risk,
        device_risk,
        incidents,
    })
}
