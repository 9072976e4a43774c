//! Cross-entity correlation: joining incidents against the
//! independently-computed high-risk user and device sets, plus the
//! direct user/device identity intersection.
//!
//! A counterparty that is not in a high-risk set produces no edge;
//! absence is expected steady-state, never an error. Matching is exact
//! string equality with no case normalization, over `HashMap` indexes
//! so each lookup is O(1).

use crate::core::{CorrelationEdge, Incident, RiskDevice, RiskUser, UserDeviceMatch};
use im::Vector;
use std::collections::HashMap;

/// Severity literal that gates correlation. Lowercase on purpose: the
/// incident export uses `"high"` while risk levels elsewhere use
/// `"High"`; the two vocabularies are distinct and must stay so.
pub const CORRELATED_SEVERITY: &str = "high";

const ACCOUNTS_LABEL: &str = "Accounts:";
const MAILBOXES_LABEL: &str = "Mailboxes:";

/// Parse an impacted-assets free-text field into identity lists.
///
/// The field is comma-delimited. A segment carrying an `Accounts:` or
/// `Mailboxes:` label opens an identity list that continues across the
/// following unlabeled tokens until the next labeled segment; labeled
/// segments of any other kind contribute nothing. Tokens are trimmed.
/// The same tokens serve as both candidate UPNs and candidate display
/// names, so both returned lists are populated identically. A field
/// with no labeled segment yields two empty lists, silently.
pub fn extract_assets(impacted_assets: &str) -> (Vec<String>, Vec<String>) {
    let mut identities: Vec<String> = Vec::new();
    let mut collecting = false;

    for segment in impacted_assets.split(',') {
        let token = if let Some(rest) = label_suffix(segment, ACCOUNTS_LABEL) {
            collecting = true;
            rest
        } else if let Some(rest) = label_suffix(segment, MAILBOXES_LABEL) {
            collecting = true;
            rest
        } else if segment.contains(':') {
            // A differently-labeled segment ends the current list.
            collecting = false;
            continue;
        } else if collecting {
            segment.trim()
        } else {
            continue;
        };

        if !token.is_empty() {
            identities.push(token.to_string());
        }
    }

    (identities.clone(), identities)
}

fn label_suffix<'a>(segment: &'a str, label: &str) -> Option<&'a str> {
    segment
        .find(label)
        .map(|at| segment[at + label.len()..].trim())
}

/// Correlation output consumed by the incident report section.
#[derive(Clone, Debug, Default)]
pub struct CorrelationOutcome {
    pub edges: Vector<CorrelationEdge>,
    pub user_device_matches: Vector<UserDeviceMatch>,
}

/// Join high-severity incidents against the high-risk user and device
/// sets, and the two sets against each other.
///
/// Per incident, edges are emitted in a fixed order: UPN-field user
/// matches, user-field user matches, then device matches for the UPN
/// list followed by the user list. The extractor's two lists are
/// matched against different user fields but the same device field, so
/// one token can legitimately produce several edges; duplicates are
/// preserved, never deduplicated.
pub fn correlate(
    incidents: &[Incident],
    users: &[RiskUser],
    devices: &[RiskDevice],
) -> CorrelationOutcome {
    let by_upn: HashMap<&str, &RiskUser> =
        users.iter().map(|u| (u.upn.as_str(), u)).collect();
    let by_user: HashMap<&str, &RiskUser> =
        users.iter().map(|u| (u.user.as_str(), u)).collect();
    let by_device: HashMap<&str, &RiskDevice> = devices
        .iter()
        .map(|d| (d.device_name.as_str(), d))
        .collect();

    let mut edges = Vector::new();
    for incident in incidents
        .iter()
        .filter(|i| i.severity == CORRELATED_SEVERITY)
    {
        for upn in &incident.extracted_upns {
            if let Some(user) = by_upn.get(upn.as_str()) {
                edges.push_back(CorrelationEdge::User {
                    incident_name: incident.name.clone(),
                    identity: upn.clone(),
                    risk_level: user.risk_level.clone(),
                });
            }
        }
        for name in &incident.extracted_users {
            if let Some(user) = by_user.get(name.as_str()) {
                edges.push_back(CorrelationEdge::User {
                    incident_name: incident.name.clone(),
                    identity: name.clone(),
                    risk_level: user.risk_level.clone(),
                });
            }
        }
        for identity in incident
            .extracted_upns
            .iter()
            .chain(&incident.extracted_users)
        {
            if let Some(device) = by_device.get(identity.as_str()) {
                edges.push_back(CorrelationEdge::Device {
                    incident_name: incident.name.clone(),
                    device_name: identity.clone(),
                    risk_level: device.risk_level.clone(),
                });
            }
        }
    }

    // Direct identity intersection, independent of incidents.
    let user_device_matches: Vector<UserDeviceMatch> = users
        .iter()
        .filter_map(|user| {
            by_device.get(user.upn.as_str()).map(|device| UserDeviceMatch {
                user: user.user.clone(),
                upn: user.upn.clone(),
                device_name: device.device_name.clone(),
            })
        })
        .collect();

    log::debug!(
        "correlation: {} edges, {} user/device matches",
        edges.len(),
        user_device_matches.len()
    );

    CorrelationOutcome {
        edges,
        user_device_matches,
    }
}
