//! Dataset loading: the thin stand-in for the Table Access Layer.
//!
//! Each dataset is one JSON file in the analyze directory:
//! `{"columns": ["..."], "rows": [{"col": value, ...}, ...]}`.
//! A file that does not exist leaves its slot empty so the engine can
//! report every missing dataset in one error; a file that exists but
//! cannot be read or parsed is a hard failure.

use crate::core::table::{
    DEVICES, EXPOSURE, INCIDENTS, SECURE_SCORE, USER_DETECTIONS,
};
use crate::core::{Dataset, Record, TableSet, Value};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub const SECURE_SCORE_FILE: &str = "secure_score.json";
pub const EXPOSURE_FILE: &str = "exposure.json";
pub const USER_DETECTIONS_FILE: &str = "user_detections.json";
pub const DEVICES_FILE: &str = "devices.json";
pub const INCIDENTS_FILE: &str = "incidents.json";

#[derive(Deserialize)]
struct RawTable {
    columns: Vec<String>,
    rows: Vec<HashMap<String, Value>>,
}

fn load_dataset(dir: &Path, file: &str, name: &str) -> Result<Option<Dataset>> {
    let path = dir.join(file);
    if !path.is_file() {
        log::debug!("dataset file {} not present", path.display());
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read dataset file {}", path.display()))?;
    let raw: RawTable = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse dataset file {}", path.display()))?;

    let rows = raw.rows.into_iter().map(Record::new).collect();
    Ok(Some(Dataset::new(name, raw.columns, rows)))
}

/// Load every dataset file present in `dir`. Presence validation is
/// the engine's job, not the loader's.
pub fn load_tables(dir: &Path) -> Result<TableSet> {
    Ok(TableSet {
        secure_score: load_dataset(dir, SECURE_SCORE_FILE, SECURE_SCORE)?,
        exposure: load_dataset(dir, EXPOSURE_FILE, EXPOSURE)?,
        user_detections: load_dataset(dir, USER_DETECTIONS_FILE, USER_DETECTIONS)?,
        devices: load_dataset(dir, DEVICES_FILE, DEVICES)?,
        incidents: load_dataset(dir, INCIDENTS_FILE, INCIDENTS)?,
    })
}
