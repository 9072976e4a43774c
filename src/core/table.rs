//! Loosely-typed table access with schema validation at the boundary.
//!
//! Input tables arrive as named collections of records whose cells are
//! untyped scalars. Rather than letting a missing column surface deep
//! inside an analyzer, every analyzer declares the columns it reads and
//! `Dataset::require_columns` checks them up front, producing a
//! `SchemaError` that names the dataset and the first missing column.

use crate::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Canonical dataset names, used in error messages and by the loader.
pub const SECURE_SCORE: &str = "secure_score";
pub const EXPOSURE: &str = "exposure";
pub const USER_DETECTIONS: &str = "user_detections";
pub const DEVICES: &str = "devices";
pub const INCIDENTS: &str = "incidents";

/// A single table cell. Numbers and strings are the only scalar kinds
/// the telemetry exports carry; everything else is absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Num(f64),
    Str(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// String view of the cell. Numbers do not coerce.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric view of the cell. Numeric strings parse; anything else
    /// is absent.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            Value::Str(s) => s.trim().parse().ok(),
            Value::Null => None,
        }
    }
}

static NULL: Value = Value::Null;

/// One row: a mapping from column name to cell value. Reading a column
/// the row does not carry yields `Null`, never an error; schema
/// presence is enforced per dataset, not per row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Record(HashMap<String, Value>);

impl Record {
    pub fn new(cells: HashMap<String, Value>) -> Self {
        Self(cells)
    }

    pub fn get(&self, column: &str) -> &Value {
        self.0.get(column).unwrap_or(&NULL)
    }

    pub fn str_field(&self, column: &str) -> Option<&str> {
        self.0.get(column).and_then(Value::as_str)
    }

    pub fn num_field(&self, column: &str) -> Option<f64> {
        self.0.get(column).and_then(Value::as_f64)
    }

    /// String content of a cell with surrounding whitespace removed;
    /// absent for empty-after-trim cells.
    pub fn trimmed_field(&self, column: &str) -> Option<&str> {
        self.str_field(column)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl<const N: usize> From<[(&str, Value); N]> for Record {
    fn from(cells: [(&str, Value); N]) -> Self {
        Self(
            cells
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }
}

/// A named, ordered collection of records sharing a column schema.
/// Row order is part of the contract: tie-breaks and head slices
/// downstream depend on it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl Dataset {
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Record>,
    ) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check that every required column is declared, naming the first
    /// one that is not.
    pub fn require_columns(&self, required: &[&str]) -> Result<(), EngineError> {
        for column in required {
            if !self.columns.iter().any(|c| c == column) {
                return Err(EngineError::schema(&self.name, *column));
            }
        }
        Ok(())
    }
}

/// The five input datasets one run consumes. Slots are optional so the
/// loader can report everything it found; `validate` turns absence into
/// a single `MissingInput` listing every absent dataset.
#[derive(Clone, Debug, Default)]
pub struct TableSet {
    pub secure_score: Option<Dataset>,
    pub exposure: Option<Dataset>,
    pub user_detections: Option<Dataset>,
    pub devices: Option<Dataset>,
    pub incidents: Option<Dataset>,
}

/// Borrowed view of a `TableSet` whose presence has been validated.
#[derive(Debug)]
pub struct ValidatedTables<'a> {
    pub secure_score: &'a Dataset,
    pub exposure: &'a Dataset,
    pub user_detections: &'a Dataset,
    pub devices: &'a Dataset,
    pub incidents: &'a Dataset,
}

impl TableSet {
    /// Names of datasets that were not supplied, in canonical order.
    pub fn missing(&self) -> Vec<String> {
        [
            (SECURE_SCORE, self.secure_score.is_none()),
            (EXPOSURE, self.exposure.is_none()),
            (USER_DETECTIONS, self.user_detections.is_none()),
            (DEVICES, self.devices.is_none()),
            (INCIDENTS, self.incidents.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then(|| name.to_string()))
        .collect()
    }

    /// Fail fast before any analysis runs, listing exactly which
    /// datasets are missing.
    pub fn validate(&self) -> Result<ValidatedTables<'_>, EngineError> {
        match (
            &self.secure_score,
            &self.exposure,
            &self.user_detections,
            &self.devices,
            &self.incidents,
        ) {
            (
                Some(secure_score),
                Some(exposure),
                Some(user_detections),
                Some(devices),
                Some(incidents),
            ) => Ok(ValidatedTables {
                secure_score,
                exposure,
                user_detections,
                devices,
                incidents,
            }),
            _ => Err(EngineError::MissingInput {
                datasets: self.missing(),
            }),
        }
    }
}
