// Export modules for library usage
pub mod analyzers;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod correlation;
pub mod errors;
pub mod io;

// Re-export commonly used types
pub use crate::core::{
    CategoryAggregate, CorrelationEdge, Dataset, DeviceRiskReport, ExposureRecommendation,
    ExposureReport, ImportantDetection, Incident, IncidentReport, PostureReport,
    ProductDeployment, Record, RiskDevice, RiskUser, ScoreEntry, ScoreStatus, SecureScoreReport,
    TableSet, UserDeviceMatch, UserRiskReport, Value,
};

pub use crate::core::ranking::{head, top_n};

pub use crate::analyzers::analyze_posture;
pub use crate::analyzers::secure_score::parse_points;

pub use crate::correlation::{correlate, extract_assets, CorrelationOutcome};

pub use crate::errors::EngineError;

pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};
