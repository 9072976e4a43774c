use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Fixed vocabularies the engine ships as defaults. Overridable via
/// `.riskmap.toml`, but the defaults are the contract with the
/// upstream telemetry exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyConfig {
    /// Secure-score category display order
    #[serde(default = "default_category_order")]
    pub category_order: Vec<String>,

    /// Detection types surfaced in the important-detections view
    #[serde(default = "default_important_detections")]
    pub important_detections: Vec<String>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            category_order: default_category_order(),
            important_detections: default_important_detections(),
        }
    }
}

fn default_category_order() -> Vec<String> {
    ["Apps", "Data", "Identity", "Device"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_important_detections() -> Vec<String> {
    [
        "Leaked credentials",
        "Malicious IP address",
        "Impossible travel",
        "Password spray",
        "New country",
        "Suspicious inbox forwarding",
        "Suspicious inbox manipulation rules",
        "Verified threat actor IP",
        "Admin confirmed user compromised",
        "User reported suspicious activity",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Top-N and head-truncation sizes for every ranked or sliced list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Secure-score actions ranked by score difference
    #[serde(default = "default_top_score_actions")]
    pub top_score_actions: usize,

    /// Exposure recommendations ranked by score impact
    #[serde(default = "default_top_exposure_recommendations")]
    pub top_exposure_recommendations: usize,

    /// Users ranked by detection count
    #[serde(default = "default_top_risk_users")]
    pub top_risk_users: usize,

    /// High-risk active devices, positional head (not ranked)
    #[serde(default = "default_high_risk_device_head")]
    pub high_risk_device_head: usize,

    /// High-risk high-exposure devices, positional head (not ranked)
    #[serde(default = "default_high_exposure_device_head")]
    pub high_exposure_device_head: usize,

    /// Incident rows carried into the summary, positional head
    #[serde(default = "default_incident_summary_head")]
    pub incident_summary_head: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            top_score_actions: default_top_score_actions(),
            top_exposure_recommendations: default_top_exposure_recommendations(),
            top_risk_users: default_top_risk_users(),
            high_risk_device_head: default_high_risk_device_head(),
            high_exposure_device_head: default_high_exposure_device_head(),
            incident_summary_head: default_incident_summary_head(),
        }
    }
}

fn default_top_score_actions() -> usize {
    15
}
fn default_top_exposure_recommendations() -> usize {
    10
}
fn default_top_risk_users() -> usize {
    10
}
fn default_high_risk_device_head() -> usize {
    15
}
fn default_high_exposure_device_head() -> usize {
    10
}
fn default_incident_summary_head() -> usize {
    10
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub default_format: Option<String>,
}

/// Root configuration structure for riskmap
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RiskmapConfig {
    /// Vocabulary overrides
    #[serde(default)]
    pub vocabulary: Option<VocabularyConfig>,

    /// Ranking and truncation sizes
    #[serde(default)]
    pub limits: Option<LimitsConfig>,

    /// Output configuration
    #[serde(default)]
    pub output: Option<OutputConfig>,
}

impl RiskmapConfig {
    pub fn vocabulary(&self) -> VocabularyConfig {
        self.vocabulary.clone().unwrap_or_default()
    }

    pub fn limits(&self) -> LimitsConfig {
        self.limits.clone().unwrap_or_default()
    }
}

/// Cache the configuration
static CONFIG: OnceLock<RiskmapConfig> = OnceLock::new();

/// Pure function to read config file contents
fn read_config_file(path: &Path) -> Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

fn parse_config(contents: &str) -> Result<RiskmapConfig, String> {
    toml::from_str::<RiskmapConfig>(contents)
        .map_err(|e| format!("Failed to parse .riskmap.toml: {}", e))
}

/// Try loading config from a specific path; parse failures degrade to
/// defaults with a warning rather than failing the run.
fn try_load_config_from_path(config_path: &Path) -> Option<RiskmapConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            eprintln!("Warning: {}. Using defaults.", e);
            None
        }
    }
}

/// Handle file read errors with appropriate logging
fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // Only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Load configuration from .riskmap.toml if it exists
pub fn load_config() -> RiskmapConfig {
    const MAX_TRAVERSAL_DEPTH: usize = 10;

    let current = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            return RiskmapConfig::default();
        }
    };

    directory_ancestors(current, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(".riskmap.toml"))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            RiskmapConfig::default()
        })
}

/// Get the cached configuration
pub fn get_config() -> &'static RiskmapConfig {
    CONFIG.get_or_init(load_config)
}
