use crate::io;
use anyhow::Result;
use std::path::PathBuf;

pub fn init_config(force: bool) -> Result<()> {
    let config_path = PathBuf::from(".riskmap.toml");

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    let default_config = r#"# Riskmap Configuration

[vocabulary]
# Secure-score category display order; categories outside this list
# sort alphabetically after it.
category_order = ["Apps", "Data", "Identity", "Device"]

# Detection types surfaced in the important-detections view.
important_detections = [
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

[limits]
top_score_actions = 15
top_exposure_recommendations = 10
top_risk_users = 10
high_risk_device_head = 15
high_exposure_device_head = 10
incident_summary_head = 10

[output]
default_format = "terminal"
"#;

    io::write_file(&config_path, default_config)?;
    println!("Created .riskmap.toml configuration file");

    Ok(())
}
