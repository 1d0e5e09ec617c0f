/// Config file loading and creation for the afopt CLI.
///
/// Config lives at ~/.config/afopt/config.toml.
/// All fields are optional — CLI args override config values.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::bail;

#[derive(Deserialize, Default)]
pub struct AfoptConfig {
    pub username: Option<String>,
    pub cache_ttl_hours: Option<f64>,
    pub request_delay_ms: Option<u64>,
    pub output_dir: Option<String>,
    #[serde(default)]
    pub time_overrides: Vec<TimeOverride>,
    #[serde(default)]
    pub exclude_from_plans: Vec<PlanExclude>,
}

/// A time you have set but that is not on dkr64.com yet. Applied to the
/// fetched snapshot before any analysis runs.
#[derive(Deserialize, Clone)]
pub struct TimeOverride {
    pub track: String,
    pub vehicle: String,
    #[serde(default = "default_category")]
    pub category: String,
    pub laps: String,
    /// MM:SS:CC
    pub time: String,
}

fn default_category() -> String {
    "standard".to_string()
}

/// A track/vehicle combo to keep out of overtake plans.
#[derive(Deserialize, Clone)]
pub struct PlanExclude {
    pub track: String,
    pub vehicle: String,
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# afopt configuration
# All values here can be overridden by CLI flags.

# Player username as it appears in dkr64.com profile URLs
# username = \"your-name\"

# How long fetched pages stay valid on disk
# cache_ttl_hours = 24

# Delay between requests to dkr64.com
# request_delay_ms = 500

# Where reports are written
# output_dir = \"output\"

# Times you have set but that are not on dkr64.com yet.
# Applied to the snapshot before any analysis runs.
# [[time_overrides]]
# track = \"ancient-lake\"
# vehicle = \"car\"
# category = \"standard\"   # optional, defaults to standard
# laps = \"3-laps\"
# time = \"01:02:33\"

# Track/vehicle combos to keep out of overtake plans.
# [[exclude_from_plans]]
# track = \"spaceport-alpha\"
# vehicle = \"plane\"
";

/// Returns the default config path: ~/.config/afopt/config.toml
pub fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| bail("HOME environment variable not set"));
    PathBuf::from(home).join(".config").join("afopt").join("config.toml")
}

/// Load config from a file path. Returns default (all None) if file doesn't exist.
pub fn load_config(path: &Path) -> AfoptConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            toml::from_str(&content)
                .unwrap_or_else(|e| bail(format!("Failed to parse config at {}: {e}", path.display())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => AfoptConfig::default(),
        Err(e) => bail(format!("Failed to read config at {}: {e}", path.display())),
    }
}

/// Create the default config file. Errors if it already exists.
pub fn create_default_config() -> PathBuf {
    let path = config_path();

    if path.exists() {
        bail(format!("Config file already exists at {}", path.display()));
    }

    // Create parent directories
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| bail(format!("Failed to create directory {}: {e}", parent.display())));
    }

    std::fs::write(&path, DEFAULT_CONFIG_TEMPLATE)
        .unwrap_or_else(|e| bail(format!("Failed to write config to {}: {e}", path.display())));

    path
}
