// Dashboard configuration
// JSON file, every field optional

use crate::numeral::RmbFormatter;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable pointing at the config file
pub const CONFIG_ENV_VAR: &str = "RMB_DASHBOARD_CONFIG";

/// Config file picked up from the working directory when nothing else is given
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub numeral: RmbFormatter,

    #[serde(default)]
    pub sheet: SheetConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Revenue sheet used when none is given on the command line
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

fn default_delimiter() -> String {
    ",".to_string()
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            path: None,
            delimiter: default_delimiter(),
        }
    }
}

impl SheetConfig {
    /// Delimiter as the single byte the CSV reader expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => bail!(
                "Sheet delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ),
        }
    }
}

impl DashboardConfig {
    /// Load from an explicit JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.sheet.delimiter_byte()?;
        Ok(config)
    }

    /// Resolve the config: explicit path, then `$RMB_DASHBOARD_CONFIG`,
    /// then `./dashboard.json`, then built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        Self::resolve_in(explicit, Path::new("."))
    }

    /// Same as [`DashboardConfig::resolve`], looking for the local file in `dir`
    pub fn resolve_in(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.is_empty() {
                return Self::load(Path::new(&path));
            }
        }

        let local = dir.join(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::load(&local);
        }

        tracing::warn!("No config file found, using defaults");
        Ok(Self::default())
    }
}
