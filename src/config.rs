//! twinleaf.toml configuration

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

/// Config file picked up from the working directory.
pub const DEFAULT_CONFIG: &str = "twinleaf.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TwinleafConfig {
    pub output: OutputConfig,
    pub lineage: LineageConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig { pretty: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LineageConfig {
    /// Selector applied when `--select` is not given.
    pub default_select: Option<String>,
}

impl TwinleafConfig {
    /// Load an explicit config file, or `./twinleaf.toml` if it exists.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::from_path(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG);
                if path.exists() {
                    Self::from_path(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
