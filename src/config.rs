//! Configuration for the window list
//!
//! Loads configuration from TOML file at `~/.config/area/window-list.toml`
//! Auto-generates default config file on first run if missing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Window list configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowListConfig {
    /// Height of one list row in pixels
    pub line_height: u32,
    /// Smallest popup height, as a fraction of the screen height
    pub min_height_ratio: f64,
    /// Largest popup height, as a fraction of the screen height
    pub max_height_ratio: f64,
    /// Popup width, as a fraction of the screen width
    pub width_ratio: f64,
    /// Recenter a re-shown popup when less than this fraction of it is on
    /// its screen
    pub recenter_overlap_ratio: f64,
    /// Indentation per owner level in pixels
    pub indent_step: u32,
    /// Title of the sticky windows section
    pub all_workspaces_label: String,
}

impl Default for WindowListConfig {
    fn default() -> Self {
        Self {
            line_height: 18,
            min_height_ratio: 0.4,
            max_height_ratio: 0.9,
            width_ratio: 0.5,
            recenter_overlap_ratio: 0.25,
            indent_step: 20,
            all_workspaces_label: "All Workspaces".into(),
        }
    }
}

impl WindowListConfig {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a given path
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            if let Err(e) = Self::save_default(config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)
            .context("Failed to read config file")?;

        let config = Self::from_toml(&content)?;

        info!("Configuration loaded from {:?}", config_path);
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Parse configuration from TOML text; missing keys take their defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let ratios = [
            ("min_height_ratio", self.min_height_ratio),
            ("max_height_ratio", self.max_height_ratio),
            ("width_ratio", self.width_ratio),
            ("recenter_overlap_ratio", self.recenter_overlap_ratio),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("{} must be between 0 and 1, got {}", name, value);
            }
        }
        if self.line_height == 0 {
            anyhow::bail!("line_height must be positive");
        }
        Ok(())
    }

    /// Get the path to the config file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("area");

        Ok(config_dir.join("window-list.toml"))
    }

    /// Save default configuration to file
    fn save_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;

        fs::write(path, toml_string)
            .context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }
}
