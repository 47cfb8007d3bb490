// Grid settings
// Loaded from ~/.config/refgrid/settings.toml

use std::fs;
use std::path::{Path, PathBuf};

use refgrid_engine::{
    FactorsPolicy, GridOptions, NumericsPolicy, ReferenceLevel, Spread, DEFAULT_LENGTH_OUT,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Defaults applied to every grid build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridSettings {
    /// Values per enumerated numeric column
    pub length_out: usize,

    /// Non-target numeric columns
    pub numerics: NumericsPolicy,

    /// Non-target categorical columns
    pub factors: FactorsPolicy,

    /// Which label a collapsed categorical column takes
    pub reference: ReferenceLevel,

    /// Interval an enumerated numeric column covers
    pub spread: Spread,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            length_out: DEFAULT_LENGTH_OUT,
            numerics: NumericsPolicy::Mean,
            factors: FactorsPolicy::ReferenceLevel,
            reference: ReferenceLevel::FirstLevel,
            spread: Spread::Range,
        }
    }
}

impl GridSettings {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let settings: GridSettings =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.length_out == 0 {
            return Err(ConfigError::Validation(
                "length_out must be a positive integer, got 0".into(),
            ));
        }
        Ok(())
    }

    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("refgrid");
        config_dir.join("settings.toml")
    }

    /// Load settings from the default path, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}: {e}; using default settings", path.display());
                Self::default()
            }
        }
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&contents)
    }

    /// Save settings as TOML
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        let toml = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(path, toml).map_err(|e| ConfigError::Io(e.to_string()))
    }

    pub fn options(&self) -> GridOptions {
        GridOptions {
            length_out: self.length_out,
            numerics: self.numerics,
            factors: self.factors,
            reference: self.reference,
            spread: self.spread,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
