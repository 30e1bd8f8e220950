// User settings, stored as JSON in the platform config directory
use crate::export::ExportFormat;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable pointing at an alternative settings file
pub const CONFIG_ENV: &str = "COLTALLY_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Format used by `analyze` when `--format` is not given
    pub default_format: ExportFormat,
    /// Width of chart bars, in cells
    pub chart_width: usize,
    /// Categories shown in charts; the rest are summarised
    pub top_n: Option<usize>,
    /// Decimals shown for percentages
    pub precision: usize,
    pub show_chart: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_format: ExportFormat::Table,
            chart_width: 40,
            top_n: Some(15),
            precision: 2,
            show_chart: true,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when no file exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)
            .map_err(|e| anyhow!("Invalid settings file {}: {}", path.display(), e))?;
        Ok(settings)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// `$COLTALLY_CONFIG`, or `<config dir>/coltally/config.json`
    pub fn config_file_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|dir| dir.join("coltally").join("config.json"))
            .ok_or_else(|| anyhow!("Could not determine config directory or home directory"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let settings = Settings {
            default_format: ExportFormat::Csv,
            top_n: None,
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"precision": 0, "default_format": "json"}"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.precision, 0);
        assert_eq!(settings.default_format, ExportFormat::Json);
        assert_eq!(settings.chart_width, 40);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }
}
