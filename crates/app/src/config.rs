use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "star-release";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the daily star entries live. Defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,
    /// Optional pre-recorded loop played under the synthesized ambience.
    pub background_track: Option<PathBuf>,
    pub start_muted: bool,
    pub high_contrast: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            background_track: None,
            start_muted: true,
            high_contrast: false,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join("config.toml"))
    }

    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents),
            Err(_) => Self::default(),
        }
    }

    /// Malformed config falls back to defaults rather than refusing to start.
    pub fn parse(contents: &str) -> Self {
        match toml::from_str(contents) {
            Ok(config) => config,
            Err(e) => {
                // Logging is not up yet when the config is read
                eprintln!("ignoring malformed config: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            return;
        };
        if let Err(e) = self.save_to(&path) {
            log::warn!("failed to save config: {e:#}");
        }
    }

    fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|p| p.join(APP_DIR)))
            .unwrap_or_else(|| PathBuf::from(APP_DIR))
    }

    /// Directory backing the star ledger's key-value store.
    pub fn sky_dir(&self) -> PathBuf {
        self.data_dir().join("sky")
    }
}
