use log::warn;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::MaptyError;
use crate::workout::Coords;

const CONFIG_FILE_NAME: &str = "config.json";
const APP_DIR_NAME: &str = "mapty";

pub const DEFAULT_ZOOM_LEVEL: u8 = 13;
pub const DEFAULT_TILE_URL_TEMPLATE: &str = "https://{s}.tile.openstreetmap.fr/hot/{z}/{x}/{y}.png";
pub const DEFAULT_TILE_ATTRIBUTION: &str = "© OpenStreetMap contributors";
pub const DEFAULT_ATTRIBUTION_URL: &str = "https://www.openstreetmap.org/copyright";
const DEFAULT_FORM_REOPEN_DELAY_MS: u64 = 1000;
const DEFAULT_PAN_DURATION_MS: u64 = 1000;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub map_zoom_level: u8,
    pub tile_url_template: String,
    pub tile_attribution: String,
    pub attribution_url: String,
    /// Position reported to the map when no other position source is given.
    pub home_position: Option<Coords>,
    /// Directory of the workout store, `dirs::data_dir()/mapty` when unset.
    pub data_dir: Option<PathBuf>,
    pub form_reopen_delay_ms: u64,
    pub pan_duration_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            map_zoom_level: DEFAULT_ZOOM_LEVEL,
            tile_url_template: DEFAULT_TILE_URL_TEMPLATE.to_string(),
            tile_attribution: DEFAULT_TILE_ATTRIBUTION.to_string(),
            attribution_url: DEFAULT_ATTRIBUTION_URL.to_string(),
            home_position: None,
            data_dir: None,
            form_reopen_delay_ms: DEFAULT_FORM_REOPEN_DELAY_MS,
            pan_duration_ms: DEFAULT_PAN_DURATION_MS,
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Result<PathBuf, MaptyError> {
        Ok(dirs::config_dir()
            .ok_or(MaptyError::NoConfigDir)?
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Read the config file, `None` if there is none or it cannot be used.
    pub fn from_local_file() -> Option<Self> {
        let config_path = Self::config_path().ok()?;
        if !config_path.exists() {
            return None;
        }

        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| warn!("Could not open config file {:?}: {}", config_path, e))
            .ok()?;
        Self::from_json(&content)
            .map_err(|e| warn!("Could not parse config file {:?}: {}", config_path, e))
            .ok()
    }

    pub fn from_json(content: &str) -> Result<Self, MaptyError> {
        serde_json::from_str(content).map_err(|e| MaptyError::ConfigSerializeError { source: e })
    }

    pub fn save(&self) -> Result<(), MaptyError> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| MaptyError::ConfigIOError { source: e })?;
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| MaptyError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| MaptyError::ConfigSerializeError { source: e })
    }

    pub fn form_reopen_delay(&self) -> Duration {
        Duration::from_millis(self.form_reopen_delay_ms)
    }

    pub fn pan_duration(&self) -> Duration {
        Duration::from_millis(self.pan_duration_ms)
    }
}
