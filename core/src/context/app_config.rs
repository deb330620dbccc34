use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use pickwatch_types::OverlaySettings;

const APP_NAME: &str = "pickwatch";

/// Persisted application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Ratings set file loaded at startup.
    pub ratings_path: Option<PathBuf>,
    pub overlay: OverlaySettings,
}

impl AppConfig {
    /// Load from the platform config dir, falling back to defaults.
    pub fn load() -> Self {
        match confy::load(APP_NAME, None) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        confy::load_path(path).map_err(ConfigError::Load)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, None, self).map_err(ConfigError::Save)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        confy::store_path(path, self).map_err(ConfigError::Save)
    }

    /// The configured log path, or the platform default.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.overlay.log_path.clone().or_else(default_log_path)
    }
}

/// Where the game writes `Player.log` on this platform.
pub fn default_log_path() -> Option<PathBuf> {
    let relative = Path::new("Wizards Of The Coast").join("MTGA").join("Player.log");

    #[cfg(target_os = "windows")]
    let base = dirs::home_dir().map(|h| h.join("AppData").join("LocalLow"));

    #[cfg(target_os = "macos")]
    let base = dirs::home_dir().map(|h| h.join("Library").join("Logs"));

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let base = dirs::home_dir().map(|h| {
        h.join(".wine")
            .join("drive_c")
            .join("users")
            .join(wine_user())
            .join("AppData")
            .join("LocalLow")
    });

    base.map(|b| b.join(relative))
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn wine_user() -> String {
    std::env::var("USER").unwrap_or_else(|_| "user".to_string())
}
