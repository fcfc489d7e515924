use onbeat_api::DEFAULT_API_BASE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Floor for every timer period.
pub const MIN_INTERVAL_MS: u64 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    /// Where the persisted studio record lives. Defaults to the platform
    /// data directory.
    pub storage_dir: Option<PathBuf>,
    pub history_interval_ms: u64,
    pub meter_interval_ms: u64,
    pub mastering_ms: u64,
    pub tuner_interval_ms: u64,
    pub console_meter_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            storage_dir: None,
            history_interval_ms: 5000,
            meter_interval_ms: 16,
            mastering_ms: 3000,
            tuner_interval_ms: 300,
            console_meter_interval_ms: 100,
        }
    }
}

impl Config {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("onbeat").join("config.toml"))
    }

    /// Load from the user config directory. Broken files give the defaults;
    /// a missing one is written out with the defaults so there is something
    /// to edit.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                if let Err(e) = config.save_to(&path) {
                    tracing::warn!("could not write {}: {e}", path.display());
                }
                config
            }
            Err(e) => {
                tracing::warn!("ignoring {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("onbeat")
        })
    }

    pub fn history_interval(&self) -> Duration {
        interval(self.history_interval_ms)
    }

    pub fn meter_interval(&self) -> Duration {
        interval(self.meter_interval_ms)
    }

    pub fn mastering_duration(&self) -> Duration {
        Duration::from_millis(self.mastering_ms)
    }

    pub fn tuner_interval(&self) -> Duration {
        interval(self.tuner_interval_ms)
    }

    pub fn console_meter_interval(&self) -> Duration {
        interval(self.console_meter_interval_ms)
    }
}

/// Timer periods must be non-zero; `0` in the file reads as 1 ms.
fn interval(ms: u64) -> Duration {
    Duration::from_millis(ms.max(MIN_INTERVAL_MS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "history_interval_ms = 1000\n").expect("write");

        let config = Config::load_from(&path).expect("load");
        assert_eq!(config.history_interval_ms, 1000);
        assert_eq!(config.api_base, "http://127.0.0.1:8000/api/v1");
        assert_eq!(config.mastering_duration(), Duration::from_secs(3));
    }

    #[test]
    fn test_save_creates_parent_and_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            storage_dir: Some(dir.path().join("data")),
            tuner_interval_ms: 150,
            ..Default::default()
        };

        config.save_to(&path).expect("save");
        assert_eq!(Config::load_from(&path).expect("load"), config);
    }

    #[test]
    fn test_zero_intervals_are_raised_to_minimum() {
        let config: Config = toml::from_str(
            "history_interval_ms = 0\nmeter_interval_ms = 0\nconsole_meter_interval_ms = 0\ntuner_interval_ms = 0\n",
        )
        .expect("parse");

        let minimum = Duration::from_millis(MIN_INTERVAL_MS);
        assert_eq!(config.history_interval(), minimum);
        assert_eq!(config.meter_interval(), minimum);
        assert_eq!(config.console_meter_interval(), minimum);
        assert_eq!(config.tuner_interval(), minimum);
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "meter_interval_ms = \"fast\"").expect("write");

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
