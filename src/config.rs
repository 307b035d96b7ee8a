//! Configuration for the telemetry monitor.

use crate::core::history::DEFAULT_HISTORY_SIZE;
use crate::core::window::DEFAULT_WINDOW_SIZE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration, persisted as JSON under the platform config dir.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Serial port the device is attached to; unset until configured
    pub port: Option<String>,

    /// Serial line rate in baud
    pub baud_rate: u32,

    /// Sliding window capacity in samples
    pub window_size: usize,

    /// Statistics history capacity in snapshots
    pub history_size: usize,

    /// Treat digit-comma-digit as a decimal point in incoming lines
    pub decimal_comma: bool,

    /// Bounded wait per idle acquisition cycle (milliseconds on disk)
    #[serde(with = "duration_millis_serde")]
    pub poll_interval: Duration,

    /// Minimum period between console redraws (milliseconds on disk)
    #[serde(with = "duration_millis_serde")]
    pub display_period: Duration,

    /// Root directory for ledgers and session exports
    pub data_path: PathBuf,

    /// Whether to write the session summary and series JSON at exit
    pub export_sessions: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("margmon");

        Self {
            port: None,
            baud_rate: 115_200,
            window_size: DEFAULT_WINDOW_SIZE,
            history_size: DEFAULT_HISTORY_SIZE,
            decimal_comma: false,
            poll_interval: Duration::from_millis(100),
            display_period: Duration::from_millis(1000),
            data_path: data_dir,
            export_sessions: true,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("margmon")
            .join("config.json")
    }

    /// Directory where ledgers land by default.
    pub fn ledger_dir(&self) -> PathBuf {
        self.data_path.join("ledgers")
    }

    /// Directory where session exports land.
    pub fn export_dir(&self) -> PathBuf {
        self.data_path.join("exports")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        std::fs::create_dir_all(self.ledger_dir())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        std::fs::create_dir_all(self.export_dir())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration stored as whole milliseconds.
mod duration_millis_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, None);
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.window_size, 5);
        assert_eq!(config.history_size, 1000);
        assert!(!config.decimal_comma);
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.display_period, Duration::from_millis(1000));
        assert!(config.export_sessions);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = Config::default();
        config.port = Some("/dev/ttyACM0".to_string());
        config.window_size = 8;
        config.poll_interval = Duration::from_millis(250);

        let json = serde_json::to_string(&config).unwrap();
        let restored: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.port.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(restored.window_size, 8);
        assert_eq!(restored.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_durations_stored_as_millis() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["poll_interval"], 100);
        assert_eq!(value["display_period"], 1000);
    }

    #[test]
    fn test_derived_directories() {
        let config = Config::default();
        assert!(config.ledger_dir().starts_with(&config.data_path));
        assert!(config.export_dir().starts_with(&config.data_path));
    }
}
