//! Configuration settings and validation.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use crate::{Error, Result};

/// Main configuration for the hot-reload server.
///
/// Immutable after startup: nothing mutates it once validated.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory tree to watch and serve.
    pub watch_dir: PathBuf,

    /// Host address to bind the HTTP listener to.
    pub host: String,

    /// Port the HTTP listener (and the advertised URL) uses.
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Fixed address to advertise in discovery replies. IPv4 only:
    /// the reply URL format carries a dotted quad. `None` selects the
    /// first non-loopback IPv4 at response time.
    pub advertise_ip: Option<Ipv4Addr>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch_dir: PathBuf::from("."),
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            advertise_ip: None,
        }
    }
}

impl Config {
    /// Create a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::config("port cannot be 0"));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "invalid log level '{}', must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.host.is_empty() {
            return Err(Error::config("host cannot be empty"));
        }

        if !self.watch_dir.is_dir() {
            return Err(Error::config(format!(
                "watch directory '{}' does not exist or is not a directory",
                self.watch_dir.display()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.watch_dir, PathBuf::from("."));
        assert!(config.advertise_ip.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_port() {
        let config = Config {
            port: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("port"));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let config = Config {
            log_level: "shouting".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log level"));
    }

    #[test]
    fn test_validate_empty_host() {
        let config = Config {
            host: String::new(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("host"));
    }

    #[test]
    fn test_validate_missing_watch_dir() {
        let config = Config {
            watch_dir: PathBuf::from("/nonexistent/hotwatch-test-dir"),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("watch directory"));
    }

    #[test]
    fn test_validate_watch_dir_is_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let config = Config {
            watch_dir: tmp.path().to_path_buf(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_all_log_levels_valid() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let config = Config {
                log_level: level.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "Level '{level}' should be valid");
        }
    }

    #[test]
    fn test_log_level_case_insensitive() {
        for level in ["TRACE", "Debug", "INFO", "Warn", "ERROR"] {
            let config = Config {
                log_level: level.to_string(),
                ..Default::default()
            };
            assert!(
                config.validate().is_ok(),
                "Level '{level}' should be valid (case insensitive)"
            );
        }
    }
}
