//! Runtime configuration.
//!
//! Values come from environment variables (optionally via a `.env` file) with defaults that
//! match the library's own.

use std::env;
use std::path::PathBuf;

/// Folder used when nothing else is configured.
pub const DEFAULT_FOLDER: &str = "./codigos_barras";

/// Log level used when neither `RUST_LOG` nor `BARUST_LOG_LEVEL` is set.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Folder where barcodes are written by default
    pub output_dir: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_FOLDER),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let output_dir = lookup("BARUST_OUTPUT_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        let log_level = lookup("BARUST_LOG_LEVEL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.log_level);

        Self {
            output_dir,
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::from_lookup(|_| None);

        assert_eq!(config.output_dir, PathBuf::from("./codigos_barras"));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_config_overrides() {
        let vars: HashMap<&str, &str> =
            [("BARUST_OUTPUT_DIR", "/tmp/codes"), ("BARUST_LOG_LEVEL", "debug")].into();
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.output_dir, PathBuf::from("/tmp/codes"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = Config::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(config, Config::default());
    }
}
