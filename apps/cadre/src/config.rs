//! # App Configuration
//!
//! Optional TOML configuration file for the server.
//!
//! The file is looked up at `cadre.toml` in the working directory (or an
//! explicit `--config` path). CLI flags override file values; file
//! values override built-in defaults.
//!
//! ```toml
//! host = "127.0.0.1"
//! port = 8080
//! database = "cadre.db"
//! backend = "redb"
//! ```

use cadre_core::ReviewError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "cadre.toml";

/// Parsed application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Host the HTTP server binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the HTTP server binds to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the review database.
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Storage backend: "redb" (ACID database) or "file" (snapshot file).
    #[serde(default = "default_backend")]
    pub backend: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database() -> PathBuf {
    PathBuf::from("cadre.db")
}

fn default_backend() -> String {
    "redb".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: default_database(),
            backend: default_backend(),
        }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// With an explicit path, the file must exist and parse. Without
    /// one, `cadre.toml` is used when present and defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ReviewError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_FILE);
                if implicit.exists() {
                    Self::from_file(implicit)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self, ReviewError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ReviewError::Storage(format!("read config {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents).map_err(|e| {
            ReviewError::InvalidInput(format!("parse config {}: {}", path.display(), e))
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_file() {
        let config = AppConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.backend, "redb");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "port = 9001").expect("write");

        let config = AppConfig::load(Some(file.path())).expect("load");
        assert_eq!(config.port, 9001);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "prot = 9001").expect("write");

        assert!(AppConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(AppConfig::load(Some(Path::new("/nonexistent/cadre.toml"))).is_err());
    }
}
