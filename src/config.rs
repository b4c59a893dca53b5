//! TOML configuration parsing.
//!
//! Every section is optional; a missing file yields [`Config::default`].
//!
//! ```toml
//! [db]
//! path = "./data/contacts.sqlite"
//!
//! [server]
//! bind = "127.0.0.1:5000"
//!
//! [logging]
//! filter = "info"
//! json = false
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/contacts.sqlite")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive. `RUST_LOG` wins when set.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

/// Load and validate the configuration at `path`.
///
/// A nonexistent file is not an error: the defaults are returned so that
/// `contacts serve` works out of the box.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    config
        .server
        .bind
        .parse::<SocketAddr>()
        .with_context(|| format!("server.bind is not a socket address: '{}'", config.server.bind))?;

    if config.logging.filter.trim().is_empty() {
        anyhow::bail!("logging.filter must not be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:5000");
        assert_eq!(cfg.db.path, PathBuf::from("./data/contacts.sqlite"));
        assert!(!cfg.logging.json);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("contacts.toml");
        fs::write(&path, "[db]\npath = \"/tmp/x.sqlite\"\n").unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.db.path, PathBuf::from("/tmp/x.sqlite"));
        assert_eq!(cfg.logging.filter, "info");
    }

    #[test]
    fn rejects_bad_bind_address() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("contacts.toml");
        fs::write(&path, "[server]\nbind = \"localhost\"\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("server.bind"));
    }

    #[test]
    fn rejects_malformed_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("contacts.toml");
        fs::write(&path, "[db\npath = 1").unwrap();
        assert!(load_config(&path).is_err());
    }
}
