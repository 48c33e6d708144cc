//! Configuration loading and management
//!
//! Handles parsing of `.planboard.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Error, Result};

/// Configuration file name, looked up at the project root.
pub const CONFIG_FILE: &str = ".planboard.toml";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Plan document, relative to the project root
    #[serde(default = "default_document")]
    pub document: String,

    /// Template copied when the document does not exist yet
    #[serde(default = "default_template")]
    pub template: String,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Change notification configuration
    #[serde(default)]
    pub watch: WatchConfig,

    /// Document storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            document: default_document(),
            template: default_template(),
            server: ServerConfig::default(),
            watch: WatchConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

fn default_document() -> String {
    "docs/MASTER_PLAN.md".to_string()
}

fn default_template() -> String {
    "templates/MASTER_PLAN.template.md".to_string()
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served for non-API paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    6010
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

/// Change notification configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Quiet period before a burst of changes is broadcast
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    crate::watch::DEFAULT_QUIET_PERIOD_MS
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Document storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    crate::lock::DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a `.planboard.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the project root, or return defaults
    pub fn load_from_root(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    path = %config_path.display(),
                    error = %err,
                    "ignoring unusable config; using defaults"
                );
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Absolute document path under `root`
    pub fn document_path(&self, root: &Path) -> PathBuf {
        root.join(&self.document)
    }

    /// Absolute template path under `root`
    pub fn template_path(&self, root: &Path) -> PathBuf {
        root.join(&self.template)
    }

    /// Static directory under `root`, if configured
    pub fn static_dir(&self, root: &Path) -> Option<PathBuf> {
        self.server
            .static_dir
            .as_deref()
            .filter(|dir| !dir.trim().is_empty())
            .map(|dir| root.join(dir))
    }

    pub fn validate(&self) -> Result<()> {
        if self.document.trim().is_empty() {
            return Err(Error::InvalidConfig("document cannot be empty".to_string()));
        }
        self.server.validate()?;
        self.watch.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::InvalidConfig("server.host cannot be empty".to_string()));
        }
        if self.port == 0 {
            return Err(Error::InvalidConfig("server.port must be > 0".to_string()));
        }
        Ok(())
    }
}

impl WatchConfig {
    fn validate(&self) -> Result<()> {
        if self.debounce_ms == 0 {
            return Err(Error::InvalidConfig(
                "watch.debounce_ms must be >= 1".to_string(),
            ));
        }
        if self.debounce_ms > 60_000 {
            return Err(Error::InvalidConfig(
                "watch.debounce_ms must be <= 60000".to_string(),
            ));
        }
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if self.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
