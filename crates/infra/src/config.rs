//! Configuration loading and representation.
//!
//! ```toml
//! [ansible]
//! static_inventory_path = "inventory/hosts.ini"
//! dynamic_inventory_path = "bin/ec2.py"
//!
//! [consul]
//! url = "http://127.0.0.1:8500/v1"
//! timeout_secs = 5
//! ```
//!
//! Every key is optional. Empty strings count as absent, and relative paths are
//! resolved against the directory of the config file.
//!
//! The pipeline always receives a [`Config`] explicitly; [`ConfigLocator`] is the
//! separate helper that finds a default file when none was given.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "INVSYNC_CONFIG";

/// File name looked up in the working and user config directories.
pub const CONFIG_FILE_NAME: &str = "invsync.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("no config file found (searched: {})", display_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ansible: AnsibleConfig,
    pub consul: ConsulConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnsibleConfig {
    pub static_inventory_path: Option<PathBuf>,
    pub dynamic_inventory_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConsulConfig {
    /// Registry base address; `<url>/catalog/service/<name>` is queried.
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ConsulConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ConsulConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Read and parse the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text, &path.display().to_string())?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(base))
    }

    /// Parse config text; `origin` names it in errors.
    pub fn parse(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        Ok(config.without_empty_values())
    }

    /// Registry address, if one is configured.
    pub fn registry_url(&self) -> Option<&str> {
        self.consul.url.as_deref()
    }

    fn without_empty_values(mut self) -> Self {
        let empty_path = |p: &Option<PathBuf>| p.as_ref().is_some_and(|p| p.as_os_str().is_empty());
        if empty_path(&self.ansible.static_inventory_path) {
            self.ansible.static_inventory_path = None;
        }
        if empty_path(&self.ansible.dynamic_inventory_path) {
            self.ansible.dynamic_inventory_path = None;
        }
        if self.consul.url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            self.consul.url = None;
        }
        self
    }

    fn relative_to(mut self, base: &Path) -> Self {
        let anchor = |p: Option<PathBuf>| {
            p.map(|p| if p.is_relative() { base.join(p) } else { p })
        };
        self.ansible.static_inventory_path = anchor(self.ansible.static_inventory_path.take());
        self.ansible.dynamic_inventory_path = anchor(self.ansible.dynamic_inventory_path.take());
        self
    }
}

/// Finds the config file to use when none is given explicitly.
///
/// Search order: `$INVSYNC_CONFIG`, `./invsync.toml`,
/// `<user config dir>/invsync/invsync.toml`, `/etc/invsync/invsync.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLocator {
    env_override: Option<PathBuf>,
    working_dir: Option<PathBuf>,
    user_config_dir: Option<PathBuf>,
    system_dir: Option<PathBuf>,
}

impl ConfigLocator {
    /// Locator for the current process environment.
    pub fn from_env() -> Self {
        Self {
            env_override: std::env::var_os(CONFIG_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            working_dir: std::env::current_dir().ok(),
            user_config_dir: dirs::config_dir(),
            system_dir: Some(PathBuf::from("/etc")),
        }
    }

    pub fn with_env_override(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_override = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_user_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_config_dir = Some(dir.into());
        self
    }

    pub fn with_system_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.system_dir = Some(dir.into());
        self
    }

    /// Candidate files in search order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(path) = &self.env_override {
            candidates.push(path.clone());
        }
        if let Some(dir) = &self.working_dir {
            candidates.push(dir.join(CONFIG_FILE_NAME));
        }
        if let Some(dir) = &self.user_config_dir {
            candidates.push(dir.join("invsync").join(CONFIG_FILE_NAME));
        }
        if let Some(dir) = &self.system_dir {
            candidates.push(dir.join("invsync").join(CONFIG_FILE_NAME));
        }
        candidates
    }

    /// `explicit` if given, otherwise the first existing candidate.
    pub fn locate(&self, explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        let candidates = self.candidates();
        match candidates.iter().find(|path| path.is_file()) {
            Some(found) => {
                tracing::debug!(path = %found.display(), "using discovered config");
                Ok(found.clone())
            }
            None => Err(ConfigError::NotFound {
                searched: candidates,
            }),
        }
    }
}
