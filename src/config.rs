//! Runtime configuration: built-in defaults, then an optional YAML file, then
//! environment variables.
//!
//! ```yaml
//! bind_addr: 0.0.0.0:8080
//! data_dir: /var/lib/handball
//! catalog_path: catalog.yaml
//! history_len: 40
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::storage::file_store::DEFAULT_DATA_DIR;
use crate::taxonomy::{Catalog, CatalogError};
use crate::tracker::DEFAULT_HISTORY_LEN;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

pub const CONFIG_ENV: &str = "HANDBALL_CONFIG";
pub const BIND_ENV: &str = "HANDBALL_BIND";
pub const DATA_DIR_ENV: &str = "HANDBALL_DATA_DIR";
pub const CATALOG_ENV: &str = "HANDBALL_CATALOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind_addr: String,
    pub data_dir: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub history_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            catalog_path: None,
            history_len: DEFAULT_HISTORY_LEN,
        }
    }
}

impl Config {
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, overlaid by `$HANDBALL_CONFIG` (if set) and the individual variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_yaml_file(Path::new(&path))?,
            None => Self::default(),
        };
        Ok(base.with_overrides(|key| env::var(key).ok()))
    }

    /// Apply variable overrides from `lookup`; blank values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(bind) = get(BIND_ENV) {
            self.bind_addr = bind;
        }
        if let Some(dir) = get(DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(catalog) = get(CATALOG_ENV) {
            self.catalog_path = Some(PathBuf::from(catalog));
        }
        self
    }

    pub fn load_catalog(&self) -> Result<Catalog, ConfigError> {
        match &self.catalog_path {
            Some(path) => Ok(Catalog::load(path)?),
            None => Ok(Catalog::handball()),
        }
    }
}
