mod catalog;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use suspension_engine::{
    Affinity, ByteDiff, CompareOptions, DiffAdapter, DiffAlgorithm, SuspensionError, TokenCatalog,
};
use thiserror::Error;

pub use catalog::{CatalogFile, TokenEntry};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid token in {catalog_path}: {source}")]
    InvalidToken {
        catalog_path: PathBuf,
        source: SuspensionError,
    },

    #[error("Token set {name:?} is not defined in {catalog_path}")]
    UnknownTokenSet { catalog_path: PathBuf, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog TOML to load; the built-in repositext catalog when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
    /// Named token set within the catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_set: Option<String>,
    pub affinity: Affinity,
    pub diff_algorithm: DiffAlgorithm,
    pub excerpt_window: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: None,
            token_set: None,
            affinity: Affinity::default(),
            diff_algorithm: DiffAlgorithm::default(),
            excerpt_window: CompareOptions::default().excerpt_window,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the catalog path
        config.catalog = config
            .catalog
            .map(|catalog| Self::expand_path(&catalog).unwrap_or(catalog));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/suspension");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// The configured catalog, narrowed to `token_set` when one is named.
    pub fn load_catalog(&self) -> Result<TokenCatalog, ConfigError> {
        let file = match &self.catalog {
            Some(path) => CatalogFile::load(path)?,
            None => CatalogFile::builtin()?,
        };
        file.catalog(self.token_set.as_deref())
    }

    pub fn diff_adapter(&self) -> DiffAdapter<ByteDiff> {
        DiffAdapter::new(ByteDiff::new(self.diff_algorithm))
    }

    pub fn compare_options(&self) -> CompareOptions {
        CompareOptions {
            excerpt_window: self.excerpt_window,
            ..CompareOptions::default()
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
