//! Token catalogs stored as TOML.
//!
//! ```toml
//! [[tokens]]
//! name = "gap_mark"
//! pattern = '%'
//!
//! [sets]
//! at_specific = ["gap_mark"]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use suspension_engine::{TokenCatalog, TokenSpec};

use crate::ConfigError;

const BUILTIN: &str = include_str!("../catalogs/repositext.toml");

/// Where the built-in catalog claims to come from in error messages.
const BUILTIN_PATH: &str = "<builtin repositext catalog>";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    pub name: String,
    pub pattern: String,
    #[serde(default)]
    pub line_start: bool,
    #[serde(default)]
    pub plain_text: bool,
    #[serde(default)]
    pub transparent: bool,
}

/// A parsed catalog file, not yet compiled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub tokens: Vec<TokenEntry>,
    /// Named subsets of token names.
    #[serde(default)]
    pub sets: BTreeMap<String, Vec<String>>,
    #[serde(skip)]
    source: PathBuf,
}

impl CatalogFile {
    /// The repositext catalog shipped with this crate.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::parse(BUILTIN, BUILTIN_PATH)
    }

    pub fn load<P: AsRef<Path>>(catalog_path: P) -> Result<Self, ConfigError> {
        let catalog_path = catalog_path.as_ref();
        let content = std::fs::read_to_string(catalog_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: catalog_path.to_path_buf(),
                source,
            }
        })?;
        Self::parse(&content, catalog_path)
    }

    /// Parses catalog TOML; `source` only labels errors.
    pub fn parse(content: &str, source: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let source = source.into();
        let mut file: CatalogFile =
            toml::from_str(content).map_err(|err| ConfigError::ConfigParseError {
                config_path: source.clone(),
                source: err,
            })?;
        file.source = source;
        Ok(file)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Compiles every entry, in file order, then restricts the result to the
    /// named set.
    pub fn catalog(&self, set: Option<&str>) -> Result<TokenCatalog, ConfigError> {
        let catalog = self
            .tokens
            .iter()
            .map(|entry| self.compile(entry))
            .collect::<Result<Vec<_>, _>>()
            .map(TokenCatalog::new)?;

        let Some(set) = set else {
            return Ok(catalog);
        };
        let names = self
            .sets
            .get(set)
            .ok_or_else(|| ConfigError::UnknownTokenSet {
                catalog_path: self.source.clone(),
                name: set.to_string(),
            })?;
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let restricted = catalog.restrict(&names);
        debug!(
            "Token set {set:?} selects {} of {} tokens",
            restricted.len(),
            catalog.len()
        );
        Ok(restricted)
    }

    fn compile(&self, entry: &TokenEntry) -> Result<TokenSpec, ConfigError> {
        let mut spec = TokenSpec::new(entry.name.as_str(), &entry.pattern).map_err(|source| {
            ConfigError::InvalidToken {
                catalog_path: self.source.clone(),
                source,
            }
        })?;
        if entry.line_start {
            spec = spec.at_line_start();
        }
        if entry.plain_text {
            spec = spec.plain_text();
        }
        if entry.transparent {
            spec = spec.transparent_to_line_start();
        }
        Ok(spec)
    }
}
