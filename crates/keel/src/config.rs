use keel_core::{err, Error, Result};
use serde::{Deserialize, Serialize};

use std::path::Path;

/// Engine configuration.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```
/// let config = keel::Config::from_toml("registry_table = \"cc_schema_version\"").unwrap();
/// assert_eq!(config.registry_table, "cc_schema_version");
/// assert_eq!(config.storage_engine, "InnoDB");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Name of the table recording each managed table's schema version.
    pub registry_table: String,

    /// MySQL storage engine for created tables.
    pub storage_engine: String,

    /// MySQL default character set for created tables.
    pub charset: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_table: "schema_version".to_string(),
            storage_engine: "InnoDB".to_string(),
            charset: "utf8".to_string(),
        }
    }
}

impl Config {
    /// Create a new Config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry_table(mut self, name: impl Into<String>) -> Self {
        self.registry_table = name.into();
        self
    }

    pub fn storage_engine(mut self, engine: impl Into<String>) -> Self {
        self.storage_engine = engine.into();
        self
    }

    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|err| err!("invalid keel configuration: {err}"))
    }

    /// Loads a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|err| {
            Error::from(err).context(err!("reading {}", path.display()))
        })?;
        Self::from_toml(&contents)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|err| err!("serializing keel configuration: {err}"))
    }
}
