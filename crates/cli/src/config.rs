//! Layered configuration from command-line overrides and TOML property files.

use policy::ConfigSource;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Property files read when neither `--properties` nor `PROPERTIES` is set.
pub const DEFAULT_PROPERTIES: &str = "conf/app.toml:local.toml:sample.toml";

/// Configuration assembled from several layers.
///
/// Layers are consulted in the order they were added and the first one
/// holding a key wins, so overrides go in before property files.
#[derive(Debug, Default)]
pub struct Config {
    layers: Vec<Layer>,
}

#[derive(Debug)]
struct Layer {
    origin: String,
    values: BTreeMap<String, String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides followed by every file in the `properties` list.
    pub fn load<S: AsRef<str>>(properties: &str, overrides: &[S]) -> Result<Self, ConfigError> {
        Self::new()
            .with_overrides(overrides)?
            .with_property_files(properties)
    }

    /// Add a layer of `key=value` definitions.
    pub fn with_overrides<S: AsRef<str>>(mut self, defines: &[S]) -> Result<Self, ConfigError> {
        let mut values = BTreeMap::new();
        for define in defines {
            let define = define.as_ref();
            let (key, value) = define
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidOverride(define.to_string()))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::InvalidOverride(define.to_string()));
            }
            values.insert(key.to_string(), value.to_string());
        }

        if !values.is_empty() {
            debug!(count = values.len(), "loaded command-line overrides");
            self.layers.push(Layer {
                origin: "command line".to_string(),
                values,
            });
        }
        Ok(self)
    }

    /// Add one layer per file in a path list separated like `PATH`.
    pub fn with_property_files(self, list: &str) -> Result<Self, ConfigError> {
        std::env::split_paths(list)
            .filter(|path| !path.as_os_str().is_empty())
            .try_fold(self, |config, path| config.with_property_file(path))
    }

    /// Add a layer from a TOML file. A missing file is skipped.
    pub fn with_property_file(mut self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "property file not found, skipping");
                return Ok(self);
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let values = Self::parse(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        debug!(path = %path.display(), keys = values.len(), "loaded property file");
        self.layers.push(Layer {
            origin: path.display().to_string(),
            values,
        });
        Ok(self)
    }

    /// Parse TOML into flat dotted keys.
    pub fn parse(toml: &str) -> Result<BTreeMap<String, String>, String> {
        let table: toml::Table = toml::from_str(toml).map_err(|e| e.to_string())?;
        let mut values = BTreeMap::new();
        flatten("", &table, &mut values)?;
        Ok(values)
    }

    /// Where the effective value of `key` comes from.
    pub fn origin(&self, key: &str) -> Option<&str> {
        self.layers
            .iter()
            .find(|layer| layer.values.contains_key(key))
            .map(|layer| layer.origin.as_str())
    }
}

impl ConfigSource for Config {
    fn raw(&self, key: &str) -> Option<&str> {
        self.layers
            .iter()
            .find_map(|layer| layer.values.get(key))
            .map(String::as_str)
    }
}

fn flatten(
    prefix: &str,
    table: &toml::Table,
    out: &mut BTreeMap<String, String>,
) -> Result<(), String> {
    for (name, value) in table {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        match value {
            toml::Value::Table(nested) => flatten(&key, nested, out)?,
            toml::Value::String(s) => {
                out.insert(key, s.clone());
            }
            toml::Value::Array(_) => return Err(format!("{key}: arrays are not supported")),
            other => {
                out.insert(key, other.to_string());
            }
        }
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid definition '{0}': expected KEY=VALUE")]
    InvalidOverride(String),
}
