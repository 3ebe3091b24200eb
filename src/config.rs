use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use toml::Value;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "config/database.toml";
pub const DEFAULT_SECTION: &str = "duckdb";

/// Read the key/value pairs of one `[section]` of a TOML file.
///
/// Scalar values are returned as strings, e.g. `port = 5432` becomes `"5432"`.
/// Nothing is validated here, a bad value only shows up when it gets used.
pub fn load_section<P: AsRef<Path>>(
    path: P,
    section: &str,
) -> Result<BTreeMap<String, String>, ConfigError> {
    let path_str = path.as_ref().display().to_string();
    let content = fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Io {
        path: path_str.clone(),
        source,
    })?;
    let doc: toml::Table = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path_str.clone(),
        source,
    })?;

    let table = match doc.get(section) {
        Some(Value::Table(table)) => table,
        Some(_) => {
            return Err(ConfigError::InvalidSection {
                path: path_str,
                section: section.to_string(),
            })
        }
        None => {
            return Err(ConfigError::MissingSection {
                path: path_str,
                section: section.to_string(),
            })
        }
    };

    let mut params = BTreeMap::new();
    for (key, value) in table {
        let value = match value {
            Value::String(s) => s.clone(),
            Value::Integer(n) => n.to_string(),
            Value::Float(x) => x.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Datetime(dt) => dt.to_string(),
            Value::Array(_) | Value::Table(_) => {
                return Err(ConfigError::InvalidSection {
                    path: path_str,
                    section: section.to_string(),
                })
            }
        };
        params.insert(key.clone(), value);
    }
    debug!("Read {} keys from [{}] in {}", params.len(), section, path_str);
    Ok(params)
}

/// Connection parameters for the DuckDB store.
#[derive(Clone, Debug, PartialEq)]
pub struct DbConfig {
    pub duckdb_path: String,
}

impl DbConfig {
    pub fn from_section(
        section: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<DbConfig, ConfigError> {
        let duckdb_path = params.get("path").ok_or_else(|| ConfigError::MissingKey {
            section: section.to_string(),
            key: "path".to_string(),
        })?;
        Ok(DbConfig {
            duckdb_path: duckdb_path.clone(),
        })
    }

    pub fn load<P: AsRef<Path>>(path: P, section: &str) -> Result<DbConfig, ConfigError> {
        let params = load_section(path, section)?;
        DbConfig::from_section(section, &params)
    }
}
