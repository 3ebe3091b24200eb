use thiserror::Error;

/// Problems reading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("can't read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("can't parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("section [{section}] not found in file {path}")]
    MissingSection { path: String, section: String },

    #[error("section [{section}] in file {path} is not a table of key/value pairs")]
    InvalidSection { path: String, section: String },

    #[error("key '{key}' is missing from section [{section}]")]
    MissingKey { section: String, key: String },
}

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to connect to {path}: {source}")]
    Connection {
        path: String,
        source: duckdb::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] duckdb::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode response for employer {employer_id}: {source}")]
    Decode {
        employer_id: i64,
        source: serde_json::Error,
    },
}
