//! Server configuration.
//!
//! Values come from the command line (or matching environment variables),
//! then an optional TOML file, then built-in defaults.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::db::PoolSettings;

pub const DEFAULT_FEATURES_TABLE: &str = "osm_spb_features";
pub const DEFAULT_REGIONS_TABLE: &str = "regions";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Missing DATABASE_URL. Pass --database-url, set the environment variable, or add database_url to the config file.")]
    MissingDatabaseUrl,
    #[error("Invalid table identifier '{0}': expected name or schema.name")]
    InvalidTable(String),
}

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "server")]
#[command(about = "PostGIS GeoJSON query server")]
pub struct Args {
    /// Listen address
    #[arg(short, long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8000")]
    pub listen: String,

    /// Optional TOML config file
    #[arg(short, long, env = "GEOQUERY_CONFIG")]
    pub config: Option<PathBuf>,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Table holding the queried features
    #[arg(long, env = "FEATURES_TABLE")]
    pub features_table: Option<String>,

    /// Table holding region polygons
    #[arg(long, env = "REGIONS_TABLE")]
    pub regions_table: Option<String>,

    /// Connection pool size
    #[arg(long, env = "DB_MAX_CONNECTIONS")]
    pub max_connections: Option<u32>,

    /// Seconds to wait for a pooled connection
    #[arg(long, env = "DB_ACQUIRE_TIMEOUT_SECS")]
    pub acquire_timeout_secs: Option<u64>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Contents of the optional config file. Every key is optional.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct FileConfig {
    pub database_url: Option<String>,
    pub features_table: Option<String>,
    pub regions_table: Option<String>,
    #[serde(default)]
    pub pool: PoolFileConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PoolFileConfig {
    pub max_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: FileConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

/// SQL table identifier taken from operator configuration.
///
/// It is spliced into query text, so only `name` or `schema.name` made of
/// identifier characters is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let pattern = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
            .map_err(|_| ConfigError::InvalidTable(raw.to_string()))?;
        if pattern.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ConfigError::InvalidTable(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two tables queries run against
#[derive(Debug, Clone)]
pub struct Tables {
    pub features: TableName,
    pub regions: TableName,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            features: TableName(DEFAULT_FEATURES_TABLE.to_string()),
            regions: TableName(DEFAULT_REGIONS_TABLE.to_string()),
        }
    }
}

/// Fully resolved configuration, built once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen: String,
    pub database_url: String,
    pub tables: Tables,
    pub pool: PoolSettings,
}

impl AppConfig {
    /// Load the config file named by `args` (if any) and merge.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => FileConfig::load_from_file(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(args, file)
    }

    /// Merge command line values over file values over defaults.
    pub fn resolve(args: &Args, file: FileConfig) -> Result<Self, ConfigError> {
        let database_url = args
            .database_url
            .clone()
            .or(file.database_url)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        let features = args
            .features_table
            .clone()
            .or(file.features_table)
            .unwrap_or_else(|| DEFAULT_FEATURES_TABLE.to_string());
        let regions = args
            .regions_table
            .clone()
            .or(file.regions_table)
            .unwrap_or_else(|| DEFAULT_REGIONS_TABLE.to_string());

        let defaults = PoolSettings::default();
        let pool = PoolSettings {
            max_connections: args
                .max_connections
                .or(file.pool.max_connections)
                .unwrap_or(defaults.max_connections),
            acquire_timeout: args
                .acquire_timeout_secs
                .or(file.pool.acquire_timeout_secs)
                .map(Duration::from_secs)
                .unwrap_or(defaults.acquire_timeout),
        };

        Ok(Self {
            listen: args.listen.clone(),
            database_url,
            tables: Tables {
                features: TableName::parse(&features)?,
                regions: TableName::parse(&regions)?,
            },
            pool,
        })
    }
}
