// Configuration loading and parsing (config/ryoe.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::stats::Columns;

/// File name of the main config file inside `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "ryoe.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub columns: Columns,
    pub query: QueryConfig,
    pub database: DatabaseConfig,
}

/// Where the CSV comes from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Local path or `http(s)://` URL.
    pub source: String,
    /// Ask HTTP caches not to store the response.
    pub no_store: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: "RYOE.csv".into(),
            no_store: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub suggestion_limit: usize,
    pub top_n: usize,
    pub default_min_rushes: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            suggestion_limit: crate::stats::SUGGESTION_LIMIT,
            top_n: crate::stats::DEFAULT_TOP_N,
            default_min_rushes: 10,
        }
    }
}

/// Target of the `import` command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/ryoe.db".into(),
            table: "ryoe".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/ryoe.toml` under `base_dir`.
///
/// A missing file is not an error: the built-in defaults are used instead.
/// Does not copy defaults; see [`load_config`].
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    if !path.exists() {
        let config = Config::default();
        validate(&config)?;
        return Ok(config);
    }
    load_config_file(&path)
}

/// Load and validate one explicit config file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let text = read_file(path)?;
    let config = parse_config(&text).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })?;
    validate(&config)?;
    Ok(config)
}

fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(text)
}

/// Copy `defaults/ryoe.toml` to `config/ryoe.toml` unless the target
/// already exists. Returns the path written, if any. Nothing else under
/// `defaults/` is touched.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let default_file = base_dir.join("defaults").join(CONFIG_FILE);
    if !default_file.is_file() {
        return Ok(None);
    }

    let config_dir = base_dir.join("config");
    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;
    let target = config_dir.join(CONFIG_FILE);

    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(mut dest) => {
            let content = std::fs::read(&default_file).map_err(|e| ConfigError::DefaultsCopyError {
                message: format!("failed to read {}: {e}", default_file.display()),
            })?;
            std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                ConfigError::DefaultsCopyError {
                    message: format!("failed to write {}: {e}", target.display()),
                }
            })?;
            Ok(Some(target))
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", target.display()),
        }),
    }
}

/// Load config relative to the current working directory, seeding
/// `config/ryoe.toml` from `defaults/` first when it is missing.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.data.source.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.source".into(),
            message: "must not be empty".into(),
        });
    }

    let c = &config.columns;
    let column_fields: &[(&str, &str)] = &[
        ("columns.name", c.name.as_str()),
        ("columns.id", c.id.as_str()),
        ("columns.value", c.value.as_str()),
        ("columns.count", c.count.as_str()),
    ];
    for (name, val) in column_fields {
        if val.is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    let q = &config.query;
    let limit_fields: &[(&str, usize)] = &[
        ("query.suggestion_limit", q.suggestion_limit),
        ("query.top_n", q.top_n),
    ];
    for (name, val) in limit_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    if config.database.table.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.table".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
