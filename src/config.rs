//! Configuration loading
//!
//! Two TOML files are read from the SDK's base directory and merged table
//! by table: `unrealsdk.toml`, then `unrealsdk.user.toml` on top of it. The
//! SDK's own settings live under `[unrealsdk]`; any other tables are kept
//! in the merged document for plugins to query with [`Config::get_str`]
//! and friends.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::{Lazy, OnceCell};
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::{Result, SdkError};

pub const BASE_FILE_NAME: &str = "unrealsdk.toml";
pub const USER_FILE_NAME: &str = "unrealsdk.user.toml";

/// Overrides the base directory
pub const HOME_ENV: &str = "UNREALSDK_HOME";
/// Overrides the path of the base config file
pub const CONFIG_FILE_ENV: &str = "UNREALSDK_CONFIG_FILE";

static CONFIG: OnceCell<Config> = OnceCell::new();
static DEFAULT: Lazy<Config> = Lazy::new(Config::default);

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub unrealsdk: SdkConfig,

    /// Full merged document, including tables the SDK does not own
    #[serde(skip)]
    raw: toml::Table,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SdkConfig {
    /// Relative paths resolve against the base directory
    #[serde(default = "default_log_file")]
    pub log_file: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Minimum level mirrored to the host console
    #[serde(default = "default_console_log_level")]
    pub console_log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            log_level: default_log_level(),
            console_log_level: default_console_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

fn default_log_file() -> String {
    "unrealsdk.log".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_console_log_level() -> String {
    "warn".to_string()
}

impl SdkConfig {
    /// Console threshold as a level, falling back to `WARN` if unparsable
    pub fn console_level(&self) -> Level {
        self.console_log_level.parse().unwrap_or(Level::WARN)
    }
}

impl Config {
    /// Parse a single document
    pub fn parse(content: &str) -> Result<Self> {
        let table = parse_table(content, Path::new("<inline>"))?;
        Self::from_table(table, Path::new("<inline>"))
    }

    /// Load and merge `base` then `user`; either may be missing
    ///
    /// Each file is checked on its own first, so a type error names the file
    /// it came from.
    pub fn load_from(base: &Path, user: &Path) -> Result<Self> {
        let mut merged = toml::Table::new();
        for path in [base, user] {
            if let Some(table) = read_table(path)? {
                Self::from_table(table.clone(), path)?;
                merge_tables(&mut merged, table);
            }
        }
        Self::from_table(merged, user)
    }

    fn from_table(table: toml::Table, origin: &Path) -> Result<Self> {
        let mut config: Self = toml::Value::Table(table.clone())
            .try_into()
            .map_err(|e: toml::de::Error| config_error(origin, e))?;
        config.raw = table;
        Ok(config)
    }

    /// Look up a dotted key path, e.g. `"unrealsdk.log_file"`
    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        let mut parts = key.split('.');
        let mut current = self.raw.get(parts.next()?)?;
        for part in parts {
            current = current.as_table()?.get(part)?;
        }
        Some(current)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key)?.as_integer()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    /// Log file location, resolved against `base_dir` when relative
    pub fn log_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.unrealsdk.log_file)
    }
}

/// Directory holding the config files and the default log file
pub fn base_dir() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return PathBuf::from(home);
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Paths of the base and user config files
pub fn config_paths(base_dir: &Path) -> (PathBuf, PathBuf) {
    let base = std::env::var_os(CONFIG_FILE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| base_dir.join(BASE_FILE_NAME));
    (base, base_dir.join(USER_FILE_NAME))
}

/// Load the process-wide config
///
/// Only the first successful call reads the files; later calls return the
/// stored config.
pub fn load() -> Result<&'static Config> {
    CONFIG.get_or_try_init(|| {
        let (base, user) = config_paths(&base_dir());
        Config::load_from(&base, &user)
    })
}

/// Process-wide config, or the defaults if [`load`] has not succeeded
pub fn get() -> &'static Config {
    CONFIG.get().unwrap_or(&DEFAULT)
}

fn read_table(path: &Path) -> Result<Option<toml::Table>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    parse_table(&content, path).map(Some)
}

fn parse_table(content: &str, path: &Path) -> Result<toml::Table> {
    toml::from_str(content).map_err(|e: toml::de::Error| config_error(path, e))
}

fn config_error(path: &Path, e: toml::de::Error) -> SdkError {
    SdkError::Config {
        path: path.display().to_string(),
        reason: e.message().to_string(),
    }
}

/// Recursively overlay `overlay` onto `base`; scalar values in `overlay` win
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
