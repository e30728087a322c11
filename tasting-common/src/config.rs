//! Configuration loading and root folder resolution
//!
//! Bootstrap settings come from a small TOML file. Everything in it is
//! optional; a missing file means compiled defaults.
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable consulted for the root folder
pub const ROOT_FOLDER_ENV: &str = "TASTING_ROOT_FOLDER";

/// Database file name used when `database_path` is not configured
pub const DEFAULT_DATABASE_FILE: &str = "tasting.db";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Path to SQLite database file. Relative paths resolve against the root folder.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Root folder for the database and log files
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Wine search tuning
    #[serde(default)]
    pub search: SearchSettings,
}

/// Where [`TomlConfig::load`] got its values from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// Built-in defaults. `missing` is the path that was tried, if any.
    Defaults { missing: Option<PathBuf> },
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Wine search tuning knobs
///
/// Defaults match the autocomplete behaviour: queries start at two
/// characters, each source contributes at most six rows and the dropdown
/// shows at most eight candidates.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SearchSettings {
    /// Minimum term length (in characters) before a query is issued
    #[serde(default = "default_min_term_len")]
    pub min_term_len: usize,

    /// Row cap applied to each source query
    #[serde(default = "default_per_source_limit")]
    pub per_source_limit: usize,

    /// Cap on the merged, deduplicated result set
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,

    /// Delay between losing focus and hiding the dropdown
    #[serde(default = "default_blur_grace_ms")]
    pub blur_grace_ms: u64,
}

fn default_port() -> u16 {
    5740
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_min_term_len() -> usize {
    2
}

fn default_per_source_limit() -> usize {
    6
}

fn default_display_limit() -> usize {
    8
}

fn default_blur_grace_ms() -> u64 {
    150
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            port: default_port(),
            root_folder: None,
            logging: LoggingConfig::default(),
            search: SearchSettings::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_term_len: default_min_term_len(),
            per_source_limit: default_per_source_limit(),
            display_limit: default_display_limit(),
            blur_grace_ms: default_blur_grace_ms(),
        }
    }
}

impl SearchSettings {
    /// Blur grace delay as a `Duration`
    pub fn blur_grace(&self) -> Duration {
        Duration::from_millis(self.blur_grace_ms)
    }

    /// Reject settings that would make the search unusable
    pub fn validate(&self) -> Result<()> {
        if self.min_term_len == 0 {
            return Err(Error::Config("search.min_term_len must be at least 1".to_string()));
        }
        if self.per_source_limit == 0 || self.display_limit == 0 {
            return Err(Error::Config(
                "search.per_source_limit and search.display_limit must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.search.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit path, or the platform default path.
    ///
    /// A missing file is not an error: defaults are used and the returned
    /// [`ConfigSource`] says so. A file that exists but fails to parse is an
    /// error. Nothing is logged here because this runs before logging is set
    /// up; callers report the source once tracing is initialized.
    pub fn load(explicit_path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let path = match explicit_path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => return Ok((Self::default(), ConfigSource::Defaults { missing: None })),
            },
        };

        if !path.exists() {
            return Ok((Self::default(), ConfigSource::Defaults { missing: Some(path) }));
        }

        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&content)?;
        Ok((config, ConfigSource::File(path)))
    }

    /// Resolve the database file path against the root folder
    pub fn resolve_database_path(&self, root_folder: &Path) -> PathBuf {
        match &self.database_path {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => root_folder.join(p),
            None => root_folder.join(DEFAULT_DATABASE_FILE),
        }
    }
}

/// Root folder resolution following the priority order in the module docs
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config: &TomlConfig,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Get default configuration file path for the platform, if one exists
fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("tasting").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/tasting/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("tasting"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/tasting"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("tasting"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/tasting"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("tasting"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\tasting"))
    } else {
        PathBuf::from("./tasting_data")
    }
}
