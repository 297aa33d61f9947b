//! Configuration loading and setting resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error; the services start on defaults.

use crate::validation::ValidationRules;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the data folder
pub const ROOT_FOLDER_ENV: &str = "QDRILL_ROOT_FOLDER";
/// Environment variable naming the HTTP listen address
pub const BIND_ADDR_ENV: &str = "QDRILL_BIND_ADDR";
/// Environment variable naming the API base URL used by clients
pub const API_BASE_URL_ENV: &str = "QDRILL_API_BASE_URL";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "qdrill.db";

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub bind_addr: Option<String>,
    pub api_base_url: Option<String>,
    pub enforce_skill_levels: Option<bool>,
    pub logging: LoggingConfig,
}

/// `[logging]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive used when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Fallback values compiled into the binaries
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub bind_addr: String,
    pub api_base_url: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            bind_addr: "127.0.0.1:5000".to_string(),
            api_base_url: "http://127.0.0.1:5000".to_string(),
        }
    }
}

/// Default location of `config.toml` (`~/.config/qdrill/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("qdrill").join("config.toml"))
}

/// Load the TOML config
///
/// `None` means the platform default location. A file that does not exist
/// yields defaults with a warning; a file that exists but does not parse is an
/// error.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => path,
        None => {
            warn!("Could not determine config directory, using defaults");
            return Ok(TomlConfig::default());
        }
    };

    if !path.exists() {
        warn!("Config file not found: {} (using defaults)", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
    info!("Loaded config file: {}", path.display());
    Ok(config)
}

/// Resolved settings for one process
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub root_folder: PathBuf,
    pub bind_addr: String,
    pub api_base_url: String,
    pub rules: ValidationRules,
}

impl Settings {
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }
}

/// Values given on the command line, if any
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root_folder: Option<PathBuf>,
    pub bind_addr: Option<String>,
    pub api_base_url: Option<String>,
    pub enforce_skill_levels: bool,
}

/// Resolve every setting: CLI → environment → TOML → compiled default
pub fn resolve_settings(cli: &CliOverrides, toml: &TomlConfig) -> Settings {
    let defaults = CompiledDefaults::for_current_platform();

    let root_folder = cli
        .root_folder
        .clone()
        .or_else(|| env_value(ROOT_FOLDER_ENV).map(PathBuf::from))
        .or_else(|| toml.root_folder.clone())
        .unwrap_or(defaults.root_folder);
    let bind_addr = cli
        .bind_addr
        .clone()
        .or_else(|| env_value(BIND_ADDR_ENV))
        .or_else(|| toml.bind_addr.clone())
        .unwrap_or(defaults.bind_addr);
    let api_base_url = resolve_api_base_url(cli.api_base_url.as_deref(), toml);
    let enforce_skill_levels = cli.enforce_skill_levels || toml.enforce_skill_levels.unwrap_or(false);

    Settings {
        root_folder,
        bind_addr,
        api_base_url,
        rules: ValidationRules {
            enforce_skill_levels,
        },
    }
}

/// Base URL for API clients, without a trailing slash
pub fn resolve_api_base_url(cli: Option<&str>, toml: &TomlConfig) -> String {
    let url = cli
        .map(str::to_string)
        .or_else(|| env_value(API_BASE_URL_ENV))
        .or_else(|| toml.api_base_url.clone())
        .unwrap_or_else(|| CompiledDefaults::for_current_platform().api_base_url);
    url.trim_end_matches('/').to_string()
}

/// Set and non-blank environment variable
fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/qdrill (or /var/lib/qdrill for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("qdrill"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/qdrill"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/qdrill
        dirs::data_dir()
            .map(|d| d.join("qdrill"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/qdrill"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\qdrill
        dirs::data_local_dir()
            .map(|d| d.join("qdrill"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\qdrill"))
    } else {
        PathBuf::from("./qdrill_data")
    }
}
