//! Configuration loading and root folder resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable config file is never fatal: a warning is logged
//! and the remaining sources are used.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::aggregate::SkillAttribution;
use crate::{Error, Result};

/// Root folder holding `lcx.db`
pub const ENV_ROOT_FOLDER: &str = "LCX_ROOT_FOLDER";
/// Explicit config file path
pub const ENV_CONFIG_FILE: &str = "LCX_CONFIG";
/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "lcx.db";

/// Built-in defaults for the current platform
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub bind_addr: String,
    pub store_url: String,
    pub refresh_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = dirs::data_local_dir()
            .map(|d| d.join("lcx"))
            .unwrap_or_else(|| PathBuf::from("./lcx_data"));

        Self {
            root_folder,
            // Port the first deployment of the form posted to
            bind_addr: "127.0.0.1:3001".to_string(),
            store_url: "http://127.0.0.1:3001".to_string(),
            refresh_interval_ms: 5000,
            // Below the refresh interval so a fetch normally finishes before the next tick
            request_timeout_ms: 4000,
            log_level: "info".to_string(),
        }
    }
}

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub dashboard: DashboardSection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[store]` section, read by lcx-rs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSection {
    /// Listen address, e.g. "0.0.0.0:3001"
    pub bind: Option<String>,
    /// Legacy JSON export to import on first start
    pub import_file: Option<PathBuf>,
}

/// `[dashboard]` section, read by lcx-dv
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardSection {
    pub store_url: Option<String>,
    pub refresh_interval_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub skill_attribution: Option<SkillAttribution>,
}

/// `[logging]` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,
}

impl LoggingConfig {
    /// Configured level, or the compiled default when `level` is absent
    pub fn level_or_default(&self) -> String {
        self.level
            .clone()
            .unwrap_or_else(|| CompiledDefaults::for_current_platform().log_level)
    }
}

/// Parse a config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

/// Locate the config file: `LCX_CONFIG`, then the user config dir, then /etc
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(ENV_CONFIG_FILE) {
        return Some(PathBuf::from(path));
    }

    let user_config = dirs::config_dir().map(|d| d.join("lcx").join("config.toml"));
    if let Some(path) = user_config.filter(|p| p.exists()) {
        return Some(path);
    }

    let system_config = PathBuf::from("/etc/lcx/config.toml");
    if cfg!(unix) && system_config.exists() {
        return Some(system_config);
    }

    None
}

/// Load the config file if one exists, falling back to an empty config
pub fn load_toml_config_or_default(explicit: Option<&Path>) -> TomlConfig {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) => path,
            None => {
                debug!("No config file found, using defaults");
                return TomlConfig::default();
            }
        },
    };

    match load_toml_config(&path) {
        Ok(config) => {
            debug!("Loaded config file {}", path.display());
            config
        }
        Err(e) => {
            warn!("Ignoring config file {}: {}", path.display(), e);
            TomlConfig::default()
        }
    }
}

/// Resolve one setting: CLI, then environment, then TOML, then default
///
/// An environment value that does not parse is logged and skipped.
pub fn resolve_setting<T: FromStr>(
    cli: Option<T>,
    env_var: &str,
    toml: Option<T>,
    default: T,
) -> T {
    if let Some(value) = cli {
        return value;
    }

    if let Ok(raw) = std::env::var(env_var) {
        match raw.parse::<T>() {
            Ok(value) => return value,
            Err(_) => warn!("Ignoring {}={:?}: not a valid value", env_var, raw),
        }
    }

    toml.unwrap_or(default)
}

/// Resolves the root folder holding the database
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_value: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(cli_arg: Option<PathBuf>, toml: &TomlConfig) -> Self {
        Self {
            cli_arg,
            toml_value: toml.root_folder.clone(),
        }
    }

    pub fn resolve(&self) -> PathBuf {
        resolve_setting(
            self.cli_arg.clone(),
            ENV_ROOT_FOLDER,
            self.toml_value.clone(),
            CompiledDefaults::for_current_platform().root_folder,
        )
    }
}

/// Prepares the root folder on first run
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder if missing; idempotent
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}
