//! lcx-rs specific configuration

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use lcx_common::config::{resolve_setting, CompiledDefaults, RootFolderResolver, TomlConfig};

/// Listen address override
pub const ENV_BIND: &str = "LCX_BIND";
/// Explicit database path, bypassing the root folder
pub const ENV_DB_PATH: &str = "LCX_DB_PATH";
/// Legacy export to import into an empty store
pub const ENV_IMPORT_FILE: &str = "LCX_IMPORT_FILE";

/// Command-line values; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct StoreOverrides {
    pub root_folder: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub bind: Option<String>,
    pub import_file: Option<PathBuf>,
}

/// Response store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub root_folder: PathBuf,
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub import_file: Option<PathBuf>,
}

impl StoreConfig {
    /// Resolve every setting: CLI, environment, TOML, compiled default
    pub fn resolve(overrides: StoreOverrides, toml: &TomlConfig) -> Result<Self> {
        let defaults = CompiledDefaults::for_current_platform();

        let root_folder = RootFolderResolver::new(overrides.root_folder, toml).resolve();
        let db_path = resolve_setting(
            overrides.db_path,
            ENV_DB_PATH,
            None,
            root_folder.join(lcx_common::config::DATABASE_FILE_NAME),
        );

        let bind = resolve_setting(
            overrides.bind,
            ENV_BIND,
            toml.store.bind.clone(),
            defaults.bind_addr,
        );
        let bind_addr: SocketAddr = bind
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", bind))?;

        let import_file = overrides
            .import_file
            .or_else(|| std::env::var(ENV_IMPORT_FILE).ok().map(PathBuf::from))
            .or_else(|| toml.store.import_file.clone());

        Ok(Self {
            root_folder,
            db_path,
            bind_addr,
            import_file,
        })
    }
}
