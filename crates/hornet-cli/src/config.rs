//! CLI configuration
//!
//! Project and global settings come from `hornet-config`; flags given on the
//! command line win over both. REPL history is configured through
//! environment variables only.

use anyhow::{Context, Result};
use hornet_runtime::foreign::{prelude, DeniedIo, HostIo, HttpIo};
use hornet_runtime::{ExecutionMode, ForeignRegistry, SessionOptions};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Flags that override loaded settings
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub mode: Option<String>,
    pub gc: bool,
    pub allow_network: bool,
}

/// Effective settings for one command
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub mode: ExecutionMode,
    pub gc: bool,
    pub gc_threshold: usize,
    pub network: bool,
}

impl RunSettings {
    /// Load settings for a command working on files under `dir`
    pub fn load(dir: &Path, overrides: &Overrides) -> Result<Self> {
        let loaded = hornet_config::ConfigLoader::new()
            .load_from_directory(dir)
            .context("Failed to load configuration")?;

        let mode_name = overrides.mode.as_deref().unwrap_or_else(|| loaded.mode());
        let mode = mode_name
            .parse::<ExecutionMode>()
            .map_err(anyhow::Error::msg)?;

        Ok(Self {
            mode,
            gc: overrides.gc || loaded.gc(),
            gc_threshold: loaded.gc_threshold(),
            network: overrides.allow_network || loaded.network_allowed(),
        })
    }

    /// Host procedures available to programs, with network access as configured
    pub fn registry(&self) -> ForeignRegistry {
        let io: Arc<dyn HostIo> = if self.network {
            Arc::new(HttpIo)
        } else {
            Arc::new(DeniedIo)
        };
        prelude(io)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            gc_threshold: self.gc_threshold,
        }
    }
}

/// Directory holding `file`, used as the start of the `hornet.toml` search
pub fn config_dir_for(file: &Path) -> Result<PathBuf> {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.to_path_buf()),
        _ => env::current_dir().context("Failed to determine working directory"),
    }
}

/// REPL history settings (HORNET_HISTORY_FILE, HORNET_NO_HISTORY)
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    pub history_file: Option<PathBuf>,
    pub no_history: bool,
}

impl HistoryConfig {
    pub fn from_env() -> Self {
        Self {
            history_file: env::var("HORNET_HISTORY_FILE").ok().map(PathBuf::from),
            no_history: env::var("HORNET_NO_HISTORY").is_ok(),
        }
    }

    /// Get the history file path
    ///
    /// Returns:
    /// 1. HORNET_HISTORY_FILE if set
    /// 2. ~/.hornet/history if home directory exists
    /// 3. None otherwise
    pub fn history_path(&self) -> Option<PathBuf> {
        if let Some(ref path) = self.history_file {
            return Some(path.clone());
        }
        dirs::home_dir().map(|home| home.join(".hornet").join("history"))
    }
}
