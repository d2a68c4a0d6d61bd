//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::settings::{validate_mode, validate_permission, Settings};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const PROJECT_FILE: &str = "hornet.toml";

/// Default heap size in cells before the first collection
pub const DEFAULT_GC_THRESHOLD: usize = 65_536;

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.hornet/config.toml) - lowest priority
/// 2. Project config (./hornet.toml) - overrides global
/// 3. Environment variables (HORNET_*) - overrides project
/// 4. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Effective settings after merging every source
    pub settings: Settings,

    /// Project root directory (where hornet.toml was found)
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Loader that reads global settings from `path` instead of the home directory
    pub fn with_global_config(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: Some(path.into()),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find hornet.toml and layers it over
    /// the global config if one exists.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project) = self.find_project_config(start_dir)?;
        self.assemble(project_root, project)
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project = Settings::load_from_file(config_path)?;
        let project_root = config_path.parent().map(|p| p.to_path_buf());
        self.assemble(project_root, project)
    }

    fn assemble(&mut self, project_root: Option<PathBuf>, project: Settings) -> ConfigResult<Config> {
        let mut settings = self.load_global_config()?;
        settings.merge(&project);
        apply_env_overrides(&mut settings)?;

        Ok(Config {
            settings,
            project_root,
        })
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(&self, start_dir: &Path) -> ConfigResult<(Option<PathBuf>, Settings)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_FILE);

            if config_path.exists() {
                let settings = Settings::load_from_file(&config_path)?;
                return Ok((Some(current), settings));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, Settings::default())),
            }
        }
    }

    /// Load global configuration, empty when the file is absent
    fn load_global_config(&mut self) -> ConfigResult<Settings> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => match Self::global_config_dir() {
                Ok(dir) => {
                    let path = dir.join("config.toml");
                    self.global_config_path = Some(path.clone());
                    path
                }
                // No home directory means no global config
                Err(ConfigError::HomeNotFound) => return Ok(Settings::default()),
                Err(e) => return Err(e),
            },
        };

        if !path.exists() {
            return Ok(Settings::default());
        }

        Settings::load_from_file(&path)
    }

    /// Get the global configuration directory (~/.hornet)
    pub fn global_config_dir() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".hornet"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `HORNET_MODE`, `HORNET_GC` and `HORNET_NETWORK`
fn apply_env_overrides(settings: &mut Settings) -> ConfigResult<()> {
    if let Ok(mode) = env::var("HORNET_MODE") {
        validate_mode("HORNET_MODE", &mode)?;
        settings.session.get_or_insert_with(Default::default).mode = Some(mode);
    }

    if let Ok(gc) = env::var("HORNET_GC") {
        let enabled = matches!(gc.to_lowercase().as_str(), "true" | "1" | "yes");
        settings.solver.get_or_insert_with(Default::default).gc = Some(enabled);
    }

    if let Ok(network) = env::var("HORNET_NETWORK") {
        validate_permission("HORNET_NETWORK", &network)?;
        settings.permissions.get_or_insert_with(Default::default).network = Some(network);
    }

    Ok(())
}

impl Config {
    /// Effective execution mode (defaults to "in-process")
    pub fn mode(&self) -> &str {
        self.settings.mode().unwrap_or("in-process")
    }

    /// Whether solver GC is enabled (defaults to off)
    pub fn gc(&self) -> bool {
        self.settings.gc().unwrap_or(false)
    }

    pub fn gc_threshold(&self) -> usize {
        self.settings.gc_threshold().unwrap_or(DEFAULT_GC_THRESHOLD)
    }

    /// Whether host procedures may reach the network (defaults to deny)
    pub fn network_allowed(&self) -> bool {
        self.settings.network() == Some("allow")
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if this is a project (has hornet.toml)
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}
