//! Hornet Configuration System
//!
//! Settings for running Hornet programs come from, in order of precedence
//! (later overrides earlier):
//! 1. Global config (`~/.hornet/config.toml`)
//! 2. Project config (`hornet.toml`, searched upward from the working directory)
//! 3. Environment variables (`HORNET_MODE`, `HORNET_GC`, `HORNET_NETWORK`)
//! 4. CLI flags (applied by the caller)
//!
//! Both files share one schema:
//!
//! ```toml
//! [session]
//! mode = "worker"        # or "in-process"
//!
//! [solver]
//! gc = true
//! gc_threshold = 65536
//!
//! [permissions]
//! network = "deny"       # or "allow"
//! ```
//!
//! # Example
//!
//! ```no_run
//! use hornet_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("mode: {}", config.mode());
//! ```

pub mod loader;
pub mod settings;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use loader::{Config, ConfigLoader, DEFAULT_GC_THRESHOLD, PROJECT_FILE};
pub use settings::{PermissionsSettings, SessionSettings, Settings, SolverSettings};
