//! Settings schema shared by `hornet.toml` and `~/.hornet/config.toml`

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One configuration file's worth of settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Where sessions run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionSettings>,

    /// Solver tuning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolverSettings>,

    /// Capabilities granted to host procedures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionsSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct SessionSettings {
    /// "in-process" or "worker"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct SolverSettings {
    /// Collect garbage during long deterministic runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gc: Option<bool>,

    /// Heap size in cells that triggers the first collection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gc_threshold: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct PermissionsSettings {
    /// Network access for host procedures ("allow", "deny")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

impl Settings {
    /// Load settings from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let settings: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check enum-valued strings and numeric ranges
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(mode) = self.session.as_ref().and_then(|s| s.mode.as_deref()) {
            validate_mode("session.mode", mode)?;
        }

        if let Some(threshold) = self.solver.as_ref().and_then(|s| s.gc_threshold) {
            if threshold == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "solver.gc_threshold".to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        if let Some(network) = self.permissions.as_ref().and_then(|p| p.network.as_deref()) {
            validate_permission("permissions.network", network)?;
        }

        Ok(())
    }

    /// Merge another settings value into this one
    ///
    /// Values present in `other` win; absent ones leave `self` untouched.
    pub fn merge(&mut self, other: &Settings) {
        if let Some(session) = &other.session {
            let ours = self.session.get_or_insert_with(Default::default);
            if session.mode.is_some() {
                ours.mode = session.mode.clone();
            }
        }
        if let Some(solver) = &other.solver {
            let ours = self.solver.get_or_insert_with(Default::default);
            if solver.gc.is_some() {
                ours.gc = solver.gc;
            }
            if solver.gc_threshold.is_some() {
                ours.gc_threshold = solver.gc_threshold;
            }
        }
        if let Some(permissions) = &other.permissions {
            let ours = self.permissions.get_or_insert_with(Default::default);
            if permissions.network.is_some() {
                ours.network = permissions.network.clone();
            }
        }
    }

    pub fn mode(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.mode.as_deref())
    }

    pub fn gc(&self) -> Option<bool> {
        self.solver.as_ref().and_then(|s| s.gc)
    }

    pub fn gc_threshold(&self) -> Option<usize> {
        self.solver.as_ref().and_then(|s| s.gc_threshold)
    }

    pub fn network(&self) -> Option<&str> {
        self.permissions.as_ref().and_then(|p| p.network.as_deref())
    }
}

pub(crate) fn validate_mode(field: &str, value: &str) -> ConfigResult<()> {
    if !matches!(value, "in-process" | "worker") {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("must be 'in-process' or 'worker', got '{}'", value),
        });
    }
    Ok(())
}

pub(crate) fn validate_permission(field: &str, value: &str) -> ConfigResult<()> {
    if !matches!(value, "allow" | "deny") {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("must be 'allow' or 'deny', got '{}'", value),
        });
    }
    Ok(())
}
