// MDB - Managed Debugger
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Debugger configuration
//!
//! Configuration is stored as TOML in `~/.mdb.toml`. Missing keys fall back to
//! their defaults, so a partial file is always valid.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default time an inspection thread waits for a live evaluation to finish.
pub const DEFAULT_EVAL_TIMEOUT_MS: u64 = 5_000;

/// Settings that control how the debugger inspects a paused debuggee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebuggerConfig {
    /// Whether expressions may run property getters and methods on the debuggee
    pub property_evaluation: bool,
    /// How long to wait for a live evaluation, in milliseconds. `0` waits forever.
    pub eval_timeout_ms: u64,
    /// Whether logs are also written to a file
    pub file_logging: bool,
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        Self {
            property_evaluation: true,
            eval_timeout_ms: DEFAULT_EVAL_TIMEOUT_MS,
            file_logging: false,
        }
    }
}

impl DebuggerConfig {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home =
            dirs::home_dir().ok_or_else(|| eyre::eyre!("Unable to determine home directory"))?;
        Ok(home.join(".mdb.toml"))
    }

    /// Load configuration from the default path, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found, creating default at {:?}", config_path);
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {path:?}"))?;

        let config: Self =
            toml::from_str(&content).wrap_err("Failed to parse config file as TOML")?;

        debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).wrap_err("Failed to serialize config to TOML")?;

        fs::write(path, content)
            .wrap_err_with(|| format!("Failed to write config file: {path:?}"))?;

        debug!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Enable or disable live property and method evaluation
    pub fn with_property_evaluation(mut self, enabled: bool) -> Self {
        self.property_evaluation = enabled;
        self
    }

    /// Set the live evaluation timeout in milliseconds
    pub fn with_eval_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.eval_timeout_ms = timeout_ms;
        self
    }

    /// Enable or disable file logging
    pub fn with_file_logging(mut self, enabled: bool) -> Self {
        self.file_logging = enabled;
        self
    }

    /// Live evaluation timeout, or `None` to wait indefinitely
    pub fn eval_timeout(&self) -> Option<Duration> {
        (self.eval_timeout_ms > 0).then(|| Duration::from_millis(self.eval_timeout_ms))
    }
}
