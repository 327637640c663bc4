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

//! Logging configuration for MDB components
//!
//! Provides centralized logging setup with:
//! - Colorful console output with structured formatting
//! - Optional file logging to the temporary directory
//! - Environment variable support (RUST_LOG)

use std::{env, fs, path::PathBuf, sync::Once};

use eyre::{Result, WrapErr};
use tracing::Level;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, time::LocalTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::DebuggerConfig;

/// Initialize logging for an MDB component
///
/// Sets up a pretty console layer and, when `enable_file_logging` is set, a
/// daily-rotated log file under `$TMP/mdb-logs/<component_name>`. The log
/// level defaults to INFO and can be overridden through `RUST_LOG`.
///
/// # Arguments
/// * `component_name` - Name of the component (e.g., "mdb", "mdb-inspector")
/// * `enable_file_logging` - Whether to also write logs to a file
///
/// # Examples
/// ```rust
/// use mdb_common::logging;
///
/// fn main() -> eyre::Result<()> {
///     logging::init_logging("mdb", false)?;
///     tracing::info!("Debugger attached");
///     Ok(())
/// }
/// ```
pub fn init_logging(component_name: &str, enable_file_logging: bool) -> Result<()> {
    let env_filter = default_filter("info")?;

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_timer(LocalTime::rfc_3339())
        .with_ansi(true)
        .pretty();

    if enable_file_logging {
        let log_dir = create_log_directory(component_name)?;

        let file_appender = rolling::daily(&log_dir, format!("{component_name}.log"));
        let (non_blocking_appender, guard) = non_blocking(file_appender);

        // The guard flushes the appender on drop; the subscriber lives for the
        // rest of the process, so the guard has to as well.
        std::mem::forget(guard);

        let file_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_timer(LocalTime::rfc_3339())
            .with_ansi(false)
            .with_writer(non_blocking_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer.with_filter(EnvFilter::from_default_env()))
            .try_init()
            .map_err(|e| eyre::eyre!("Failed to initialize tracing subscriber: {e}"))?;

        tracing::info!(
            component = component_name,
            log_dir = %log_dir.display(),
            "Logging initialized with console and file output"
        );
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .try_init()
            .map_err(|e| eyre::eyre!("Failed to initialize tracing subscriber: {e}"))?;

        tracing::info!(component = component_name, "Logging initialized with console output only");
    }

    let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing::debug!(component = component_name, rust_log = %rust_log, "Environment information");

    Ok(())
}

/// Initialize logging for `component_name` with file output taken from the
/// `file_logging` setting of `config`.
pub fn init_logging_from_config(component_name: &str, config: &DebuggerConfig) -> Result<()> {
    init_logging(component_name, config.file_logging)
}

/// Build an [`EnvFilter`] from `RUST_LOG`, falling back to `default_level`.
fn default_filter(default_level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .wrap_err("Failed to create environment filter")
}

/// Create log directory in system temp folder
fn create_log_directory(component_name: &str) -> Result<PathBuf> {
    let log_dir = env::temp_dir().join("mdb-logs").join(component_name);

    fs::create_dir_all(&log_dir)
        .wrap_err_with(|| format!("Failed to create log directory {}", log_dir.display()))?;

    Ok(log_dir)
}

/// Initialize simple logging (console only, compact formatting)
///
/// Useful for tests and small utilities.
pub fn init_simple_logging(level: Level) -> Result<()> {
    let env_filter = default_filter(level.as_str())?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to initialize simple logging: {e}"))?;

    Ok(())
}

static TEST_LOGGING_INIT: Once = Once::new();

/// Logging initialization for tests; safe to call from every test.
///
/// Console-only, INFO by default, respects `RUST_LOG`. Errors are ignored
/// since they only mean a subscriber is already installed.
///
/// # Usage
/// ```rust
/// use mdb_common::logging;
///
/// #[test]
/// fn my_test() {
///     logging::ensure_test_logging(None);
///     tracing::info!("Running test");
/// }
/// ```
pub fn ensure_test_logging(default_level: Option<Level>) {
    TEST_LOGGING_INIT.call_once(|| {
        let _ = init_simple_logging(default_level.unwrap_or(Level::INFO));
    });
}
