//! Where hlstream keeps its config and logs
//!
//! Resolution order for the base directory:
//! 1. `$HLSTREAM_CONFIG_DIR`, used as is
//! 2. `$XDG_CONFIG_HOME/hlstream` (Unix/macOS) or `%APPDATA%\hlstream` (Windows)
//! 3. `~/.config/hlstream` (Unix/macOS)

use std::{env, fs, path::PathBuf};

const APP_DIR: &str = "hlstream";

/// Overrides the base directory, mainly for scripted runs
pub const CONFIG_DIR_ENV: &str = "HLSTREAM_CONFIG_DIR";

/// Prefix of the daily rotated log files (`hlstream.log.YYYY-MM-DD`)
pub const LOG_FILE_PREFIX: &str = "hlstream.log";

/// Base config directory, from the environment and the home directory
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let platform_base = env::var_os("APPDATA").map(PathBuf::from);

    #[cfg(not(target_os = "windows"))]
    let platform_base = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")));

    resolve_config_dir(env::var_os(CONFIG_DIR_ENV).map(PathBuf::from), platform_base)
}

/// An explicit override wins; otherwise the app directory under `platform_base`
fn resolve_config_dir(
    override_dir: Option<PathBuf>,
    platform_base: Option<PathBuf>,
) -> Option<PathBuf> {
    override_dir
        .filter(|dir| !dir.as_os_str().is_empty())
        .or_else(|| platform_base.map(|base| base.join(APP_DIR)))
}

/// `<config dir>/config.yaml`
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

/// `<config dir>/logs/`
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

/// Create the logs dir if needed and return it
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let logs = logs_dir().ok_or_else(|| "No config directory available".to_string())?;
    fs::create_dir_all(&logs)
        .map_err(|e| format!("Failed to create directory {}: {}", logs.display(), e))?;
    Ok(logs)
}
