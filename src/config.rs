//! Platform-specific configuration and paths

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Overrides both the data and config roots (used by tests and portable setups)
pub const HOME_ENV: &str = "CURSOR_USAGE_HOME";

/// Overrides the dashboard export URL
pub const EXPORT_URL_ENV: &str = "CURSOR_USAGE_EXPORT_URL";

/// Dashboard endpoint that returns the usage-event CSV for the session user
pub const DEFAULT_EXPORT_URL: &str =
    "https://cursor.com/api/dashboard/export-usage-events-csv?strategy=tokens";

/// A pull taking longer than this is treated as failed
pub const DEFAULT_PULL_TIMEOUT: Duration = Duration::from_secs(30);

/// Most entries kept in the recent-files list
pub const RECENT_FILES_LIMIT: usize = 10;

const APP_DIR: &str = "cursor-usage";

/// Get the data directory (recent files, pulled exports)
/// - macOS: ~/Library/Application Support/cursor-usage/
/// - Linux: ~/.local/share/cursor-usage/
/// - Windows: %APPDATA%/cursor-usage/
pub fn data_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(home).join("data"));
    }
    let base = dirs::data_dir().context("Could not determine data directory")?;
    Ok(base.join(APP_DIR))
}

/// Get the config directory (session credential)
/// - macOS: ~/Library/Application Support/cursor-usage/
/// - Linux: ~/.config/cursor-usage/
/// - Windows: %APPDATA%/cursor-usage/
pub fn config_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(home).join("config"));
    }
    let base = dirs::config_dir().context("Could not determine config directory")?;
    Ok(base.join(APP_DIR))
}

/// Path of the recent-files list
pub fn recent_files_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("recent-files.json"))
}

/// Path of the stored dashboard session
pub fn session_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("session.json"))
}

/// Where `pull` writes the export unless told otherwise
pub fn default_pull_destination() -> Result<PathBuf> {
    Ok(data_dir()?.join("usage-events.csv"))
}

/// Export URL: explicit value, then environment, then the default
pub fn export_url(explicit: Option<&str>) -> Result<Url> {
    let raw = match explicit {
        Some(url) => url.to_string(),
        None => std::env::var(EXPORT_URL_ENV).unwrap_or_else(|_| DEFAULT_EXPORT_URL.to_string()),
    };
    Url::parse(&raw).with_context(|| format!("Invalid export URL: {}", raw))
}
