//! Config file locations for relay.
//!
//! User config follows the XDG Base Directory layout on every platform,
//! like gh and kubectl do. Project config lives next to the code in
//! `.relay/`.

use std::path::{Path, PathBuf};

/// Application directory name under the XDG config home.
pub const APP_DIR: &str = "relay";

/// Name of the config file in both locations.
pub const CONFIG_FILE: &str = "config.toml";

/// Overrides the project config directory.
pub const PROJECT_CONFIG_DIR_ENV: &str = "RELAY_PROJECT_CONFIG_DIR";

/// Get the relay config directory.
///
/// Returns `$XDG_CONFIG_HOME/relay` if set, otherwise `~/.config/relay`.
///
/// # Examples
///
/// ```
/// use relay_paths::config_dir;
///
/// let config = config_dir();
/// assert!(config.ends_with("relay"));
/// ```
pub fn config_dir() -> PathBuf {
    match std::env::var_os("XDG_CONFIG_HOME") {
        Some(xdg_config) if !xdg_config.is_empty() => PathBuf::from(xdg_config).join(APP_DIR),
        _ => match dirs::home_dir() {
            Some(home) => home.join(".config").join(APP_DIR),
            None => PathBuf::from(".config").join(APP_DIR),
        },
    }
}

/// Path of the user config file.
pub fn user_config_file() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

/// Project config directory for a project rooted at `root`.
///
/// `RELAY_PROJECT_CONFIG_DIR` wins when set; otherwise `<root>/.relay`.
pub fn project_config_dir(root: &Path) -> PathBuf {
    match std::env::var_os(PROJECT_CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => root.join(".relay"),
    }
}

/// Path of the project config file for a project rooted at `root`.
pub fn project_config_file(root: &Path) -> PathBuf {
    project_config_dir(root).join(CONFIG_FILE)
}
