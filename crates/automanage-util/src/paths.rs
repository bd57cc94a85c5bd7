//! Default paths for automanage
//!
//! - Config: `$XDG_CONFIG_HOME/automanage/config.toml` or `~/.config/automanage/config.toml`

use std::path::PathBuf;

/// Environment variable for overriding the config path
pub const AUTOMANAGE_CONFIG_ENV: &str = "AUTOMANAGE_CONFIG";

/// Application subdirectory name
const APP_DIR: &str = "automanage";

/// Config filename within the config directory
const CONFIG_FILENAME: &str = "config.toml";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$XDG_CONFIG_HOME/automanage/config.toml` (if XDG_CONFIG_HOME is set)
/// 2. `~/.config/automanage/config.toml`
/// 3. `./automanage/config.toml` when no home directory can be determined
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME")
        && !config_home.is_empty()
    {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    dirs::home_dir()
        .map(|home| home.join(".config"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_ends_with_app_file() {
        let path = default_config_path();
        assert!(path.ends_with("automanage/config.toml"));
    }
}
