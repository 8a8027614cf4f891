//! Cross-platform settings location using the `dirs` crate.
//!
//! Layout:
//!
//!   Windows: %APPDATA%\corpus-importer\settings.toml
//!   macOS:   ~/Library/Application Support/corpus-importer/settings.toml
//!   Linux:   ~/.config/corpus-importer/settings.toml

use std::path::PathBuf;

/// Holds the resolved settings directory and file.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "corpus-importer";

    /// Resolves the settings location, falling back to the current directory
    /// when the platform provides no config directory.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);
        let settings_file = config_dir.join("settings.toml");

        Self {
            config_dir,
            settings_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_file_lives_in_config_dir() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.ends_with("corpus-importer"));
        assert_eq!(paths.settings_file.parent(), Some(paths.config_dir.as_path()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
    }
}
