//! Application paths for config and data.

use directories::ProjectDirs;
use std::path::PathBuf;

/// Application paths.
pub struct AppPaths {
    /// Configuration directory.
    pub config: PathBuf,
    /// Data directory.
    pub data: PathBuf,
}

impl AppPaths {
    /// Create paths for the wattvault application.
    #[must_use]
    pub fn new() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("io", "wattvault", "wattvault") {
            Self {
                config: proj_dirs.config_dir().to_path_buf(),
                data: proj_dirs.data_dir().to_path_buf(),
            }
        } else {
            // Fallback to home directory
            let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            Self {
                config: home.join(".config/wattvault"),
                data: home.join(".local/share/wattvault"),
            }
        }
    }

    /// Path to the consumption database file.
    #[must_use]
    pub fn consumption_db_file(&self) -> PathBuf {
        self.data.join("consumption.sqlite")
    }

    /// Path to the engine config file.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.toml")
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

/// Home directory lookup, kept separate so the fallback reads clearly.
mod dirs {
    use std::path::PathBuf;

    pub fn home_dir() -> Option<PathBuf> {
        directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
    }
}
