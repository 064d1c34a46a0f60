//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Weekday;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use mt_core::SwitchPolicy;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// First day of the week for week periods and the calendar grid.
    pub first_weekday: Weekday,

    /// Whether stopped sessions may be switched.
    pub switch_policy: SwitchPolicy,

    /// Print lifecycle and running-time lines to stderr.
    pub live_updates: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("first_weekday", &self.first_weekday)
            .field("switch_policy", &self.switch_policy)
            .field("live_updates", &self.live_updates)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("mt.db"),
            first_weekday: Weekday::Mon,
            switch_policy: SwitchPolicy::Any,
            live_updates: true,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (MT_*)
        figment = figment.merge(Env::prefixed("MT_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for mt.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("mt"))
}

/// Returns the platform-specific data directory for mt.
///
/// On Linux: `~/.local/share/mt`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("mt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_mt() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "mt");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("mt.db"));
        assert_eq!(config.first_weekday, Weekday::Mon);
        assert_eq!(config.switch_policy, SwitchPolicy::Any);
        assert!(config.live_updates);
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "database_path = \"/tmp/elsewhere.db\"\n\
             first_weekday = \"sunday\"\n\
             switch_policy = \"active_only\"\n\
             live_updates = false\n",
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/elsewhere.db"));
        assert_eq!(config.first_weekday, Weekday::Sun);
        assert_eq!(config.switch_policy, SwitchPolicy::ActiveOnly);
        assert!(!config.live_updates);
    }

    #[test]
    fn test_invalid_weekday_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "first_weekday = \"someday\"\n").unwrap();

        assert!(Config::load_from(Some(&path)).is_err());
    }
}
