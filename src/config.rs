//! Configuration management for Shelfkeeper

use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

use crate::models::{UserPrefs, UserSettings};

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
    pub catalog_file: String,
    pub loans_file: String,
    pub borrowers_file: String,
    pub prefs_file: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Daily rolling log file; logs go to stderr when unset
    pub file: Option<String>,
}

/// Loan policy used when no prefs file exists yet
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DefaultsConfig {
    pub loan_period_days: u32,
    pub renew_period_days: u32,
    pub fine_increment: Decimal,
    pub max_renews: u32,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // SHELFKEEPER_STORAGE__DATA_DIR=... overrides storage.data_dir
            .add_source(
                Environment::with_prefix("SHELFKEEPER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("storage.data_dir", env::var("SHELFKEEPER_DATA_DIR").ok())?
            .build()?;

        config.try_deserialize()
    }

    /// Prefs for a library that has never saved any
    pub fn default_prefs(&self) -> UserPrefs {
        UserPrefs {
            user_settings: UserSettings {
                loan_period_days: self.defaults.loan_period_days,
                renew_period_days: self.defaults.renew_period_days,
                fine_increment: self.defaults.fine_increment,
                max_renews: self.defaults.max_renews,
            },
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            catalog_file: "catalog.json".to_string(),
            loans_file: "loans.json".to_string(),
            borrowers_file: "borrowers.json".to_string(),
            prefs_file: "preferences.json".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let settings = UserSettings::default();
        Self {
            loan_period_days: settings.loan_period_days,
            renew_period_days: settings.renew_period_days,
            fine_increment: settings.fine_increment,
            max_renews: settings.max_renews,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_user_settings() {
        let config = AppConfig::default();
        assert_eq!(config.default_prefs(), UserPrefs::default());
        assert_eq!(config.storage.data_dir, "data");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_sections_fall_back_to_defaults() {
        let config: AppConfig = Config::builder()
            .set_override("storage.data_dir", "/tmp/library")
            .unwrap()
            .set_override("defaults.max_renews", 3)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.storage.data_dir, "/tmp/library");
        assert_eq!(config.storage.loans_file, "loans.json");
        assert_eq!(config.defaults.max_renews, 3);
        assert_eq!(config.defaults.loan_period_days, 14);
    }
}
