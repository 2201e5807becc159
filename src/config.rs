//! Centralized configuration management for formbuilder

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::tui::ui::Theme;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite file backing the key-value store
    pub database_path: PathBuf,
    /// Log file written by the terminal UI
    pub log_file: PathBuf,
    /// Initial light/dark mode
    pub theme: Theme,
    /// How long the "submitted" notice stays visible (milliseconds)
    pub notice_duration_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "./formbuilder.db".into(),
            log_file: "formbuilder.log".into(),
            theme: Theme::Light,
            notice_duration_ms: 2000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let database_path = std::env::var("FORMBUILDER_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let log_file = std::env::var("FORMBUILDER_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.log_file);

        let theme = match std::env::var("FORMBUILDER_THEME") {
            Ok(val) => Theme::parse(&val)
                .with_context(|| format!("Unknown theme in FORMBUILDER_THEME = '{}'", val))?,
            Err(_) => defaults.theme,
        };

        let notice_duration_ms =
            parse_env_var("FORMBUILDER_NOTICE_MS")?.unwrap_or(defaults.notice_duration_ms);

        Ok(Config {
            database_path,
            log_file,
            theme,
            notice_duration_ms,
        })
    }

    /// Override the database path (from the command line)
    pub fn with_database_path(mut self, path: Option<&str>) -> Self {
        if let Some(path) = path {
            self.database_path = path.into();
        }
        self
    }

    /// Get database path as string
    pub fn database_path_str(&self) -> &str {
        self.database_path.to_str().unwrap_or("./formbuilder.db")
    }

    /// Get notice duration as Duration
    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_duration_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Check if parent directory of database exists
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(anyhow::anyhow!(
                    "Database parent directory does not exist: {}",
                    parent.display()
                ));
            }
        }

        if self.notice_duration_ms == 0 {
            return Err(anyhow::anyhow!("FORMBUILDER_NOTICE_MS must be greater than zero"));
        }

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}
