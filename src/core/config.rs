//! Environment configuration
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Scheduler interval and database busy timeout
//! - 1.0.0: Token, database path and log level

use anyhow::{Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub database_path: String,
    pub log_level: String,
    pub reminder_interval: Duration,
    pub database_busy_timeout: Duration,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .context("DISCORD_TOKEN must be set")?;

        let database_path = lookup("DATABASE_PATH").unwrap_or_else(|| "events.db".to_string());
        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let interval_secs = parse_or(&lookup, "REMINDER_INTERVAL_SECS", 60)?;
        if interval_secs == 0 {
            anyhow::bail!("REMINDER_INTERVAL_SECS must be greater than zero");
        }
        let busy_timeout_ms = parse_or(&lookup, "DATABASE_BUSY_TIMEOUT_MS", 5000)?;

        Ok(Config {
            discord_token,
            database_path,
            log_level,
            reminder_interval: Duration::from_secs(interval_secs),
            database_busy_timeout: Duration::from_millis(busy_timeout_ms),
        })
    }
}

fn parse_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a non-negative integer, got '{value}'")),
        None => Ok(default),
    }
}
