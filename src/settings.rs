//! Layered settings: built-in defaults, an optional config file, then
//! `RADIOWATCH_*` environment variables.
//!
//! Environment keys use `_` after the prefix and `__` between nested
//! fields: `RADIOWATCH_POLL_INTERVAL=5s`, `RADIOWATCH_SMTP__USERNAME=...`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::Source;
use crate::error::ConfigError;

/// Environment variable prefix, e.g. `RADIOWATCH_POLL_INTERVAL=5s`.
pub const ENV_PREFIX: &str = "RADIOWATCH";

/// Stations monitored when no `sources` table is configured.
pub const DEFAULT_SOURCES: &[(&str, &str)] = &[
    ("tabajara", "http://stm2.xcast.com.br:7524/index.html?sid=1"),
    ("parahyba", "http://stm1.xcast.com.br:9538/index.html?sid=1"),
];

/// SMTP relay settings for outage alerts.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    pub relay: String,
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Defaults to the sending account.
    #[serde(default)]
    pub recipient: Option<String>,
}

impl SmtpSettings {
    /// Returns `(username, password)` when both are present and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }

    /// The address alerts are delivered to.
    pub fn recipient(&self) -> Option<&str> {
        self.recipient.as_deref().or(self.username.as_deref())
    }
}

/// Runtime settings for the whole process.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Station name to status page URL.
    pub sources: BTreeMap<String, String>,
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub poll_interval: Duration,
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub http_timeout: Duration,
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub render_interval: Duration,
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub shutdown_grace: Duration,
    /// Observations per source shown in the chart.
    pub chart_window: usize,
    pub database: PathBuf,
    pub log_file: PathBuf,
    pub smtp: SmtpSettings,
}

impl Settings {
    /// Load settings, reading `path` if given.
    ///
    /// `EMAIL_USER` and `EMAIL_PASS` fill in SMTP credentials that no other
    /// layer provided.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;
        settings.fill_credentials_from_env(
            std::env::var("EMAIL_USER").ok(),
            std::env::var("EMAIL_PASS").ok(),
        );
        settings.validate()?;
        Ok(settings)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let mut builder = Config::builder()
            .set_default("poll_interval", "10s")?
            .set_default("http_timeout", "5s")?
            .set_default("render_interval", "1s")?
            .set_default("shutdown_grace", "2s")?
            .set_default("chart_window", 20)?
            .set_default("database", "radio_logs.db")?
            .set_default("log_file", "radiowatch.log")?
            .set_default("smtp.relay", "mail.mailo.com")?
            .set_default("smtp.port", 587)?;
        for (name, url) in DEFAULT_SOURCES {
            builder = builder.set_default(format!("sources.{}", name), *url)?;
        }
        Ok(builder)
    }

    fn fill_credentials_from_env(&mut self, user: Option<String>, pass: Option<String>) {
        if self.smtp.username.is_none() {
            self.smtp.username = user;
        }
        if self.smtp.password.is_none() {
            self.smtp.password = pass;
        }
    }

    /// Check invariants the loops rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::Invalid("at least one source is required".into()));
        }
        if let Some((name, _)) = self.sources.iter().find(|(_, url)| url.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("source '{}' has no URL", name)));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid("poll_interval must be greater than zero".into()));
        }
        if self.render_interval.is_zero() {
            return Err(ConfigError::Invalid("render_interval must be greater than zero".into()));
        }
        if self.chart_window == 0 {
            return Err(ConfigError::Invalid("chart_window must be greater than zero".into()));
        }
        Ok(())
    }

    /// Configured sources in name order.
    pub fn sources(&self) -> Vec<Source> {
        self.sources.iter().map(|(name, url)| Source::new(name, url)).collect()
    }
}
