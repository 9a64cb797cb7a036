//! Error types for the checker, store, notifier, and configuration.
//!
//! None of these escape the monitor or chart loops; they are logged at the
//! point they occur and replaced with a safe default.

use thiserror::Error;

/// Errors that can occur while fetching a status page.
#[derive(Debug, Error)]
pub enum CheckError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("Status page returned {0}")]
    Status(u16),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for CheckError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CheckError::Timeout
        } else if err.is_connect() {
            CheckError::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            CheckError::Status(status.as_u16())
        } else {
            CheckError::Http(err.to_string())
        }
    }
}

/// Errors from the observation log.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying database reported an error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be decoded into an observation.
    #[error("Corrupt row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },
}

/// Errors while composing or sending an alert email.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Sender or recipient is not a valid mailbox.
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The message could not be built.
    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    /// The SMTP exchange failed (connection, STARTTLS, or authentication).
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Errors while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration source could not be read or deserialized.
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    /// The merged settings are unusable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
