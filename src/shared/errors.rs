//! Error handling for the application

use thiserror::Error;

/// Availability fetch errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Availability API returned status {0}")]
    Status(u16),

    #[error("Failed to decode availability payload: {0}")]
    Decode(String),

    #[error("Giving up after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

impl FetchError {
    /// Only timeouts are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Timeout)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Notification delivery errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotifyError {
    #[error("Webhook is rate limiting requests")]
    RateLimited,

    #[error("Webhook transport error: {0}")]
    Transport(String),

    #[error("Webhook returned status {0}")]
    Status(u16),
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Transport(err.to_string())
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("HTTP client setup failed: {0}")]
    HttpClient(String),
}
