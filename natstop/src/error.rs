//! Error types shared by the fetcher, the poll loop and the dashboard.

use thiserror::Error;

/// Why a single monitoring request attempt failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not get stats from server: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    #[error("server answered with HTTP status {0}")]
    Status(u16),

    #[error("could not decode response: {0}")]
    Malformed(serde_json::Error),
}

impl FetchError {
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        FetchError::Transport(err.into())
    }
}

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("could not reach {endpoint} after {attempts} attempts")]
    UnreachableServer {
        endpoint: String,
        attempts: u32,
        #[source]
        source: FetchError,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("poll loop stopped unexpectedly")]
    PollerStopped,
}

pub type Result<T> = std::result::Result<T, MonitorError>;
