//! Error types for the KOS loader.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that abort a loader run.
#[derive(Debug, Error)]
pub enum KosError {
    /// Missing or invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP call failed or returned a non-success status
    #[error("Request {request} failed: {message}")]
    Transport {
        request: String,
        status: Option<StatusCode>,
        message: String,
    },

    /// The HTTP call succeeded but the body does not have the expected shape
    #[error("Invalid response for {request}: {message}")]
    Schema { request: String, message: String },

    /// Login handshake failed
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Semester selection failed
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Writing the output file failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing the output document failed
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl KosError {
    /// Builds a transport error from a reqwest error raised while running `request`.
    pub fn transport(request: impl ToString, err: reqwest::Error) -> Self {
        KosError::Transport {
            request: request.to_string(),
            status: err.status(),
            message: err.to_string(),
        }
    }

    /// Builds a schema error for `request`.
    pub fn schema(request: impl ToString, message: impl Into<String>) -> Self {
        KosError::Schema {
            request: request.to_string(),
            message: message.into(),
        }
    }

    /// Returns true if the remote call itself failed.
    pub fn is_transport(&self) -> bool {
        matches!(self, KosError::Transport { .. })
    }

    /// Returns true if the remote call succeeded but returned an unexpected body.
    pub fn is_schema(&self) -> bool {
        matches!(self, KosError::Schema { .. })
    }
}

/// Configuration errors, reported before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable {name}")]
    MissingEnv { name: &'static str },

    #[error("Invalid value {value:?} for environment variable {name}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Invalid output file path {}: {message}", .path.display())]
    InvalidOutputPath { path: PathBuf, message: String },

    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors raised by the login handshake.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The info endpoint did not set the XSRF cookie
    #[error("Missing cookie XSRF-TOKEN from the {endpoint} endpoint")]
    MissingCsrfCookie { endpoint: String },

    /// The login endpoint returned a non-success status
    #[error("Login rejected with status {status}")]
    LoginRejected { status: StatusCode },

    /// Network/HTTP failure during login
    #[error("Login request to {endpoint} failed: {message}")]
    Http { endpoint: String, message: String },
}

/// Errors in choosing the semesters to download.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No semester contains the date {today}")]
    NoCurrentSemester { today: chrono::NaiveDate },

    #[error("Semester {current} is the last known semester, no next semester exists")]
    NoNextSemester { current: String },
}

/// A single API element could not be turned into an entity.
///
/// Never fatal: the fetcher drops the element and keeps going.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed element: {0}")]
    Malformed(String),

    #[error("Unknown parallel type {0:?}")]
    UnknownParallelType(String),

    #[error("Invalid time {0:?}, expected HH:MM")]
    InvalidTime(String),

    #[error("Invalid date {0:?}")]
    InvalidDate(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::Malformed(err.to_string())
    }
}
