//! Error types for asset-mirror
//!
//! Every error is scoped to a single seed page or asset URL. The pipeline
//! records it in the run report and moves on to the next item.

use std::fmt;

/// Main error type for asset-mirror operations
#[derive(Debug)]
pub enum Error {
    /// Connection, timeout or request transport failure
    NetworkError(String),

    /// Server answered with a non-success status code
    BadStatus(u16),

    /// Response body could not be read to the end
    ReadError(String),

    /// Server answered with a zero-length body
    EmptyBody,

    /// Directory or file creation/write failure
    IoError(std::io::Error),

    /// URL cannot be turned into a download target
    InvalidUrl(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NetworkError(msg) => {
                write!(f, "Network error: {}", msg)
            }
            Error::BadStatus(code) => {
                write!(f, "Bad HTTP status: {}", code)
            }
            Error::ReadError(msg) => {
                write!(f, "Failed to read response body: {}", msg)
            }
            Error::EmptyBody => {
                write!(f, "Empty response body")
            }
            Error::IoError(err) => {
                write!(f, "I/O error: {}", err)
            }
            Error::InvalidUrl(url) => {
                write!(f, "Invalid URL: {}", url)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Error::BadStatus(status.as_u16()),
            None => Error::NetworkError(err.to_string()),
        }
    }
}

/// Convenience result type for asset-mirror operations
pub type Result<T> = std::result::Result<T, Error>;

/// Serializes an error as its display message, for JSON reports
pub(crate) fn serialize_error<S>(err: &Error, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(err)
}

/// Serializes an optional error as its display message or `null`
pub(crate) fn serialize_opt_error<S>(
    err: &Option<Error>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match err {
        Some(err) => serializer.collect_str(err),
        None => serializer.serialize_none(),
    }
}
