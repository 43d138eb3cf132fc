//! Error types for the Rundeck client.
//!
//! [`RundeckError`] separates transport failures (surfaced straight from
//! `reqwest`) from API failures, which are always carried as a normalized
//! [`ApiError`] regardless of which endpoint produced them.

use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RundeckError>;

/// Error code synthesized when an error body cannot be decoded.
pub const DECODE_FAILURE_CODE: &str = "decode.failure";

#[derive(Debug, Error)]
pub enum RundeckError {
    /// The server answered with a status the endpoint does not expect.
    #[error("API error (status {status}): {error}")]
    Api { status: u16, error: ApiError },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A success body did not match the declared response type.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("config error: {0}")]
    Config(String),

    /// Rejected before any request was sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("archive is only {percentage}% complete")]
    ArchiveNotReady { percentage: i32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl RundeckError {
    /// The normalized API error, if this is an API-level failure.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            RundeckError::Api { error, .. } => Some(error),
            _ => None,
        }
    }

    /// HTTP status of an API-level failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            RundeckError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The error payload Rundeck returns for a bad API call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiError {
    pub error: bool,
    #[serde(rename = "apiversion")]
    pub api_version: i32,
    #[serde(rename = "errorCode")]
    pub error_code: String,
    pub message: String,
}

impl ApiError {
    /// Normalizes a non-success response body.
    ///
    /// Undecodable bodies become a `decode.failure` error carrying the decoder
    /// message. A decoded payload without a message gets the status line, so
    /// the message is never empty.
    pub fn from_body(status: StatusCode, body: &[u8]) -> Self {
        match serde_json::from_slice::<ApiError>(body) {
            Ok(mut err) => {
                if err.message.trim().is_empty() {
                    err.message = status_line(status);
                }
                err
            }
            Err(decode_err) => ApiError {
                error: true,
                api_version: -1,
                error_code: DECODE_FAILURE_CODE.to_string(),
                message: decode_err.to_string(),
            },
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.error_code.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "[{}] {}", self.error_code, self.message)
        }
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => format!("HTTP status {}", status.as_u16()),
    }
}
