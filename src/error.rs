// src/error.rs
//! Application error types with structured error handling.
//!
//! Two layers: [`GatewayError`] describes what went wrong on the wire,
//! [`AppError`] describes what went wrong for the export run. Word-detail
//! lookups are the one place a gateway failure is swallowed instead of
//! propagated; see [`crate::api::words`].

use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use serde_json::Value;
use thiserror::Error;

/// Transport and protocol failures of a single remote call.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Network error calling {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status} calling {url}: {excerpt}")]
    HttpStatus {
        status: reqwest::StatusCode,
        url: String,
        excerpt: String,
    },

    #[error("Non-JSON response calling {url}: {excerpt}")]
    Protocol { url: String, excerpt: String },

    #[error("Invalid request header {name}: {message}")]
    InvalidHeader { name: String, message: String },

    #[error("Cannot build request URL from base {base}")]
    InvalidUrl { base: String },
}

impl GatewayError {
    /// Builds a transport error from a reqwest failure, noting timeouts.
    pub fn transport(url: &str, err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out ({})", err)
        } else {
            err.to_string()
        };
        Self::Transport {
            url: url.to_string(),
            message,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Truncates a response body for inclusion in error messages.
pub fn excerpt(body: &str) -> String {
    match body.char_indices().nth(ERROR_BODY_PREVIEW_LENGTH) {
        Some((cut, _)) => body[..cut].to_string(),
        None => body.to_string(),
    }
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The envelope arrived but its `code` is not success.
    #[error("{operation} failed (code {code})")]
    Application {
        operation: String,
        code: i64,
        envelope: Value,
    },

    /// The envelope reported success but its payload has the wrong shape.
    #[error("Unexpected {operation} response shape")]
    UnexpectedShape { operation: String, envelope: Value },

    #[error("Folder id not found in fetchMyFolders: {0}")]
    FolderNotFound(String),

    #[error("No folders returned")]
    NoFolders,

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] crate::types::ValidationError),
}

impl AppError {
    /// The raw envelope worth showing the user, if this error carries one.
    pub fn diagnostic_envelope(&self) -> Option<&Value> {
        match self {
            Self::Application { envelope, .. } | Self::UnexpectedShape { envelope, .. } => {
                Some(envelope)
            }
            _ => None,
        }
    }

    /// Process exit status: 2 for configuration problems, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::MissingConfiguration(_) | Self::Validation(_) => 2,
            _ => 1,
        }
    }
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;
