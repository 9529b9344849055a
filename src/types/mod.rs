// src/types/mod.rs
use thiserror::Error;

mod domain_types;
mod ids;

pub use domain_types::*;
pub use ids::*;

/// Configuration and input problems detected before any network activity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Empty required field: {0}")]
    EmptyField(&'static str),

    #[error("Invalid --target-types entry: {0:?}")]
    InvalidTargetType(String),

    #[error("Invalid --sort-types entry: {0:?}")]
    InvalidSortType(String),

    #[error("Invalid session token: {reason}")]
    InvalidSessionToken { reason: String },

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("--json requires --output <file> (so progress can be rewritten)")]
    JsonWithoutOutput,

    #[error("Value out of bounds for {field}: {value}, expected at least {min}")]
    OutOfBounds {
        field: &'static str,
        value: i64,
        min: i64,
    },
}
