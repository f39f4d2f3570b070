//! Error taxonomy for upstream API access and authentication.

use crate::figo::models::ApiError;
use thiserror::Error;

/// Errors surfaced by the figo API client and authenticator.
///
/// `Unauthorized` is deliberately its own variant rather than a decoded
/// [`ApiError`]: the refresh loop matches on it to trigger reauthentication,
/// while every other variant is treated as an ordinary failed poll cycle.
#[derive(Debug, Error)]
pub enum FigoError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request was not authorized")]
    Unauthorized,

    #[error("API error: {0}")]
    Api(ApiError),

    #[error("failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("authentication failed: {reason}")]
    Auth { reason: String },
}
