//! Error taxonomy for the session layer.
//!
//! Nothing here is fatal: every variant leaves the session usable and the
//! next scheduled tick (or a manual action) retries.

use thiserror::Error;

/// Errors surfaced by the token store, the API client and the fetch cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashError {
    /// The submitted token was empty after trimming.
    #[error("Please enter your API token")]
    EmptyToken,

    /// The service answered with a non-success status.
    #[error("API request failed. Please check your token.")]
    ApiRequest { endpoint: String, status: u16 },

    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("Failed to fetch: {0}")]
    Network(String),

    /// The response body was not the expected JSON shape.
    #[error("Unexpected response from the API: {0}")]
    Decode(String),

    /// The persisted token slot could not be written or removed.
    #[error("Token storage error: {0}")]
    Storage(String),
}

impl DashError {
    /// Whether this error came from talking to the remote service.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::ApiRequest { .. } | Self::Network(_) | Self::Decode(_)
        )
    }
}

impl From<std::io::Error> for DashError {
    fn from(err: std::io::Error) -> Self {
        DashError::Storage(err.to_string())
    }
}
