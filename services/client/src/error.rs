//! services/client/src/error.rs
//!
//! Defines the primary error type for the client service.

use crate::config::ConfigError;
use chunk_view_core::ports::PortError;
use chunk_view_core::FetchOutcome;

/// The primary error type for the `client` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from the service port.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from building the underlying HTTP client.
    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A collections page could not be loaded.
    #[error("Could not load collections page {page}: {reason}")]
    Fetch { page: u64, reason: &'static str },

    /// Represents a bad command line.
    #[error("Usage error: {0}")]
    Usage(String),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ClientError {
    /// Turns a pager fetch outcome into a user-facing error.
    ///
    /// Only an applied response counts as success; the pager keeps its old
    /// state for every other outcome, so showing it would be misleading.
    pub fn check_fetch(page: u64, outcome: FetchOutcome) -> Result<(), ClientError> {
        let reason = match outcome {
            FetchOutcome::Applied => return Ok(()),
            FetchOutcome::Malformed => "the service sent a malformed response",
            FetchOutcome::Failed => "the request failed",
            FetchOutcome::Stale => "the request was superseded",
        };
        Err(ClientError::Fetch { page, reason })
    }
}
