//! Error taxonomy for the transfer gateway
//!
//! Every failure surfaced to a caller is one of four kinds. Validation
//! errors are detected before any network call; collaborator failures are
//! propagated as-is and never retried here (retry policy belongs to the
//! caller or the surrounding deployment).

use thiserror::Error;

/// Error type covering the whole build-and-relay pipeline
#[derive(Error, Debug)]
pub enum TransferError {
    /// Malformed address, non-positive or non-representable amount,
    /// or an empty recipient list
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The token identifier does not resolve to an initialized SPL mint
    #[error("asset not found: {0}")]
    AssetNotFound(String),

    /// A ledger collaborator call failed or timed out
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Malformed signed-transaction blob on the submission path
    #[error("decode error: {0}")]
    DecodeError(String),
}

impl TransferError {
    /// Stable label for logs and dashboards
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::AssetNotFound(_) => "asset_not_found",
            Self::NetworkUnavailable(_) => "network_unavailable",
            Self::DecodeError(_) => "decode_error",
        }
    }

    /// Whether the failure is the caller's fault (maps to HTTP 4xx)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::DecodeError(_))
    }

    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    pub fn network(reason: impl Into<String>) -> Self {
        Self::NetworkUnavailable(reason.into())
    }
}
