//! Error types for overlayrank.

use thiserror::Error;

/// Result alias for overlayrank operations.
pub type OverlayResult<T> = std::result::Result<T, OverlayError>;

/// Errors raised by constructors, config validation and per-candidate work.
///
/// Ranking entry points never surface these: a failing candidate is dropped
/// and the ranking continues with the rest.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum OverlayError {
    /// Image dimensions are zero or overflow.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer cannot hold the declared image.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Decoding or reading an encoded image failed.
    #[error("image io error: {reason}")]
    ImageIo { reason: String },
    /// A configuration value is out of its valid range.
    #[error("invalid config: {field}: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
    /// The proposal source could not supply a candidate.
    #[error("proposal failed for strategy {strategy}: {source}")]
    Proposal {
        strategy: &'static str,
        #[source]
        source: ProposalError,
    },
    /// A candidate could not be assembled from its inputs.
    #[error("candidate rejected for strategy {strategy}: {reason}")]
    CandidateRejected {
        strategy: &'static str,
        reason: String,
    },
}

/// Failures reported by a [`ProposalSource`](crate::rank::ProposalSource).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProposalError {
    /// The call did not finish within the configured timeout.
    #[error("timed out after {millis} ms")]
    Timeout { millis: u64 },
    /// The upstream is not reachable or declined the request.
    #[error("unavailable: {0}")]
    Unavailable(String),
    /// The upstream answered with something unusable.
    #[error("malformed response: {0}")]
    Malformed(String),
}
