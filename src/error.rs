use thiserror::Error;

/// Why a command attempt or an inbound message failed.
///
/// These never escape the dispatcher or the consumer as errors; they are
/// carried in a [`DispatchOutcome`](crate::dispatcher::DispatchOutcome) or
/// logged and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// The attempt did not complete within its timeout
    #[error("request timed out")]
    Timeout,

    /// Connection refused, DNS failure, broken stream, ...
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The remote answered with a non-2xx status
    #[error("HTTP error: status {0}")]
    Http(u16),

    /// A pushed message was not valid JSON or lacked required fields
    #[error("parse failure: {0}")]
    ParseFailure(String),

    /// Input rejected before any network call
    #[error("validation failure: {0}")]
    ValidationFailure(String),
}
