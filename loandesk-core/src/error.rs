use thiserror::Error;

/// Failure modes of the platform HTTP API client.
///
/// A `Status` error carries the backend's response body verbatim — the
/// caller decides how much of it to surface (the TUI shows a generic
/// banner and logs the body via tracing).
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, DNS, TLS, or timeout failure before a response arrived.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("api error ({status}): {body}")]
    Status { status: u16, body: String },

    /// The response was 2xx but did not match the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
