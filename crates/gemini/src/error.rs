use thiserror::Error;

/// Errors from the Gemini API.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The request never reached the API or the connection dropped.
    #[error("network error: {0}")]
    Network(String),

    /// The API answered 429.
    #[error("rate limited by the Gemini API")]
    RateLimited,

    /// The API answered with a non-success status.
    #[error("API error: {0}")]
    Api(String),

    /// The response body could not be used.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
