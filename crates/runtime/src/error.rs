use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("remote tool server unavailable: {0}")]
    RemoteToolUnavailable(String),

    #[error("generation failed: {0}")]
    Generation(#[from] gemini::Error),

    #[error("sign-on error: {0}")]
    SignOn(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
