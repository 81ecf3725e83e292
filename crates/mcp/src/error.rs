//! MCP error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to connect to MCP server: {0}")]
    Connect(String),

    #[error("sign-on failed: {0}")]
    SignOn(String),

    #[error("no sign-on is waiting for a callback")]
    NoPendingSignOn,

    #[error("sign-on was abandoned before the callback arrived")]
    SignOnAbandoned,

    #[error("ping failed: {0}")]
    Ping(String),

    #[error("request failed: {0}")]
    Request(String),
}

pub type Result<T> = std::result::Result<T, Error>;
