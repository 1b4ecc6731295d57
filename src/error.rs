//! Client error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Category of a failed server exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ClientErrorKind {
    /// Connection could not be established or was dropped.
    #[display("network")]
    Network,
    /// The request did not complete within the configured timeout.
    #[display("timeout")]
    Timeout,
    /// The server answered with a non-success status.
    #[display("server {}", status)]
    Server {
        /// HTTP status code returned by the server.
        status: u16,
    },
    /// The response body could not be decoded.
    #[display("decode")]
    Decode,
}

/// Error raised by a game server exchange, with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Client error ({}): {} at {}:{}", kind, message, file, line)]
pub struct ClientError {
    /// Failure category.
    pub kind: ClientErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ClientError {
    /// Creates a new client error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: ClientErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Connection failure.
    #[track_caller]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Network, message)
    }

    /// Request exceeded its deadline.
    #[track_caller]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Timeout, message)
    }

    /// Non-success response; `body` is the server's own explanation.
    #[track_caller]
    pub fn server(status: u16, body: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Server { status }, body)
    }

    /// Malformed response payload.
    #[track_caller]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Decode, message)
    }
}

impl From<reqwest::Error> for ClientError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(format!("Request timed out: {}", err))
        } else if err.is_decode() {
            Self::decode(format!("Failed to read response: {}", err))
        } else {
            Self::network(format!("HTTP request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for ClientError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::decode(format!("Invalid JSON response: {}", err))
    }
}
