//! Error types for the accounts API client.
//!
//! # Design
//! Every failure is classified by where it happened. Errors raised before
//! the network (`RequestBuild`, `Encoding`) and errors where no response
//! arrived (`Transport`, `Cancelled`, `Timeout`) carry no [`Response`]. Once
//! the server has answered, the error owns the response so callers can
//! branch on the status code without re-parsing the body.

use thiserror::Error;

use crate::response::Response;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`Client`](crate::Client) and the account operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be built: bad path, bad base URL or a body
    /// that failed to serialize. Never reaches the network.
    #[error("failed to build request: {0}")]
    RequestBuild(String),

    /// Query options could not be encoded onto the request path.
    #[error("failed to encode query options: {0}")]
    Encoding(String),

    /// The transport failed before a response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The caller cancelled the call.
    #[error("request cancelled")]
    Cancelled,

    /// The caller's deadline expired before a response arrived.
    #[error("request deadline exceeded")]
    Timeout,

    /// The server answered with a status outside 200..=299.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        response: Response,
    },

    /// The server answered 2xx but the body did not match the expected shape.
    #[error("failed to decode response body: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        response: Response,
    },
}

impl Error {
    /// The server response attached to this error, if the server was reached.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::Api { response, .. } | Error::Decode { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Status code of the attached response, if any.
    pub fn status(&self) -> Option<u16> {
        self.response().map(Response::status_code)
    }

    /// True only for a 404 reported by the server.
    ///
    /// A 400 for a malformed identifier is a validation failure, not a
    /// missing resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { status: 404, .. })
    }

    /// True for caller-initiated cancellation or deadline expiry.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Error::Cancelled | Error::Timeout | Error::Transport(TransportError::Timeout)
        )
    }
}

/// Failures raised by a [`Transport`](crate::transport::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not connect or the connection broke mid-exchange.
    #[error("connection error: {0}")]
    Connection(String),

    /// The transport's own timeout fired.
    #[error("transport timeout")]
    Timeout,

    /// The response body could not be read.
    #[error("I/O error: {0}")]
    Io(String),

    /// The worker executing the blocking call died.
    #[error("transport worker failed: {0}")]
    Runtime(String),
}
