//! Error types shared by every provider adapter.

use crate::providers::ProviderKind;

/// Errors surfaced by provider adapters.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transport could not complete the exchange (no response obtained).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The provider rejected the request: HTTP status >= 400, or a
    /// `success: false` body on a 2xx response.
    #[error("{message}")]
    Request {
        /// HTTP status of the response that carried the failure.
        status: Option<u16>,
        /// Human-readable message extracted from the response.
        message: String,
    },

    /// Bearer token acquisition failed.
    #[error("token acquisition failed: {0}")]
    Auth(#[source] Box<Error>),

    /// Session bootstrap failed.
    #[error("session bootstrap failed: {0}")]
    Session(#[from] SessionError),

    /// A required identity field was empty. Raised before any network call.
    #[error("invalid argument: {0}")]
    Validation(&'static str),

    /// The response decoded but lacked the expected shape.
    #[error("unexpected response: {0}")]
    ResponseParse(String),

    /// The provider demands a captcha before issuing an address.
    #[error("captcha verification required before an inbox can be created")]
    CaptchaRequired,

    /// A message id was not present in the inbox listing.
    #[error("message {0} not found")]
    MessageNotFound(String),

    /// The provider has no endpoint for this operation.
    #[error("{provider} does not support {operation}")]
    Unsupported {
        /// Provider the operation was attempted on.
        provider: ProviderKind,
        /// Canonical operation name.
        operation: &'static str,
    },
}

impl Error {
    pub(crate) fn request(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Request {
            status,
            message: message.into(),
        }
    }

    /// The provider's message when this is a [`Error::Request`].
    pub fn request_message(&self) -> Option<&str> {
        match self {
            Error::Request { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Transport(error.into())
    }
}

/// Failure of the transport gateway itself.
///
/// Cloneable so a single failed exchange can be reported to every caller
/// sharing it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    /// Create a transport error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        TransportError::new(format!("request failed: {error}"))
    }
}

/// Failure of a bootstrap session attempt, shared by all concurrent waiters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SessionError {
    message: String,
}

impl SessionError {
    /// Create a session error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
