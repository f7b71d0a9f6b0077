//! Error types for courier.

use derive_more::{Display, Error, From};

use crate::{TypedApiError, UnknownApiError};

/// Main error type for courier operations.
///
/// Every non-2xx response surfaces as exactly one of [`Error::Api`] or
/// [`Error::UnknownApi`]. The remaining variants describe transport failures
/// and misconfiguration.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The server answered with a structured error body.
    #[display("{_0}")]
    #[from]
    Api(TypedApiError),

    /// The server answered with an error whose body could not be decoded.
    #[display("{_0}")]
    #[from]
    UnknownApi(UnknownApiError),

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors, including pin and host mismatches.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "error_summary.message").
        path: String,
        /// Error message.
        message: String,
    },

    /// `build()` was called before a base URL was set.
    #[display("base URL must be set")]
    #[from(skip)]
    MissingBaseUrl,

    /// Builder configuration could not be turned into a client.
    #[display("invalid configuration: {_0}")]
    #[from(skip)]
    InvalidConfig(#[error(not(source))] String),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if the server sent a structured error body.
    #[must_use]
    pub const fn is_api_error(&self) -> bool {
        matches!(self, Self::Api(_))
    }

    /// Returns `true` if the server sent an error body that could not be decoded.
    #[must_use]
    pub const fn is_unknown_api_error(&self) -> bool {
        matches!(self, Self::UnknownApi(_))
    }

    /// The structured API error, if any.
    #[must_use]
    pub const fn api_error(&self) -> Option<&TypedApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// The undecodable API error, if any.
    #[must_use]
    pub const fn unknown_api_error(&self) -> Option<&UnknownApiError> {
        match self {
            Self::UnknownApi(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this error came from a response.
    ///
    /// For [`Error::Api`] this is the response status, not the `status`
    /// member of the decoded body.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api(err) => Some(err.http_status()),
            Self::UnknownApi(err) => Some(err.status()),
            _ => None,
        }
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }
}
