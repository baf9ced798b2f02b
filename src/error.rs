//! Error types for the DocRaptor client.
//!
//! Configuration and validation errors (`NoApiKeyProvided`, `NoContent`,
//! `InvalidArgument`) are always returned before any request is sent. The
//! remote failure variants carry the HTTP status and raw body so callers can
//! surface the service's message verbatim; they are only produced on the
//! strict call path.

use thiserror::Error;

/// Errors that can occur while talking to the document service.
#[derive(Debug, Error)]
pub enum DocRaptorError {
    /// No API key from the explicit argument, the client cache, or the environment.
    #[error("no API key provided (pass one explicitly or set DOCRAPTOR_API_KEY)")]
    NoApiKeyProvided,

    /// A create request carried neither `document_content` nor `document_url`.
    #[error("must supply document_content or document_url")]
    NoContent,

    /// An operation was called with an argument of the wrong shape.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the argument.
        message: String,
    },

    /// The service rejected a document creation request.
    #[error("DocumentCreationFailure\nHTTP Status: {status_code}\nReturned: {body}")]
    DocumentCreationFailure {
        /// HTTP status code returned by the service.
        status_code: u16,
        /// Raw response body.
        body: String,
    },

    /// The service rejected a document listing request.
    #[error("DocumentListingFailure\nHTTP Status: {status_code}\nReturned: {body}")]
    DocumentListingFailure {
        /// HTTP status code returned by the service.
        status_code: u16,
        /// Raw response body.
        body: String,
    },

    /// The service rejected a status request.
    #[error("DocumentStatusFailure\nHTTP Status: {status_code}\nReturned: {body}")]
    DocumentStatusFailure {
        /// HTTP status code returned by the service.
        status_code: u16,
        /// Raw response body.
        body: String,
    },

    /// A successful response did not have the shape the client relies on.
    #[error("malformed response: {reason}")]
    MalformedResponse {
        /// Description of the unexpected shape.
        reason: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that was requested.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// The base URL or a derived endpoint URL is invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The offending URL string.
        url: String,
    },

    /// File system error while buffering a response into a temporary file.
    #[error("IO error while {context}: {source}")]
    Io {
        /// What the client was doing when the error occurred.
        context: &'static str,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DocRaptorError {
    /// Creates an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a malformed-response error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    /// HTTP status code for remote failures, `None` for every other variant.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::DocumentCreationFailure { status_code, .. }
            | Self::DocumentListingFailure { status_code, .. }
            | Self::DocumentStatusFailure { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Raw response body for remote failures.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::DocumentCreationFailure { body, .. }
            | Self::DocumentListingFailure { body, .. }
            | Self::DocumentStatusFailure { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Whether this error was raised before any request reached the network.
    #[must_use]
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::NoApiKeyProvided
                | Self::NoContent
                | Self::InvalidArgument { .. }
                | Self::InvalidUrl { .. }
        )
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs
// context (url, operation) the source errors don't carry.
