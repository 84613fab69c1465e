//! Error model for Cloud Directory operations.
//!
//! Every failure is handed back to the immediate caller. Nothing in this
//! crate retries, suppresses or falls back; [`DirectoryError::is_retryable`]
//! only classifies so that callers can layer their own policy on top.

use thiserror::Error;

/// Top-level error type for all directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The request could not be canonicalized for signing.
    #[error("signing error: {message}")]
    Signing { message: String },

    /// Connection or I/O failure during the HTTP exchange.
    #[error("transport error{}: {message}", fmt_status(.status))]
    Transport { status: Option<u16>, message: String },

    /// The service answered with a status other than 200.
    #[error(
        "{operation} rejected (HTTP {status}): {body}{}",
        fmt_request_id(.request_id)
    )]
    RemoteRejection {
        operation: String,
        status: u16,
        /// Raw response body.
        body: String,
        /// The body parsed as JSON, when it was JSON.
        parsed: Option<serde_json::Value>,
        /// Request ID from the response headers, for tracing.
        request_id: Option<String>,
    },

    /// A response body that should have been JSON was not.
    #[error("{operation} returned an unparseable body (HTTP {status}): {message}")]
    Parse {
        operation: String,
        status: u16,
        body: String,
        message: String,
    },

    /// A payload could not be encoded.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Missing or malformed client configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

fn fmt_request_id(request_id: &Option<String>) -> String {
    request_id
        .as_ref()
        .map(|id| format!(" [RequestId: {}]", id))
        .unwrap_or_default()
}

impl DirectoryError {
    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Build a rejection from a non-200 response, keeping the JSON form of the
    /// body when it has one.
    pub fn rejection(operation: &str, status: u16, body: String) -> Self {
        let parsed = serde_json::from_str(&body).ok();
        Self::RemoteRejection {
            operation: operation.to_string(),
            status,
            body,
            parsed,
            request_id: None,
        }
    }

    /// Attach the service request ID to a rejection. Other variants are
    /// returned unchanged.
    pub fn with_request_id(mut self, id: Option<String>) -> Self {
        if let Self::RemoteRejection {
            ref mut request_id, ..
        } = self
        {
            *request_id = id;
        }
        self
    }

    /// Service request ID of a rejection, when the response carried one.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::RemoteRejection { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    /// HTTP status attached to the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::RemoteRejection { status, .. } | Self::Parse { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body for rejections and parse failures.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::RemoteRejection { body, .. } | Self::Parse { body, .. } => Some(body),
            _ => None,
        }
    }

    /// True for both flavours of a remote-side failure.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::RemoteRejection { .. } | Self::Parse { .. })
    }

    /// Whether the raw response body contains `needle`. This is how callers
    /// tell a missing object apart from other rejections.
    pub fn mentions(&self, needle: &str) -> bool {
        self.body().map(|b| b.contains(needle)).unwrap_or(false)
    }

    /// Transient by HTTP semantics: throttling, 5xx, connect/timeout failures.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { status: None, .. } => true,
            Self::Transport {
                status: Some(status),
                ..
            }
            | Self::RemoteRejection { status, .. } => {
                matches!(*status, 429 | 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for DirectoryError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Convenience result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;
