//! Error types for Linode API operations.
//!
//! Every fallible operation in the workspace returns [`Error`]. The variants
//! follow the failure taxonomy of the API client: transport failures never
//! carry a status code, decoded provider error bodies become [`ApiError`],
//! and non-2xx responses with undecodable bodies fall back to [`Error::Http`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Main error type for Linode API operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Connection, timeout or DNS failure before a response was received
    #[error("Transport error ({kind}): {message}")]
    Transport {
        /// Broad category of the transport failure
        kind: TransportKind,
        /// Underlying error message
        message: String,
    },

    /// The requested resource does not exist (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(ApiError),

    /// Decoded provider error body for any other non-2xx status
    #[error("API error: {0}")]
    Api(ApiError),

    /// Non-2xx response whose body could not be decoded
    #[error("HTTP error {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Missing or invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-supplied options failed local validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// The request context was cancelled or its deadline elapsed
    #[error("Request cancelled: {0}")]
    Cancelled(String),

    /// A successful response carried a body that could not be deserialized
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Specialized result type for Linode API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Category of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// Could not establish a connection (includes DNS resolution failures)
    Connect,
    /// The exchange exceeded the configured request timeout
    Timeout,
    /// Any other failure while sending the request or reading the response
    Request,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connect => "connect",
            Self::Timeout => "timeout",
            Self::Request => "request",
        };
        f.write_str(name)
    }
}

/// A single entry of the provider error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReason {
    /// Field the reason applies to, for validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Human-readable reason
    pub reason: String,
}

/// Structured error decoded from a provider error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP status code of the failed exchange
    pub status: u16,
    /// Human-readable summary of all reasons
    pub message: String,
    /// Individual reasons, in the order the provider returned them
    #[serde(default)]
    pub reasons: Vec<ErrorReason>,
}

impl ApiError {
    /// Build a structured error from the provider's reason list.
    #[must_use]
    pub fn from_reasons(status: u16, reasons: Vec<ErrorReason>) -> Self {
        let message = reasons
            .iter()
            .map(|r| match &r.field {
                Some(field) => format!("{field}: {}", r.reason),
                None => r.reason.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self {
            status,
            message,
            reasons,
        }
    }

    /// Map of field name to reason for validation-style failures.
    ///
    /// Reasons without a field are omitted.
    #[must_use]
    pub fn field_reasons(&self) -> BTreeMap<&str, &str> {
        self.reasons
            .iter()
            .filter_map(|r| r.field.as_deref().map(|f| (f, r.reason.as_str())))
            .collect()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:03}] {}", self.status, self.message)
    }
}

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Api(_) => "API_ERROR",
            Self::Http { .. } => "HTTP_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Cancelled(_) => "CANCELLED",
            Self::Decode(_) => "DECODE_ERROR",
        }
    }

    /// HTTP status code, when the error originated from a completed exchange.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound(api) | Self::Api(api) => Some(api.status),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true for a 404 from any operation.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns true for transport-level failures.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Response bodies are parsed with serde_json; a failed body stream
        // is a transport failure.
        if err.is_builder() {
            return Self::Config(err.to_string());
        }

        let kind = if err.is_timeout() {
            TransportKind::Timeout
        } else if err.is_connect() {
            TransportKind::Connect
        } else {
            TransportKind::Request
        };

        Self::Transport {
            kind,
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::Config(format!("Invalid URL: {err}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}
