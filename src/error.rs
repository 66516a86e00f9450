//! Error types for the Watana SDK.
//!
//! Every fault raised inside the SDK is translated into [`WatanaError`]
//! before it reaches the caller. Nothing is retried automatically.

use thiserror::Error;

/// Result type for Watana operations.
pub type Result<T> = std::result::Result<T, WatanaError>;

/// Errors that can occur when using the Watana SDK.
#[derive(Error, Debug)]
pub enum WatanaError {
    /// A mandatory payload field was absent or null. Raised locally, the
    /// request is never sent.
    #[error("Validation error: missing mandatory field `{field}`")]
    Validation {
        /// Wire name of the missing field.
        field: String,
    },

    /// The service answered with a non-2xx status.
    #[error("Transport error ({status}): {reason}")]
    Transport {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
        /// Response body, kept for diagnostics.
        body: String,
    },

    /// Connection-level failure talking to the service.
    #[error("Communication error: {0}")]
    Communication(#[source] reqwest::Error),

    /// The configured timeout elapsed.
    #[error("Request timed out")]
    Timeout,

    /// The caller's cancellation signal fired before completion.
    #[error("Request cancelled")]
    Cancelled,

    /// The service answered with a content-type this SDK cannot handle.
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// The response JSON did not match the requested result type.
    #[error("Failed to decode response as {target}: {source}")]
    ResponseDecoding {
        /// Name of the target type.
        target: &'static str,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Building a zip archive failed.
    #[error("Compression error: {0}")]
    Compression(String),

    /// A zip archive contained no entries.
    #[error("Archive contains no entries")]
    EmptyArchive,

    /// The bytes are not a readable zip archive.
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    /// Malformed base64 input.
    #[error("Invalid base64 encoding: {0}")]
    InvalidEncoding(String),

    /// Missing or malformed client configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other failure.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for WatanaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WatanaError::Timeout
        } else if err.is_connect() || err.is_request() || err.is_body() {
            WatanaError::Communication(err)
        } else {
            WatanaError::Unexpected(err.to_string())
        }
    }
}

impl WatanaError {
    /// Returns the HTTP status code if available.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            WatanaError::Transport { status, .. } => Some(*status),
            WatanaError::Communication(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true if the call failed because the timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, WatanaError::Timeout)
    }

    /// Returns true if the call was rejected locally for a missing field.
    pub fn is_validation(&self) -> bool {
        matches!(self, WatanaError::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WatanaError::Transport {
            status: 500,
            reason: "Internal Server Error".to_string(),
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Transport error (500): Internal Server Error");

        let err = WatanaError::Validation {
            field: "carpeta_codigo".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Validation error: missing mandatory field `carpeta_codigo`"
        );
    }

    #[test]
    fn test_status_code() {
        let err = WatanaError::Transport {
            status: 404,
            reason: "Not Found".to_string(),
            body: String::new(),
        };
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(WatanaError::EmptyArchive.status_code(), None);
    }

    #[test]
    fn test_predicates() {
        assert!(WatanaError::Timeout.is_timeout());
        assert!(!WatanaError::Cancelled.is_timeout());
        assert!(
            WatanaError::Validation {
                field: "titulo".to_string()
            }
            .is_validation()
        );
    }

    #[test]
    fn test_decoding_error_names_target() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = WatanaError::ResponseDecoding {
            target: "watana::types::Envelope",
            source,
        };
        assert!(err.to_string().contains("watana::types::Envelope"));
    }
}
