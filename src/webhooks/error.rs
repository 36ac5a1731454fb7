//! Error types for the admission webhook.

use thiserror::Error;

/// Errors returned by an admission validator.
#[derive(Error, Debug)]
pub enum AdmissionError {
    /// The request context carried no dry-run flag
    #[error("admission request has no dryRun flag")]
    MissingDryRun,

    /// The request did not carry the object required for this operation
    #[error("missing {0} in admission request")]
    MissingObject(&'static str),

    /// An object could not be decoded into a ScaledJob
    #[error("failed to decode {which} as ScaledJob: {message}")]
    Decode { which: &'static str, message: String },

    /// The resource was rejected by validation
    #[error("{0}")]
    Denied(String),
}

impl AdmissionError {
    /// Check if this error is a validation outcome rather than a malformed request
    pub fn is_denial(&self) -> bool {
        matches!(self, AdmissionError::Denied(_))
    }
}

/// Errors that can occur when running the webhook server
#[derive(Error, Debug)]
pub enum WebhookError {
    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),

    /// Server error
    #[error("Webhook server error: {0}")]
    Server(String),
}
