//! Error types for the SOAP client

use thiserror::Error;

/// Errors that can occur during SOAP communication
#[derive(Debug, Error)]
pub enum SoapError {
    /// Network or HTTP communication error
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    Parse(String),

    /// SOAP fault returned by the device inside a 500 response
    #[error("SOAP fault: error code {code}: {description}")]
    Fault { code: u16, description: String },

    /// Final response status was neither 200 nor a parseable fault
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    /// The device answered 401 but no credentials are configured
    #[error("Authentication required: device sent a digest challenge but no credentials are configured")]
    AuthenticationRequired,

    /// The challenge asks for a digest variant this client does not implement
    #[error("Unsupported digest challenge: {0}")]
    UnsupportedDigest(String),

    /// A control URL could not be parsed
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl SoapError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            SoapError::Http { status, .. } => Some(*status),
            SoapError::Fault { .. } => Some(500),
            _ => None,
        }
    }
}
