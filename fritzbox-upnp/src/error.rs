//! Error types for loading and calling UPnP services.

use soap_client::SoapError;
use thiserror::Error;

/// Errors raised while loading a device's service tree or invoking an action.
#[derive(Debug, Error)]
pub enum UpnpError {
    /// Transport failure or non-success status while fetching a description
    #[error("Network error: {0}")]
    Network(String),

    /// A description document is not well-formed or not the expected schema
    #[error("Parse error: {0}")]
    Parse(String),

    /// A URL in the configuration or in a description could not be resolved
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// An argument names a state variable its service does not declare
    #[error(
        "Unresolved state variable '{variable}' for argument '{argument}' of {service}#{action}"
    )]
    UnresolvedStateVariable {
        service: String,
        action: String,
        argument: String,
        variable: String,
    },

    /// No service with this service type was loaded
    #[error("Service {0} not found")]
    ServiceNotFound(String),

    /// The service does not declare this action
    #[error("Action {action} not found in service {service}")]
    ActionNotFound { service: String, action: String },

    /// A response value is declared with a data type the decoder does not know
    #[error("Unknown datatype '{data_type}' for value '{value}'")]
    UnknownDataType { data_type: String, value: String },

    /// A response value could not be parsed as its declared type
    #[error("Invalid {data_type} value '{value}': {reason}")]
    InvalidValue {
        data_type: String,
        value: String,
        reason: String,
    },

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Failure reported by the SOAP layer
    #[error(transparent)]
    Soap(#[from] SoapError),
}

/// Convenience Result type alias for this crate.
pub type Result<T> = std::result::Result<T, UpnpError>;
