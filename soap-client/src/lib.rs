//! Private SOAP client for UPnP/TR-064 device communication
//!
//! This crate provides a minimal blocking SOAP client for invoking actions on
//! UPnP devices such as home gateways. Requests are always sent
//! unauthenticated first; if the device answers with an HTTP Digest
//! challenge, the same envelope is sent once more with an `Authorization`
//! header computed from the configured credentials.

pub mod digest;
pub mod envelope;
mod error;

pub use error::SoapError;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use xmltree::Element;

const CONTENT_TYPE: &str = "text/xml; charset=\"utf-8\"";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Username and password used to answer digest challenges
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// A single action invocation
#[derive(Debug, Clone, Copy)]
pub struct SoapRequest<'a> {
    /// Absolute control URL of the service
    pub control_url: &'a str,
    /// Service type, used as the action namespace and in the SOAPACTION header
    pub service_type: &'a str,
    /// Action name
    pub action: &'a str,
    /// Ordered `(name, value)` input arguments
    pub arguments: &'a [(&'a str, &'a str)],
}

/// Which of the two allowed attempts is being sent
#[derive(Debug)]
enum Attempt {
    Anonymous,
    Authenticated(String),
}

/// What came back from a single POST
#[derive(Debug)]
enum Reply {
    Success(String),
    Unauthorized {
        challenge: Option<String>,
        reason: String,
    },
    Failure {
        status: u16,
        reason: String,
        body: String,
    },
}

/// Builder for [`SoapClient`]
#[derive(Debug, Clone)]
pub struct SoapClientBuilder {
    timeout: Duration,
    verify_tls: bool,
    credentials: Option<Credentials>,
}

impl Default for SoapClientBuilder {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            verify_tls: true,
            credentials: None,
        }
    }
}

impl SoapClientBuilder {
    /// Overall timeout of a single request
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether HTTPS control URLs must present a valid certificate
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Credentials used when a device sends a digest challenge
    pub fn credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn build(self) -> Result<SoapClient, SoapError> {
        let mut agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT.min(self.timeout))
            .timeout(self.timeout);

        if !self.verify_tls {
            let connector = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
                .build()
                .map_err(|e| SoapError::Network(format!("Failed to create TLS connector: {}", e)))?;
            agent = agent.tls_connector(Arc::new(connector));
        }

        Ok(SoapClient {
            agent: agent.build(),
            credentials: self.credentials,
        })
    }
}

/// A minimal SOAP client for UPnP device communication
#[derive(Debug, Clone)]
pub struct SoapClient {
    agent: ureq::Agent,
    credentials: Option<Credentials>,
}

impl SoapClient {
    /// Create a new SOAP client with default configuration and no credentials
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(CONNECT_TIMEOUT)
                .timeout(DEFAULT_TIMEOUT)
                .build(),
            credentials: None,
        }
    }

    pub fn builder() -> SoapClientBuilder {
        SoapClientBuilder::default()
    }

    /// Whether digest challenges can be answered
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Send a SOAP request and return the parsed response document.
    ///
    /// The returned element is the document root (normally the `Envelope`).
    /// A `401` to the first attempt is [`SoapError::AuthenticationRequired`]
    /// when no credentials are configured. With credentials, a digest
    /// challenge is answered once and the outcome of the second attempt is
    /// final.
    pub fn call(&self, request: &SoapRequest<'_>) -> Result<Element, SoapError> {
        let body = envelope::build(request.service_type, request.action, request.arguments);
        let soap_action = format!("{}#{}", request.service_type, request.action);

        let mut attempt = Attempt::Anonymous;
        let (status, reason, response_body) = loop {
            let authorization = match &attempt {
                Attempt::Anonymous => None,
                Attempt::Authenticated(header) => Some(header.as_str()),
            };

            match self.send(request.control_url, &soap_action, &body, authorization)? {
                Reply::Success(xml_text) => return Self::extract_response(&xml_text),
                Reply::Unauthorized { challenge, reason } if matches!(attempt, Attempt::Anonymous) => {
                    // any 401 without credentials is final, challenge or not
                    let credentials = self
                        .credentials
                        .as_ref()
                        .ok_or(SoapError::AuthenticationRequired)?;
                    let Some(challenge) = challenge else {
                        break (401, reason, String::new());
                    };
                    debug!(action = %soap_action, "Answering digest challenge");
                    let path = request_path(request.control_url)?;
                    let header = digest::authorization_header(
                        &challenge,
                        &credentials.username,
                        &credentials.password,
                        &path,
                    )?;
                    attempt = Attempt::Authenticated(header);
                }
                Reply::Unauthorized { reason, .. } => break (401, reason, String::new()),
                Reply::Failure {
                    status,
                    reason,
                    body,
                } => break (status, reason, body),
            }
        };

        if matches!(attempt, Attempt::Authenticated(_)) && status == 401 {
            warn!(action = %soap_action, "Digest credentials rejected by device");
        }

        Err(Self::failure(status, reason, &response_body))
    }

    fn send(
        &self,
        url: &str,
        soap_action: &str,
        body: &str,
        authorization: Option<&str>,
    ) -> Result<Reply, SoapError> {
        debug!(url, soap_action, authenticated = authorization.is_some(), "POST");

        let mut request = self
            .agent
            .post(url)
            .set("Content-Type", CONTENT_TYPE)
            .set("SOAPACTION", soap_action);
        if let Some(header) = authorization {
            request = request.set("Authorization", header);
        }

        match request.send_string(body) {
            Ok(response) => {
                let status = response.status();
                let reason = response.status_text().to_string();
                let text = response
                    .into_string()
                    .map_err(|e| SoapError::Network(e.to_string()))?;
                if status == 200 {
                    Ok(Reply::Success(text))
                } else {
                    Ok(Reply::Failure {
                        status,
                        reason,
                        body: text,
                    })
                }
            }
            Err(ureq::Error::Status(401, response)) => {
                let challenge = response.header("WWW-Authenticate").map(str::to_string);
                let reason = response.status_text().to_string();
                // drain so the connection can be reused for the retry
                let _ = response.into_string();
                Ok(Reply::Unauthorized { challenge, reason })
            }
            Err(ureq::Error::Status(status, response)) => {
                let reason = response.status_text().to_string();
                let body = response.into_string().unwrap_or_default();
                Ok(Reply::Failure {
                    status,
                    reason,
                    body,
                })
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(SoapError::Network(transport.to_string()))
            }
        }
    }

    fn extract_response(xml_text: &str) -> Result<Element, SoapError> {
        let xml = envelope::parse(xml_text)?;
        match envelope::embedded_fault(&xml) {
            Some(fault) => Err(fault),
            None => Ok(xml),
        }
    }

    fn failure(status: u16, reason: String, body: &str) -> SoapError {
        if status == 500 {
            if let Some(fault) = envelope::parse(body)
                .ok()
                .and_then(|xml| envelope::upnp_fault(&xml))
            {
                return fault;
            }
        }
        SoapError::Http { status, reason }
    }
}

impl Default for SoapClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Path (and query) of a control URL, used as the digest `uri`
fn request_path(control_url: &str) -> Result<String, SoapError> {
    let url = url::Url::parse(control_url).map_err(|e| SoapError::InvalidUrl {
        url: control_url.to_string(),
        reason: e.to_string(),
    })?;

    Ok(match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    })
}
