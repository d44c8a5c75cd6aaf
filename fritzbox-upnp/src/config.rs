//! Configuration types for the fritzbox-upnp crate
//!
//! [`ClientConfig`] controls where descriptions are fetched from, which
//! credentials answer digest challenges and how the HTTP transports behave.

use std::time::Duration;

use url::Url;

use crate::error::{Result, UpnpError};

/// Environment variable holding the gateway base URL
pub const ENV_GATEWAY_URL: &str = "FRITZBOX_GATEWAY_URL";
/// Environment variable holding the username
pub const ENV_USERNAME: &str = "FRITZBOX_USERNAME";
/// Environment variable holding the password
pub const ENV_PASSWORD: &str = "FRITZBOX_PASSWORD";
/// Environment variable toggling certificate verification
pub const ENV_VERIFY_TLS: &str = "FRITZBOX_VERIFY_TLS";
/// Environment variable holding the request timeout in seconds
pub const ENV_TIMEOUT_SECS: &str = "FRITZBOX_TIMEOUT_SECS";

/// Configuration for loading and calling a gateway's services
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every description, SCPD and control URL is resolved against
    /// Default: http://fritz.box:49000
    pub base_url: String,

    /// Username for digest authentication
    /// Default: None
    pub username: Option<String>,

    /// Password for digest authentication
    /// Default: None
    pub password: Option<String>,

    /// Verify the device certificate on HTTPS connections
    /// Default: false
    pub verify_tls: bool,

    /// Timeout applied to every GET and POST
    /// Default: 10 seconds
    pub timeout: Duration,

    /// Also load the TR-064 description on top of the IGD one
    /// Default: true
    pub load_tr64: bool,

    /// Path of the primary (IGD) description
    /// Default: /igddesc.xml
    pub igd_description_path: String,

    /// Path of the secondary (TR-064) description
    /// Default: /tr64desc.xml
    pub tr64_description_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://fritz.box:49000".to_string(),
            username: None,
            password: None,
            verify_tls: false,
            timeout: Duration::from_secs(10),
            load_tr64: true,
            igd_description_path: "/igddesc.xml".to_string(),
            tr64_description_path: "/tr64desc.xml".to_string(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("verify_tls", &self.verify_tls)
            .field("timeout", &self.timeout)
            .field("load_tr64", &self.load_tr64)
            .field("igd_description_path", &self.igd_description_path)
            .field("tr64_description_path", &self.tr64_description_path)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new ClientConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ClientConfig for the given base URL
    pub fn for_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Create a ClientConfig that only loads the IGD description
    pub fn igd_only() -> Self {
        Self {
            load_tr64: false,
            ..Default::default()
        }
    }

    /// Create a ClientConfig for the TLS port of a FRITZ!Box, with
    /// certificate verification enabled
    pub fn secure() -> Self {
        Self {
            base_url: "https://fritz.box:49443".to_string(),
            verify_tls: true,
            ..Default::default()
        }
    }

    /// Read the configuration from the `FRITZBOX_*` environment variables,
    /// keeping defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ClientConfig::from_env`] with a custom variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_GATEWAY_URL) {
            config.base_url = url;
        }
        config.username = lookup(ENV_USERNAME).filter(|v| !v.is_empty());
        config.password = lookup(ENV_PASSWORD).filter(|v| !v.is_empty());

        if let Some(raw) = lookup(ENV_VERIFY_TLS) {
            config.verify_tls = parse_flag(&raw).ok_or_else(|| {
                UpnpError::Configuration(format!("{} must be a boolean, got '{}'", ENV_VERIFY_TLS, raw))
            })?;
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                UpnpError::Configuration(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_TIMEOUT_SECS, raw
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        self.parsed_base_url()?;

        if self.password.is_some() && self.username.is_none() {
            return Err(UpnpError::Configuration(
                "A password was given without a username".to_string(),
            ));
        }

        if self.timeout == Duration::ZERO {
            return Err(UpnpError::Configuration(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        for path in [&self.igd_description_path, &self.tr64_description_path] {
            if !path.starts_with('/') {
                return Err(UpnpError::Configuration(format!(
                    "Description path '{}' must start with '/'",
                    path
                )));
            }
        }

        Ok(())
    }

    /// The base URL, parsed and checked for an http(s) scheme
    pub fn parsed_base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url).map_err(|e| UpnpError::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(UpnpError::InvalidUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", other),
            }),
        }
    }

    /// Credentials for the SOAP client, present when a username is set
    pub fn credentials(&self) -> Option<soap_client::Credentials> {
        self.username.as_ref().map(|username| {
            soap_client::Credentials::new(username.clone(), self.password.clone().unwrap_or_default())
        })
    }

    // Builder pattern methods for fluent configuration

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_tr64(mut self, enabled: bool) -> Self {
        self.load_tr64 = enabled;
        self
    }

    pub fn with_description_paths(mut self, igd: impl Into<String>, tr64: impl Into<String>) -> Self {
        self.igd_description_path = igd.into();
        self.tr64_description_path = tr64.into();
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
