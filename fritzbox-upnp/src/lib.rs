//! UPnP/TR-064 client for home gateways
//!
//! This crate loads the service tree a gateway such as a FRITZ!Box publishes
//! through its device descriptions (`igddesc.xml`, `tr64desc.xml`) and calls
//! the actions it offers over SOAP, answering HTTP Digest challenges
//! transparently.
//!
//! # Quick Start
//!
//! ```no_run
//! use fritzbox_upnp::{ClientConfig, Root};
//!
//! let config = ClientConfig::new().with_credentials("admin", "secret");
//! let root = Root::load(config)?;
//!
//! let result = root.call(
//!     "urn:schemas-upnp-org:service:WANCommonInterfaceConfig:1",
//!     "GetTotalBytesReceived",
//!     &[],
//! )?;
//! println!("{:?}", result.get("TotalBytesReceived"));
//! # Ok::<(), fritzbox_upnp::UpnpError>(())
//! ```
//!
//! # Action Handles
//!
//! Looking an action up once and calling it repeatedly avoids repeating the
//! lookup:
//!
//! ```no_run
//! use fritzbox_upnp::{ActionArgument, ClientConfig, Root};
//!
//! let root = Root::load(ClientConfig::from_env()?)?;
//! let entry = root.action(
//!     "urn:schemas-upnp-org:service:WANIPConnection:1",
//!     "GetGenericPortMappingEntry",
//! )?;
//!
//! for index in 0..4 {
//!     let result = entry.call(&[ActionArgument::new("NewPortMappingIndex", index.to_string())])?;
//!     println!("{:?}", result);
//! }
//! # Ok::<(), fritzbox_upnp::UpnpError>(())
//! ```

mod action;
pub mod config;
pub mod device;
mod error;
pub mod inventory;
mod loader;
pub mod logging;
mod root;
mod scpd;
pub mod service;
pub mod value;

pub use action::{ActionArgument, ActionHandle, ActionResult};
pub use config::ClientConfig;
pub use device::{Device, DeviceId, ServiceDescriptor};
pub use error::{Result, UpnpError};
pub use root::Root;
pub use service::{Action, Argument, Direction, Service, StateVariable};
pub use soap_client::SoapError;
pub use value::{DataType, Value};

/// Load a gateway's services with the given base URL and optional credentials.
///
/// This is a convenience function for the common case; use
/// [`Root::load`] with a [`ClientConfig`] for anything else.
pub fn load_services(
    base_url: &str,
    username: Option<&str>,
    password: Option<&str>,
    verify_tls: bool,
) -> Result<Root> {
    let config = ClientConfig {
        base_url: base_url.to_string(),
        username: username.map(str::to_string),
        password: password.map(str::to_string),
        verify_tls,
        ..Default::default()
    };

    Root::load(config)
}
