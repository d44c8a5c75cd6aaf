//! The loaded service registry of a gateway.

use std::collections::HashMap;

use soap_client::SoapClient;
use tracing::info;
use url::Url;

use crate::action::{ActionArgument, ActionHandle, ActionResult};
use crate::config::ClientConfig;
use crate::device::{Device, DeviceId};
use crate::error::{Result, UpnpError};
use crate::loader::{resolve_url, DescriptionLoader};
use crate::service::Service;

/// All services of a gateway, merged from its description documents.
///
/// A `Root` is read-only once loaded and can be shared across threads.
/// Reloading means loading a new `Root` and replacing the old one.
#[derive(Debug)]
pub struct Root {
    config: ClientConfig,
    base_url: Url,
    devices: Vec<Device>,
    root_devices: Vec<DeviceId>,
    services: HashMap<String, Service>,
    soap: SoapClient,
}

impl Root {
    /// Fetch the description documents named by `config` and every SCPD they
    /// reference.
    ///
    /// The TR-064 tree (when enabled) is loaded after the IGD tree, and its
    /// services replace IGD services of the same type.
    ///
    /// # Errors
    ///
    /// Any invalid configuration, transport failure, non-success status,
    /// malformed document or unresolved state variable fails the whole load.
    pub fn load(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let loader = DescriptionLoader::new(&config)?;
        let soap = SoapClient::builder()
            .timeout(config.timeout)
            .verify_tls(config.verify_tls)
            .credentials(config.credentials())
            .build()?;

        let mut devices = Vec::new();
        let mut root_devices = vec![loader.load_tree(&config.igd_description_path, &mut devices)?];
        if config.load_tr64 {
            root_devices.push(loader.load_tree(&config.tr64_description_path, &mut devices)?);
        }

        let mut services = HashMap::new();
        for &root in &root_devices {
            loader.load_services(root, &devices, &mut services)?;
        }

        info!(
            base_url = %loader.base_url(),
            devices = devices.len(),
            services = services.len(),
            "Gateway services loaded"
        );

        Ok(Self {
            base_url: loader.base_url().clone(),
            config,
            devices,
            root_devices,
            services,
            soap,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Look up a service by its service type
    pub fn service(&self, service_type: &str) -> Option<&Service> {
        self.services.get(service_type)
    }

    /// All services keyed by service type
    pub fn services(&self) -> &HashMap<String, Service> {
        &self.services
    }

    /// Service types in lexical order
    pub fn service_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.services.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Every device of every loaded tree, in depth-first pre-order
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// The root device of each loaded description, IGD first
    pub fn root_devices(&self) -> &[DeviceId] {
        &self.root_devices
    }

    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.devices.get(id.index())
    }

    /// Look up an action of a service
    ///
    /// # Errors
    ///
    /// `ServiceNotFound` or `ActionNotFound` when either name is unknown.
    pub fn action(&self, service_type: &str, action_name: &str) -> Result<ActionHandle<'_>> {
        let service = self
            .service(service_type)
            .ok_or_else(|| UpnpError::ServiceNotFound(service_type.to_string()))?;
        let action = service.action(action_name).ok_or_else(|| UpnpError::ActionNotFound {
            service: service_type.to_string(),
            action: action_name.to_string(),
        })?;

        Ok(ActionHandle::new(self, service, action))
    }

    /// Look up and invoke an action in one step
    pub fn call(
        &self,
        service_type: &str,
        action_name: &str,
        arguments: &[ActionArgument],
    ) -> Result<ActionResult> {
        self.action(service_type, action_name)?.call(arguments)
    }

    /// Absolute control URL of a service
    pub fn control_url(&self, service: &Service) -> Result<Url> {
        resolve_url(&self.base_url, &service.control_url)
    }

    pub(crate) fn soap_client(&self) -> &SoapClient {
        &self.soap
    }
}
