//! Fetching description documents and building the service index.
//!
//! The loader walks a description tree depth-first, a device's own services
//! before those of its children, fetching one SCPD per service. Every
//! failure aborts the walk.

use std::collections::HashMap;

use tracing::{debug, info};
use url::Url;

use crate::config::ClientConfig;
use crate::device::{Device, DeviceDescription, DeviceId, ServiceDescriptor};
use crate::error::{Result, UpnpError};
use crate::scpd::Scpd;
use crate::service::Service;

/// Resolve a URL declared in a description against the base URL.
///
/// Absolute references are used as they are; anything else is appended to
/// the base URL's path.
pub(crate) fn resolve_url(base_url: &Url, reference: &str) -> Result<Url> {
    if let Ok(absolute) = Url::parse(reference) {
        return Ok(absolute);
    }

    let base = base_url.as_str().trim_end_matches('/');
    let joined = if reference.starts_with('/') {
        format!("{}{}", base, reference)
    } else {
        format!("{}/{}", base, reference)
    };

    Url::parse(&joined).map_err(|e| UpnpError::InvalidUrl {
        url: joined,
        reason: e.to_string(),
    })
}

/// Blocking fetcher for device descriptions and SCPDs
pub(crate) struct DescriptionLoader {
    http: reqwest::blocking::Client,
    base_url: Url,
}

impl DescriptionLoader {
    pub(crate) fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = config.parsed_base_url()?;
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| UpnpError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch a document and return its body; any non-success status fails
    fn fetch(&self, reference: &str) -> Result<String> {
        let url = resolve_url(&self.base_url, reference)?;
        debug!(url = %url, "GET");

        let response = self
            .http
            .get(url.clone())
            .send()
            .map_err(|e| UpnpError::Network(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpnpError::Network(format!("Failed to fetch {}: HTTP {}", url, status)));
        }

        response
            .text()
            .map_err(|e| UpnpError::Network(format!("Failed to read response body of {}: {}", url, e)))
    }

    /// Fetch a device description and append its tree to `arena`
    pub(crate) fn load_tree(&self, path: &str, arena: &mut Vec<Device>) -> Result<DeviceId> {
        let xml = self.fetch(path)?;
        let description = DeviceDescription::from_xml(&xml)?;
        let first = arena.len();
        let root = description.flatten(None, arena);

        debug!(
            path,
            device_type = %arena[root.index()].device_type,
            devices = arena.len() - first,
            "Loaded device description"
        );
        Ok(root)
    }

    /// Load every service of the tree rooted at `root` into `services`.
    ///
    /// Services already present under the same service type are replaced.
    /// Returns the number of services loaded from this tree.
    pub(crate) fn load_services(
        &self,
        root: DeviceId,
        arena: &[Device],
        services: &mut HashMap<String, Service>,
    ) -> Result<usize> {
        let mut loaded = 0;
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            let device = &arena[id.index()];

            for descriptor in &device.services {
                let service = self.load_service(descriptor, id)?;
                if services.insert(service.service_type.clone(), service).is_some() {
                    debug!(service_type = %descriptor.service_type, "Replaced previously loaded service");
                }
                loaded += 1;
            }

            stack.extend(device.children.iter().rev().copied());
        }

        info!(
            root_device = %arena[root.index()].device_type,
            services = loaded,
            "Loaded service tree"
        );
        Ok(loaded)
    }

    fn load_service(&self, descriptor: &ServiceDescriptor, device: DeviceId) -> Result<Service> {
        let xml = self.fetch(&descriptor.scpd_url)?;
        let scpd = Scpd::from_xml(&xml)?;
        let service = Service::from_scpd(descriptor, device, scpd)?;

        debug!(
            service_type = %service.service_type,
            actions = service.actions.len(),
            state_variables = service.state_variables.len(),
            "Loaded service"
        );
        Ok(service)
    }
}
