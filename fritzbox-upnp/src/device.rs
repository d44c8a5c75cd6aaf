//! Device description parsing and the device tree.
//!
//! A UPnP device description (`igddesc.xml`, `tr64desc.xml`) declares a root
//! device, the services it exposes and any embedded sub-devices. The parsed
//! tree is flattened into an arena owned by [`crate::Root`]; devices refer to
//! their parent and children through [`DeviceId`] handles.

use serde::{Deserialize, Serialize};

use crate::error::{Result, UpnpError};

/// Handle of a device inside a [`crate::Root`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub(crate) usize);

impl DeviceId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A `<service>` entry of a device description.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceDescriptor {
    #[serde(rename = "serviceType")]
    pub service_type: String,
    #[serde(rename = "serviceId", default)]
    pub service_id: String,
    #[serde(rename = "controlURL")]
    pub control_url: String,
    #[serde(rename = "eventSubURL", default)]
    pub event_sub_url: String,
    #[serde(rename = "SCPDURL")]
    pub scpd_url: String,
}

/// A device of the loaded tree.
#[derive(Debug, Clone)]
pub struct Device {
    pub id: DeviceId,
    /// Enclosing device, `None` for the root device of a description
    pub parent: Option<DeviceId>,
    pub device_type: String,
    pub friendly_name: String,
    pub manufacturer: String,
    pub manufacturer_url: String,
    pub model_description: String,
    pub model_name: String,
    pub model_number: String,
    pub model_url: String,
    pub udn: String,
    pub presentation_url: String,
    /// Services declared directly by this device, in document order
    pub services: Vec<ServiceDescriptor>,
    /// Embedded devices, in document order
    pub children: Vec<DeviceId>,
}

/// Device description root element.
#[derive(Debug, Deserialize)]
pub struct DescriptionDocument {
    pub device: DeviceDescription,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceList {
    #[serde(rename = "service", default)]
    pub services: Vec<ServiceDescriptor>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeviceList {
    #[serde(rename = "device", default)]
    pub devices: Vec<DeviceDescription>,
}

/// A `<device>` element as it appears in the XML.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescription {
    pub device_type: String,
    #[serde(default)]
    pub friendly_name: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(rename = "manufacturerURL", default)]
    pub manufacturer_url: String,
    #[serde(default)]
    pub model_description: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub model_number: String,
    #[serde(rename = "modelURL", default)]
    pub model_url: String,
    #[serde(rename = "UDN", default)]
    pub udn: String,
    #[serde(rename = "presentationURL", default)]
    pub presentation_url: String,
    #[serde(default)]
    pub service_list: ServiceList,
    #[serde(default)]
    pub device_list: DeviceList,
}

impl DeviceDescription {
    /// Parse the root device of a description document.
    ///
    /// # Errors
    ///
    /// Returns `UpnpError::Parse` if the XML is malformed or has no root device.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document: DescriptionDocument = quick_xml::de::from_str(xml)
            .map_err(|e| UpnpError::Parse(format!("Failed to parse device description: {}", e)))?;

        Ok(document.device)
    }

    /// Move this device and its descendants into `arena` in depth-first
    /// pre-order and return the id of this device.
    pub(crate) fn flatten(self, parent: Option<DeviceId>, arena: &mut Vec<Device>) -> DeviceId {
        let id = DeviceId(arena.len());
        arena.push(Device {
            id,
            parent,
            device_type: self.device_type,
            friendly_name: self.friendly_name,
            manufacturer: self.manufacturer,
            manufacturer_url: self.manufacturer_url,
            model_description: self.model_description,
            model_name: self.model_name,
            model_number: self.model_number,
            model_url: self.model_url,
            udn: self.udn,
            presentation_url: self.presentation_url,
            services: self.service_list.services,
            children: Vec::new(),
        });

        let children = self
            .device_list
            .devices
            .into_iter()
            .map(|child| child.flatten(Some(id), arena))
            .collect();
        arena[id.0].children = children;

        id
    }
}
