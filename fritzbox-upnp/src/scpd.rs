//! Service Control Protocol Description (SCPD) documents.

use serde::Deserialize;

use crate::error::{Result, UpnpError};

/// `<scpd>` root element
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scpd {
    #[serde(default)]
    pub action_list: ActionList,
    #[serde(default)]
    pub service_state_table: ServiceStateTable,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActionList {
    #[serde(rename = "action", default)]
    pub actions: Vec<ActionDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescription {
    pub name: String,
    #[serde(default)]
    pub argument_list: ArgumentList,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArgumentList {
    #[serde(rename = "argument", default)]
    pub arguments: Vec<ArgumentDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentDescription {
    pub name: String,
    pub direction: String,
    pub related_state_variable: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceStateTable {
    #[serde(rename = "stateVariable", default)]
    pub state_variables: Vec<StateVariableDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateVariableDescription {
    #[serde(rename = "@sendEvents", default)]
    pub send_events: Option<String>,
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub default_value: Option<String>,
}

impl Scpd {
    /// Parse an SCPD document.
    ///
    /// # Errors
    ///
    /// Returns `UpnpError::Parse` if the XML is malformed or an action,
    /// argument or state variable lacks a required element.
    pub fn from_xml(xml: &str) -> Result<Self> {
        quick_xml::de::from_str(xml)
            .map_err(|e| UpnpError::Parse(format!("Failed to parse service description: {}", e)))
    }
}
