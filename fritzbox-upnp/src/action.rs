//! Invoking actions and decoding their results.

use std::collections::HashMap;

use soap_client::{envelope, SoapRequest};
use tracing::debug;
use xmltree::{Element, XMLNode};

use crate::error::Result;
use crate::root::Root;
use crate::service::{Action, Direction, Service};
use crate::value::{decode, Value};

/// Decoded output values of one call, keyed by state variable name
pub type ActionResult = HashMap<String, Value>;

/// An input argument passed to an action call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionArgument {
    pub name: String,
    pub value: String,
}

impl ActionArgument {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<N: Into<String>, V: Into<String>> From<(N, V)> for ActionArgument {
    fn from((name, value): (N, V)) -> Self {
        Self::new(name, value)
    }
}

/// An action together with the service and root it belongs to
#[derive(Debug, Clone, Copy)]
pub struct ActionHandle<'a> {
    root: &'a Root,
    service: &'a Service,
    action: &'a Action,
}

impl<'a> ActionHandle<'a> {
    pub(crate) fn new(root: &'a Root, service: &'a Service, action: &'a Action) -> Self {
        Self { root, service, action }
    }

    pub fn service(&self) -> &'a Service {
        self.service
    }

    pub fn action(&self) -> &'a Action {
        self.action
    }

    /// Invoke the action with the given input arguments, in order.
    ///
    /// Arguments are sent as given; the device validates them. The result
    /// holds one entry per output argument found in the response.
    pub fn call(&self, arguments: &[ActionArgument]) -> Result<ActionResult> {
        let control_url = self.root.control_url(self.service)?;
        let pairs: Vec<(&str, &str)> = arguments
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_str()))
            .collect();

        let request = SoapRequest {
            control_url: control_url.as_str(),
            service_type: &self.service.service_type,
            action: &self.action.name,
            arguments: &pairs,
        };

        let response = self.root.soap_client().call(&request)?;
        let result = decode_response(self.action, &response)?;

        debug!(
            service_type = %self.service.service_type,
            action = %self.action.name,
            values = result.len(),
            "Action call succeeded"
        );
        Ok(result)
    }
}

/// Collect the values of every element, at any depth and in document order,
/// named like one of the action's output arguments.
pub(crate) fn decode_response(action: &Action, response: &Element) -> Result<ActionResult> {
    let mut result = ActionResult::new();
    collect_outputs(action, response, &mut result)?;
    Ok(result)
}

fn collect_outputs(action: &Action, element: &Element, result: &mut ActionResult) -> Result<()> {
    if let Some(argument) = action
        .argument(&element.name)
        .filter(|a| a.direction == Direction::Out)
    {
        let value = decode(&envelope::text_of(element), &argument.state_variable.data_type)?;
        result.insert(argument.state_variable.name.clone(), value);
    }

    for child in &element.children {
        if let XMLNode::Element(child) = child {
            collect_outputs(action, child, result)?;
        }
    }
    Ok(())
}
