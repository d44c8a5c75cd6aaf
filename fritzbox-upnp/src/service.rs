//! Services, actions, arguments and state variables of a loaded tree.

use std::collections::HashMap;
use std::sync::Arc;

use crate::device::{DeviceId, ServiceDescriptor};
use crate::error::{Result, UpnpError};
use crate::scpd::Scpd;
use crate::value::DataType;

/// A state variable declared in a service's state table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateVariable {
    pub name: String,
    pub data_type: DataType,
    /// Declared default; not used for decoding
    pub default_value: Option<String>,
    pub send_events: bool,
}

/// Direction of an action argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }

    fn parse(direction: &str) -> Option<Self> {
        match direction.trim() {
            "in" => Some(Direction::In),
            "out" => Some(Direction::Out),
            _ => None,
        }
    }
}

/// An argument of an action, resolved against its service's state table
#[derive(Debug, Clone)]
pub struct Argument {
    pub name: String,
    pub direction: Direction,
    pub related_state_variable: String,
    pub state_variable: Arc<StateVariable>,
}

/// A callable action of a service
#[derive(Debug, Clone)]
pub struct Action {
    pub name: String,
    /// Service type of the owning service
    pub service_type: String,
    pub arguments: Vec<Argument>,
    argument_index: HashMap<String, usize>,
}

impl Action {
    /// Look up an argument by its SOAP name
    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.argument_index.get(name).map(|&i| &self.arguments[i])
    }

    pub fn inputs(&self) -> impl Iterator<Item = &Argument> {
        self.arguments.iter().filter(|a| a.direction == Direction::In)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Argument> {
        self.arguments.iter().filter(|a| a.direction == Direction::Out)
    }

    /// Whether the action only queries information: no input arguments and
    /// at least one argument overall.
    pub fn is_read_only(&self) -> bool {
        self.inputs().next().is_none() && !self.arguments.is_empty()
    }
}

/// A fully loaded service
#[derive(Debug, Clone)]
pub struct Service {
    pub service_type: String,
    pub service_id: String,
    /// Control URL as declared, relative to the base URL
    pub control_url: String,
    pub event_sub_url: String,
    pub scpd_url: String,
    /// Device that declared this service
    pub device: DeviceId,
    pub actions: HashMap<String, Action>,
    pub state_variables: Vec<Arc<StateVariable>>,
}

impl Service {
    /// Build a service from its descriptor and parsed SCPD, resolving every
    /// argument's related state variable by exact name.
    pub(crate) fn from_scpd(descriptor: &ServiceDescriptor, device: DeviceId, scpd: Scpd) -> Result<Self> {
        let state_variables: Vec<Arc<StateVariable>> = scpd
            .service_state_table
            .state_variables
            .into_iter()
            .map(|v| {
                Arc::new(StateVariable {
                    data_type: DataType::from(v.data_type.as_str()),
                    name: v.name,
                    default_value: v.default_value,
                    send_events: v.send_events.as_deref() == Some("yes"),
                })
            })
            .collect();

        let by_name: HashMap<&str, &Arc<StateVariable>> = state_variables
            .iter()
            .map(|v| (v.name.as_str(), v))
            .collect();

        let mut actions = HashMap::new();
        for description in scpd.action_list.actions {
            let mut arguments = Vec::with_capacity(description.argument_list.arguments.len());
            let mut argument_index = HashMap::new();

            for argument in description.argument_list.arguments {
                let direction = Direction::parse(&argument.direction).ok_or_else(|| {
                    UpnpError::Parse(format!(
                        "Invalid direction '{}' for argument {} of {}#{}",
                        argument.direction, argument.name, descriptor.service_type, description.name
                    ))
                })?;

                let state_variable = by_name
                    .get(argument.related_state_variable.as_str())
                    .copied()
                    .map(Arc::clone)
                    .ok_or_else(|| UpnpError::UnresolvedStateVariable {
                        service: descriptor.service_type.clone(),
                        action: description.name.clone(),
                        argument: argument.name.clone(),
                        variable: argument.related_state_variable.clone(),
                    })?;

                argument_index.insert(argument.name.clone(), arguments.len());
                arguments.push(Argument {
                    name: argument.name,
                    direction,
                    related_state_variable: argument.related_state_variable,
                    state_variable,
                });
            }

            actions.insert(
                description.name.clone(),
                Action {
                    name: description.name,
                    service_type: descriptor.service_type.clone(),
                    arguments,
                    argument_index,
                },
            );
        }

        Ok(Self {
            service_type: descriptor.service_type.clone(),
            service_id: descriptor.service_id.clone(),
            control_url: descriptor.control_url.clone(),
            event_sub_url: descriptor.event_sub_url.clone(),
            scpd_url: descriptor.scpd_url.clone(),
            device,
            actions,
            state_variables,
        })
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    /// Action names in lexical order
    pub fn action_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn state_variable(&self, name: &str) -> Option<&Arc<StateVariable>> {
        self.state_variables.iter().find(|v| v.name == name)
    }
}
