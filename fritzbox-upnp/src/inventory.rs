//! Listing what a gateway offers.
//!
//! Helpers for exploring a loaded [`Root`]: a printable service listing, JSON
//! templates for every readable value and a probe that calls every read-only
//! action once.

use std::fmt::Write;

use serde::Serialize;
use tracing::warn;

use crate::action::ActionResult;
use crate::error::UpnpError;
use crate::root::Root;
use crate::service::Action;

/// One readable value: the output `result` of `action` in `service`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricTemplate {
    pub service: String,
    pub action: String,
    pub result: String,
}

/// Outcome of calling one read-only action
#[derive(Debug)]
pub struct ProbeOutcome {
    pub service: String,
    pub action: String,
    pub outcome: Result<ActionResult, UpnpError>,
}

/// Human readable listing of every service, action and argument.
///
/// Services are sorted by type and actions by name; each argument is shown
/// as `variable [direction] (soap name, soap type)`.
pub fn describe(root: &Root) -> String {
    let mut out = String::new();

    for service_type in root.service_types() {
        let Some(service) = root.service(service_type) else {
            continue;
        };
        let _ = writeln!(out, "Service: {} (Url: {})", service_type, service.control_url);

        for name in service.action_names() {
            let Some(action) = service.action(name) else {
                continue;
            };
            let _ = writeln!(
                out,
                "  {} - arguments: variable [direction] (soap name, soap type)",
                action.name
            );
            for argument in &action.arguments {
                let _ = writeln!(
                    out,
                    "    {} [{}] ({}, {})",
                    argument.related_state_variable,
                    argument.direction.as_str(),
                    argument.name,
                    argument.state_variable.data_type
                );
            }
        }
    }

    out
}

/// One template per argument of every read-only action, sorted like
/// [`describe`]
pub fn metric_templates(root: &Root) -> Vec<MetricTemplate> {
    read_only_actions(root)
        .into_iter()
        .flat_map(|(service_type, action)| {
            action.arguments.iter().map(move |argument| MetricTemplate {
                service: service_type.to_string(),
                action: action.name.clone(),
                result: argument.related_state_variable.clone(),
            })
        })
        .collect()
}

/// [`metric_templates`] as a pretty-printed JSON array
pub fn metric_templates_json(root: &Root) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&metric_templates(root))
}

/// Call every read-only action without arguments.
///
/// Failures are recorded per action and do not stop the probe.
pub fn probe(root: &Root) -> Vec<ProbeOutcome> {
    read_only_actions(root)
        .into_iter()
        .map(|(service_type, action)| {
            let outcome = root.call(service_type, &action.name, &[]);
            if let Err(e) = &outcome {
                warn!(service_type, action = %action.name, error = %e, "Probe call failed");
            }
            ProbeOutcome {
                service: service_type.to_string(),
                action: action.name.clone(),
                outcome,
            }
        })
        .collect()
}

fn read_only_actions(root: &Root) -> Vec<(&str, &Action)> {
    let mut actions = Vec::new();
    for service_type in root.service_types() {
        let Some(service) = root.service(service_type) else {
            continue;
        };
        for name in service.action_names() {
            if let Some(action) = service.action(name).filter(|a| a.is_read_only()) {
                actions.push((service_type, action));
            }
        }
    }
    actions
}
