//! SOAP 1.1 envelope construction and response inspection
//!
//! Responses are parsed with xmltree, which drops text nodes made only of
//! whitespace. An element such as `<NewFoo>   </NewFoo>` therefore reads as
//! empty; whitespace around other text is kept as sent.

use quick_xml::escape::escape;
use xmltree::{Element, XMLNode};

use crate::error::SoapError;

const ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const ENCODING_STYLE: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// Build the request envelope for `action` of `service_type`.
///
/// Each argument becomes `<name>value</name>` inside the action element, in
/// the order given. Values are XML-escaped; names are sent verbatim since
/// they come from the device's own SCPD.
pub fn build(service_type: &str, action: &str, arguments: &[(&str, &str)]) -> String {
    let mut payload = String::new();
    for (name, value) in arguments {
        payload.push_str(&format!("<{name}>{}</{name}>", escape(*value), name = name));
    }

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><s:Envelope xmlns:s="{envelope_ns}" s:encodingStyle="{encoding_style}"><s:Body><u:{action} xmlns:u="{service_type}">{payload}</u:{action}></s:Body></s:Envelope>"#,
        envelope_ns = ENVELOPE_NS,
        encoding_style = ENCODING_STYLE,
        action = action,
        service_type = escape(service_type),
        payload = payload
    )
}

/// Parse a response body into its root element
pub fn parse(body: &str) -> Result<Element, SoapError> {
    Element::parse(body.as_bytes()).map_err(|e| SoapError::Parse(e.to_string()))
}

/// Depth-first search for the first element (self included) named `name`
pub fn find_element<'a>(element: &'a Element, name: &str) -> Option<&'a Element> {
    if element.name == name {
        return Some(element);
    }
    element.children.iter().find_map(|child| match child {
        XMLNode::Element(child) => find_element(child, name),
        _ => None,
    })
}

/// Text content of an element, empty for self-closing and
/// whitespace-only elements
pub fn text_of(element: &Element) -> String {
    element
        .get_text()
        .map(|text| text.into_owned())
        .unwrap_or_default()
}

/// Extract the UPnP error carried by a fault body.
///
/// Returns `None` when no `errorCode` with a numeric value is present, so the
/// caller can fall back to the HTTP status text.
pub fn upnp_fault(xml: &Element) -> Option<SoapError> {
    let code = find_element(xml, "errorCode")
        .map(text_of)
        .and_then(|text| text.trim().parse::<u16>().ok())?;
    let description = find_element(xml, "errorDescription")
        .map(text_of)
        .unwrap_or_default();

    Some(SoapError::Fault {
        code,
        description: description.trim().to_string(),
    })
}

/// Check a 200 response for an embedded `<s:Fault>`
pub fn embedded_fault(xml: &Element) -> Option<SoapError> {
    let fault = find_element(xml, "Fault")?;
    Some(upnp_fault(fault).unwrap_or_else(|| SoapError::Fault {
        code: 500,
        description: find_element(fault, "faultstring")
            .map(text_of)
            .unwrap_or_default(),
    }))
}
