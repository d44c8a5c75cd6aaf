//! Test helpers for fixture-based integration tests

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use fritzbox_upnp::ClientConfig;
use mockito::{Mock, ServerGuard};

pub const ANY_SERVICE: &str = "urn:schemas-any-com:service:Any:1";
pub const WAN_COMMON: &str = "urn:schemas-upnp-org:service:WANCommonInterfaceConfig:1";
pub const WAN_IP: &str = "urn:schemas-upnp-org:service:WANIPConnection:1";
pub const DEVICE_INFO: &str = "urn:dslforum-org:service:DeviceInfo:1";
pub const HOSTS: &str = "urn:dslforum-org:service:Hosts:1";
pub const FOO: &str = "urn:schemas-upnp-org:service:Foo:1";

/// Every document a gateway fixture serves, as `(path, fixture file)`
pub const GATEWAY_DOCUMENTS: &[(&str, &str)] = &[
    ("/igddesc.xml", "igddesc.xml"),
    ("/any.xml", "any.xml"),
    ("/igdicfgSCPD.xml", "igdicfgSCPD.xml"),
    ("/igdconnSCPD.xml", "igdconnSCPD.xml"),
    ("/tr64desc.xml", "tr64desc.xml"),
    ("/tr64anySCPD.xml", "tr64anySCPD.xml"),
    ("/deviceinfoSCPD.xml", "deviceinfoSCPD.xml"),
    ("/hostsSCPD.xml", "hostsSCPD.xml"),
];

/// Load a fixture from the fixtures directory
pub fn fixture(filename: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures");
    path.push(filename);

    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", filename, e))
}

/// Serve `body` as an XML document at `path`
pub fn serve(server: &mut ServerGuard, path: &str, body: &str) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(body)
        .create()
}

/// Serve every gateway document except those listed in `skip`
pub fn serve_gateway_except(server: &mut ServerGuard, skip: &[&str]) -> Vec<Mock> {
    GATEWAY_DOCUMENTS
        .iter()
        .filter(|(path, _)| !skip.contains(path))
        .map(|(path, file)| serve(server, path, &fixture(file)))
        .collect()
}

/// Serve both description trees of the gateway fixture
pub fn serve_gateway(server: &mut ServerGuard) -> Vec<Mock> {
    serve_gateway_except(server, &[])
}

/// Serve the single-service Foo device at the default IGD path
pub fn serve_foo_device(server: &mut ServerGuard) -> Vec<Mock> {
    vec![
        serve(server, "/igddesc.xml", &fixture("foodesc.xml")),
        serve(server, "/fooSCPD.xml", &fixture("fooSCPD.xml")),
    ]
}

/// Configuration pointing at a mock server
pub fn config_for(server: &ServerGuard) -> ClientConfig {
    ClientConfig::for_url(server.url())
}

/// A SOAP response envelope for `action` carrying `payload`
pub fn soap_response(service_type: &str, action: &str, payload: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
<s:Body>
<u:{action}Response xmlns:u="{service_type}">
{payload}
</u:{action}Response>
</s:Body>
</s:Envelope>"#
    )
}

/// A UPnP fault body as sent with a 500 status
pub fn soap_fault(code: u16, description: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
<s:Body>
<s:Fault>
<faultcode>s:Client</faultcode>
<faultstring>UPnPError</faultstring>
<detail>
<UPnPError xmlns="urn:schemas-upnp-org:control-1-0">
<errorCode>{code}</errorCode>
<errorDescription>{description}</errorDescription>
</UPnPError>
</detail>
</s:Fault>
</s:Body>
</s:Envelope>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_fixture() {
        for (_, file) in GATEWAY_DOCUMENTS {
            let xml = fixture(file);
            assert!(xml.starts_with("<?xml"));
        }
    }
}
