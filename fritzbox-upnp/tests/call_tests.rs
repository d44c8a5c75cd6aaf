//! Action invocation against a mock gateway

mod helpers;

use fritzbox_upnp::{ActionArgument, Root, SoapError, UpnpError, Value};
use helpers::*;
use mockito::{Matcher, Server, ServerGuard};

const CHALLENGE: &str = r#"Digest realm="F!Box SOAP-Auth", nonce="0F4D2B1A9C3E5D77", qop="auth", algorithm=MD5"#;

fn foo_root(server: &mut ServerGuard) -> Root {
    let _mocks = serve_foo_device(server);
    Root::load(config_for(server).with_tr64(false)).expect("foo device should load")
}

fn gateway_root(server: &mut ServerGuard, credentials: Option<(&str, &str)>) -> Root {
    let _mocks = serve_gateway(server);
    let mut config = config_for(server);
    if let Some((username, password)) = credentials {
        config = config.with_credentials(username, password);
    }
    Root::load(config).expect("gateway should load")
}

/// Pull `key="value"` out of an Authorization header
fn directive<'a>(header: &'a str, key: &str) -> &'a str {
    let marker = format!(" {}=\"", key);
    let start = header.find(&marker).map(|i| i + marker.len()).unwrap();
    let end = header[start..].find('"').unwrap();
    &header[start..start + end]
}

#[test]
fn test_get_foo_returns_value_keyed_by_state_variable() {
    let mut server = Server::new();
    let root = foo_root(&mut server);
    let control = server
        .mock("POST", "/upnp/control/foo")
        .match_header("soapaction", "urn:schemas-upnp-org:service:Foo:1#GetFoo")
        .match_header("content-type", "text/xml; charset=\"utf-8\"")
        .with_status(200)
        .with_body(soap_response(FOO, "GetFoo", "<NewFoo>bar</NewFoo>"))
        .create();

    let result = root.call(FOO, "GetFoo", &[]).unwrap();

    control.assert();
    assert_eq!(result.len(), 1);
    assert_eq!(result.get("Foo"), Some(&Value::String("bar".to_string())));
}

#[test]
fn test_input_arguments_are_sent_in_order() {
    let mut server = Server::new();
    let root = foo_root(&mut server);
    let control = server
        .mock("POST", "/upnp/control/foo")
        .match_body(Matcher::Regex(
            r#"<u:SetFoo xmlns:u="urn:schemas-upnp-org:service:Foo:1"><NewFoo>a &lt; b</NewFoo><NewCount>7</NewCount></u:SetFoo>"#
                .to_string(),
        ))
        .with_status(200)
        .with_body(soap_response(FOO, "SetFoo", ""))
        .create();

    let result = root
        .action(FOO, "SetFoo")
        .unwrap()
        .call(&[
            ActionArgument::new("NewFoo", "a < b"),
            ActionArgument::new("NewCount", "7"),
        ])
        .unwrap();

    control.assert();
    assert!(result.is_empty());
}

#[test]
fn test_typed_outputs_are_decoded() {
    let mut server = Server::new();
    let root = gateway_root(&mut server, None);
    let _control = server
        .mock("POST", "/igdupnp/control/WANIPConn1")
        .with_status(200)
        .with_body(soap_response(
            WAN_IP,
            "GetStatusInfo",
            "<NewConnectionStatus>Connected</NewConnectionStatus>\
             <NewLastConnectionError/>\
             <NewUptime>4294967296</NewUptime>\
             <NewUnexpected>ignored</NewUnexpected>",
        ))
        .create();

    let result = root.call(WAN_IP, "GetStatusInfo", &[]).unwrap();

    assert_eq!(result.len(), 3);
    assert_eq!(result["ConnectionStatus"].as_str(), Some("Connected"));
    assert_eq!(result["LastConnectionError"].as_str(), Some(""));
    assert_eq!(result["Uptime"].as_u64(), Some(4_294_967_296));
}

#[test]
fn test_boolean_output() {
    let mut server = Server::new();
    let root = gateway_root(&mut server, None);
    let _control = server
        .mock("POST", "/igdupnp/control/WANIPConn1")
        .match_body(Matcher::Regex("<NewPortMappingIndex>0</NewPortMappingIndex>".to_string()))
        .with_status(200)
        .with_body(soap_response(WAN_IP, "GetGenericPortMappingEntry", "<NewEnabled>1</NewEnabled>"))
        .create();

    let result = root
        .call(WAN_IP, "GetGenericPortMappingEntry", &[("NewPortMappingIndex", "0").into()])
        .unwrap();

    assert_eq!(result["PortMappingEnabled"], Value::Bool(true));
}

#[test]
fn test_digest_retry_response_matches_formula() {
    let mut server = Server::new();
    let root = gateway_root(&mut server, Some(("admin", "secret")));
    let challenge = server
        .mock("POST", "/upnp/control/deviceinfo")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_header("WWW-Authenticate", CHALLENGE)
        .expect(1)
        .create();
    // echo the Authorization header back as the model name
    let authorized = server
        .mock("POST", "/upnp/control/deviceinfo")
        .match_header("authorization", Matcher::Regex("^Digest ".to_string()))
        .with_status(200)
        .with_body_from_request(|request| {
            let header = request.header("authorization")[0].to_str().unwrap().to_string();
            soap_response(
                DEVICE_INFO,
                "GetInfo",
                &format!("<NewModelName>{}</NewModelName><NewUpTime>120</NewUpTime>", header),
            )
            .into_bytes()
        })
        .expect(1)
        .create();

    let result = root.call(DEVICE_INFO, "GetInfo", &[]).unwrap();

    challenge.assert();
    authorized.assert();
    assert_eq!(result["UpTime"], Value::UInt(120));

    let header = result["ModelName"].as_str().unwrap();
    assert!(header.starts_with("Digest username=\"admin\""));
    assert!(header.contains(" nc=00000001,"));
    assert!(header.contains(" qop=auth,"));
    assert_eq!(directive(header, "realm"), "F!Box SOAP-Auth");
    assert_eq!(directive(header, "uri"), "/upnp/control/deviceinfo");

    let cnonce = directive(header, "cnonce");
    let expected = soap_client::digest::response_digest(
        "admin",
        "F!Box SOAP-Auth",
        "secret",
        "0F4D2B1A9C3E5D77",
        "00000001",
        cnonce,
        "auth",
        "/upnp/control/deviceinfo",
    );
    assert_eq!(directive(header, "response"), expected);
}

#[test]
fn test_challenge_without_credentials() {
    let mut server = Server::new();
    let root = gateway_root(&mut server, None);
    let _control = server
        .mock("POST", "/upnp/control/deviceinfo")
        .with_status(401)
        .with_header("WWW-Authenticate", CHALLENGE)
        .expect(1)
        .create();

    let err = root.call(DEVICE_INFO, "GetInfo", &[]).unwrap_err();
    assert!(matches!(err, UpnpError::Soap(SoapError::AuthenticationRequired)));
}

#[test]
fn test_fault_surfaces_code_and_description() {
    let mut server = Server::new();
    let root = gateway_root(&mut server, Some(("admin", "wrong")));
    let _control = server
        .mock("POST", "/upnp/control/hosts")
        .with_status(500)
        .with_header("content-type", "text/xml")
        .with_body(soap_fault(401, "Action not authorized"))
        .create();

    let err = root.call(HOSTS, "GetHostNumberOfEntries", &[]).unwrap_err();

    assert!(matches!(
        err,
        UpnpError::Soap(SoapError::Fault { code: 401, .. })
    ));
    let message = err.to_string();
    assert!(message.contains("401"), "{}", message);
    assert!(message.contains("Action not authorized"), "{}", message);
}

#[test]
fn test_unparseable_fault_falls_back_to_status() {
    let mut server = Server::new();
    let root = gateway_root(&mut server, None);
    let _control = server
        .mock("POST", "/upnp/control/hosts")
        .with_status(500)
        .with_body("Internal Server Error")
        .create();

    let err = root.call(HOSTS, "GetHostNumberOfEntries", &[]).unwrap_err();
    assert!(matches!(
        err,
        UpnpError::Soap(SoapError::Http { status: 500, .. })
    ));
}

#[test]
fn test_output_with_wrong_type_fails() {
    let mut server = Server::new();
    let root = gateway_root(&mut server, None);
    let _control = server
        .mock("POST", "/upnp/control/hosts")
        .with_status(200)
        .with_body(soap_response(
            HOSTS,
            "GetHostNumberOfEntries",
            "<NewHostNumberOfEntries>many</NewHostNumberOfEntries>",
        ))
        .create();

    let err = root.call(HOSTS, "GetHostNumberOfEntries", &[]).unwrap_err();
    assert!(matches!(err, UpnpError::InvalidValue { .. }));
}

#[test]
fn test_unknown_service_and_action() {
    let mut server = Server::new();
    let root = foo_root(&mut server);

    assert!(matches!(
        root.call("urn:schemas-upnp-org:service:Bar:1", "GetBar", &[]),
        Err(UpnpError::ServiceNotFound(_))
    ));

    match root.action(FOO, "GetBar") {
        Err(UpnpError::ActionNotFound { service, action }) => {
            assert_eq!(service, FOO);
            assert_eq!(action, "GetBar");
        }
        other => panic!("Expected ActionNotFound, got {:?}", other.map(|h| h.action().name.clone())),
    }
}

#[test]
fn test_control_url_resolution() {
    let mut server = Server::new();
    let root = foo_root(&mut server);
    let service = root.service(FOO).unwrap();

    assert_eq!(
        root.control_url(service).unwrap().as_str(),
        format!("{}/upnp/control/foo", server.url())
    );
}

#[test]
fn test_root_shared_across_threads() {
    let mut server = Server::new();
    let root = std::sync::Arc::new(foo_root(&mut server));
    let control = server
        .mock("POST", "/upnp/control/foo")
        .with_status(200)
        .with_body(soap_response(FOO, "GetFoo", "<NewFoo>bar</NewFoo>"))
        .expect(4)
        .create();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let root = std::sync::Arc::clone(&root);
            std::thread::spawn(move || root.call(FOO, "GetFoo", &[]).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap()["Foo"].as_str(), Some("bar"));
    }
    control.assert();
}
