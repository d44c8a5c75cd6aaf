//! Call a single action and print its result as JSON
//!
//! Configuration is read from the `FRITZBOX_*` environment variables.
//!
//! Usage: cargo run -p fritzbox-upnp --example call_action -- \
//!     urn:dslforum-org:service:DeviceInfo:1 GetInfo [NewName=value ...]

use fritzbox_upnp::{logging, ActionArgument, ClientConfig, Root};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging_from_env()?;

    let mut args = std::env::args().skip(1);
    let (Some(service_type), Some(action)) = (args.next(), args.next()) else {
        eprintln!("usage: call_action <service type> <action> [name=value ...]");
        std::process::exit(2);
    };

    let arguments = args
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => Ok(ActionArgument::new(name, value)),
            None => Err(format!("argument '{}' is not of the form name=value", pair)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let root = Root::load(ClientConfig::from_env()?)?;
    let result = root.call(&service_type, &action, &arguments)?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
