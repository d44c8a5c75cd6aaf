//! Print every service and action of a gateway and call the read-only ones
//!
//! Configuration is read from the `FRITZBOX_*` environment variables.
//!
//! Usage: cargo run -p fritzbox-upnp --example list_services [templates.json]

use fritzbox_upnp::{inventory, logging, ClientConfig, Root};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging_from_env()?;

    let config = ClientConfig::from_env()?;
    let root = Root::load(config)?;
    println!("services loaded");

    print!("{}", inventory::describe(&root));

    println!();
    println!("read-only actions - results: variable: value");
    for probe in inventory::probe(&root) {
        println!("  {} {}", probe.service, probe.action);
        match probe.outcome {
            Ok(result) => {
                let mut entries: Vec<_> = result.into_iter().collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                for (variable, value) in entries {
                    println!("    {}: {}", variable, value);
                }
            }
            Err(e) => println!("    FAILED: {}", e),
        }
    }

    if let Some(path) = std::env::args().nth(1) {
        std::fs::write(&path, inventory::metric_templates_json(&root)?)?;
        println!("metric templates written to {}", path);
    }

    Ok(())
}
