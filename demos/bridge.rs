use std::env;
use std::sync::Arc;

use daikin_ac_bridge::{Accessory, Attribute, BridgeHost, DaikinPlatform, PlatformConfig};
use tracing::Level;

/// Prints what a real host would store.
struct ConsoleHost;

impl BridgeHost for ConsoleHost {
    fn host_version(&self) -> &str {
        "console"
    }

    fn register_device(&self, accessory: &Accessory) -> daikin_ac_bridge::Result<()> {
        println!(
            "registered {} (serial {}) setpoint {:.1}\u{00b0}C",
            accessory.device_name(),
            accessory.serial_number(),
            f64::from(accessory.thermostat.occupied_cooling_setpoint) / 100.0,
        );
        Ok(())
    }

    fn set_attribute(&self, storage_key: &str, attribute: Attribute) -> daikin_ac_bridge::Result<()> {
        println!("[{storage_key}] {attribute:?}");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> daikin_ac_bridge::Result<()> {
    let args: Vec<String> = env::args().collect();
    let Some(path) = args.get(1) else {
        eprintln!("usage: bridge <config.json>");
        return Ok(());
    };
    let config = PlatformConfig::from_json(&std::fs::read_to_string(path)?)?;

    let level = if config.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut platform = DaikinPlatform::new(Arc::new(ConsoleHost), config);
    platform.on_start("demo").await?;
    platform.on_configure()?;

    println!("Bridging {} unit(s). Ctrl-C to stop.", platform.devices().len());
    tokio::signal::ctrl_c().await?;
    platform.on_shutdown("ctrl-c");
    Ok(())
}
