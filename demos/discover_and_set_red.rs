//! Discover all Yeelight bulbs on the network and set them to red.
//!
//! This example demonstrates:
//! - Multicast discovery of bulbs on the local network
//! - Sending `set_rgb` to every discovered bulb
//!
//! Run with: cargo run --example discover_and_set_red

use std::time::Duration;
use yeelight_rs::channel::{self, TcpTransport};
use yeelight_rs::command;
use yeelight_rs::{Color, DeviceRegistry, DiscoveryListener};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Discovering Yeelight bulbs on the network...");

    let listener = DiscoveryListener::start("0.0.0.0:0", DeviceRegistry::new())?;
    listener.probe()?;

    // Replies arrive on the listener thread
    tokio::time::sleep(Duration::from_secs(3)).await;
    listener.stop();

    let devices = listener.registry().devices();
    if devices.is_empty() {
        println!("No bulbs found on the network.");
        return Ok(());
    }

    println!("Found {} bulb(s):", devices.len());
    for device in &devices {
        println!("  - {} at {}", device.id(), device.location());
    }

    let red = command::rgb(Color::rgb(255, 0, 0));
    let transport = TcpTransport::default();

    println!("\nSetting all bulbs to red...");

    for device in devices {
        if !device.supports(red.method()) {
            println!("  - {} does not support {}, skipped", device.id(), red.method());
            continue;
        }
        match channel::request(&transport, device.location(), &red).await {
            Ok(response) if response.is_ok() => {
                println!("  ✓ Successfully set {} to red", device.location())
            }
            Ok(response) => eprintln!(
                "  ✗ {} rejected the command: {:?}",
                device.location(),
                response.error
            ),
            Err(e) => eprintln!("  ✗ Failed to set {} to red: {}", device.location(), e),
        }
    }

    println!("\nDone!");
    Ok(())
}
